//! Defines some common functions used in this library.

/// Defines some checker functions.
pub(crate) mod checker;

/// Defines presorting and order statistics helpers.
pub mod utils;

pub use utils::{
    ordered_elements,
    median,
    score_at_percentile,
    mask_from_indices,
};
