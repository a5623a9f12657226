//! Flat binary trees produced by the classic (non-boosting) tree builder.
//!
//! Nodes live in a `Vec` and address their children by index.
//! A node without a feature index is a leaf.

pub mod node;
pub mod binary_tree;

pub use node::Node;
pub use binary_tree::{
    BinaryTree,
    ProbabilityPrediction,
};
