//! Defines the error type shared by every learner in this crate.
//! Configuration errors are reported eagerly,
//! either when a builder is consumed or when a learner is called.

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, TreeError>;


/// Errors reported by the tree learners and the impurity calculators.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TreeError {
    /// The maximal tree depth must be positive.
    #[error("maximum tree depth must be larger than 0, got {0}")]
    InvalidMaxDepth(usize),

    /// The minimum split size must be positive.
    #[error("minimum split size must be larger than 0, got {0}")]
    InvalidMinSplitSize(usize),

    /// The minimum information gain must be positive.
    #[error("minimum information gain must be larger than 0, got {0}")]
    InvalidMinInformationGain(f64),

    /// More features per split were requested than the data has.
    #[error(
        "features per split ({requested}) exceeds \
        the number of available features ({available})"
    )]
    FeaturesPrSplitTooLarge {
        /// Requested number of features per split.
        requested: usize,
        /// Number of columns in the observations.
        available: usize,
    },

    /// Two inputs that must be aligned have different lengths.
    #[error("length mismatch for `{what}`: expected {expected}, got {got}")]
    LengthMismatch {
        /// Name of the offending input.
        what: &'static str,
        /// Expected length.
        expected: usize,
        /// Observed length.
        got: usize,
    },

    /// The learner was given no sample to work on.
    #[error("no sample is selected; at least one row is required")]
    EmptySample,

    /// A matrix was built from rows of unequal length.
    #[error("row {row} has {got} columns, expected {expected}")]
    RaggedRows {
        /// Index of the offending row.
        row: usize,
        /// Column count of the first row.
        expected: usize,
        /// Column count of the offending row.
        got: usize,
    },

    /// An interval is reversed or reaches past the end of the data.
    #[error("interval [{from}, {to}) is invalid for data of length {len}")]
    InvalidInterval {
        /// Inclusive start.
        from: usize,
        /// Exclusive end.
        to: usize,
        /// Length of the indexed data.
        len: usize,
    },

    /// The sweep cursor of an impurity calculator was moved backwards.
    #[error("new position {requested} must not be smaller than the current position {current}")]
    NonMonotonicPosition {
        /// Current cursor position.
        current: usize,
        /// Requested cursor position.
        requested: usize,
    },

    /// The sweep cursor of an impurity calculator was moved past its interval.
    #[error("position {position} lies outside the interval [{from}, {to}]")]
    PositionOutOfInterval {
        /// Requested cursor position.
        position: usize,
        /// Inclusive start of the interval.
        from: usize,
        /// Exclusive end of the interval.
        to: usize,
    },

    /// A class label is not one of the target names.
    #[error("class label {0} is not one of the target names")]
    UnknownLabel(f64),

    /// Classification needs at least two distinct target values.
    #[error("classification requires at least 2 classes, got {0}")]
    TooFewClasses(usize),

    /// The learning rate must be positive.
    #[error("learning rate must be larger than 0, got {0}")]
    InvalidLearningRate(f64),

    /// The number of boosting iterations must be positive.
    #[error("iterations must be at least 1, got {0}")]
    InvalidIterations(usize),

    /// The row subsampling ratio must be in `(0, 1]`.
    #[error("subsample ratio must be in (0, 1], got {0}")]
    InvalidSubsampleRatio(f64),

    /// The loss parameter `alpha` must be in `(0, 1]`.
    #[error("alpha must be in (0, 1], got {0}")]
    InvalidAlpha(f64),

    /// Early stopping must check at least once before the last iteration.
    #[error("early stopping rounds ({rounds}) must be in [1, {iterations})")]
    InvalidEarlyStoppingRounds {
        /// Requested number of rounds between checks.
        rounds: usize,
        /// Configured number of iterations.
        iterations: usize,
    },

    /// A node refers to a node or probability vector that does not exist.
    #[error("node {node} refers to the missing index {index}")]
    DegenerateTree {
        /// Index of the referring node.
        node: usize,
        /// Index that could not be resolved.
        index: usize,
    },
}
