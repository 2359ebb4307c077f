use thiserror::Error;

/// Errors raised while constructing an [`EngineConfig`](crate::config::EngineConfig).
///
/// All of these are construction-time: once an `EngineConfig` exists it is
/// immutable and every field has already been validated.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("similarity_threshold must be in [0.0, 1.0], got {0}")]
    ThresholdOutOfRange(f64),

    #[error("min_cluster_size must be >= 1, got {0}")]
    MinClusterSizeTooSmall(usize),

    #[error("max_clusters must be >= 1, got {0}")]
    MaxClustersTooSmall(usize),

    #[error("min_pattern_length ({min}) must be <= max_pattern_length ({max})")]
    PatternLengthRange { min: usize, max: usize },

    #[error("min_pattern_length must be >= 1, got {0}")]
    MinPatternLengthTooSmall(usize),

    #[error("min_pattern_specificity must be in [0.0, 1.0], got {0}")]
    SpecificityOutOfRange(f64),

    #[error("hierarchy threshold must be in [0.0, 1.0], got {0}")]
    HierarchyThresholdOutOfRange(f64),

    #[error("invalid regular expression: {0}")]
    InvalidRegex(#[from] fancy_regex::Error),
}
