use thiserror::Error;

use crate::pipeline::Column;

/// Structural failures inside the indicator pipeline.
///
/// Numeric degeneracies (zero divisors, constant windows) are not errors;
/// they are coerced to 0 where they occur.
#[derive(Debug, Error, PartialEq)]
pub enum PipelineError {
    #[error("column `{0}` read before the stage producing it ran")]
    MissingColumn(Column),

    #[error("column `{column}` has {actual} values, table has {expected} bars")]
    LengthMismatch {
        column: Column,
        expected: usize,
        actual: usize,
    },
}

/// Invalid pipeline parameters
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} window must be at least 1, got {value}")]
    ZeroWindow { name: &'static str, value: usize },

    #[error("decay ratio must lie strictly between 0 and 1, got {0}")]
    InvalidRatio(f64),

    #[error("pressure power must be positive, got {0}")]
    InvalidPower(f64),

    #[error("band width factor must be non-negative, got {0}")]
    InvalidBandWidth(f64),

    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}
