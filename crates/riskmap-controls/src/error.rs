//! Error types for riskmap-controls

use thiserror::Error;

/// Errors raised while evaluating controls or deriving residual risk.
#[derive(Error, Debug)]
pub enum ControlError {
    /// A criterion score outside 0..=100
    #[error("criterion {criterion} must be within 0..=100, got {value}")]
    InvalidScore { criterion: &'static str, value: f64 },

    /// A mitigation percentage outside [0, 1]
    #[error("mitigation percentage must be within 0..=1, got {0}")]
    InvalidMitigation(f64),

    /// Unrecognised effectiveness rating
    #[error("unknown effectiveness rating: {0:?}")]
    UnknownEffectiveness(String),

    /// A risk with no causes to aggregate
    #[error("risk {0} has no causes")]
    NoCauses(String),

    /// Core domain error
    #[error(transparent)]
    Risk(#[from] riskmap_core::RiskError),
}

/// Result type for control operations
pub type Result<T> = std::result::Result<T, ControlError>;
