//! Domain-level error taxonomy for riskmap.

/// Errors produced while reading or compiling a matrix configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid cell key: {key:?} (expected \"probability-impact\")")]
    InvalidCellKey { key: String },

    #[error("invalid color for level {level_id}: {color:?}")]
    InvalidColor { level_id: String, color: String },

    #[error("duplicate level id in catalog: {0}")]
    DuplicateLevelId(String),

    #[error("unknown band preset: {0:?}")]
    UnknownPreset(String),

    #[error("appetite threshold must be within 1..=25, got {0}")]
    InvalidAppetiteThreshold(f64),
}

/// riskmap domain errors.
#[derive(Debug, thiserror::Error)]
pub enum RiskError {
    #[error("cell out of range: probability={probability}, impact={impact} (both must be 1..=5)")]
    CellOutOfRange { probability: i64, impact: i64 },

    #[error("non-finite coordinate: probability={probability}, impact={impact}")]
    NonFiniteCoordinate { probability: f64, impact: f64 },

    #[error("impact rating for {dimension:?} must be within 0..=5, got {value}")]
    InvalidImpactRating {
        dimension: crate::evaluation::ImpactDimension,
        value: u8,
    },

    #[error("invalid color: {0:?}")]
    InvalidColor(String),

    #[error("unknown risk level: {0:?}")]
    UnknownLevel(String),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for riskmap domain operations.
pub type Result<T> = std::result::Result<T, RiskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_out_of_range_display() {
        let err = RiskError::CellOutOfRange {
            probability: 6,
            impact: 0,
        };
        let msg = err.to_string();
        assert!(msg.contains("probability=6"));
        assert!(msg.contains("impact=0"));
    }

    #[test]
    fn test_config_error_wraps() {
        let err: RiskError = ConfigError::InvalidCellKey {
            key: "9-x".to_string(),
        }
        .into();
        assert!(err.to_string().contains("config error"));
        assert!(err.to_string().contains("9-x"));
    }
}
