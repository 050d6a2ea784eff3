//! Control design criteria and the weighted control score.

use serde::{Deserialize, Serialize};

use crate::error::{ControlError, Result};

/// Criterion scores of a control, each in `0..=100`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ControlCriteria {
    pub applicability: f64,
    pub coverage: f64,
    pub ease_of_use: f64,
    pub segregation: f64,
    pub nature: f64,
}

impl ControlCriteria {
    fn fields(&self) -> [(&'static str, f64); 5] {
        [
            ("applicability", self.applicability),
            ("coverage", self.coverage),
            ("ease_of_use", self.ease_of_use),
            ("segregation", self.segregation),
            ("nature", self.nature),
        ]
    }

    /// Reject scores outside `0..=100` (and non-finite ones).
    pub fn validate(&self) -> Result<()> {
        for (criterion, value) in self.fields() {
            if !(0.0..=100.0).contains(&value) {
                return Err(ControlError::InvalidScore { criterion, value });
            }
        }
        Ok(())
    }
}

/// Weight of each criterion in the control score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CriteriaWeights {
    pub applicability: f64,
    pub coverage: f64,
    pub ease_of_use: f64,
    pub segregation: f64,
    pub nature: f64,
}

impl Default for CriteriaWeights {
    fn default() -> Self {
        Self {
            applicability: 0.25,
            coverage: 0.25,
            ease_of_use: 0.10,
            segregation: 0.20,
            nature: 0.20,
        }
    }
}

/// Weighted control score in `0..=100`.
pub fn control_score(criteria: &ControlCriteria, weights: &CriteriaWeights) -> Result<f64> {
    criteria.validate()?;
    Ok(criteria.applicability * weights.applicability
        + criteria.coverage * weights.coverage
        + criteria.ease_of_use * weights.ease_of_use
        + criteria.segregation * weights.segregation
        + criteria.nature * weights.nature)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_marks_score_hundred() {
        let criteria = ControlCriteria {
            applicability: 100.0,
            coverage: 100.0,
            ease_of_use: 100.0,
            segregation: 100.0,
            nature: 100.0,
        };
        let score = control_score(&criteria, &CriteriaWeights::default()).unwrap();
        assert!((score - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_weighted_sum() {
        let criteria = ControlCriteria {
            applicability: 100.0,
            coverage: 50.0,
            ease_of_use: 0.0,
            segregation: 100.0,
            nature: 0.0,
        };
        // 25 + 12.5 + 0 + 20 + 0
        let score = control_score(&criteria, &CriteriaWeights::default()).unwrap();
        assert!((score - 57.5).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let criteria = ControlCriteria {
            coverage: 120.0,
            ..Default::default()
        };
        let err = control_score(&criteria, &CriteriaWeights::default()).unwrap_err();
        assert!(err.to_string().contains("coverage"));

        let criteria = ControlCriteria {
            nature: f64::NAN,
            ..Default::default()
        };
        assert!(criteria.validate().is_err());
    }
}
