//! Prioritization score for action plans.

use serde::{Deserialize, Serialize};

/// Variables rated for a risk when ranking it for treatment.
///
/// Unrated variables count as 0.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct PriorityVariables {
    #[serde(default)]
    pub capacity: Option<f64>,
    #[serde(default)]
    pub complexity: Option<f64>,
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub other: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PriorityWeights {
    pub capacity: f64,
    pub complexity: f64,
    pub speed: f64,
    pub other: f64,
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            capacity: 0.25,
            complexity: 0.25,
            speed: 0.25,
            other: 0.25,
        }
    }
}

impl PriorityWeights {
    pub fn with_capacity(mut self, weight: f64) -> Self {
        self.capacity = weight;
        self
    }

    pub fn with_complexity(mut self, weight: f64) -> Self {
        self.complexity = weight;
        self
    }

    pub fn with_speed(mut self, weight: f64) -> Self {
        self.speed = weight;
        self
    }

    pub fn with_other(mut self, weight: f64) -> Self {
        self.other = weight;
        self
    }
}

/// Weighted sum of the rated variables. Non-finite ratings count as 0.
pub fn priority_score(variables: &PriorityVariables, weights: &PriorityWeights) -> f64 {
    let value = |v: Option<f64>| v.filter(|x| x.is_finite()).unwrap_or(0.0);
    value(variables.capacity) * weights.capacity
        + value(variables.complexity) * weights.complexity
        + value(variables.speed) * weights.speed
        + value(variables.other) * weights.other
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_average() {
        let vars = PriorityVariables {
            capacity: Some(4.0),
            complexity: Some(2.0),
            speed: Some(3.0),
            other: Some(1.0),
        };
        assert_eq!(priority_score(&vars, &PriorityWeights::default()), 2.5);
    }

    #[test]
    fn test_missing_variables_are_zero() {
        let vars = PriorityVariables {
            capacity: Some(4.0),
            other: Some(f64::NAN),
            ..Default::default()
        };
        assert_eq!(priority_score(&vars, &PriorityWeights::default()), 1.0);
        assert_eq!(
            priority_score(&PriorityVariables::default(), &PriorityWeights::default()),
            0.0
        );
    }

    #[test]
    fn test_custom_weights() {
        let vars = PriorityVariables {
            capacity: Some(5.0),
            speed: Some(5.0),
            ..Default::default()
        };
        let weights = PriorityWeights::default()
            .with_capacity(0.5)
            .with_complexity(0.0)
            .with_speed(0.5)
            .with_other(0.0);
        assert_eq!(priority_score(&vars, &weights), 5.0);
    }
}
