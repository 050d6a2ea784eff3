//! Inherent evaluation: impact dimensions aggregated into a matrix cell.
//!
//! A risk is rated on nine impact dimensions. The **maximum** impact drives
//! the matrix cell and the inherent score; the weighted **global** impact is
//! reported alongside it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::classifier::{Classifier, MapKind};
use crate::domain::{Cell, Classification, Result, RiskError, RiskLevel, MAX_AXIS, MIN_AXIS};
use crate::score::score;

// ---------------------------------------------------------------------------
// Impact dimensions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ImpactDimension {
    Environmental,
    Confidentiality,
    Availability,
    Economic,
    Integrity,
    Legal,
    People,
    Processes,
    Reputation,
}

impl ImpactDimension {
    pub const ALL: [ImpactDimension; 9] = [
        ImpactDimension::Environmental,
        ImpactDimension::Confidentiality,
        ImpactDimension::Availability,
        ImpactDimension::Economic,
        ImpactDimension::Integrity,
        ImpactDimension::Legal,
        ImpactDimension::People,
        ImpactDimension::Processes,
        ImpactDimension::Reputation,
    ];

    /// Weight in the global impact. The information-security dimensions
    /// carry no weight but still count toward the maximum.
    pub fn weight(&self) -> f64 {
        match self {
            ImpactDimension::Environmental => 0.22,
            ImpactDimension::Confidentiality => 0.0,
            ImpactDimension::Availability => 0.0,
            ImpactDimension::Economic => 0.22,
            ImpactDimension::Integrity => 0.0,
            ImpactDimension::Legal => 0.22,
            ImpactDimension::People => 0.14,
            ImpactDimension::Processes => 0.10,
            ImpactDimension::Reputation => 0.10,
        }
    }
}

// ---------------------------------------------------------------------------
// Impacts
// ---------------------------------------------------------------------------

/// Impact ratings per dimension, each in `1..=5`.
///
/// Unrated dimensions count as 1.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct Impacts {
    ratings: BTreeMap<ImpactDimension, u8>,
}

impl Impacts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rate a dimension. Zero clears the rating.
    pub fn with(mut self, dimension: ImpactDimension, value: u8) -> Result<Self> {
        if value > MAX_AXIS {
            return Err(RiskError::InvalidImpactRating { dimension, value });
        }
        if value == 0 {
            self.ratings.remove(&dimension);
        } else {
            self.ratings.insert(dimension, value);
        }
        Ok(self)
    }

    /// Rating of a dimension, 1 when unrated.
    pub fn get(&self, dimension: ImpactDimension) -> u8 {
        self.ratings
            .get(&dimension)
            .copied()
            .filter(|v| *v > 0)
            .map_or(MIN_AXIS, |v| v.min(MAX_AXIS))
    }

    /// `ceil(Σ rating × weight)`.
    pub fn global(&self) -> u8 {
        let weighted: f64 = ImpactDimension::ALL
            .iter()
            .map(|d| f64::from(self.get(*d)) * d.weight())
            .sum();
        // Guard against 0.22 + 0.22 + ... landing a hair above an integer.
        let rounded = (weighted * 1e9).round() / 1e9;
        rounded.ceil().clamp(f64::from(MIN_AXIS), f64::from(MAX_AXIS)) as u8
    }

    /// Highest rating across all dimensions.
    pub fn max(&self) -> u8 {
        ImpactDimension::ALL
            .iter()
            .map(|d| self.get(*d))
            .max()
            .unwrap_or(MIN_AXIS)
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Result of an inherent evaluation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InherentEvaluation {
    pub cell: Cell,
    pub global_impact: u8,
    pub max_impact: u8,
    pub score: f64,
    pub level: RiskLevel,
    pub classification: Classification,
}

/// Evaluate a risk from its probability and impact ratings.
///
/// The cell is (probability, max impact). Opportunities are always `Low`;
/// threats take the classifier's inherent level of the cell.
pub fn evaluate_inherent(
    probability: u8,
    impacts: &Impacts,
    classification: Classification,
    classifier: &Classifier<'_>,
) -> InherentEvaluation {
    let max_impact = impacts.max();
    let cell = Cell::saturating(probability, max_impact);
    let level = match classification {
        Classification::Positive => RiskLevel::Low,
        Classification::Negative => classifier.level(MapKind::Inherent, cell),
    };
    InherentEvaluation {
        cell,
        global_impact: impacts.global(),
        max_impact,
        score: score(cell.probability(), cell.impact()),
        level,
        classification,
    }
}
