//! Matrix coordinates and the risk points placed on them.

use serde::{Deserialize, Serialize};

use super::error::{ConfigError, RiskError};
use super::level::Classification;

/// Smallest valid probability/impact value.
pub const MIN_AXIS: u8 = 1;
/// Largest valid probability/impact value.
pub const MAX_AXIS: u8 = 5;

/// A validated (probability, impact) coordinate on the 5×5 matrix.
///
/// Ordering is lexicographic on `(probability, impact)`, which is also the
/// scan order used by [`Cell::all`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "RawCell")]
pub struct Cell {
    probability: u8,
    impact: u8,
}

#[derive(Deserialize)]
struct RawCell {
    probability: i64,
    impact: i64,
}

impl TryFrom<RawCell> for Cell {
    type Error = RiskError;

    fn try_from(raw: RawCell) -> Result<Self, Self::Error> {
        Cell::checked(raw.probability, raw.impact)
    }
}

impl Cell {
    /// Create a cell, rejecting values outside `1..=5`.
    pub fn new(probability: u8, impact: u8) -> Result<Self, RiskError> {
        Self::checked(i64::from(probability), i64::from(impact))
    }

    fn checked(probability: i64, impact: i64) -> Result<Self, RiskError> {
        let range = i64::from(MIN_AXIS)..=i64::from(MAX_AXIS);
        if range.contains(&probability) && range.contains(&impact) {
            Ok(Self {
                probability: probability as u8,
                impact: impact as u8,
            })
        } else {
            Err(RiskError::CellOutOfRange {
                probability,
                impact,
            })
        }
    }

    /// Round to the nearest integer and clamp into `1..=5`.
    ///
    /// This is the upstream clamping step callers apply before classifying
    /// values that came from calculations rather than from a picker.
    pub fn clamped(probability: f64, impact: f64) -> Result<Self, RiskError> {
        if !probability.is_finite() || !impact.is_finite() {
            return Err(RiskError::NonFiniteCoordinate {
                probability,
                impact,
            });
        }
        let clamp = |v: f64| v.round().clamp(f64::from(MIN_AXIS), f64::from(MAX_AXIS)) as u8;
        Ok(Self {
            probability: clamp(probability),
            impact: clamp(impact),
        })
    }

    /// Clamp integer coordinates into `1..=5`.
    pub fn saturating(probability: u8, impact: u8) -> Self {
        Self {
            probability: probability.clamp(MIN_AXIS, MAX_AXIS),
            impact: impact.clamp(MIN_AXIS, MAX_AXIS),
        }
    }

    pub fn probability(&self) -> u8 {
        self.probability
    }

    pub fn impact(&self) -> u8 {
        self.impact
    }

    /// Plain product `probability * impact`, without the (2,2) exception.
    pub fn raw_product(&self) -> u8 {
        self.probability * self.impact
    }

    /// Risk score of this cell (see [`crate::score::score`]).
    pub fn score(&self) -> f64 {
        crate::score::score(self.probability, self.impact)
    }

    /// Canonical configuration key, `"{probability}-{impact}"`.
    pub fn key(&self) -> String {
        format!("{}-{}", self.probability, self.impact)
    }

    /// Parse a `"{probability}-{impact}"` key.
    pub fn parse_key(key: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidCellKey {
            key: key.to_string(),
        };
        let (p, i) = key.trim().split_once('-').ok_or_else(invalid)?;
        let probability: u8 = p.trim().parse().map_err(|_| invalid())?;
        let impact: u8 = i.trim().parse().map_err(|_| invalid())?;
        Cell::new(probability, impact).map_err(|_| invalid())
    }

    /// All 25 cells in scan order: probability 1..=5, then impact 1..=5.
    pub fn all() -> impl Iterator<Item = Cell> {
        (MIN_AXIS..=MAX_AXIS).flat_map(|probability| {
            (MIN_AXIS..=MAX_AXIS).map(move |impact| Cell {
                probability,
                impact,
            })
        })
    }

    /// Neighbour at the given offset, if it is still on the grid.
    pub fn offset(&self, d_probability: i8, d_impact: i8) -> Option<Cell> {
        let p = self.probability as i8 + d_probability;
        let i = self.impact as i8 + d_impact;
        if p < MIN_AXIS as i8 || p > MAX_AXIS as i8 || i < MIN_AXIS as i8 || i > MAX_AXIS as i8 {
            return None;
        }
        Some(Cell {
            probability: p as u8,
            impact: i as u8,
        })
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.probability, self.impact)
    }
}

impl std::str::FromStr for Cell {
    type Err = RiskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Cell::parse_key(s)?)
    }
}

/// A risk placed on the map, as produced by the risk-evaluation collaborator.
///
/// Coordinates are stored as received. Use [`RiskPoint::inherent_cell`] and
/// [`RiskPoint::explicit_residual_cell`] to obtain clamped cells.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskPoint {
    /// Risk identifier (e.g. "1GFA").
    pub id: String,

    #[serde(default)]
    pub description: String,

    pub probability: u8,

    pub impact: u8,

    #[serde(default)]
    pub classification: Classification,

    #[serde(default)]
    pub residual_probability: Option<u8>,

    #[serde(default)]
    pub residual_impact: Option<u8>,

    /// Continuous residual score after control mitigation, when the
    /// evaluation produced a score rather than residual coordinates.
    #[serde(default)]
    pub residual_score: Option<f64>,
}

impl RiskPoint {
    /// Create a negative risk at the given inherent coordinates.
    pub fn new(id: impl Into<String>, probability: u8, impact: u8) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            probability,
            impact,
            classification: Classification::Negative,
            residual_probability: None,
            residual_impact: None,
            residual_score: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_classification(mut self, classification: Classification) -> Self {
        self.classification = classification;
        self
    }

    pub fn with_residual_cell(mut self, probability: u8, impact: u8) -> Self {
        self.residual_probability = Some(probability);
        self.residual_impact = Some(impact);
        self
    }

    pub fn with_residual_score(mut self, score: f64) -> Self {
        self.residual_score = Some(score);
        self
    }

    /// Inherent cell, clamped into range. A zero coordinate counts as 1.
    pub fn inherent_cell(&self) -> Cell {
        Cell::saturating(self.probability, self.impact)
    }

    /// Residual cell from explicit residual coordinates, if both are set and
    /// non-zero.
    pub fn explicit_residual_cell(&self) -> Option<Cell> {
        match (self.residual_probability, self.residual_impact) {
            (Some(p), Some(i)) if p > 0 && i > 0 => Some(Cell::saturating(p, i)),
            _ => None,
        }
    }

    /// Whether the stored inherent coordinates needed clamping.
    pub fn needs_clamping(&self) -> bool {
        Cell::new(self.probability, self.impact).is_err()
    }
}
