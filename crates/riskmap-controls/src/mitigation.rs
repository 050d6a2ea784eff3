//! Mitigation percentages and residual frequency/impact.

use serde::{Deserialize, Serialize};

use crate::effectiveness::Effectiveness;
use crate::error::{ControlError, Result};

/// Share of frequency or impact a control removes, per definitive rating.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MitigationTable {
    pub highly_effective: f64,
    pub effective: f64,
    pub moderate: f64,
    pub low: f64,
    pub ineffective: f64,
    pub not_applicable: f64,
}

impl Default for MitigationTable {
    fn default() -> Self {
        Self::advanced()
    }
}

impl MitigationTable {
    /// Table used with the five-criterion control evaluation.
    pub fn advanced() -> Self {
        Self {
            highly_effective: 0.81,
            effective: 0.61,
            moderate: 0.33,
            low: 0.20,
            ineffective: 0.0,
            not_applicable: 0.0,
        }
    }

    /// Flat table from the simplified evaluation.
    pub fn basic() -> Self {
        Self {
            highly_effective: 0.34,
            effective: 0.34,
            moderate: 0.20,
            low: 0.10,
            ineffective: 0.0,
            not_applicable: 0.0,
        }
    }

    pub fn percentage(&self, rating: Effectiveness) -> f64 {
        match rating {
            Effectiveness::HighlyEffective => self.highly_effective,
            Effectiveness::Effective => self.effective,
            Effectiveness::Moderate => self.moderate,
            Effectiveness::Low => self.low,
            Effectiveness::Ineffective => self.ineffective,
            Effectiveness::NotApplicable => self.not_applicable,
        }
    }
}

/// Which axis a control acts on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum MitigationTarget {
    #[serde(alias = "FRECUENCIA")]
    Frequency,
    #[serde(alias = "IMPACTO")]
    Impact,
    #[default]
    #[serde(alias = "AMBAS")]
    Both,
}

impl MitigationTarget {
    pub fn reduces_frequency(&self) -> bool {
        matches!(self, MitigationTarget::Frequency | MitigationTarget::Both)
    }

    pub fn reduces_impact(&self) -> bool {
        matches!(self, MitigationTarget::Impact | MitigationTarget::Both)
    }
}

fn check_percentage(pct: f64) -> Result<()> {
    if (0.0..=1.0).contains(&pct) {
        Ok(())
    } else {
        Err(ControlError::InvalidMitigation(pct))
    }
}

/// `max(1, ceil(value - value * pct))`.
pub fn mitigate(value: u8, pct: f64) -> Result<u8> {
    check_percentage(pct)?;
    let v = f64::from(value);
    let residual = ((v - v * pct) * 1e9).round() / 1e9;
    Ok(residual.ceil().max(1.0) as u8)
}

/// Residual frequency; unchanged when the control only targets impact.
pub fn residual_frequency(frequency: u8, pct: f64, target: MitigationTarget) -> Result<u8> {
    check_percentage(pct)?;
    if target.reduces_frequency() {
        mitigate(frequency, pct)
    } else {
        Ok(frequency)
    }
}

/// Residual impact; unchanged when the control only targets frequency.
pub fn residual_impact(impact: u8, pct: f64, target: MitigationTarget) -> Result<u8> {
    check_percentage(pct)?;
    if target.reduces_impact() {
        mitigate(impact, pct)
    } else {
        Ok(impact)
    }
}
