//! Control effectiveness: preliminary rating from the score, definitive
//! rating after deviations found in testing.

use serde::{Deserialize, Serialize};

use crate::error::ControlError;

/// Effectiveness rating of a control.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Effectiveness {
    Ineffective,
    Low,
    Moderate,
    Effective,
    HighlyEffective,
    /// The control does not apply to the cause.
    NotApplicable,
}

impl Effectiveness {
    /// Label used by the risk register.
    pub fn label(&self) -> &'static str {
        match self {
            Effectiveness::Ineffective => "Inefectivo",
            Effectiveness::Low => "Baja Efectividad",
            Effectiveness::Moderate => "Medianamente Efectivo",
            Effectiveness::Effective => "Efectivo",
            Effectiveness::HighlyEffective => "Altamente Efectivo",
            Effectiveness::NotApplicable => "No Aplica",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Effectiveness::Ineffective => "ineffective",
            Effectiveness::Low => "low",
            Effectiveness::Moderate => "moderate",
            Effectiveness::Effective => "effective",
            Effectiveness::HighlyEffective => "highly_effective",
            Effectiveness::NotApplicable => "not_applicable",
        }
    }
}

impl std::fmt::Display for Effectiveness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Effectiveness {
    type Err = ControlError;

    /// Accepts the register labels ("Altamente Efectivo", accents optional)
    /// and the snake_case identifiers.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = riskmap_core::normalize_level_name(s).replace(['_', '-'], " ");
        let rating = match normalized.trim() {
            "INEFECTIVO" | "INEFFECTIVE" => Effectiveness::Ineffective,
            "BAJA EFECTIVIDAD" | "LOW" => Effectiveness::Low,
            "MEDIANAMENTE EFECTIVO" | "MODERATE" => Effectiveness::Moderate,
            "EFECTIVO" | "EFFECTIVE" => Effectiveness::Effective,
            "ALTAMENTE EFECTIVO" | "HIGHLY EFFECTIVE" => Effectiveness::HighlyEffective,
            "NO APLICA" | "NOT APPLICABLE" => Effectiveness::NotApplicable,
            _ => return Err(ControlError::UnknownEffectiveness(s.to_string())),
        };
        Ok(rating)
    }
}

/// Lower bounds of each preliminary rating on the control score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EffectivenessThresholds {
    pub low: f64,
    pub moderate: f64,
    pub effective: f64,
    pub highly_effective: f64,
}

impl Default for EffectivenessThresholds {
    fn default() -> Self {
        Self {
            low: 25.0,
            moderate: 46.0,
            effective: 65.0,
            highly_effective: 85.0,
        }
    }
}

impl EffectivenessThresholds {
    /// Preliminary rating of a control score.
    pub fn preliminary(&self, score: f64) -> Effectiveness {
        if score >= self.highly_effective {
            Effectiveness::HighlyEffective
        } else if score >= self.effective {
            Effectiveness::Effective
        } else if score >= self.moderate {
            Effectiveness::Moderate
        } else if score >= self.low {
            Effectiveness::Low
        } else {
            Effectiveness::Ineffective
        }
    }
}

/// Deviations found when testing a control.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Deviations {
    /// A: no failures.
    #[default]
    #[serde(rename = "A", alias = "clean")]
    Clean,
    /// B: deviations found.
    #[serde(rename = "B", alias = "found")]
    Found,
    /// C: the control fails most of the time.
    #[serde(rename = "C", alias = "widespread")]
    Widespread,
}

/// Definitive rating: preliminary rating adjusted for deviations.
///
/// Widespread failure makes any control ineffective; deviations cap a
/// highly effective control at effective.
pub fn definitive(preliminary: Effectiveness, deviations: Deviations) -> Effectiveness {
    match (deviations, preliminary) {
        (Deviations::Widespread, _) => Effectiveness::Ineffective,
        (Deviations::Found, Effectiveness::HighlyEffective) => Effectiveness::Effective,
        _ => preliminary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preliminary_boundaries() {
        let t = EffectivenessThresholds::default();
        assert_eq!(t.preliminary(0.0), Effectiveness::Ineffective);
        assert_eq!(t.preliminary(24.9), Effectiveness::Ineffective);
        assert_eq!(t.preliminary(25.0), Effectiveness::Low);
        assert_eq!(t.preliminary(45.9), Effectiveness::Low);
        assert_eq!(t.preliminary(46.0), Effectiveness::Moderate);
        assert_eq!(t.preliminary(64.9), Effectiveness::Moderate);
        assert_eq!(t.preliminary(65.0), Effectiveness::Effective);
        assert_eq!(t.preliminary(84.9), Effectiveness::Effective);
        assert_eq!(t.preliminary(85.0), Effectiveness::HighlyEffective);
        assert_eq!(t.preliminary(100.0), Effectiveness::HighlyEffective);
    }

    #[test]
    fn test_definitive_downgrades() {
        use Effectiveness::*;
        assert_eq!(definitive(HighlyEffective, Deviations::Widespread), Ineffective);
        assert_eq!(definitive(Low, Deviations::Widespread), Ineffective);
        assert_eq!(definitive(HighlyEffective, Deviations::Found), Effective);
        assert_eq!(definitive(Effective, Deviations::Found), Effective);
        assert_eq!(definitive(Moderate, Deviations::Found), Moderate);
        assert_eq!(definitive(HighlyEffective, Deviations::Clean), HighlyEffective);
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!(
            "Altamente Efectivo".parse::<Effectiveness>().unwrap(),
            Effectiveness::HighlyEffective
        );
        assert_eq!(
            "baja efectividad".parse::<Effectiveness>().unwrap(),
            Effectiveness::Low
        );
        assert_eq!(
            "not_applicable".parse::<Effectiveness>().unwrap(),
            Effectiveness::NotApplicable
        );
        assert!("Excelente".parse::<Effectiveness>().is_err());
    }

    #[test]
    fn test_deviation_codes() {
        let d: Deviations = serde_json::from_str("\"C\"").unwrap();
        assert_eq!(d, Deviations::Widespread);
        let d: Deviations = serde_json::from_str("\"found\"").unwrap();
        assert_eq!(d, Deviations::Found);
        assert_eq!(serde_json::to_string(&Deviations::Clean).unwrap(), "\"A\"");
    }
}
