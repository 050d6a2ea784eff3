//! Risk levels, risk classification, and level-name normalization.

use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Ordinal risk level. Totally ordered: `Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// All levels in ascending order.
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::Low,
        RiskLevel::Medium,
        RiskLevel::High,
        RiskLevel::Critical,
    ];

    /// Stable machine identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }

    /// Label used by the risk register ("NIVEL ...").
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "NIVEL BAJO",
            RiskLevel::Medium => "NIVEL MEDIO",
            RiskLevel::High => "NIVEL ALTO",
            RiskLevel::Critical => "NIVEL CRÍTICO",
        }
    }

    /// Short cell label shown inside a matrix cell.
    pub fn cell_label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "BAJO",
            RiskLevel::Medium => "MEDIO",
            RiskLevel::High => "ALTO",
            RiskLevel::Critical => "CRÍTICO",
        }
    }

    /// Match a free-text level name against the known level names.
    ///
    /// The name is normalized (accents stripped, uppercased) and then searched
    /// for the level tokens in severity order, so "Muy Alto" matches `High`
    /// and "Nivel Crítico" matches `Critical`. Returns `None` when no token
    /// matches.
    ///
    /// Intended to run once per configured level when a configuration is
    /// compiled, not on every classification.
    pub fn from_name(name: &str) -> Option<RiskLevel> {
        let normalized = normalize_level_name(name);
        const TOKENS: [(&str, RiskLevel); 8] = [
            ("CRITICO", RiskLevel::Critical),
            ("CRITICAL", RiskLevel::Critical),
            ("ALTO", RiskLevel::High),
            ("HIGH", RiskLevel::High),
            ("MEDIO", RiskLevel::Medium),
            ("MEDIUM", RiskLevel::Medium),
            ("BAJO", RiskLevel::Low),
            ("LOW", RiskLevel::Low),
        ];
        TOKENS
            .iter()
            .find(|(token, _)| normalized.contains(token))
            .map(|(_, level)| *level)
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for RiskLevel {
    type Err = crate::domain::RiskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RiskLevel::from_name(s).ok_or_else(|| crate::domain::RiskError::UnknownLevel(s.to_string()))
    }
}

/// Strip diacritics and uppercase. "Crítico" becomes "CRITICO".
pub fn normalize_level_name(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_uppercase()
}

/// Whether a risk has negative consequences (a threat) or positive ones
/// (an opportunity).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Positive,
    #[default]
    Negative,
}

impl Classification {
    /// Label used by the risk register.
    pub fn label(&self) -> &'static str {
        match self {
            Classification::Positive => "Riesgo con consecuencia positiva",
            Classification::Negative => "Riesgo con consecuencia negativa",
        }
    }
}
