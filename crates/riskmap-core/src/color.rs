//! Display colors for risk levels.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::domain::{Classification, RiskError, RiskLevel};

/// A display color token: `#rrggbb`, or an `rgb(...)`/`rgba(...)` expression.
///
/// Hex colors are normalized to lowercase with a leading `#`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(Cow<'static, str>);

impl Color {
    pub const CRITICAL: Color = Color(Cow::Borrowed("#d32f2f"));
    pub const HIGH: Color = Color(Cow::Borrowed("#f57c00"));
    pub const MEDIUM: Color = Color(Cow::Borrowed("#fbc02d"));
    pub const LOW: Color = Color(Cow::Borrowed("#388e3c"));

    pub const OPPORTUNITY_EXTREME: Color = Color(Cow::Borrowed("#1565c0"));
    pub const OPPORTUNITY_HIGH: Color = Color(Cow::Borrowed("#42a5f5"));
    pub const OPPORTUNITY_MEDIUM: Color = Color(Cow::Borrowed("#757575"));
    pub const OPPORTUNITY_LOW: Color = Color(Cow::Borrowed("#bdbdbd"));

    /// Parse and normalize a color token.
    pub fn parse(input: &str) -> Result<Self, RiskError> {
        let trimmed = input.trim();
        let lower = trimmed.to_ascii_lowercase();
        if (lower.starts_with("rgb(") || lower.starts_with("rgba(")) && lower.ends_with(')') {
            return Ok(Color(Cow::Owned(lower)));
        }
        let hex = lower.strip_prefix('#').unwrap_or(&lower);
        if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Ok(Color(Cow::Owned(format!("#{hex}"))));
        }
        Err(RiskError::InvalidColor(input.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to an `rgba(r, g, b, opacity)` string.
    ///
    /// Colors that are already `rgb(...)`/`rgba(...)` are returned unchanged.
    pub fn to_rgba(&self, opacity: f64) -> String {
        let Some(hex) = self.0.strip_prefix('#') else {
            return self.0.to_string();
        };
        let channel = |range: std::ops::Range<usize>| {
            hex.get(range)
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .unwrap_or(0)
        };
        format!(
            "rgba({}, {}, {}, {})",
            channel(0..2),
            channel(2..4),
            channel(4..6),
            opacity
        )
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Color {
    type Error = RiskError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::parse(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.0.into_owned()
    }
}

/// Threat legend: red, orange, yellow, green.
pub static RISK_PALETTE: Palette = Palette {
    critical: Color::CRITICAL,
    high: Color::HIGH,
    medium: Color::MEDIUM,
    low: Color::LOW,
};

/// Opportunity legend: blues and greys.
pub static OPPORTUNITY_PALETTE: Palette = Palette {
    critical: Color::OPPORTUNITY_EXTREME,
    high: Color::OPPORTUNITY_HIGH,
    medium: Color::OPPORTUNITY_MEDIUM,
    low: Color::OPPORTUNITY_LOW,
};

/// Four colors, one per risk level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub critical: Color,
    pub high: Color,
    pub medium: Color,
    pub low: Color,
}

impl Palette {
    /// Legend to present for a risk classification.
    pub fn for_classification(classification: Classification) -> &'static Palette {
        match classification {
            Classification::Negative => &RISK_PALETTE,
            Classification::Positive => &OPPORTUNITY_PALETTE,
        }
    }

    pub fn color(&self, level: RiskLevel) -> &Color {
        match level {
            RiskLevel::Critical => &self.critical,
            RiskLevel::High => &self.high,
            RiskLevel::Medium => &self.medium,
            RiskLevel::Low => &self.low,
        }
    }
}

/// Static threat-legend color of a level.
pub fn color_for(level: RiskLevel) -> Color {
    RISK_PALETTE.color(level).clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_for_levels() {
        assert_eq!(color_for(RiskLevel::Critical).as_str(), "#d32f2f");
        assert_eq!(color_for(RiskLevel::High).as_str(), "#f57c00");
        assert_eq!(color_for(RiskLevel::Medium).as_str(), "#fbc02d");
        assert_eq!(color_for(RiskLevel::Low).as_str(), "#388e3c");
    }

    #[test]
    fn test_parse_normalizes_hex() {
        assert_eq!(Color::parse("#ABCDEF").unwrap().as_str(), "#abcdef");
        assert_eq!(Color::parse("00ff00").unwrap().as_str(), "#00ff00");
        assert!(Color::parse("#abc").is_err());
        assert!(Color::parse("red").is_err());
        assert!(Color::parse("#gggggg").is_err());
    }

    #[test]
    fn test_to_rgba() {
        assert_eq!(Color::CRITICAL.to_rgba(0.5), "rgba(211, 47, 47, 0.5)");
        let rgb = Color::parse("rgb(1, 2, 3)").unwrap();
        assert_eq!(rgb.to_rgba(0.3), "rgb(1, 2, 3)");
    }

    #[test]
    fn test_opportunity_palette() {
        let palette = Palette::for_classification(Classification::Positive);
        assert_eq!(palette.color(RiskLevel::Critical), &Color::OPPORTUNITY_EXTREME);
        assert_eq!(palette.color(RiskLevel::Low).as_str(), "#bdbdbd");
    }

    #[test]
    fn test_color_serde_roundtrip_validates() {
        let c: Color = serde_json::from_str("\"#F57C00\"").unwrap();
        assert_eq!(c, Color::HIGH);
        let bad: Result<Color, _> = serde_json::from_str("\"orange\"");
        assert!(bad.is_err());
    }
}
