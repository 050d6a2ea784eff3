//! Risk score classifier: (probability, impact) → score, level, color.
//!
//! The computed band of the active [`BandPreset`] is the fallback. A compiled
//! [`ThresholdMap`] entry for the cell, when present, takes precedence.
//!
//! Nothing here fails: inputs are validated [`Cell`]s or integers the caller
//! has already clamped into `1..=5`.

use serde::{Deserialize, Serialize};

use crate::color::{color_for, Color, Palette};
use crate::config::{ClassifierConfig, ThresholdMap};
use crate::domain::{Cell, Classification, RiskLevel, RiskPoint};
use crate::preset::{BandPreset, LegendBand};
use crate::score::score;

/// Which of the two maps a classification is for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MapKind {
    Inherent,
    Residual,
}

impl MapKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MapKind::Inherent => "inherent",
            MapKind::Residual => "residual",
        }
    }
}

impl std::fmt::Display for MapKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Four-band fallback level of a (probability, impact) pair.
pub fn classify(probability: u8, impact: u8) -> RiskLevel {
    BandPreset::FourBand.classify(probability, impact)
}

/// Level of a (probability, impact) pair with optional per-cell overrides.
pub fn classify_with(
    probability: u8,
    impact: u8,
    overrides: Option<&ThresholdMap>,
    preset: BandPreset,
) -> RiskLevel {
    Cell::new(probability, impact)
        .ok()
        .and_then(|cell| overrides.and_then(|map| map.level(&cell)))
        .unwrap_or_else(|| preset.classify(probability, impact))
}

/// Everything the map needs to draw one cell.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Assessment {
    pub cell: Cell,
    pub score: f64,
    pub level: RiskLevel,
    pub color: Color,
    pub legend_band: LegendBand,
    /// Level came from a configured override rather than the computed band.
    pub overridden: bool,
    pub tolerated: bool,
}

/// Classifier bound to one compiled configuration.
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'a> {
    config: &'a ClassifierConfig,
}

impl<'a> Classifier<'a> {
    pub fn new(config: &'a ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &'a ClassifierConfig {
        self.config
    }

    pub fn preset(&self) -> BandPreset {
        self.config.preset
    }

    fn overrides(&self, kind: MapKind) -> &'a ThresholdMap {
        match kind {
            MapKind::Inherent => &self.config.inherent,
            MapKind::Residual => &self.config.residual,
        }
    }

    /// Level of a cell on the given map.
    pub fn level(&self, kind: MapKind, cell: Cell) -> RiskLevel {
        classify_with(
            cell.probability(),
            cell.impact(),
            Some(self.overrides(kind)),
            self.config.preset,
        )
    }

    /// Display color of a cell.
    ///
    /// Positive risks use the opportunity legend for the cell's level. For
    /// negative risks a configured cell color wins, then the color of an
    /// overridden level, then the preset's cell color.
    pub fn color(&self, kind: MapKind, cell: Cell, classification: Classification) -> Color {
        let level = self.level(kind, cell);
        if classification == Classification::Positive {
            return Palette::for_classification(classification)
                .color(level)
                .clone();
        }
        let entry = self.overrides(kind).get(&cell);
        if let Some(color) = entry.and_then(|o| o.color.as_ref()) {
            return color.clone();
        }
        if let Some(level) = entry.and_then(|o| o.level) {
            return color_for(level);
        }
        self.config.preset.cell_color(cell)
    }

    pub fn is_tolerated(&self, cell: Cell) -> bool {
        self.config.tolerance.contains(&cell)
    }

    /// Score, level, color and legend band of a cell.
    pub fn assess(&self, kind: MapKind, cell: Cell, classification: Classification) -> Assessment {
        let score = score(cell.probability(), cell.impact());
        Assessment {
            cell,
            score,
            level: self.level(kind, cell),
            color: self.color(kind, cell, classification),
            legend_band: self.config.preset.legend_band(score),
            overridden: self.overrides(kind).level(&cell).is_some(),
            tolerated: self.is_tolerated(cell),
        }
    }

    /// Inherent level of a point. Opportunities are always `Low`.
    pub fn inherent_level(&self, point: &RiskPoint) -> RiskLevel {
        match point.classification {
            Classification::Positive => RiskLevel::Low,
            Classification::Negative => self.level(MapKind::Inherent, point.inherent_cell()),
        }
    }

    /// A negative point whose raw product reaches the appetite threshold.
    pub fn outside_appetite(&self, point: &RiskPoint) -> bool {
        point.classification == Classification::Negative
            && f64::from(point.inherent_cell().raw_product()) >= self.config.appetite_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(p: u8, i: u8) -> Cell {
        Cell::new(p, i).unwrap()
    }

    #[test]
    fn test_classify_scenarios() {
        assert_eq!(classify(1, 1), RiskLevel::Low);
        assert_eq!(classify(2, 2), RiskLevel::Low);
        assert_eq!(classify(3, 3), RiskLevel::Medium);
        assert_eq!(classify(4, 3), RiskLevel::High);
        assert_eq!(classify(5, 5), RiskLevel::Critical);
        assert_eq!(classify(3, 5), RiskLevel::Critical);
    }

    #[test]
    fn test_override_wins() {
        let map = ThresholdMap::new().with_level(cell(1, 1), RiskLevel::Critical);
        assert_eq!(
            classify_with(1, 1, Some(&map), BandPreset::FourBand),
            RiskLevel::Critical
        );
        assert_eq!(
            classify_with(1, 2, Some(&map), BandPreset::FourBand),
            RiskLevel::Low
        );
        assert_eq!(classify_with(1, 1, None, BandPreset::FourBand), RiskLevel::Low);
    }

    #[test]
    fn test_color_precedence() {
        let residual = ThresholdMap::new()
            .with_level(cell(1, 1), RiskLevel::High)
            .with_level(cell(1, 2), RiskLevel::High)
            .with_color(cell(1, 2), Color::parse("#000000").unwrap());
        let config = ClassifierConfig::default().with_residual(residual);
        let classifier = Classifier::new(&config);
        let neg = Classification::Negative;

        assert_eq!(classifier.color(MapKind::Residual, cell(1, 1), neg), Color::HIGH);
        assert_eq!(
            classifier.color(MapKind::Residual, cell(1, 2), neg).as_str(),
            "#000000"
        );
        assert_eq!(classifier.color(MapKind::Inherent, cell(1, 1), neg), Color::LOW);
        assert_eq!(
            classifier.color(MapKind::Residual, cell(1, 1), Classification::Positive),
            Color::OPPORTUNITY_HIGH
        );
    }

    #[test]
    fn test_assess_two_by_two() {
        let config = ClassifierConfig::default();
        let a = Classifier::new(&config).assess(
            MapKind::Inherent,
            cell(2, 2),
            Classification::Negative,
        );
        assert_eq!(a.score, 3.99);
        assert_eq!(a.level, RiskLevel::Low);
        assert_eq!(a.legend_band, LegendBand::Low);
        assert!(!a.overridden);
        assert!(!a.tolerated);
    }

    #[test]
    fn test_positive_points_are_low_and_inside_appetite() {
        let config = ClassifierConfig::default();
        let classifier = Classifier::new(&config);
        let opportunity =
            RiskPoint::new("OP1", 5, 5).with_classification(Classification::Positive);
        assert_eq!(classifier.inherent_level(&opportunity), RiskLevel::Low);
        assert!(!classifier.outside_appetite(&opportunity));

        assert!(classifier.outside_appetite(&RiskPoint::new("R1", 3, 5)));
        assert!(!classifier.outside_appetite(&RiskPoint::new("R2", 2, 7)));
        assert!(!classifier.outside_appetite(&RiskPoint::new("R3", 2, 2)));
    }
}
