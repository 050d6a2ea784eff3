//! Band presets: how a score maps to a level, a legend band, and a cell color.
//!
//! Two map variants are in use and they disagree on thresholds and on the
//! colors of edge cells such as (1,5). Neither is treated as authoritative;
//! callers pick one explicitly.
//!
//! | Preset | Critical | Very High | High | Medium | Low |
//! |--------|----------|-----------|------|--------|-----|
//! | `FourBand` | 15–25 | – | 10–14 | 4–9 | 1–3, 3.99 |
//! | `FiveBandWithVeryHigh` (levels) | ≥20 | – | 10–19 | 5–9 | ≤4 |
//! | `FiveBandWithVeryHigh` (legend) | ≥20 | 15–19 | 10–14 | 5–9 | ≤4 |

use serde::{Deserialize, Serialize};

use crate::color::{color_for, Color};
use crate::domain::{Cell, ConfigError, RiskError, RiskLevel};
use crate::score::score;

/// Which band layout to classify with.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum BandPreset {
    /// Four contiguous bands over the score, with cell colors derived from
    /// the level.
    #[default]
    FourBand,
    /// Four levels plus a "Very High" legend band, with a fixed 25-cell
    /// color matrix.
    FiveBandWithVeryHigh,
}

/// A legend band. `VeryHigh` only occurs in the five-band preset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LegendBand {
    Low,
    Medium,
    High,
    VeryHigh,
    Critical,
}

impl LegendBand {
    pub fn label(&self) -> &'static str {
        match self {
            LegendBand::Low => "Bajo",
            LegendBand::Medium => "Medio",
            LegendBand::High => "Alto",
            LegendBand::VeryHigh => "Muy Alto",
            LegendBand::Critical => "Crítico",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            LegendBand::Low => Color::LOW,
            LegendBand::Medium => Color::MEDIUM,
            LegendBand::High => Color::HIGH,
            // Both red bands share the same swatch in the legend.
            LegendBand::VeryHigh | LegendBand::Critical => Color::CRITICAL,
        }
    }
}

/// One row of a rendered legend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LegendEntry {
    pub band: LegendBand,
    pub label: String,
    pub range: String,
    pub color: Color,
}

/// Cell tones of the five-band map, rows by impact 1..=5, columns by
/// probability 1..=5.
const FIVE_BAND_CELL_TONES: [[RiskLevel; 5]; 5] = {
    use crate::domain::RiskLevel::{Critical as C, High as H, Low as L, Medium as M};
    [
        [L, L, L, M, H],
        [L, L, M, M, H],
        [L, M, M, H, C],
        [M, M, H, C, C],
        [H, H, C, C, C],
    ]
};

impl BandPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            BandPreset::FourBand => "four_band",
            BandPreset::FiveBandWithVeryHigh => "five_band_with_very_high",
        }
    }

    /// Level of a score under this preset.
    pub fn level_for_score(&self, score: f64) -> RiskLevel {
        match self {
            BandPreset::FourBand => {
                if score >= 15.0 {
                    RiskLevel::Critical
                } else if score >= 10.0 {
                    RiskLevel::High
                } else if score >= 4.0 {
                    RiskLevel::Medium
                } else {
                    RiskLevel::Low
                }
            }
            BandPreset::FiveBandWithVeryHigh => {
                if score >= 20.0 {
                    RiskLevel::Critical
                } else if score >= 10.0 {
                    RiskLevel::High
                } else if score >= 5.0 {
                    RiskLevel::Medium
                } else {
                    RiskLevel::Low
                }
            }
        }
    }

    /// Fallback level of a (probability, impact) pair.
    pub fn classify(&self, probability: u8, impact: u8) -> RiskLevel {
        self.level_for_score(score(probability, impact))
    }

    /// Legend band of a score.
    pub fn legend_band(&self, score: f64) -> LegendBand {
        match self {
            BandPreset::FourBand => match self.level_for_score(score) {
                RiskLevel::Critical => LegendBand::Critical,
                RiskLevel::High => LegendBand::High,
                RiskLevel::Medium => LegendBand::Medium,
                RiskLevel::Low => LegendBand::Low,
            },
            BandPreset::FiveBandWithVeryHigh => {
                if score >= 20.0 {
                    LegendBand::Critical
                } else if score >= 15.0 {
                    LegendBand::VeryHigh
                } else if score >= 10.0 {
                    LegendBand::High
                } else if score >= 5.0 {
                    LegendBand::Medium
                } else {
                    LegendBand::Low
                }
            }
        }
    }

    /// Fallback display color of a cell.
    pub fn cell_color(&self, cell: Cell) -> Color {
        match self {
            BandPreset::FourBand => color_for(self.classify(cell.probability(), cell.impact())),
            BandPreset::FiveBandWithVeryHigh => {
                let tone = FIVE_BAND_CELL_TONES[usize::from(cell.impact() - 1)]
                    [usize::from(cell.probability() - 1)];
                color_for(tone)
            }
        }
    }

    /// Legend rows, most severe first.
    pub fn legend(&self) -> Vec<LegendEntry> {
        let rows: &[(LegendBand, &str)] = match self {
            BandPreset::FourBand => &[
                (LegendBand::Critical, "15-25"),
                (LegendBand::High, "10-14"),
                (LegendBand::Medium, "4-9"),
                (LegendBand::Low, "1-3"),
            ],
            BandPreset::FiveBandWithVeryHigh => &[
                (LegendBand::Critical, "20-25"),
                (LegendBand::VeryHigh, "15-19"),
                (LegendBand::High, "10-14"),
                (LegendBand::Medium, "5-9"),
                (LegendBand::Low, "1-4"),
            ],
        };
        rows.iter()
            .map(|(band, range)| LegendEntry {
                band: *band,
                label: band.label().to_string(),
                range: range.to_string(),
                color: band.color(),
            })
            .collect()
    }
}

impl std::fmt::Display for BandPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BandPreset {
    type Err = RiskError;

    /// Accepts `four_band`, `four-band`, `fourBand`, `five_band`,
    /// `five-band-with-very-high`, `fiveBandWithVeryHigh`, ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match compact.as_str() {
            "fourband" | "four" | "4" => Ok(BandPreset::FourBand),
            "fiveband" | "fivebandwithveryhigh" | "five" | "5" => {
                Ok(BandPreset::FiveBandWithVeryHigh)
            }
            _ => Err(ConfigError::UnknownPreset(s.to_string()).into()),
        }
    }
}
