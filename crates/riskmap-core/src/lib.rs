//! riskmap core library
//!
//! Risk score classification on the 5×5 probability × impact matrix, plus
//! the configuration, evaluation, placement and statistics built on it.

pub mod classifier;
pub mod color;
pub mod config;
pub mod domain;
pub mod evaluation;
pub mod inverse;
pub mod matrix;
pub mod obs;
pub mod preset;
pub mod prioritization;
pub mod reporting;
pub mod score;
pub mod stats;
pub mod telemetry;

pub use classifier::{classify, classify_with, Assessment, Classifier, MapKind};
pub use color::{color_for, Color, Palette, OPPORTUNITY_PALETTE, RISK_PALETTE};
pub use config::{
    CellOverride, ClassifierConfig, LevelDefinition, MatrixConfig, ThresholdMap,
    DEFAULT_APPETITE_THRESHOLD, DEFAULT_MAX_VISIBLE_PER_CELL,
};
pub use domain::{
    normalize_level_name, Cell, Classification, ConfigError, Result, RiskError, RiskLevel,
    RiskPoint, MAX_AXIS, MIN_AXIS,
};
pub use evaluation::{evaluate_inherent, ImpactDimension, Impacts, InherentEvaluation};
pub use inverse::inverse_lookup;
pub use matrix::{
    residual_cell, tolerance_borders, Borders, PlacedPoint, ResidualSource, RiskMatrix,
};
pub use preset::{BandPreset, LegendBand, LegendEntry};
pub use prioritization::{priority_score, PriorityVariables, PriorityWeights};
pub use reporting::{
    render_comparison_md, render_matrix_summary_md, write_matrix_report_json, CellReport,
    MatrixReport, MATRIX_REPORT_SCHEMA_VERSION,
};
pub use score::{score, EXCEPTION_CELL, RESIDUAL_EXCEPTION_SCORE, SCORE_EPSILON};
pub use stats::{outside_appetite, Comparison, ComparisonSummary, LevelCounts, RiskChange, Trend};
pub use telemetry::init_tracing;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
