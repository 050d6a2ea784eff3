//! Map report artifacts: JSON for dashboards, Markdown summaries for review.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::classifier::{Classifier, MapKind};
use crate::color::Color;
use crate::domain::{Cell, Classification, Result, RiskLevel, RiskPoint};
use crate::matrix::{tolerance_borders, Borders, RiskMatrix};
use crate::preset::{BandPreset, LegendBand};
use crate::stats::{outside_appetite, Comparison, LevelCounts};

pub const MATRIX_REPORT_SCHEMA_VERSION: &str = "1.0";

/// One cell of a rendered map.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CellReport {
    pub key: String,
    pub probability: u8,
    pub impact: u8,
    pub score: f64,
    pub level: RiskLevel,
    pub color: Color,
    pub legend_band: LegendBand,
    pub tolerated: bool,
    pub borders: Borders,
    /// Ids shown in the cell, at most `max_visible_per_cell`.
    pub visible_risks: Vec<String>,
    /// Risks in the cell beyond the visible ones.
    pub hidden_risks: usize,
}

/// Map artifact written for dashboards and audits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatrixReport {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub kind: MapKind,
    pub preset: BandPreset,
    pub config_digest: Option<String>,
    pub total_risks: usize,
    pub counts: LevelCounts,
    pub outside_appetite: Vec<String>,
    /// All 25 cells, probability-major.
    pub cells: Vec<CellReport>,
}

impl MatrixReport {
    pub fn build(
        matrix: &RiskMatrix,
        points: &[RiskPoint],
        classifier: &Classifier<'_>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let config = classifier.config();
        let cells = Cell::all()
            .map(|cell| {
                let assessment = classifier.assess(matrix.kind(), cell, Classification::Negative);
                let (visible, hidden) = matrix.visible_at(cell, config.max_visible_per_cell);
                CellReport {
                    key: cell.key(),
                    probability: cell.probability(),
                    impact: cell.impact(),
                    score: assessment.score,
                    level: assessment.level,
                    color: assessment.color,
                    legend_band: assessment.legend_band,
                    tolerated: assessment.tolerated,
                    borders: tolerance_borders(&config.tolerance, cell),
                    visible_risks: visible.iter().map(|p| p.point.id.clone()).collect(),
                    hidden_risks: hidden,
                }
            })
            .collect();

        Self {
            schema_version: MATRIX_REPORT_SCHEMA_VERSION.to_string(),
            generated_at,
            kind: matrix.kind(),
            preset: classifier.preset(),
            config_digest: config.digest.clone(),
            total_risks: matrix.len(),
            counts: LevelCounts::from_matrix(matrix, classifier),
            outside_appetite: outside_appetite(points, classifier)
                .into_iter()
                .map(|p| p.id.clone())
                .collect(),
            cells,
        }
    }
}

/// Write a map report as pretty JSON.
pub fn write_matrix_report_json(path: &Path, report: &MatrixReport) -> Result<()> {
    let content = serde_json::to_string_pretty(report)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Render a Markdown summary of a map report.
pub fn render_matrix_summary_md(report: &MatrixReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {} Risk Map\n\n", capitalize(report.kind.as_str())));
    out.push_str(&format!(
        "- preset: `{}`\n- risks: {}\n",
        report.preset, report.total_risks
    ));
    if let Some(digest) = &report.config_digest {
        out.push_str(&format!("- config: `{}`\n", digest));
    }
    out.push('\n');

    out.push_str("## Levels\n");
    for level in RiskLevel::ALL.iter().rev() {
        out.push_str(&format!("- {}: {}\n", level.label(), report.counts.get(*level)));
    }
    out.push('\n');

    if !report.outside_appetite.is_empty() {
        out.push_str("## Outside Appetite\n");
        for id in &report.outside_appetite {
            out.push_str(&format!("- `{}`\n", id));
        }
        out.push('\n');
    }
    out
}

/// Render a Markdown summary of an inherent-vs-residual comparison.
pub fn render_comparison_md(comparison: &Comparison) -> String {
    let mut out = String::new();
    out.push_str("# Inherent vs Residual\n\n");
    out.push_str(&format!(
        "- risks: {}\n- lowered: {}\n- unchanged: {}\n- raised: {}\n- efficacy: {}%\n\n",
        comparison.summary.total,
        comparison.summary.lowered,
        comparison.summary.unchanged,
        comparison.summary.raised,
        comparison.efficacy_pct
    ));

    out.push_str("| Level | Inherent | Residual |\n|---|---|---|\n");
    for level in RiskLevel::ALL.iter().rev() {
        out.push_str(&format!(
            "| {} | {} | {} |\n",
            level.label(),
            comparison.inherent.get(*level),
            comparison.residual.get(*level)
        ));
    }
    out.push('\n');

    let top = comparison.top_mitigations(3);
    if !top.is_empty() {
        out.push_str("## Top Mitigations\n");
        for change in top {
            out.push_str(&format!(
                "- `{}` {} -> {} (-{})\n",
                change.risk_id, change.inherent_cell, change.residual_cell, change.reduction
            ));
        }
        out.push('\n');
    }

    if !comparison.persistent_critical.is_empty() {
        out.push_str("## Persistent Critical\n");
        for id in &comparison.persistent_critical {
            out.push_str(&format!("- `{}`\n", id));
        }
        out.push('\n');
    }
    out
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
