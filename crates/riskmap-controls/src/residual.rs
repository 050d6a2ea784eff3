//! Residual risk: controls applied to each cause of a risk, aggregated into
//! one residual cell on the residual map.

use serde::{Deserialize, Serialize};

use riskmap_core::obs;
use riskmap_core::{Cell, Classification, Classifier, Color, MapKind, RiskLevel, RiskPoint};

use crate::criteria::{control_score, ControlCriteria, CriteriaWeights};
use crate::effectiveness::{definitive, Deviations, Effectiveness, EffectivenessThresholds};
use crate::error::{ControlError, Result};
use crate::mitigation::{residual_frequency, residual_impact, MitigationTable, MitigationTarget};

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Weights, thresholds and mitigation table used to evaluate controls.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct EvaluationSettings {
    pub weights: CriteriaWeights,
    pub thresholds: EffectivenessThresholds,
    pub table: MitigationTable,
}

impl EvaluationSettings {
    pub fn with_table(mut self, table: MitigationTable) -> Self {
        self.table = table;
        self
    }

    pub fn with_thresholds(mut self, thresholds: EffectivenessThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }
}

// ---------------------------------------------------------------------------
// Control evaluation
// ---------------------------------------------------------------------------

/// A control as evaluated against one cause.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct ControlAssessment {
    #[serde(default)]
    pub criteria: ControlCriteria,
    #[serde(default)]
    pub deviations: Deviations,
    #[serde(default)]
    pub target: MitigationTarget,
    /// Marks a control that does not apply; its criteria are ignored.
    #[serde(default)]
    pub not_applicable: bool,
}

/// Score, ratings and mitigation of one control.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ControlOutcome {
    pub score: f64,
    pub preliminary: Effectiveness,
    pub definitive: Effectiveness,
    pub mitigation: f64,
    pub target: MitigationTarget,
}

impl ControlAssessment {
    pub fn evaluate(&self, settings: &EvaluationSettings) -> Result<ControlOutcome> {
        if self.not_applicable {
            return Ok(ControlOutcome {
                score: 0.0,
                preliminary: Effectiveness::NotApplicable,
                definitive: Effectiveness::NotApplicable,
                mitigation: settings.table.percentage(Effectiveness::NotApplicable),
                target: self.target,
            });
        }
        let score = control_score(&self.criteria, &settings.weights)?;
        let preliminary = settings.thresholds.preliminary(score);
        let definitive = definitive(preliminary, self.deviations);
        Ok(ControlOutcome {
            score,
            preliminary,
            definitive,
            mitigation: settings.table.percentage(definitive),
            target: self.target,
        })
    }
}

// ---------------------------------------------------------------------------
// Causes
// ---------------------------------------------------------------------------

/// A cause of a risk with its inherent frequency and global impact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cause {
    pub id: String,
    pub frequency: u8,
    pub impact: u8,
    #[serde(default)]
    pub control: Option<ControlAssessment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CauseResidual {
    pub cause_id: String,
    pub inherent_cell: Cell,
    pub residual_cell: Cell,
    pub inherent_score: f64,
    pub residual_score: f64,
    /// `None` for a cause without a control.
    pub control: Option<ControlOutcome>,
}

impl Cause {
    /// Apply the cause's control, if any.
    pub fn residual(&self, settings: &EvaluationSettings) -> Result<CauseResidual> {
        let inherent_cell = Cell::new(self.frequency, self.impact)?;
        let control = self
            .control
            .as_ref()
            .map(|c| c.evaluate(settings))
            .transpose()?;
        let residual_cell = match &control {
            Some(outcome) => Cell::new(
                residual_frequency(self.frequency, outcome.mitigation, outcome.target)?,
                residual_impact(self.impact, outcome.mitigation, outcome.target)?,
            )?,
            None => inherent_cell,
        };
        Ok(CauseResidual {
            cause_id: self.id.clone(),
            inherent_cell,
            residual_cell,
            inherent_score: inherent_cell.score(),
            residual_score: residual_cell.score(),
            control,
        })
    }
}

// ---------------------------------------------------------------------------
// Risk residual
// ---------------------------------------------------------------------------

/// Residual position of a risk on the residual map.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResidualAssessment {
    pub risk_id: String,
    pub causes: Vec<CauseResidual>,
    /// Highest inherent score over the causes.
    pub inherent_score: f64,
    /// Highest residual score over the causes.
    pub residual_score: f64,
    /// Residual cell of the cause with the highest residual score.
    pub cell: Cell,
    pub level: RiskLevel,
    pub color: Color,
}

impl ResidualAssessment {
    /// Record the residual cell and score on the point.
    pub fn apply_to(&self, point: RiskPoint) -> RiskPoint {
        point
            .with_residual_cell(self.cell.probability(), self.cell.impact())
            .with_residual_score(self.residual_score)
    }
}

/// Evaluate every cause of a risk and place the risk on the residual map.
///
/// The risk takes the worst cause: the one with the highest residual score,
/// first on ties.
pub fn assess_residual(
    risk_id: &str,
    causes: &[Cause],
    classification: Classification,
    settings: &EvaluationSettings,
    classifier: &Classifier<'_>,
) -> Result<ResidualAssessment> {
    let residuals = causes
        .iter()
        .map(|c| c.residual(settings))
        .collect::<Result<Vec<_>>>()?;

    let worst = residuals
        .iter()
        .reduce(|best, next| {
            if next.residual_score > best.residual_score {
                next
            } else {
                best
            }
        })
        .ok_or_else(|| ControlError::NoCauses(risk_id.to_string()))?;

    let inherent_score = residuals
        .iter()
        .map(|r| r.inherent_score)
        .fold(f64::MIN, f64::max);
    let cell = worst.residual_cell;
    let residual_score = worst.residual_score;
    let level = classifier.level(MapKind::Residual, cell);

    obs::emit_residual_computed(risk_id, &cell.key(), residual_score, level.as_str());

    Ok(ResidualAssessment {
        risk_id: risk_id.to_string(),
        inherent_score,
        residual_score,
        cell,
        level,
        color: classifier.color(MapKind::Residual, cell, classification),
        causes: residuals,
    })
}
