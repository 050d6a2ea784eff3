//! riskmap-controls: control evaluation and residual risk.
//!
//! A control is scored on five design criteria. The score gives a
//! preliminary effectiveness rating, deviations found in testing give the
//! definitive one, and the definitive rating selects a mitigation
//! percentage. The percentage reduces the frequency and/or impact of the
//! cause the control acts on, producing the residual cell.

pub mod criteria;
pub mod effectiveness;
pub mod error;
pub mod mitigation;
pub mod residual;

pub use criteria::{control_score, ControlCriteria, CriteriaWeights};
pub use effectiveness::{definitive, Deviations, Effectiveness, EffectivenessThresholds};
pub use error::{ControlError, Result};
pub use mitigation::{
    mitigate, residual_frequency, residual_impact, MitigationTable, MitigationTarget,
};
pub use residual::{
    assess_residual, Cause, CauseResidual, ControlAssessment, ControlOutcome, EvaluationSettings,
    ResidualAssessment,
};
