//! Structured observability hooks for configuration and map events.
//!
//! This module provides:
//! - Map-scoped tracing spans via the `MapSpan` RAII guard
//! - Emission functions for configuration loading, point clamping, map
//!   construction and residual computation
//!
//! Events are emitted at `info!` level, or `warn!` for skipped overrides and
//! clamped points. Filtering follows `RUST_LOG` (see [`crate::init_tracing`]).

use tracing::{info, warn};

/// RAII guard that enters a span tagged with the map being built.
///
/// # Example
///
/// ```ignore
/// let _span = MapSpan::enter("residual");
/// // point.clamped and matrix.built events now carry map = "residual"
/// ```
pub struct MapSpan {
    _span: tracing::span::EnteredSpan,
}

impl MapSpan {
    pub fn enter(map: &str) -> Self {
        let span = tracing::info_span!("riskmap.map", map = %map);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: a configuration document was compiled.
pub fn emit_config_compiled(
    digest: &str,
    preset: &str,
    inherent_overrides: usize,
    residual_overrides: usize,
    tolerance_cells: usize,
) {
    info!(
        event = "config.loaded",
        digest = %digest,
        preset = %preset,
        inherent_overrides = inherent_overrides,
        residual_overrides = residual_overrides,
        tolerance_cells = tolerance_cells,
    );
}

/// Emit event: a cell override was dropped; the computed fallback applies.
pub fn emit_override_skipped(map: &str, cell_key: &str, level_ref: &str, reason: &str) {
    warn!(
        event = "config.override_skipped",
        map = %map,
        cell = %cell_key,
        level = %level_ref,
        reason = %reason,
    );
}

/// Emit event: a catalog level name matched no known level.
pub fn emit_level_unmatched(level_id: &str, name: &str) {
    warn!(event = "config.level_unmatched", level_id = %level_id, name = %name);
}

/// Emit event: a point's coordinates were outside `1..=5` and were clamped.
pub fn emit_point_clamped(risk_id: &str, probability: u8, impact: u8) {
    warn!(
        event = "point.clamped",
        risk_id = %risk_id,
        probability = probability,
        impact = impact,
    );
}

/// Emit event: a duplicate risk id was ignored while placing points.
pub fn emit_point_duplicate(risk_id: &str) {
    warn!(event = "point.duplicate", risk_id = %risk_id);
}

/// Emit event: a map was built.
pub fn emit_matrix_built(kind: &str, points: usize, occupied_cells: usize) {
    info!(
        event = "matrix.built",
        kind = %kind,
        points = points,
        occupied_cells = occupied_cells,
    );
}

/// Emit event: residual coordinates were derived for a risk.
pub fn emit_residual_computed(risk_id: &str, cell_key: &str, score: f64, level: &str) {
    info!(
        event = "residual.computed",
        risk_id = %risk_id,
        cell = %cell_key,
        score = score,
        level = %level,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_span_create() {
        let _span = MapSpan::enter("inherent");
        emit_matrix_built("inherent", 0, 0);
    }
}
