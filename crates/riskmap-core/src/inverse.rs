//! Inverse lookup: the matrix cell that best represents a continuous score.

use crate::domain::Cell;
use crate::score::SCORE_EPSILON;

/// Find the cell whose score best represents `target`.
///
/// Cells are scanned in row order (probability 1..=5, then impact 1..=5):
/// 1. the first cell whose score equals `target` within [`SCORE_EPSILON`];
/// 2. else the cell with the smallest score at or above `target`;
/// 3. else (target above 25) the cell closest to `target`.
///
/// The result never scores below a target in `..=25`. Ties keep the first
/// cell in scan order. Non-finite targets yield `None`.
pub fn inverse_lookup(target: f64) -> Option<Cell> {
    if !target.is_finite() {
        return None;
    }

    let exact = Cell::all().find(|c| (c.score() - target).abs() < SCORE_EPSILON);
    if exact.is_some() {
        return exact;
    }

    // `min_by` returns the first of several equal minima.
    let above = Cell::all()
        .filter(|c| c.score() >= target)
        .min_by(|a, b| a.score().total_cmp(&b.score()));
    if above.is_some() {
        return above;
    }

    Cell::all().min_by(|a, b| {
        (a.score() - target)
            .abs()
            .total_cmp(&(b.score() - target).abs())
    })
}
