//! Risk score: probability × impact with the (2,2) business-rule exception.

/// Score assigned to cell (2,2).
///
/// Business rule from the risk-rating workbook
/// (`=IF(AND(impact=2,probability=2),3.99,impact*probability)`): the 2×2 cell
/// sits at the top of the Low band instead of at the bottom of Medium, where
/// the raw product 4 would put it. Applies to this single cell only.
pub const RESIDUAL_EXCEPTION_SCORE: f64 = 3.99;

/// The cell that carries [`RESIDUAL_EXCEPTION_SCORE`].
pub const EXCEPTION_CELL: (u8, u8) = (2, 2);

/// Tolerance under which a target score counts as equal to a cell score.
///
/// Only absorbs float noise: 3.991 is not 3.99.
pub const SCORE_EPSILON: f64 = 1e-9;

/// Numeric risk score of a (probability, impact) pair.
///
/// Callers round and clamp both values into `1..=5` first; the function does
/// not validate the range.
pub fn score(probability: u8, impact: u8) -> f64 {
    if (probability, impact) == EXCEPTION_CELL {
        return RESIDUAL_EXCEPTION_SCORE;
    }
    f64::from(probability) * f64::from(impact)
}
