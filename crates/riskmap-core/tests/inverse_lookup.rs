//! Inverse lookup from continuous scores to matrix cells.

use riskmap_core::{inverse_lookup, score, Cell, RESIDUAL_EXCEPTION_SCORE};

#[test]
fn exception_score_maps_to_two_by_two() {
    let found = inverse_lookup(RESIDUAL_EXCEPTION_SCORE).unwrap();
    assert_eq!(found.key(), "2-2");
}

#[test]
fn every_cell_score_finds_a_cell_at_or_above() {
    for c in Cell::all() {
        let target = score(c.probability(), c.impact());
        let found = inverse_lookup(target).unwrap();
        assert!(found.score() >= target, "target {target} found {found}");
    }
}

#[test]
fn continuous_targets_never_land_below() {
    for step in 500..=25_000u32 {
        let target = f64::from(step) / 1000.0;
        let found = inverse_lookup(target).unwrap();
        assert!(
            found.score() >= target,
            "target {target} found {found} scoring {}",
            found.score()
        );
        let closer = Cell::all().find(|c| c.score() >= target && c.score() < found.score());
        assert!(closer.is_none(), "target {target} found {found}, {closer:?} is closer");
    }
}

#[test]
fn ties_resolve_to_first_in_scan_order() {
    // 6 = 2×3 = 3×2; 2-3 is scanned first.
    assert_eq!(inverse_lookup(6.0).unwrap().key(), "2-3");
    // 5.5 rounds up to 6 as well.
    assert_eq!(inverse_lookup(5.5).unwrap().key(), "2-3");
    // 10 = 2×5 = 5×2.
    assert_eq!(inverse_lookup(9.1).unwrap().key(), "2-5");
}

#[test]
fn mitigated_scores_land_on_next_cell_up() {
    assert_eq!(inverse_lookup(13.4).unwrap().key(), "3-5");
    assert_eq!(inverse_lookup(2.4).unwrap().key(), "1-3");
    assert_eq!(inverse_lookup(3.991).unwrap().key(), "1-4");
}

#[test]
fn out_of_grid_targets() {
    assert_eq!(inverse_lookup(100.0).unwrap().key(), "5-5");
    assert_eq!(inverse_lookup(-3.0).unwrap().key(), "1-1");
    assert!(inverse_lookup(f64::NEG_INFINITY).is_none());
}
