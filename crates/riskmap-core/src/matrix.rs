//! Placement of risk points on the inherent and residual maps.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt::Write as _;

use crate::classifier::{Classifier, MapKind};
use crate::domain::{Cell, RiskPoint, MAX_AXIS, MIN_AXIS};
use crate::inverse::inverse_lookup;
use crate::obs;

/// Where a point's residual coordinates came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ResidualSource {
    /// Residual probability and impact recorded on the point.
    Explicit,
    /// Residual score mapped to a cell by inverse lookup.
    Score,
    /// No residual data; the risk stays where the inherent map puts it.
    Inherent,
}

/// Residual cell of a point, in priority order: explicit residual
/// coordinates, then the residual score, then the inherent cell.
pub fn residual_cell(point: &RiskPoint) -> (Cell, ResidualSource) {
    if let Some(cell) = point.explicit_residual_cell() {
        return (cell, ResidualSource::Explicit);
    }
    if let Some(cell) = point
        .residual_score
        .filter(|s| *s > 0.0)
        .and_then(inverse_lookup)
    {
        return (cell, ResidualSource::Score);
    }
    (point.inherent_cell(), ResidualSource::Inherent)
}

/// A point as placed on one map.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlacedPoint {
    pub point: RiskPoint,
    pub cell: Cell,
    /// Set on the residual map only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ResidualSource>,
}

/// One map: risks grouped by cell, each risk id placed once.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskMatrix {
    kind: MapKind,
    cells: BTreeMap<Cell, Vec<PlacedPoint>>,
    index: BTreeMap<String, Cell>,
}

impl RiskMatrix {
    /// Place each point at its clamped inherent cell.
    pub fn inherent(points: &[RiskPoint]) -> Self {
        Self::build(MapKind::Inherent, points, |p| (p.inherent_cell(), None))
    }

    /// Place each point at its residual cell (see [`residual_cell`]).
    pub fn residual(points: &[RiskPoint]) -> Self {
        Self::build(MapKind::Residual, points, |p| {
            let (cell, source) = residual_cell(p);
            (cell, Some(source))
        })
    }

    fn build<F>(kind: MapKind, points: &[RiskPoint], place: F) -> Self
    where
        F: Fn(&RiskPoint) -> (Cell, Option<ResidualSource>),
    {
        let _span = obs::MapSpan::enter(kind.as_str());
        let mut seen = HashSet::new();
        let mut matrix = Self {
            kind,
            cells: BTreeMap::new(),
            index: BTreeMap::new(),
        };

        for point in points {
            if !seen.insert(point.id.as_str()) {
                obs::emit_point_duplicate(&point.id);
                continue;
            }
            if point.needs_clamping() {
                obs::emit_point_clamped(&point.id, point.probability, point.impact);
            }
            let (cell, source) = place(point);
            matrix.index.insert(point.id.clone(), cell);
            matrix.cells.entry(cell).or_default().push(PlacedPoint {
                point: point.clone(),
                cell,
                source,
            });
        }

        obs::emit_matrix_built(kind.as_str(), matrix.index.len(), matrix.cells.len());
        matrix
    }

    pub fn kind(&self) -> MapKind {
        self.kind
    }

    /// Number of distinct risks placed.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn points_at(&self, cell: Cell) -> &[PlacedPoint] {
        self.cells.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The first `max` points of a cell and how many were left out.
    pub fn visible_at(&self, cell: Cell, max: usize) -> (&[PlacedPoint], usize) {
        let all = self.points_at(cell);
        let shown = all.len().min(max);
        (&all[..shown], all.len() - shown)
    }

    /// Cell a risk was placed in.
    pub fn placement(&self, risk_id: &str) -> Option<Cell> {
        self.index.get(risk_id).copied()
    }

    pub fn placed(&self, risk_id: &str) -> Option<&PlacedPoint> {
        let cell = self.placement(risk_id)?;
        self.points_at(cell).iter().find(|p| p.point.id == risk_id)
    }

    /// All placed points in cell order.
    pub fn iter(&self) -> impl Iterator<Item = &PlacedPoint> {
        self.cells.values().flatten()
    }

    /// Plain-text grid, impact 5 on top and probability 1 on the left.
    ///
    /// Each cell shows its level label and the number of risks in it.
    pub fn render_text(&self, classifier: &Classifier<'_>) -> String {
        const WIDTH: usize = 12;
        let mut out = String::new();
        let _ = writeln!(out, "{} map", self.kind);
        for impact in (MIN_AXIS..=MAX_AXIS).rev() {
            let _ = write!(out, "I{impact} |");
            for probability in MIN_AXIS..=MAX_AXIS {
                let cell = Cell::saturating(probability, impact);
                let level = classifier.level(self.kind, cell);
                let count = self.points_at(cell).len();
                let text = if count > 0 {
                    format!("{} {}", level.cell_label(), count)
                } else {
                    level.cell_label().to_string()
                };
                let _ = write!(out, " {text:<WIDTH$}|");
            }
            out.push('\n');
        }
        let _ = write!(out, "    ");
        for probability in MIN_AXIS..=MAX_AXIS {
            let _ = write!(out, " {:<WIDTH$} ", format!("P{probability}"));
        }
        out.push('\n');
        out
    }
}

/// Which sides of a cell sit on the edge of the tolerance zone.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Borders {
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
    pub left: bool,
}

impl Borders {
    pub fn any(&self) -> bool {
        self.top || self.right || self.bottom || self.left
    }
}

/// Tolerance-zone borders of a cell.
///
/// A side is a border when the neighbour on that side is on the grid and
/// differs from `cell` in tolerance membership. Top is impact + 1, right is
/// probability + 1.
pub fn tolerance_borders(tolerance: &BTreeSet<Cell>, cell: Cell) -> Borders {
    let inside = tolerance.contains(&cell);
    let differs = |neighbour: Option<Cell>| {
        neighbour.is_some_and(|n| tolerance.contains(&n) != inside)
    };
    Borders {
        top: differs(cell.offset(0, 1)),
        right: differs(cell.offset(1, 0)),
        bottom: differs(cell.offset(0, -1)),
        left: differs(cell.offset(-1, 0)),
    }
}
