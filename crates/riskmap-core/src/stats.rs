//! Map statistics: level counts, inherent-vs-residual comparison, appetite.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::classifier::{Classifier, MapKind};
use crate::domain::{Cell, RiskLevel, RiskPoint};
use crate::matrix::{residual_cell, ResidualSource, RiskMatrix};

/// Number of risks per level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct LevelCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl LevelCounts {
    /// Count each placed risk under the level of its cell.
    pub fn from_matrix(matrix: &RiskMatrix, classifier: &Classifier<'_>) -> Self {
        let mut counts = Self::default();
        for placed in matrix.iter() {
            counts.add(classifier.level(matrix.kind(), placed.cell));
        }
        counts
    }

    pub fn add(&mut self, level: RiskLevel) {
        *self.slot(level) += 1;
    }

    pub fn get(&self, level: RiskLevel) -> usize {
        match level {
            RiskLevel::Critical => self.critical,
            RiskLevel::High => self.high,
            RiskLevel::Medium => self.medium,
            RiskLevel::Low => self.low,
        }
    }

    fn slot(&mut self, level: RiskLevel) -> &mut usize {
        match level {
            RiskLevel::Critical => &mut self.critical,
            RiskLevel::High => &mut self.high,
            RiskLevel::Medium => &mut self.medium,
            RiskLevel::Low => &mut self.low,
        }
    }

    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low
    }
}

/// Direction of a risk's level from the inherent to the residual map.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Lowered,
    Unchanged,
    Raised,
}

impl Trend {
    pub fn between(inherent: RiskLevel, residual: RiskLevel) -> Self {
        match residual.cmp(&inherent) {
            std::cmp::Ordering::Less => Trend::Lowered,
            std::cmp::Ordering::Equal => Trend::Unchanged,
            std::cmp::Ordering::Greater => Trend::Raised,
        }
    }
}

/// One risk's movement between the two maps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskChange {
    pub risk_id: String,
    pub description: String,
    pub inherent_cell: Cell,
    pub residual_cell: Cell,
    pub inherent_level: RiskLevel,
    pub residual_level: RiskLevel,
    pub residual_source: ResidualSource,
    /// Raw product of the inherent cell minus that of the residual cell.
    pub reduction: i32,
    pub trend: Trend,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ComparisonSummary {
    pub lowered: usize,
    pub unchanged: usize,
    pub raised: usize,
    pub total: usize,
}

/// Inherent-vs-residual comparison over a set of risks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comparison {
    pub inherent: LevelCounts,
    pub residual: LevelCounts,
    /// `"{inherent}->{residual}"` level pairs, e.g. `"critical->high"`.
    pub transitions: BTreeMap<String, usize>,
    pub changes: Vec<RiskChange>,
    pub summary: ComparisonSummary,
    /// Risks still critical after mitigation.
    pub persistent_critical: Vec<String>,
    /// Share of risks whose raw product went down, rounded percent.
    pub efficacy_pct: u32,
}

impl Comparison {
    /// Compare where each risk sits on the inherent and residual maps.
    ///
    /// Duplicate ids count once, at their first occurrence.
    pub fn compute(points: &[RiskPoint], classifier: &Classifier<'_>) -> Self {
        let inherent_map = RiskMatrix::inherent(points);
        let residual_map = RiskMatrix::residual(points);

        let mut changes = Vec::with_capacity(inherent_map.len());
        let mut transitions = BTreeMap::new();
        let mut summary = ComparisonSummary::default();
        let mut seen = HashSet::new();

        for point in points {
            let Some(inherent_cell) = inherent_map.placement(&point.id) else {
                continue;
            };
            if !seen.insert(point.id.as_str()) {
                continue;
            }
            let (residual_cell, residual_source) = residual_cell(point);
            let inherent_level = classifier.level(MapKind::Inherent, inherent_cell);
            let residual_level = classifier.level(MapKind::Residual, residual_cell);
            let trend = Trend::between(inherent_level, residual_level);

            match trend {
                Trend::Lowered => summary.lowered += 1,
                Trend::Unchanged => summary.unchanged += 1,
                Trend::Raised => summary.raised += 1,
            }
            *transitions
                .entry(format!("{}->{}", inherent_level.as_str(), residual_level.as_str()))
                .or_insert(0) += 1;

            changes.push(RiskChange {
                risk_id: point.id.clone(),
                description: point.description.clone(),
                inherent_cell,
                residual_cell,
                inherent_level,
                residual_level,
                residual_source,
                reduction: i32::from(inherent_cell.raw_product())
                    - i32::from(residual_cell.raw_product()),
                trend,
            });
        }
        summary.total = changes.len();

        let persistent_critical = changes
            .iter()
            .filter(|c| c.residual_level == RiskLevel::Critical)
            .map(|c| c.risk_id.clone())
            .collect();

        let improved = changes.iter().filter(|c| c.reduction > 0).count();
        let efficacy_pct = if changes.is_empty() {
            0
        } else {
            (improved as f64 / changes.len() as f64 * 100.0).round() as u32
        };

        Self {
            inherent: LevelCounts::from_matrix(&inherent_map, classifier),
            residual: LevelCounts::from_matrix(&residual_map, classifier),
            transitions,
            changes,
            summary,
            persistent_critical,
            efficacy_pct,
        }
    }

    /// The `n` risks with the largest positive reduction, largest first.
    pub fn top_mitigations(&self, n: usize) -> Vec<&RiskChange> {
        let mut reduced: Vec<&RiskChange> =
            self.changes.iter().filter(|c| c.reduction > 0).collect();
        reduced.sort_by(|a, b| b.reduction.cmp(&a.reduction));
        reduced.truncate(n);
        reduced
    }

    pub fn transition(&self, from: RiskLevel, to: RiskLevel) -> usize {
        self.transitions
            .get(&format!("{}->{}", from.as_str(), to.as_str()))
            .copied()
            .unwrap_or(0)
    }
}

/// Negative risks whose raw inherent product reaches the appetite threshold.
pub fn outside_appetite<'p>(
    points: &'p [RiskPoint],
    classifier: &Classifier<'_>,
) -> Vec<&'p RiskPoint> {
    points
        .iter()
        .filter(|p| classifier.outside_appetite(p))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClassifierConfig;
    use crate::domain::Classification;

    fn sample() -> Vec<RiskPoint> {
        vec![
            RiskPoint::new("R1", 5, 5).with_residual_cell(3, 3),
            RiskPoint::new("R2", 4, 4),
            RiskPoint::new("R3", 2, 3).with_residual_cell(4, 4),
            RiskPoint::new("R4", 3, 4).with_residual_score(3.99),
        ]
    }

    #[test]
    fn test_level_counts() {
        let config = ClassifierConfig::default();
        let classifier = Classifier::new(&config);
        let matrix = RiskMatrix::inherent(&sample());
        let counts = LevelCounts::from_matrix(&matrix, &classifier);
        assert_eq!(counts.critical, 2);
        assert_eq!(counts.high, 1);
        assert_eq!(counts.medium, 1);
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn test_comparison_trends() {
        let config = ClassifierConfig::default();
        let classifier = Classifier::new(&config);
        let cmp = Comparison::compute(&sample(), &classifier);

        assert_eq!(cmp.summary.total, 4);
        assert_eq!(cmp.summary.lowered, 2);
        assert_eq!(cmp.summary.unchanged, 1);
        assert_eq!(cmp.summary.raised, 1);
        assert_eq!(cmp.transition(RiskLevel::Critical, RiskLevel::Medium), 1);
        assert_eq!(cmp.transition(RiskLevel::High, RiskLevel::Low), 1);
        assert_eq!(cmp.persistent_critical, vec!["R2", "R3"]);
        assert_eq!(cmp.efficacy_pct, 50);
        assert_eq!(cmp.residual.critical, 2);
    }

    #[test]
    fn test_top_mitigations_order() {
        let config = ClassifierConfig::default();
        let classifier = Classifier::new(&config);
        let cmp = Comparison::compute(&sample(), &classifier);
        let top = cmp.top_mitigations(3);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].risk_id, "R1");
        assert_eq!(top[0].reduction, 16);
        assert_eq!(top[1].risk_id, "R4");
        assert_eq!(top[1].reduction, 8);
    }

    #[test]
    fn test_duplicate_ids_compared_once() {
        let config = ClassifierConfig::default();
        let classifier = Classifier::new(&config);
        let mut points = sample();
        points.push(RiskPoint::new("R1", 1, 1));
        points.push(RiskPoint::new("R2", 1, 1).with_residual_cell(1, 1));

        let cmp = Comparison::compute(&points, &classifier);
        assert_eq!(cmp.summary.total, 4);
        let r1: Vec<_> = cmp.changes.iter().filter(|c| c.risk_id == "R1").collect();
        assert_eq!(r1.len(), 1);
        assert_eq!(r1[0].inherent_cell.key(), "5-5");
        assert_eq!(r1[0].residual_cell.key(), "3-3");
        assert_eq!(cmp.persistent_critical, vec!["R2", "R3"]);
    }

    #[test]
    fn test_empty_comparison() {
        let config = ClassifierConfig::default();
        let cmp = Comparison::compute(&[], &Classifier::new(&config));
        assert_eq!(cmp.efficacy_pct, 0);
        assert!(cmp.changes.is_empty());
    }

    #[test]
    fn test_outside_appetite() {
        let config = ClassifierConfig::default();
        let classifier = Classifier::new(&config);
        let points = vec![
            RiskPoint::new("N1", 3, 5),
            RiskPoint::new("N2", 3, 4),
            RiskPoint::new("P1", 5, 5).with_classification(Classification::Positive),
        ];
        let outside = outside_appetite(&points, &classifier);
        assert_eq!(outside.len(), 1);
        assert_eq!(outside[0].id, "N1");
    }
}
