//! Matrix configuration: per-cell level overrides, tolerance zone, presets.
//!
//! A [`MatrixConfig`] is the document an administrator edits (JSON). It is
//! compiled once into a [`ClassifierConfig`]: cell keys are parsed, colors
//! validated, and free-text level names normalized into [`RiskLevel`]s. The
//! classifier only ever sees the compiled form.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use crate::color::Color;
use crate::domain::{Cell, ConfigError, Result, RiskLevel};
use crate::obs;
use crate::preset::BandPreset;

/// Default score at or above which a negative risk is outside appetite.
pub const DEFAULT_APPETITE_THRESHOLD: f64 = 15.0;

/// Default number of risks listed inside a cell before collapsing.
pub const DEFAULT_MAX_VISIBLE_PER_CELL: usize = 3;

fn default_appetite_threshold() -> f64 {
    DEFAULT_APPETITE_THRESHOLD
}

fn default_max_visible_per_cell() -> usize {
    DEFAULT_MAX_VISIBLE_PER_CELL
}

/// One entry of the level catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LevelDefinition {
    pub id: String,

    /// Free-text name, e.g. "Crítico" or "Nivel Alto".
    #[serde(alias = "nombre")]
    pub name: String,

    #[serde(default)]
    pub color: Option<String>,
}

impl LevelDefinition {
    pub fn new(id: &str, name: &str, color: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            color: color.map(str::to_string),
        }
    }
}

/// Matrix configuration document.
///
/// Field aliases accept the register's original key names (`inherente`,
/// `tolerancia`, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatrixConfig {
    #[serde(default)]
    pub preset: BandPreset,

    #[serde(default, alias = "niveles")]
    pub levels: Vec<LevelDefinition>,

    /// Cell key → level id for the inherent map.
    #[serde(default, alias = "inherente")]
    pub inherent: BTreeMap<String, String>,

    /// Cell key → level id for the residual map.
    #[serde(default)]
    pub residual: BTreeMap<String, String>,

    /// Cell keys inside the tolerance zone.
    #[serde(default, alias = "tolerancia")]
    pub tolerance: Vec<String>,

    #[serde(default = "default_appetite_threshold")]
    pub appetite_threshold: f64,

    #[serde(default = "default_max_visible_per_cell", alias = "maxRiesgosVisible")]
    pub max_visible_per_cell: usize,
}

impl Default for MatrixConfig {
    /// Empty configuration: no overrides, four-band fallback.
    fn default() -> Self {
        Self {
            preset: BandPreset::default(),
            levels: Vec::new(),
            inherent: BTreeMap::new(),
            residual: BTreeMap::new(),
            tolerance: Vec::new(),
            appetite_threshold: DEFAULT_APPETITE_THRESHOLD,
            max_visible_per_cell: DEFAULT_MAX_VISIBLE_PER_CELL,
        }
    }
}

impl MatrixConfig {
    /// The register's default map: four catalog levels, the same assignment
    /// for inherent and residual maps, and Low + Medium cells tolerated.
    pub fn standard() -> Self {
        const CRITICAL: [&str; 6] = ["3-5", "4-4", "4-5", "5-3", "5-4", "5-5"];
        const HIGH: [&str; 6] = ["1-5", "2-5", "3-4", "4-3", "5-1", "5-2"];
        const MEDIUM: [&str; 7] = ["1-4", "2-3", "2-4", "3-2", "3-3", "4-1", "4-2"];
        const LOW: [&str; 6] = ["1-1", "1-2", "1-3", "2-1", "2-2", "3-1"];

        let mut assignment = BTreeMap::new();
        for (id, keys) in [
            ("1", &CRITICAL[..]),
            ("2", &HIGH[..]),
            ("3", &MEDIUM[..]),
            ("4", &LOW[..]),
        ] {
            for key in keys {
                assignment.insert(key.to_string(), id.to_string());
            }
        }

        Self {
            preset: BandPreset::FourBand,
            levels: vec![
                LevelDefinition::new("1", "Crítico", Some("#d32f2f")),
                LevelDefinition::new("2", "Alto", Some("#f57c00")),
                LevelDefinition::new("3", "Medio", Some("#fbc02d")),
                LevelDefinition::new("4", "Bajo", Some("#388e3c")),
            ],
            inherent: assignment.clone(),
            residual: assignment,
            tolerance: LOW.iter().chain(MEDIUM.iter()).map(|k| k.to_string()).collect(),
            appetite_threshold: DEFAULT_APPETITE_THRESHOLD,
            max_visible_per_cell: DEFAULT_MAX_VISIBLE_PER_CELL,
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Read a configuration document from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// SHA-256 hex digest of the canonical JSON form.
    pub fn digest(&self) -> Result<String> {
        let canonical = serde_json::to_vec(self)?;
        let mut hasher = Sha256::new();
        hasher.update(&canonical);
        Ok(hex::encode(hasher.finalize()))
    }

    /// Validate and normalize into a [`ClassifierConfig`].
    ///
    /// Malformed cell keys, colors, duplicate level ids, and an out-of-range
    /// appetite threshold are errors. References to unknown level ids and
    /// level names that match no known level are logged and skipped, so the
    /// computed fallback applies to those cells.
    pub fn compile(&self) -> Result<ClassifierConfig> {
        if !(1.0..=25.0).contains(&self.appetite_threshold) {
            return Err(ConfigError::InvalidAppetiteThreshold(self.appetite_threshold).into());
        }

        let mut catalog: HashMap<&str, CellOverride> = HashMap::new();
        for def in &self.levels {
            let level = RiskLevel::from_name(&def.name);
            if level.is_none() {
                obs::emit_level_unmatched(&def.id, &def.name);
            }
            let color = match &def.color {
                Some(raw) => Some(Color::parse(raw).map_err(|_| ConfigError::InvalidColor {
                    level_id: def.id.clone(),
                    color: raw.clone(),
                })?),
                None => None,
            };
            if catalog
                .insert(def.id.as_str(), CellOverride { level, color })
                .is_some()
            {
                return Err(ConfigError::DuplicateLevelId(def.id.clone()).into());
            }
        }

        let inherent = resolve_assignment("inherent", &self.inherent, &catalog)?;
        let residual = resolve_assignment("residual", &self.residual, &catalog)?;

        let tolerance = self
            .tolerance
            .iter()
            .map(|key| Cell::parse_key(key))
            .collect::<std::result::Result<BTreeSet<_>, _>>()?;

        let digest = self.digest()?;
        obs::emit_config_compiled(
            &digest,
            self.preset.as_str(),
            inherent.len(),
            residual.len(),
            tolerance.len(),
        );

        Ok(ClassifierConfig {
            preset: self.preset,
            inherent,
            residual,
            tolerance,
            appetite_threshold: self.appetite_threshold,
            max_visible_per_cell: self.max_visible_per_cell,
            digest: Some(digest),
        })
    }
}

fn resolve_assignment(
    map: &str,
    assignment: &BTreeMap<String, String>,
    catalog: &HashMap<&str, CellOverride>,
) -> Result<ThresholdMap> {
    let mut resolved = ThresholdMap::new();
    for (key, level_id) in assignment {
        let cell = Cell::parse_key(key)?;
        match catalog.get(level_id.as_str()) {
            Some(entry) if entry.level.is_some() || entry.color.is_some() => {
                resolved.insert(cell, entry.clone());
            }
            Some(_) => obs::emit_override_skipped(map, key, level_id, "level name unmatched"),
            None => obs::emit_override_skipped(map, key, level_id, "unknown level id"),
        }
    }
    Ok(resolved)
}

/// A compiled per-cell override.
///
/// `level` is `None` when the configured name matched no known level; a
/// configured color still applies in that case.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CellOverride {
    pub level: Option<RiskLevel>,
    pub color: Option<Color>,
}

/// Per-cell overrides keyed by matrix cell.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ThresholdMap {
    cells: BTreeMap<Cell, CellOverride>,
}

impl ThresholdMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `"{probability}-{impact}"` → free-text level name pairs.
    ///
    /// Names are normalized here, once. Unmatched names are logged and left
    /// out of the map.
    pub fn from_level_names<'a, I>(entries: I) -> std::result::Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut map = Self::new();
        for (key, name) in entries {
            let cell = Cell::parse_key(key)?;
            match RiskLevel::from_name(name) {
                Some(level) => map = map.with_level(cell, level),
                None => obs::emit_override_skipped("custom", key, name, "level name unmatched"),
            }
        }
        Ok(map)
    }

    /// Set the level override of a cell, keeping any configured color.
    pub fn with_level(mut self, cell: Cell, level: RiskLevel) -> Self {
        self.cells.entry(cell).or_default().level = Some(level);
        self
    }

    /// Set the color override of a cell, keeping any configured level.
    pub fn with_color(mut self, cell: Cell, color: Color) -> Self {
        self.cells.entry(cell).or_default().color = Some(color);
        self
    }

    pub fn insert(&mut self, cell: Cell, entry: CellOverride) {
        self.cells.insert(cell, entry);
    }

    pub fn get(&self, cell: &Cell) -> Option<&CellOverride> {
        self.cells.get(cell)
    }

    pub fn level(&self, cell: &Cell) -> Option<RiskLevel> {
        self.cells.get(cell).and_then(|o| o.level)
    }

    pub fn color(&self, cell: &Cell) -> Option<&Color> {
        self.cells.get(cell).and_then(|o| o.color.as_ref())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Cell, &CellOverride)> {
        self.cells.iter()
    }
}

/// Compiled configuration handed to the classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
    pub preset: BandPreset,
    pub inherent: ThresholdMap,
    pub residual: ThresholdMap,
    pub tolerance: BTreeSet<Cell>,
    pub appetite_threshold: f64,
    pub max_visible_per_cell: usize,
    /// Digest of the source document, when compiled from one.
    pub digest: Option<String>,
}

impl Default for ClassifierConfig {
    /// Fallback-only: four bands, no overrides, empty tolerance zone.
    fn default() -> Self {
        Self::fallback(BandPreset::default())
    }
}

impl ClassifierConfig {
    /// No overrides; classification comes entirely from `preset`.
    pub fn fallback(preset: BandPreset) -> Self {
        Self {
            preset,
            inherent: ThresholdMap::new(),
            residual: ThresholdMap::new(),
            tolerance: BTreeSet::new(),
            appetite_threshold: DEFAULT_APPETITE_THRESHOLD,
            max_visible_per_cell: DEFAULT_MAX_VISIBLE_PER_CELL,
            digest: None,
        }
    }

    pub fn with_inherent(mut self, overrides: ThresholdMap) -> Self {
        self.inherent = overrides;
        self
    }

    pub fn with_residual(mut self, overrides: ThresholdMap) -> Self {
        self.residual = overrides;
        self
    }

    pub fn with_tolerance(mut self, cells: impl IntoIterator<Item = Cell>) -> Self {
        self.tolerance = cells.into_iter().collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_covers_every_cell() {
        let config = MatrixConfig::standard();
        assert_eq!(config.inherent.len(), 25);
        assert_eq!(config.residual.len(), 25);
        assert_eq!(config.tolerance.len(), 13);
        let compiled = config.compile().unwrap();
        assert_eq!(compiled.inherent.len(), 25);
        assert_eq!(compiled.tolerance.len(), 13);
    }

    #[test]
    fn test_standard_assignment_counts() {
        let compiled = MatrixConfig::standard().compile().unwrap();
        let count = |level| {
            compiled
                .inherent
                .iter()
                .filter(|(_, o)| o.level == Some(level))
                .count()
        };
        assert_eq!(count(RiskLevel::Critical), 6);
        assert_eq!(count(RiskLevel::High), 6);
        assert_eq!(count(RiskLevel::Medium), 7);
        assert_eq!(count(RiskLevel::Low), 6);
    }

    #[test]
    fn test_digest_is_stable_and_content_sensitive() {
        let a = MatrixConfig::standard();
        let b = MatrixConfig::standard();
        assert_eq!(a.digest().unwrap(), b.digest().unwrap());
        assert_eq!(a.digest().unwrap().len(), 64);

        let mut c = MatrixConfig::standard();
        c.tolerance.pop();
        assert_ne!(a.digest().unwrap(), c.digest().unwrap());
    }

    #[test]
    fn test_invalid_key_rejected() {
        let mut config = MatrixConfig::standard();
        config.inherent.insert("6-1".to_string(), "1".to_string());
        assert!(config.compile().is_err());
    }

    #[test]
    fn test_invalid_color_rejected() {
        let mut config = MatrixConfig::standard();
        config.levels[0].color = Some("crimson".to_string());
        let err = config.compile().unwrap_err();
        assert!(err.to_string().contains("crimson"));
    }

    #[test]
    fn test_duplicate_level_id_rejected() {
        let mut config = MatrixConfig::standard();
        config
            .levels
            .push(LevelDefinition::new("1", "Otro", None));
        assert!(config.compile().is_err());
    }

    #[test]
    fn test_unknown_level_id_skipped() {
        let mut config = MatrixConfig::default();
        config.inherent.insert("5-5".to_string(), "99".to_string());
        let compiled = config.compile().unwrap();
        assert!(compiled.inherent.is_empty());
    }

    #[test]
    fn test_unmatched_name_keeps_color() {
        let config = MatrixConfig {
            levels: vec![LevelDefinition::new("x", "Extremo", Some("#123456"))],
            inherent: BTreeMap::from([("1-1".to_string(), "x".to_string())]),
            ..MatrixConfig::default()
        };
        let compiled = config.compile().unwrap();
        let cell = Cell::new(1, 1).unwrap();
        assert_eq!(compiled.inherent.level(&cell), None);
        assert_eq!(compiled.inherent.color(&cell).unwrap().as_str(), "#123456");
    }

    #[test]
    fn test_appetite_threshold_validated() {
        let config = MatrixConfig {
            appetite_threshold: 30.0,
            ..MatrixConfig::default()
        };
        assert!(config.compile().is_err());
    }

    #[test]
    fn test_original_field_aliases() {
        let json = r##"{
            "niveles": [{"id": "1", "nombre": "CRÍTICO", "color": "#D32F2F"}],
            "inherente": {"1-1": "1"},
            "tolerancia": ["1-2"],
            "maxRiesgosVisible": 5
        }"##;
        let config = MatrixConfig::from_json_str(json).unwrap();
        assert_eq!(config.max_visible_per_cell, 5);
        let compiled = config.compile().unwrap();
        let cell = Cell::new(1, 1).unwrap();
        assert_eq!(compiled.inherent.level(&cell), Some(RiskLevel::Critical));
        assert_eq!(compiled.appetite_threshold, DEFAULT_APPETITE_THRESHOLD);
    }

    #[test]
    fn test_threshold_map_from_level_names() {
        let map =
            ThresholdMap::from_level_names([("1-1", "Crítico"), ("2-2", "desconocido")]).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(
            map.level(&Cell::new(1, 1).unwrap()),
            Some(RiskLevel::Critical)
        );
        assert!(ThresholdMap::from_level_names([("0-0", "Alto")]).is_err());
    }
}
