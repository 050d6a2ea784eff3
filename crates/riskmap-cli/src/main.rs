//! riskmap - risk map scoring from the command line
//!
//! ## Commands
//!
//! - `score`: Numeric score of a (probability, impact) pair
//! - `classify`: Score, level and color of a cell
//! - `inverse`: Cell that represents a continuous score
//! - `matrix`: Place risks on the inherent or residual map
//! - `compare`: Inherent vs residual comparison
//! - `residual`: Evaluate controls and derive residual cells
//! - `config`: Validate or print a matrix configuration

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, Level};

use riskmap_controls::{assess_residual, Cause, EvaluationSettings, MitigationTable};
use riskmap_core::{
    inverse_lookup, render_comparison_md, render_matrix_summary_md, score,
    write_matrix_report_json, BandPreset, Cell, Classification, Classifier, ClassifierConfig,
    Comparison, MapKind, MatrixConfig, MatrixReport, RiskMatrix, RiskPoint,
};

#[derive(Parser)]
#[command(name = "riskmap")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Risk score classification for 5x5 risk maps", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Numeric score of a (probability, impact) pair
    Score {
        #[arg(short, long)]
        probability: u8,

        #[arg(short, long)]
        impact: u8,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Score, level and color of a cell
    Classify {
        #[arg(short, long)]
        probability: u8,

        #[arg(short, long)]
        impact: u8,

        #[command(flatten)]
        map: MapArgs,

        /// Classify on the residual map
        #[arg(long)]
        residual: bool,

        /// Treat the risk as an opportunity (positive consequence)
        #[arg(long)]
        positive: bool,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Cell whose score best represents a continuous score
    Inverse {
        /// Continuous score; values below 1 map to 1-1
        #[arg(allow_negative_numbers = true)]
        target: f64,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Place risks on the inherent or residual map
    Matrix {
        /// Risk points (JSON array)
        #[arg(long)]
        points: PathBuf,

        #[command(flatten)]
        map: MapArgs,

        /// Build the residual map
        #[arg(long)]
        residual: bool,

        /// Also write the full map report to this path
        #[arg(long)]
        report: Option<PathBuf>,

        /// Print a Markdown summary instead of the grid
        #[arg(long)]
        markdown: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compare inherent and residual placement of risks
    Compare {
        /// Risk points (JSON array)
        #[arg(long)]
        points: PathBuf,

        #[command(flatten)]
        map: MapArgs,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Evaluate controls per cause and derive residual cells
    Residual {
        /// Risks with causes and controls (JSON array)
        #[arg(long)]
        causes: PathBuf,

        #[command(flatten)]
        map: MapArgs,

        /// Use the basic mitigation table
        #[arg(long)]
        basic_table: bool,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Matrix configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Compile a configuration and report what it overrides
    Validate { path: PathBuf },
    /// Print the standard configuration as JSON
    ShowDefault,
}

#[derive(clap::Args, Debug, Clone, Default)]
struct MapArgs {
    /// Matrix configuration (JSON); the standard map when omitted
    #[arg(long, env = "RISKMAP_CONFIG")]
    config: Option<PathBuf>,

    /// Band preset, overriding the configuration's
    #[arg(long)]
    preset: Option<BandPreset>,

    /// Ignore configured overrides and use the computed bands only
    #[arg(long)]
    fallback: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    riskmap_core::init_tracing(cli.log_json, level);

    let output = match cli.command {
        Commands::Score {
            probability,
            impact,
            json,
        } => cmd_score(probability, impact, json)?,
        Commands::Classify {
            probability,
            impact,
            map,
            residual,
            positive,
            json,
        } => {
            let config = load_classifier_config(&map)?;
            cmd_classify(&config, probability, impact, residual, positive, json)?
        }
        Commands::Inverse { target, json } => cmd_inverse(target, json)?,
        Commands::Matrix {
            points,
            map,
            residual,
            report,
            markdown,
            json,
        } => {
            let config = load_classifier_config(&map)?;
            let points: Vec<RiskPoint> = read_json_file(&points)?;
            let kind = if residual {
                MapKind::Residual
            } else {
                MapKind::Inherent
            };
            cmd_matrix(&config, &points, kind, report.as_deref(), markdown, json)?
        }
        Commands::Compare { points, map, json } => {
            let config = load_classifier_config(&map)?;
            let points: Vec<RiskPoint> = read_json_file(&points)?;
            cmd_compare(&config, &points, json)?
        }
        Commands::Residual {
            causes,
            map,
            basic_table,
            json,
        } => {
            let config = load_classifier_config(&map)?;
            let risks: Vec<RiskCauses> = read_json_file(&causes)?;
            cmd_residual(&config, &risks, basic_table, json)?
        }
        Commands::Config { action } => match action {
            ConfigAction::Validate { path } => cmd_config_validate(&path)?,
            ConfigAction::ShowDefault => cmd_config_show_default()?,
        },
    };

    println!("{}", output.trim_end());
    Ok(())
}

// ---------------------------------------------------------------------------
// Input helpers
// ---------------------------------------------------------------------------

fn read_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read JSON file: {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {:?}", path))
}

fn load_classifier_config(args: &MapArgs) -> Result<ClassifierConfig> {
    let mut document = match &args.config {
        Some(path) => MatrixConfig::load(path)
            .with_context(|| format!("Failed to load matrix config: {:?}", path))?,
        None => MatrixConfig::standard(),
    };
    if let Some(preset) = args.preset {
        document.preset = preset;
    }
    if args.fallback {
        debug!(preset = %document.preset, "using computed bands only");
        return Ok(ClassifierConfig::fallback(document.preset));
    }
    document.compile().context("Invalid matrix config")
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ScoreOutput {
    probability: u8,
    impact: u8,
    score: f64,
}

fn cmd_score(probability: u8, impact: u8, json: bool) -> Result<String> {
    let cell = Cell::new(probability, impact)?;
    let out = ScoreOutput {
        probability,
        impact,
        score: score(cell.probability(), cell.impact()),
    };
    if json {
        return Ok(serde_json::to_string_pretty(&out)?);
    }
    Ok(format!("{}", out.score))
}

fn cmd_classify(
    config: &ClassifierConfig,
    probability: u8,
    impact: u8,
    residual: bool,
    positive: bool,
    json: bool,
) -> Result<String> {
    let cell = Cell::new(probability, impact)?;
    let kind = if residual {
        MapKind::Residual
    } else {
        MapKind::Inherent
    };
    let classification = if positive {
        Classification::Positive
    } else {
        Classification::Negative
    };
    let assessment = Classifier::new(config).assess(kind, cell, classification);
    if json {
        return Ok(serde_json::to_string_pretty(&assessment)?);
    }
    Ok(format!(
        "{cell}  score={}  level={}  color={}",
        assessment.score, assessment.level, assessment.color
    ))
}

fn cmd_inverse(target: f64, json: bool) -> Result<String> {
    let cell = inverse_lookup(target)
        .with_context(|| format!("No cell for non-finite score {target}"))?;
    if json {
        return Ok(serde_json::to_string_pretty(&cell)?);
    }
    Ok(cell.key())
}

fn cmd_matrix(
    config: &ClassifierConfig,
    points: &[RiskPoint],
    kind: MapKind,
    report_path: Option<&Path>,
    markdown: bool,
    json: bool,
) -> Result<String> {
    let classifier = Classifier::new(config);
    let matrix = match kind {
        MapKind::Inherent => RiskMatrix::inherent(points),
        MapKind::Residual => RiskMatrix::residual(points),
    };
    let report = MatrixReport::build(&matrix, points, &classifier, Utc::now());

    if let Some(path) = report_path {
        write_matrix_report_json(path, &report)
            .with_context(|| format!("Failed to write report: {:?}", path))?;
    }

    if json {
        return Ok(serde_json::to_string_pretty(&report)?);
    }
    if markdown {
        return Ok(render_matrix_summary_md(&report));
    }
    Ok(matrix.render_text(&classifier))
}

fn cmd_compare(config: &ClassifierConfig, points: &[RiskPoint], json: bool) -> Result<String> {
    let comparison = Comparison::compute(points, &Classifier::new(config));
    if json {
        return Ok(serde_json::to_string_pretty(&comparison)?);
    }
    Ok(render_comparison_md(&comparison))
}

/// One risk and its causes, as read by `residual`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RiskCauses {
    risk_id: String,
    #[serde(default)]
    classification: Classification,
    causes: Vec<Cause>,
}

fn cmd_residual(
    config: &ClassifierConfig,
    risks: &[RiskCauses],
    basic_table: bool,
    json: bool,
) -> Result<String> {
    let classifier = Classifier::new(config);
    let settings = if basic_table {
        EvaluationSettings::default().with_table(MitigationTable::basic())
    } else {
        EvaluationSettings::default()
    };

    let assessments = risks
        .iter()
        .map(|risk| {
            assess_residual(
                &risk.risk_id,
                &risk.causes,
                risk.classification,
                &settings,
                &classifier,
            )
            .with_context(|| format!("Failed to assess risk {}", risk.risk_id))
        })
        .collect::<Result<Vec<_>>>()?;

    if json {
        return Ok(serde_json::to_string_pretty(&assessments)?);
    }
    let mut out = String::new();
    for a in &assessments {
        out.push_str(&format!(
            "{}  inherent={}  residual={}  cell={}  level={}\n",
            a.risk_id, a.inherent_score, a.residual_score, a.cell, a.level
        ));
    }
    Ok(out)
}

fn cmd_config_validate(path: &Path) -> Result<String> {
    let document = MatrixConfig::load(path)
        .with_context(|| format!("Failed to load matrix config: {:?}", path))?;
    let compiled = document.compile().context("Invalid matrix config")?;
    Ok(format!(
        "ok  preset={}  inherent_overrides={}  residual_overrides={}  \
         tolerance_cells={}  digest={}",
        compiled.preset,
        compiled.inherent.len(),
        compiled.residual.len(),
        compiled.tolerance.len(),
        compiled.digest.unwrap_or_default()
    ))
}

fn cmd_config_show_default() -> Result<String> {
    Ok(serde_json::to_string_pretty(&MatrixConfig::standard())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard() -> ClassifierConfig {
        MatrixConfig::standard().compile().unwrap()
    }

    #[test]
    fn test_score_output() {
        assert_eq!(cmd_score(2, 2, false).unwrap(), "3.99");
        assert_eq!(cmd_score(3, 5, false).unwrap(), "15");
        let json: serde_json::Value =
            serde_json::from_str(&cmd_score(4, 3, true).unwrap()).unwrap();
        assert_eq!(json["score"], 12.0);
        assert!(cmd_score(0, 3, false).is_err());
    }

    #[test]
    fn test_classify_output() {
        let out = cmd_classify(&standard(), 3, 5, false, false, false).unwrap();
        assert_eq!(out, "3-5  score=15  level=NIVEL CRÍTICO  color=#d32f2f");

        let json = cmd_classify(&standard(), 1, 1, true, true, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["level"], "low");
        assert_eq!(value["color"], "#bdbdbd");
        assert_eq!(value["tolerated"], true);
    }

    #[test]
    fn test_inverse_output() {
        assert_eq!(cmd_inverse(3.99, false).unwrap(), "2-2");
        assert_eq!(cmd_inverse(7.5, false).unwrap(), "2-4");
        assert!(cmd_inverse(f64::NAN, false).is_err());
    }

    #[test]
    fn test_matrix_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let report_path = dir.path().join("map.json");
        let points = vec![RiskPoint::new("1GFA", 5, 5), RiskPoint::new("2GFA", 1, 1)];

        let text = cmd_matrix(
            &standard(),
            &points,
            MapKind::Inherent,
            Some(&report_path),
            false,
            false,
        )
        .unwrap();
        assert!(text.starts_with("inherent map"));

        let report: MatrixReport = read_json_file(&report_path).unwrap();
        assert_eq!(report.total_risks, 2);
        assert_eq!(report.counts.critical, 1);
        assert_eq!(report.cells.len(), 25);
    }

    #[test]
    fn test_matrix_markdown() {
        let points = vec![RiskPoint::new("1GFA", 5, 5)];
        let md = cmd_matrix(&standard(), &points, MapKind::Residual, None, true, false).unwrap();
        assert!(md.starts_with("# Residual Risk Map"));
        assert!(md.contains("- NIVEL CRÍTICO: 1"));
    }

    #[test]
    fn test_compare_json() {
        let points = vec![
            RiskPoint::new("1GFA", 5, 5).with_residual_cell(1, 2),
            RiskPoint::new("2GFA", 4, 4),
        ];
        let out = cmd_compare(&standard(), &points, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["summary"]["lowered"], 1);
        assert_eq!(value["efficacy_pct"], 50);
    }

    #[test]
    fn test_residual_from_json_input() {
        let risks: Vec<RiskCauses> = serde_json::from_str(
            r#"[{
                "risk_id": "1GFA",
                "causes": [{
                    "id": "c1", "frequency": 5, "impact": 4,
                    "control": {
                        "criteria": {"applicability": 100, "coverage": 100,
                                     "ease_of_use": 100, "segregation": 100, "nature": 100},
                        "deviations": "B",
                        "target": "FRECUENCIA"
                    }
                }]
            }]"#,
        )
        .unwrap();
        let out = cmd_residual(&standard(), &risks, false, false).unwrap();
        // Effective (61%) on frequency: 5 -> 2
        assert_eq!(out, "1GFA  inherent=20  residual=8  cell=2-4  level=NIVEL MEDIO\n");
    }

    #[test]
    fn test_config_validate_and_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, cmd_config_show_default().unwrap()).unwrap();

        let out = cmd_config_validate(&path).unwrap();
        assert!(out.starts_with("ok  preset=four_band  inherent_overrides=25"));

        std::fs::write(&path, r#"{"tolerance": ["9-9"]}"#).unwrap();
        assert!(cmd_config_validate(&path).is_err());
    }

    #[test]
    fn test_fallback_flag_ignores_overrides() {
        let args = MapArgs {
            fallback: true,
            preset: Some(BandPreset::FiveBandWithVeryHigh),
            ..Default::default()
        };
        let config = load_classifier_config(&args).unwrap();
        assert!(config.inherent.is_empty());
        assert_eq!(config.preset, BandPreset::FiveBandWithVeryHigh);
    }

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
        let cli = Cli::try_parse_from([
            "riskmap", "--verbose", "classify", "-p", "2", "-i", "2", "--preset", "five-band",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Classify { .. }));
    }

    #[test]
    fn test_inverse_accepts_negative_target() {
        let cli = Cli::try_parse_from(["riskmap", "inverse", "-3", "--json"]).unwrap();
        let Commands::Inverse { target, json } = cli.command else {
            panic!("expected inverse");
        };
        assert_eq!(target, -3.0);
        assert!(json);
        assert_eq!(cmd_inverse(target, false).unwrap(), "1-1");
    }
}
