//! Domain models for riskmap.
//!
//! Canonical definitions for the core entities:
//! - `Cell`: A validated (probability, impact) coordinate
//! - `RiskPoint`: A risk as placed on a map
//! - `RiskLevel`: Ordinal risk level
//! - `Classification`: Threat vs. opportunity

pub mod cell;
pub mod error;
pub mod level;

// Re-export main types and errors
pub use cell::{Cell, RiskPoint, MAX_AXIS, MIN_AXIS};
pub use error::{ConfigError, Result, RiskError};
pub use level::{normalize_level_name, Classification, RiskLevel};
