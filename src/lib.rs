//! # tabrecon
//!
//! Reconciles two tabular datasets: finds records present in one table but
//! not the other, rows duplicated within a table, and field-level mismatches
//! between rows that share a key.

pub mod cli;
pub mod commands;
pub mod config;
pub mod differ;
pub mod engine;
pub mod error;
pub mod export;
pub mod loader;
pub mod matcher;
pub mod mismatch;
pub mod normalize;
pub mod output;
pub mod progress;
pub mod resolver;
pub mod table;

pub use config::ReconConfig;
pub use engine::{CompareMode, ReconEngine, ReconReport};
pub use error::{ReconError, Result};
pub use normalize::NormalizationSpec;
pub use resolver::ColumnResolver;
pub use table::{Table, Value};

/// Current format version for reports and profiles
pub const FORMAT_VERSION: &str = "1.0.0";

/// Default number of rows previewed by `tabrecon columns`
pub const DEFAULT_PREVIEW_ROWS: usize = 5;
