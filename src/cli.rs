//! Command-line interface for tabrecon

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tabrecon")]
#[command(about = "Reconcile two tabular datasets: missing records, duplicates and field mismatches")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Comparison profile to read defaults from
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default comparison profile
    Init {
        /// Where to write the profile
        #[arg(long, default_value = "recon.json")]
        path: PathBuf,

        /// Overwrite an existing profile
        #[arg(long)]
        force: bool,
    },

    /// List the columns of a file with their letter tokens
    Columns {
        /// Input file
        input: PathBuf,

        /// Number of rows to preview
        #[arg(long, default_value_t = crate::DEFAULT_PREVIEW_ROWS)]
        rows: usize,

        /// Output format: "pretty" or "json"
        #[arg(long)]
        format: Option<String>,
    },

    /// Compare two files
    Compare {
        /// Left (A) input file
        left: PathBuf,

        /// Right (B) input file
        right: PathBuf,

        /// Comparison mode: "single", "records", "rows" or "mismatches"
        #[arg(long)]
        mode: Option<String>,

        /// Column token for the left table (single mode)
        #[arg(long)]
        column_a: Option<String>,

        /// Column token for the right table (single mode)
        #[arg(long)]
        column_b: Option<String>,

        /// Key column token; repeat for multi-column keys
        #[arg(long = "key")]
        keys: Vec<String>,

        /// Key column token to compare with text folding; repeatable
        #[arg(long = "fold")]
        folds: Vec<String>,

        /// Numeric tolerance for key matching (>= 0)
        #[arg(long, value_parser = validate_tolerance)]
        tolerance: Option<f64>,

        /// Fuzzy column-name similarity threshold (0 to 1)
        #[arg(long, value_parser = validate_threshold)]
        threshold: Option<f64>,

        /// Output format: "pretty" or "json"
        #[arg(long)]
        format: Option<String>,

        /// Directory to write result files into
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Field delimiter for exported files
        #[arg(long)]
        delimiter: Option<String>,
    },
}

/// Parse comparison mode string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareKind {
    Single,
    Records,
    Rows,
    Mismatches,
}

impl CompareKind {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "records" => Ok(Self::Records),
            "rows" => Ok(Self::Rows),
            "mismatches" => Ok(Self::Mismatches),
            _ => Err(format!(
                "Invalid comparison mode: {}. Use 'single', 'records', 'rows' or 'mismatches'",
                s
            )),
        }
    }
}

/// Parse output format string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Pretty,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {}. Use 'pretty' or 'json'", s)),
        }
    }
}

/// Parse a delimiter argument into a single byte
pub fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s {
        "\\t" | "tab" => Ok(b'\t'),
        _ if s.len() == 1 => Ok(s.as_bytes()[0]),
        _ => Err(format!("Invalid delimiter: '{}'. Must be a single character", s)),
    }
}

fn validate_tolerance(s: &str) -> Result<f64, String> {
    let tolerance: f64 = s
        .parse()
        .map_err(|_| format!("Invalid tolerance: '{}'. Must be a number.", s))?;
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err("Tolerance must be a finite number >= 0".to_string());
    }
    Ok(tolerance)
}

fn validate_threshold(s: &str) -> Result<f64, String> {
    let threshold: f64 = s
        .parse()
        .map_err(|_| format!("Invalid threshold: '{}'. Must be a number.", s))?;
    if !(0.0..=1.0).contains(&threshold) {
        return Err("Threshold must be between 0 and 1".to_string());
    }
    Ok(threshold)
}
