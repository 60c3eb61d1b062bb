//! Saved comparison profiles

use crate::cli::{parse_delimiter, CompareKind, OutputFormat};
use crate::engine::CompareMode;
use crate::error::{ReconError, Result};
use crate::normalize::NormalizationSpec;
use crate::resolver::{ColumnResolver, DEFAULT_SIMILARITY_THRESHOLD};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A comparison profile as stored on disk. Missing fields take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconConfig {
    pub version: String,
    pub mode: String,
    pub column_a: Option<String>,
    pub column_b: Option<String>,
    pub key_columns: Vec<String>,
    pub text_fold: Vec<String>,
    pub tolerance: f64,
    pub similarity_threshold: f64,
    pub output_format: String,
    pub delimiter: String,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            version: crate::FORMAT_VERSION.to_string(),
            mode: "records".to_string(),
            column_a: None,
            column_b: None,
            key_columns: Vec::new(),
            text_fold: Vec::new(),
            tolerance: 0.0,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            output_format: "pretty".to_string(),
            delimiter: ",".to_string(),
        }
    }
}

/// Values given on the command line; set fields replace profile values
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub mode: Option<String>,
    pub column_a: Option<String>,
    pub column_b: Option<String>,
    pub key_columns: Vec<String>,
    pub text_fold: Vec<String>,
    pub tolerance: Option<f64>,
    pub similarity_threshold: Option<f64>,
    pub output_format: Option<String>,
    pub delimiter: Option<String>,
}

impl ReconConfig {
    /// Read and validate a profile
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read profile {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse profile {}", path.display()))?;
        config.validate()?;
        log::debug!("Loaded comparison profile from {}", path.display());
        Ok(config)
    }

    /// Profile at `path` if given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// Write this profile as pretty JSON. An existing file is kept unless
    /// `force` is set.
    pub fn save(&self, path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            return Err(ReconError::config(format!(
                "{} already exists (use --force to overwrite)",
                path.display()
            )));
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        CompareKind::parse(&self.mode).map_err(ReconError::config)?;
        OutputFormat::parse(&self.output_format).map_err(ReconError::config)?;
        parse_delimiter(&self.delimiter).map_err(ReconError::config)?;
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ReconError::InvalidTolerance {
                value: self.tolerance,
            });
        }
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(ReconError::InvalidThreshold {
                value: self.similarity_threshold,
            });
        }
        Ok(())
    }

    /// Merge command-line values over this profile. Non-empty key and fold
    /// lists replace the profile's lists.
    pub fn apply(mut self, overrides: Overrides) -> Result<Self> {
        if let Some(mode) = overrides.mode {
            self.mode = mode;
        }
        if overrides.column_a.is_some() {
            self.column_a = overrides.column_a;
        }
        if overrides.column_b.is_some() {
            self.column_b = overrides.column_b;
        }
        if !overrides.key_columns.is_empty() {
            self.key_columns = overrides.key_columns;
        }
        if !overrides.text_fold.is_empty() {
            self.text_fold = overrides.text_fold;
        }
        if let Some(tolerance) = overrides.tolerance {
            self.tolerance = tolerance;
        }
        if let Some(threshold) = overrides.similarity_threshold {
            self.similarity_threshold = threshold;
        }
        if let Some(format) = overrides.output_format {
            self.output_format = format;
        }
        if let Some(delimiter) = overrides.delimiter {
            self.delimiter = delimiter;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn output_format(&self) -> Result<OutputFormat> {
        OutputFormat::parse(&self.output_format).map_err(ReconError::config)
    }

    pub fn delimiter_byte(&self) -> Result<u8> {
        parse_delimiter(&self.delimiter).map_err(ReconError::config)
    }

    pub fn resolver(&self) -> Result<ColumnResolver> {
        ColumnResolver::with_threshold(self.similarity_threshold)
    }

    pub fn normalization(&self) -> NormalizationSpec {
        NormalizationSpec {
            text_fold: self.text_fold.iter().cloned().collect(),
            tolerance: self.tolerance,
        }
    }

    /// Build the engine mode this profile describes
    pub fn compare_mode(&self) -> Result<CompareMode> {
        let kind = CompareKind::parse(&self.mode).map_err(ReconError::config)?;
        Ok(match kind {
            CompareKind::Single => match (&self.column_a, &self.column_b) {
                (Some(a), Some(b)) => CompareMode::SingleColumn {
                    column_a: a.clone(),
                    column_b: b.clone(),
                },
                _ => {
                    return Err(ReconError::invalid_input(
                        "Single-column mode needs both --column-a and --column-b",
                    ))
                }
            },
            CompareKind::Records => CompareMode::Records {
                key_columns: self.key_columns.clone(),
                normalization: self.normalization(),
            },
            CompareKind::Rows => CompareMode::FullRows,
            CompareKind::Mismatches => CompareMode::Mismatches {
                key_columns: self.key_columns.clone(),
                normalization: self.normalization(),
            },
        })
    }
}
