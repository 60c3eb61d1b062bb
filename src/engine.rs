//! Reconciliation engine: resolves columns, runs one comparison mode and
//! packages the result

use crate::differ;
use crate::error::{ReconError, Result};
use crate::matcher::{self, DuplicateRow};
use crate::mismatch::{self, MismatchRecord};
use crate::normalize::{ColumnKind, KeyCell, KeyTuple, NormalizationSpec};
use crate::resolver::ColumnResolver;
use crate::table::Table;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Comparison to run, with its parameters
#[derive(Debug, Clone, PartialEq)]
pub enum CompareMode {
    /// Distinct values of one column from each table
    SingleColumn { column_a: String, column_b: String },
    /// Key-tuples over the given key columns
    Records {
        key_columns: Vec<String>,
        normalization: NormalizationSpec,
    },
    /// Whole rows restricted to the shared columns
    FullRows,
    /// Record comparison plus field mismatches of the matched keys
    Mismatches {
        key_columns: Vec<String>,
        normalization: NormalizationSpec,
    },
}

impl CompareMode {
    pub fn name(&self) -> &'static str {
        match self {
            CompareMode::SingleColumn { .. } => "single",
            CompareMode::Records { .. } => "records",
            CompareMode::FullRows => "rows",
            CompareMode::Mismatches { .. } => "mismatches",
        }
    }
}

/// Result of a single-column comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SingleColumnResult {
    pub column_a: String,
    pub column_b: String,
    pub only_left: Vec<KeyCell>,
    pub only_right: Vec<KeyCell>,
    pub common: Vec<KeyCell>,
    pub duplicates_left: Vec<DuplicateRow>,
    pub duplicates_right: Vec<DuplicateRow>,
}

/// Result of a record (multi-column key) comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordResult {
    pub key_columns: Vec<String>,
    pub column_kinds: Vec<ColumnKind>,
    pub left_only: Vec<KeyTuple>,
    pub right_only: Vec<KeyTuple>,
    pub both: Vec<KeyTuple>,
    pub duplicates_left: Vec<DuplicateRow>,
    pub duplicates_right: Vec<DuplicateRow>,
}

/// Field mismatches among matched keys
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MismatchResult {
    pub key_columns: Vec<String>,
    pub compared_columns: Vec<String>,
    pub matched_keys: usize,
    pub mismatches: Vec<MismatchRecord>,
}

/// Mode-specific payload of a report
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Outcome {
    Single(SingleColumnResult),
    Records(RecordResult),
    Rows(RecordResult),
    Mismatches {
        records: RecordResult,
        mismatches: MismatchResult,
    },
}

impl Outcome {
    /// The record partition, for modes that have one
    pub fn records(&self) -> Option<&RecordResult> {
        match self {
            Outcome::Single(_) => None,
            Outcome::Records(r) | Outcome::Rows(r) => Some(r),
            Outcome::Mismatches { records, .. } => Some(records),
        }
    }
}

/// Counts across the outcome
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconSummary {
    pub only_left: usize,
    pub only_right: usize,
    pub common: usize,
    pub duplicates_left: usize,
    pub duplicates_right: usize,
    pub mismatches: usize,
}

impl ReconSummary {
    pub fn has_differences(&self) -> bool {
        self.only_left > 0 || self.only_right > 0 || self.mismatches > 0
    }

    fn from_outcome(outcome: &Outcome) -> Self {
        match outcome {
            Outcome::Single(s) => Self {
                only_left: s.only_left.len(),
                only_right: s.only_right.len(),
                common: s.common.len(),
                duplicates_left: s.duplicates_left.len(),
                duplicates_right: s.duplicates_right.len(),
                mismatches: 0,
            },
            Outcome::Records(r) | Outcome::Rows(r) => Self::from_records(r),
            Outcome::Mismatches { records, mismatches } => Self {
                mismatches: mismatches.mismatches.len(),
                ..Self::from_records(records)
            },
        }
    }

    fn from_records(r: &RecordResult) -> Self {
        Self {
            only_left: r.left_only.len(),
            only_right: r.right_only.len(),
            common: r.both.len(),
            duplicates_left: r.duplicates_left.len(),
            duplicates_right: r.duplicates_right.len(),
            mismatches: 0,
        }
    }
}

/// Shape of an input table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableMeta {
    pub name: String,
    pub rows: usize,
    pub columns: usize,
}

impl TableMeta {
    fn of(table: &Table) -> Self {
        Self {
            name: table.name().to_string(),
            rows: table.row_count(),
            columns: table.column_count(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub format_version: String,
    pub mode: String,
    pub left: TableMeta,
    pub right: TableMeta,
    pub generated_at: DateTime<Utc>,
}

/// Everything one comparison produced
#[derive(Debug, Clone, Serialize)]
pub struct ReconReport {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub outcome: Outcome,
    /// BLAKE3 digest of the outcome; equal inputs give equal fingerprints
    pub fingerprint: String,
}

/// Stateless comparison engine. Holds only immutable settings, so one
/// instance can serve any number of comparisons.
#[derive(Debug, Clone, Default)]
pub struct ReconEngine {
    resolver: ColumnResolver,
}

impl ReconEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resolver(resolver: ColumnResolver) -> Self {
        Self { resolver }
    }

    /// Run `mode` and package the outcome as a report
    pub fn run(&self, left: &Table, right: &Table, mode: &CompareMode) -> Result<ReconReport> {
        let outcome = match mode {
            CompareMode::SingleColumn { column_a, column_b } => {
                Outcome::Single(self.compare_single_column(left, right, column_a, column_b)?)
            }
            CompareMode::Records {
                key_columns,
                normalization,
            } => Outcome::Records(self.compare_records(left, right, key_columns, normalization)?),
            CompareMode::FullRows => Outcome::Rows(self.compare_full_rows(left, right)?),
            CompareMode::Mismatches {
                key_columns,
                normalization,
            } => {
                let records = self.compare_records(left, right, key_columns, normalization)?;
                let mismatches =
                    self.detect_mismatches(left, right, key_columns, normalization, Some(&records))?;
                Outcome::Mismatches { records, mismatches }
            }
        };

        let summary = ReconSummary::from_outcome(&outcome);
        let fingerprint = fingerprint(&outcome)?;

        log::info!(
            "{} comparison of {} and {}: {} only left, {} only right, {} common, {} mismatches",
            mode.name(),
            left.name(),
            right.name(),
            summary.only_left,
            summary.only_right,
            summary.common,
            summary.mismatches
        );

        Ok(ReconReport {
            meta: ReconMeta {
                format_version: crate::FORMAT_VERSION.to_string(),
                mode: mode.name().to_string(),
                left: TableMeta::of(left),
                right: TableMeta::of(right),
                generated_at: Utc::now(),
            },
            summary,
            outcome,
            fingerprint,
        })
    }

    /// Compare the distinct values of one column from each table. Each token
    /// is resolved against its own table.
    pub fn compare_single_column(
        &self,
        left: &Table,
        right: &Table,
        column_a: &str,
        column_b: &str,
    ) -> Result<SingleColumnResult> {
        let column_a = self.resolver.resolve_in(column_a, left)?;
        let column_b = self.resolver.resolve_in(column_b, right)?;

        let left_values: Vec<KeyCell> = left.column_values(&column_a)?.iter().map(|v| v.render()).collect();
        let right_values: Vec<KeyCell> = right.column_values(&column_b)?.iter().map(|v| v.render()).collect();

        let diff = differ::diff(left_values.iter().cloned(), right_values.iter().cloned());

        Ok(SingleColumnResult {
            duplicates_left: single_duplicates(&left_values),
            duplicates_right: single_duplicates(&right_values),
            column_a,
            column_b,
            only_left: diff.only_left,
            only_right: diff.only_right,
            common: diff.common,
        })
    }

    /// Partition the distinct normalized key-tuples of both tables
    pub fn compare_records(
        &self,
        left: &Table,
        right: &Table,
        key_tokens: &[String],
        spec: &NormalizationSpec,
    ) -> Result<RecordResult> {
        spec.validate()?;
        let key_columns = self.resolve_keys(left, right, key_tokens)?;
        let spec = self.resolve_spec(left, spec, &key_columns)?;
        self.match_on(left, right, key_columns, &spec)
    }

    /// Compare whole rows over the columns both tables share
    pub fn compare_full_rows(&self, left: &Table, right: &Table) -> Result<RecordResult> {
        let shared = left.shared_columns(right);
        if shared.is_empty() {
            return Err(no_shared_columns(left, right));
        }
        self.match_on(left, right, shared, &NormalizationSpec::new())
    }

    /// Report non-key fields that differ between rows with equal raw keys.
    ///
    /// `prior` supplies the matched keys from an earlier `compare_records` on
    /// the same keys; without it (or when its keys differ) the record
    /// comparison is recomputed.
    pub fn detect_mismatches(
        &self,
        left: &Table,
        right: &Table,
        key_tokens: &[String],
        spec: &NormalizationSpec,
        prior: Option<&RecordResult>,
    ) -> Result<MismatchResult> {
        let key_columns = self.resolve_keys(left, right, key_tokens)?;

        let matched_keys = match prior {
            Some(records) if records.key_columns == key_columns => records.both.len(),
            _ => {
                log::debug!("No usable prior record comparison; recomputing matched keys");
                spec.validate()?;
                let spec = self.resolve_spec(left, spec, &key_columns)?;
                self.match_on(left, right, key_columns.clone(), &spec)?.both.len()
            }
        };

        let mismatches = mismatch::detect_mismatches(left, right, &key_columns)?;

        Ok(MismatchResult {
            compared_columns: mismatch::compared_columns(left, right, &key_columns),
            key_columns,
            matched_keys,
            mismatches,
        })
    }

    fn match_on(
        &self,
        left: &Table,
        right: &Table,
        key_columns: Vec<String>,
        spec: &NormalizationSpec,
    ) -> Result<RecordResult> {
        let matched = matcher::match_records(left, right, &key_columns, spec)?;
        Ok(RecordResult {
            key_columns,
            column_kinds: matched.kinds,
            left_only: matched.partition.left_only,
            right_only: matched.partition.right_only,
            both: matched.partition.both,
            duplicates_left: matched.duplicates_left,
            duplicates_right: matched.duplicates_right,
        })
    }

    /// Resolve key tokens against the left table and require each resolved
    /// column verbatim in the right table. Repeats keep their first position.
    fn resolve_keys(&self, left: &Table, right: &Table, tokens: &[String]) -> Result<Vec<String>> {
        if left.shared_columns(right).is_empty() {
            return Err(no_shared_columns(left, right));
        }
        if tokens.iter().all(|t| t.trim().is_empty()) {
            return Err(ReconError::EmptyKeySelection);
        }

        let mut keys: Vec<String> = Vec::with_capacity(tokens.len());
        for token in tokens.iter().filter(|t| !t.trim().is_empty()) {
            let column = self.resolver.resolve_in(token, left)?;
            if !right.has_column(&column) {
                return Err(ReconError::key_column_missing(column, right.name()));
            }
            if !keys.contains(&column) {
                keys.push(column);
            }
        }
        Ok(keys)
    }

    /// Resolve text-fold tokens to column names
    fn resolve_spec(&self, left: &Table, spec: &NormalizationSpec, keys: &[String]) -> Result<NormalizationSpec> {
        let mut resolved = NormalizationSpec::new().with_tolerance(spec.tolerance);
        for token in &spec.text_fold {
            let column = self.resolver.resolve_in(token, left)?;
            if !keys.contains(&column) {
                log::warn!("Text fold requested for '{}', which is not a key column", column);
            }
            resolved.text_fold.insert(column);
        }
        Ok(resolved)
    }
}

fn single_duplicates(values: &[KeyCell]) -> Vec<DuplicateRow> {
    differ::duplicate_indices(values)
        .into_iter()
        .map(|row_index| DuplicateRow {
            row_index,
            key: vec![values[row_index].clone()],
        })
        .collect()
}

fn no_shared_columns(left: &Table, right: &Table) -> ReconError {
    ReconError::NoSharedColumns {
        left: left.name().to_string(),
        right: right.name().to_string(),
    }
}

/// BLAKE3 digest over the JSON form of an outcome
pub fn fingerprint(outcome: &Outcome) -> Result<String> {
    let bytes = serde_json::to_vec(outcome)?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}
