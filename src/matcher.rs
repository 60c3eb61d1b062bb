//! Multi-column record matching over distinct key-tuples

use crate::differ::{self, SetDiff};
use crate::error::Result;
use crate::normalize::{self, ColumnKind, KeyTuple, NormalizationSpec};
use crate::table::Table;
use serde::Serialize;

/// Distinct key-tuples partitioned by presence in each table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchOutput {
    pub left_only: Vec<KeyTuple>,
    pub right_only: Vec<KeyTuple>,
    pub both: Vec<KeyTuple>,
}

impl MatchOutput {
    pub fn has_differences(&self) -> bool {
        !self.left_only.is_empty() || !self.right_only.is_empty()
    }
}

impl From<SetDiff<KeyTuple>> for MatchOutput {
    fn from(diff: SetDiff<KeyTuple>) -> Self {
        Self {
            left_only: diff.only_left,
            right_only: diff.only_right,
            both: diff.common,
        }
    }
}

/// A row whose key-tuple repeats inside its own table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateRow {
    pub row_index: usize,
    pub key: KeyTuple,
}

/// Partition and per-table duplicates for one record comparison
#[derive(Debug, Clone)]
pub struct RecordMatch {
    pub kinds: Vec<ColumnKind>,
    pub partition: MatchOutput,
    pub duplicates_left: Vec<DuplicateRow>,
    pub duplicates_right: Vec<DuplicateRow>,
}

/// Partition already-normalized key-tuples. Each side is deduplicated first
/// and tuples are equal only when every key cell is equal.
pub fn match_keys(left: &[KeyTuple], right: &[KeyTuple]) -> MatchOutput {
    differ::diff(left.iter().cloned(), right.iter().cloned()).into()
}

/// Rows sharing a raw key-tuple with another row of the same table
pub fn find_duplicates(keys: &[KeyTuple]) -> Vec<DuplicateRow> {
    differ::duplicate_indices(keys)
        .into_iter()
        .map(|row_index| DuplicateRow {
            row_index,
            key: keys[row_index].clone(),
        })
        .collect()
}

/// Normalize both key projections and partition them. Duplicates are found
/// on the raw (pre-normalization) projections.
pub fn match_records(
    left: &Table,
    right: &Table,
    key_columns: &[String],
    spec: &NormalizationSpec,
) -> Result<RecordMatch> {
    let (left_keys, right_keys) = normalize::normalize_pair(left, right, key_columns, spec)?;
    let partition = match_keys(&left_keys.tuples, &right_keys.tuples);

    let duplicates_left = find_duplicates(&normalize::raw_keys(left, key_columns)?);
    let duplicates_right = find_duplicates(&normalize::raw_keys(right, key_columns)?);

    log::debug!(
        "Matched {} x {} rows on {:?}: {} left-only, {} right-only, {} in both",
        left.row_count(),
        right.row_count(),
        key_columns,
        partition.left_only.len(),
        partition.right_only.len(),
        partition.both.len()
    );

    Ok(RecordMatch {
        kinds: left_keys.kinds,
        partition,
        duplicates_left,
        duplicates_right,
    })
}
