//! Field-level mismatch detection between rows sharing a key

use crate::error::Result;
use crate::normalize::{self, KeyCell, KeyTuple};
use crate::table::Table;
use serde::Serialize;
use std::collections::BTreeMap;

/// One differing non-key field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDifference {
    pub column: String,
    pub left: KeyCell,
    pub right: KeyCell,
}

/// A pair of rows with the same raw key and at least one differing field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MismatchRecord {
    pub key: KeyTuple,
    pub left_row: usize,
    pub right_row: usize,
    pub differences: Vec<FieldDifference>,
    /// The key matched more than one row on at least one side
    pub ambiguous: bool,
}

impl MismatchRecord {
    /// Names of the differing columns
    pub fn columns(&self) -> Vec<&str> {
        self.differences.iter().map(|d| d.column.as_str()).collect()
    }
}

/// Columns compared for mismatches: shared by both tables, not part of the key
pub fn compared_columns(left: &Table, right: &Table, key_columns: &[String]) -> Vec<String> {
    left.shared_columns(right)
        .into_iter()
        .filter(|c| !key_columns.contains(c))
        .collect()
}

/// Inner-join the tables on exact raw key equality and report every joined
/// pair whose non-key fields differ.
///
/// A key present on several rows of either side yields every combination,
/// each flagged `ambiguous`. Output is ordered by left row, then right row.
pub fn detect_mismatches(left: &Table, right: &Table, key_columns: &[String]) -> Result<Vec<MismatchRecord>> {
    let left_keys = normalize::raw_keys(left, key_columns)?;
    let right_keys = normalize::raw_keys(right, key_columns)?;

    let mut left_groups: BTreeMap<&KeyTuple, usize> = BTreeMap::new();
    for key in &left_keys {
        *left_groups.entry(key).or_insert(0) += 1;
    }
    let mut right_groups: BTreeMap<&KeyTuple, Vec<usize>> = BTreeMap::new();
    for (idx, key) in right_keys.iter().enumerate() {
        right_groups.entry(key).or_default().push(idx);
    }

    let columns = compared_columns(left, right, key_columns);
    let left_idx = left.column_indices(&columns)?;
    let right_idx = right.column_indices(&columns)?;

    let mut records = Vec::new();
    let mut ambiguous_keys = 0usize;

    for (left_row, key) in left_keys.iter().enumerate() {
        let Some(right_rows) = right_groups.get(key) else {
            continue;
        };
        let left_count = left_groups.get(key).copied().unwrap_or(0);
        let ambiguous = left_count > 1 || right_rows.len() > 1;
        if ambiguous {
            ambiguous_keys += 1;
        }

        let left_values = &left.rows()[left_row];
        for &right_row in right_rows {
            let right_values = &right.rows()[right_row];
            let differences: Vec<FieldDifference> = columns
                .iter()
                .enumerate()
                .filter_map(|(k, column)| {
                    let l = left_values[left_idx[k]].render();
                    let r = right_values[right_idx[k]].render();
                    if l != r {
                        Some(FieldDifference {
                            column: column.clone(),
                            left: l,
                            right: r,
                        })
                    } else {
                        None
                    }
                })
                .collect();

            if !differences.is_empty() {
                records.push(MismatchRecord {
                    key: key.clone(),
                    left_row,
                    right_row,
                    differences,
                    ambiguous,
                });
            }
        }
    }

    if ambiguous_keys > 0 {
        log::warn!(
            "{} row(s) of {} joined ambiguously on {:?}; every combination is reported",
            ambiguous_keys,
            left.name(),
            key_columns
        );
    }

    Ok(records)
}
