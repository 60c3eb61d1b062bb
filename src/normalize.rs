//! Key normalization: text folding, exact numeric canonicalization and
//! tolerance bucketing

use crate::error::{ReconError, Result};
use crate::table::{Table, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One cell of a comparison key. `None` is a null cell, which is a value of
/// its own and sorts before every string.
pub type KeyCell = Option<String>;

/// Ordered key cells for one row
pub type KeyTuple = Vec<KeyCell>;

/// Per-comparison normalization settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizationSpec {
    /// Key columns whose text is lowercased and stripped to `[a-z0-9]`
    #[serde(default)]
    pub text_fold: BTreeSet<String>,
    /// Bucket width for numeric key columns; 0 compares numbers exactly
    #[serde(default)]
    pub tolerance: f64,
}

impl NormalizationSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn fold(mut self, column: impl Into<String>) -> Self {
        self.text_fold.insert(column.into());
        self
    }

    pub fn folds(&self, column: &str) -> bool {
        self.text_fold.contains(column)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ReconError::InvalidTolerance {
                value: self.tolerance,
            });
        }
        Ok(())
    }
}

/// How a key column is compared after inspection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Text,
}

/// Normalized key projection of one table
#[derive(Debug, Clone)]
pub struct NormalizedKeys {
    pub columns: Vec<String>,
    pub kinds: Vec<ColumnKind>,
    pub tuples: Vec<KeyTuple>,
}

/// Lowercase and drop everything outside `[a-z0-9]`
pub fn fold_text(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Round `value` to the nearest multiple of `tolerance`
pub fn bucket(value: f64, tolerance: f64) -> f64 {
    if tolerance > 0.0 {
        (value / tolerance).round() * tolerance
    } else {
        value
    }
}

/// Canonical text form of a bucketed number. Float noise left by bucketing
/// (`0.30000000000000004`) is rounded away at 10 decimal places, and `-0`
/// prints as `0`.
pub fn canonical_number(value: f64) -> String {
    let cleaned = if value.abs() < 1e8 {
        (value * 1e10).round() / 1e10
    } else {
        value
    };
    if cleaned == 0.0 {
        return "0".to_string();
    }
    format!("{}", cleaned)
}

/// Widest decimal exponent still printed positionally by [`canonical_decimal`]
const MAX_PLAIN_EXPONENT: i64 = 40;

/// Exact canonical form of a decimal literal, without going through `f64`.
///
/// Leading zeros, trailing fractional zeros, a `+` sign and exponent notation
/// are normalized away, so `"0100.50"`, `"1.005e2"` and `"100.5"` all give
/// `100.5`. Very large or very small magnitudes print as `<digits>e<exp>`.
/// Returns `None` for anything that is not a plain decimal literal.
pub fn canonical_decimal(text: &str) -> Option<String> {
    let text = text.trim();
    let (negative, unsigned) = match text.as_bytes().first().copied()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };

    let (mantissa, exponent) = match unsigned.find(|c| c == 'e' || c == 'E') {
        Some(pos) => (&unsigned[..pos], unsigned[pos + 1..].parse::<i64>().ok()?),
        None => (unsigned, 0),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let mut digits: String = format!("{}{}", int_part, frac_part)
        .trim_start_matches('0')
        .to_string();
    let mut exponent = exponent.checked_sub(i64::try_from(frac_part.len()).ok()?)?;
    if digits.is_empty() {
        return Some("0".to_string());
    }
    let significant = digits.trim_end_matches('0').len();
    exponent = exponent.checked_add(i64::try_from(digits.len() - significant).ok()?)?;
    digits.truncate(significant);

    let sign = if negative { "-" } else { "" };
    let len = i64::try_from(digits.len()).ok()?;
    let rendered = if exponent >= 0 && exponent <= MAX_PLAIN_EXPONENT {
        format!("{}{}", digits, "0".repeat(exponent as usize))
    } else if exponent < 0 && exponent >= -(len + MAX_PLAIN_EXPONENT) {
        let point = len + exponent;
        if point > 0 {
            let (whole, frac) = digits.split_at(point as usize);
            format!("{}.{}", whole, frac)
        } else {
            format!("0.{}{}", "0".repeat((-point) as usize), digits)
        }
    } else {
        format!("{}e{}", digits, exponent)
    };
    Some(format!("{}{}", sign, rendered))
}

/// Exact canonical form of a numeric cell
fn exact_number(value: &Value) -> Option<String> {
    match value {
        Value::Int(i) => canonical_decimal(&i.to_string()),
        Value::Float(f) if f.is_finite() => canonical_decimal(&format!("{}", f)),
        Value::Text(s) => canonical_decimal(s),
        _ => None,
    }
}

/// Raw rendering of the key columns, one tuple per row
pub fn raw_keys(table: &Table, key_columns: &[String]) -> Result<Vec<KeyTuple>> {
    let indices = table.column_indices(key_columns)?;
    Ok(table
        .rows()
        .iter()
        .map(|row| indices.iter().map(|&i| row[i].render()).collect())
        .collect())
}

/// Normalize the key projection of a single table
pub fn normalize(table: &Table, key_columns: &[String], spec: &NormalizationSpec) -> Result<NormalizedKeys> {
    spec.validate()?;
    let kinds = column_kinds(&[table], key_columns)?;
    apply(table, key_columns, &kinds, spec)
}

/// Normalize both tables' key projections.
///
/// The numeric/text decision for each key column is taken over the cells of
/// both tables together, so one column is never numeric on one side and text
/// on the other.
pub fn normalize_pair(
    left: &Table,
    right: &Table,
    key_columns: &[String],
    spec: &NormalizationSpec,
) -> Result<(NormalizedKeys, NormalizedKeys)> {
    spec.validate()?;
    let kinds = column_kinds(&[left, right], key_columns)?;
    let left_keys = apply(left, key_columns, &kinds, spec)?;
    let right_keys = apply(right, key_columns, &kinds, spec)?;
    Ok((left_keys, right_keys))
}

/// A column is numeric when every non-null cell parses as a number and at
/// least one cell is non-null. Anything else is text.
fn column_kinds(tables: &[&Table], key_columns: &[String]) -> Result<Vec<ColumnKind>> {
    let mut kinds = Vec::with_capacity(key_columns.len());

    for column in key_columns {
        let mut numeric_cells = 0usize;
        let mut text_cells = 0usize;

        for table in tables {
            for value in table.column_values(column)? {
                if value.is_null() {
                    continue;
                }
                if value.as_number().is_some() {
                    numeric_cells += 1;
                } else {
                    text_cells += 1;
                }
            }
        }

        let kind = if numeric_cells > 0 && text_cells == 0 {
            ColumnKind::Numeric
        } else {
            ColumnKind::Text
        };

        if numeric_cells > 0 && text_cells > 0 {
            log::warn!(
                "Key column '{}' mixes {} numeric and {} non-numeric cells; comparing as text",
                column,
                numeric_cells,
                text_cells
            );
        } else {
            log::debug!("Key column '{}' compared as {:?}", column, kind);
        }

        kinds.push(kind);
    }

    Ok(kinds)
}

fn apply(
    table: &Table,
    key_columns: &[String],
    kinds: &[ColumnKind],
    spec: &NormalizationSpec,
) -> Result<NormalizedKeys> {
    let indices = table.column_indices(key_columns)?;
    let folds: Vec<bool> = key_columns.iter().map(|c| spec.folds(c)).collect();

    let tuples = table
        .rows()
        .iter()
        .map(|row| {
            indices
                .iter()
                .enumerate()
                .map(|(k, &i)| normalize_cell(&row[i], kinds[k], folds[k], spec.tolerance))
                .collect()
        })
        .collect();

    Ok(NormalizedKeys {
        columns: key_columns.to_vec(),
        kinds: kinds.to_vec(),
        tuples,
    })
}

fn normalize_cell(value: &Value, kind: ColumnKind, fold: bool, tolerance: f64) -> KeyCell {
    if value.is_null() {
        return None;
    }
    match kind {
        // Tolerance 0 compares the decimal literal itself, not its f64 image
        ColumnKind::Numeric if tolerance == 0.0 => exact_number(value)
            .or_else(|| value.as_number().map(canonical_number)),
        ColumnKind::Numeric => value
            .as_number()
            .map(|n| canonical_number(bucket(n, tolerance))),
        ColumnKind::Text => value
            .render()
            .map(|s| if fold { fold_text(&s) } else { s }),
    }
}
