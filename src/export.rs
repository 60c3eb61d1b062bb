//! Delimited-text export of reconciliation results
//!
//! A null cell is written as an empty field, so exported files cannot tell
//! null from the empty string. The JSON report keeps the difference
//! (`null` versus `""`).

use crate::engine::{Outcome, RecordResult, ReconReport, SingleColumnResult};
use crate::error::Result;
use crate::matcher::DuplicateRow;
use crate::mismatch::MismatchRecord;
use crate::normalize::{KeyCell, KeyTuple};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

fn writer<W: Write>(out: W, delimiter: u8) -> csv::Writer<W> {
    csv::WriterBuilder::new().delimiter(delimiter).from_writer(out)
}

/// Null exports as an empty field
fn cell(value: &KeyCell) -> &str {
    value.as_deref().unwrap_or("")
}

/// One row per key-tuple, one column per key column
pub fn write_key_set<W: Write>(out: W, columns: &[String], keys: &[KeyTuple], delimiter: u8) -> Result<()> {
    let mut wtr = writer(out, delimiter);
    wtr.write_record(columns)?;
    for key in keys {
        wtr.write_record(key.iter().map(cell))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Single-column values under one header
pub fn write_values<W: Write>(out: W, column: &str, values: &[KeyCell], delimiter: u8) -> Result<()> {
    let mut wtr = writer(out, delimiter);
    wtr.write_record([column])?;
    for value in values {
        wtr.write_record([cell(value)])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Duplicate rows with their row index and key cells
pub fn write_duplicates<W: Write>(
    out: W,
    columns: &[String],
    duplicates: &[DuplicateRow],
    delimiter: u8,
) -> Result<()> {
    let mut wtr = writer(out, delimiter);
    let mut header = vec!["row_index".to_string()];
    header.extend(columns.iter().cloned());
    wtr.write_record(&header)?;
    for dup in duplicates {
        let mut record = vec![dup.row_index.to_string()];
        record.extend(dup.key.iter().map(|k| cell(k).to_string()));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Mismatch records, one row per differing field: key cells, row
/// positions, the column name and each side's value
pub fn write_mismatches<W: Write>(
    out: W,
    key_columns: &[String],
    records: &[MismatchRecord],
    delimiter: u8,
) -> Result<()> {
    let mut wtr = writer(out, delimiter);
    let mut header: Vec<String> = key_columns.to_vec();
    header.extend(
        ["left_row", "right_row", "column", "left_value", "right_value", "ambiguous"]
            .iter()
            .map(|s| s.to_string()),
    );
    wtr.write_record(&header)?;

    for record in records {
        let key: Vec<&str> = record.key.iter().map(cell).collect();
        let left_row = record.left_row.to_string();
        let right_row = record.right_row.to_string();
        let ambiguous = record.ambiguous.to_string();
        for difference in &record.differences {
            let mut row = key.clone();
            row.extend([
                left_row.as_str(),
                right_row.as_str(),
                difference.column.as_str(),
                cell(&difference.left),
                cell(&difference.right),
                ambiguous.as_str(),
            ]);
            wtr.write_record(&row)?;
        }
    }
    wtr.flush()?;
    Ok(())
}

/// Side-by-side sheet: `Only_<left>` and `Only_<right>` columns, the shorter
/// one padded with empty cells
pub fn write_difference_sheet<W: Write>(
    out: W,
    left_name: &str,
    right_name: &str,
    only_left: &[String],
    only_right: &[String],
    delimiter: u8,
) -> Result<()> {
    let mut wtr = writer(out, delimiter);
    wtr.write_record([format!("Only_{}", left_name), format!("Only_{}", right_name)])?;
    let height = only_left.len().max(only_right.len());
    for i in 0..height {
        let l = only_left.get(i).map(String::as_str).unwrap_or("");
        let r = only_right.get(i).map(String::as_str).unwrap_or("");
        wtr.write_record([l, r])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Key tuples flattened for the difference sheet
fn joined(keys: &[KeyTuple]) -> Vec<String> {
    keys.iter()
        .map(|k| k.iter().map(cell).collect::<Vec<_>>().join("|"))
        .collect()
}

fn singles(values: &[KeyCell]) -> Vec<String> {
    values.iter().map(|v| cell(v).to_string()).collect()
}

/// Write every result set of `report` into `dir` and return the paths
/// written, in creation order
pub fn export_report(report: &ReconReport, dir: &Path, delimiter: u8) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let left = &report.meta.left.name;
    let right = &report.meta.right.name;
    let mut written = Vec::new();

    let mut create = |name: &str| -> Result<fs::File> {
        let path = dir.join(name);
        let file = fs::File::create(&path)?;
        written.push(path);
        Ok(file)
    };

    match &report.outcome {
        Outcome::Single(single) => export_single(single, left, right, delimiter, &mut create)?,
        Outcome::Records(records) | Outcome::Rows(records) => {
            export_records(records, left, right, delimiter, &mut create)?
        }
        Outcome::Mismatches { records, mismatches } => {
            export_records(records, left, right, delimiter, &mut create)?;
            let file = create("mismatches.csv")?;
            write_mismatches(file, &mismatches.key_columns, &mismatches.mismatches, delimiter)?;
        }
    }

    log::debug!("Exported {} file(s) to {}", written.len(), dir.display());
    Ok(written)
}

fn export_single<F>(
    single: &SingleColumnResult,
    left: &str,
    right: &str,
    delimiter: u8,
    create: &mut F,
) -> Result<()>
where
    F: FnMut(&str) -> Result<fs::File>,
{
    let file = create("only_left.csv")?;
    write_values(file, &single.column_a, &single.only_left, delimiter)?;
    let file = create("only_right.csv")?;
    write_values(file, &single.column_b, &single.only_right, delimiter)?;
    let file = create("common.csv")?;
    write_values(file, &single.column_a, &single.common, delimiter)?;
    let file = create("duplicates_left.csv")?;
    write_duplicates(file, &[single.column_a.clone()], &single.duplicates_left, delimiter)?;
    let file = create("duplicates_right.csv")?;
    write_duplicates(file, &[single.column_b.clone()], &single.duplicates_right, delimiter)?;
    let file = create("difference.csv")?;
    write_difference_sheet(
        file,
        left,
        right,
        &singles(&single.only_left),
        &singles(&single.only_right),
        delimiter,
    )
}

fn export_records<F>(
    records: &RecordResult,
    left: &str,
    right: &str,
    delimiter: u8,
    create: &mut F,
) -> Result<()>
where
    F: FnMut(&str) -> Result<fs::File>,
{
    let columns = &records.key_columns;
    let file = create("only_left.csv")?;
    write_key_set(file, columns, &records.left_only, delimiter)?;
    let file = create("only_right.csv")?;
    write_key_set(file, columns, &records.right_only, delimiter)?;
    let file = create("both.csv")?;
    write_key_set(file, columns, &records.both, delimiter)?;
    let file = create("duplicates_left.csv")?;
    write_duplicates(file, columns, &records.duplicates_left, delimiter)?;
    let file = create("duplicates_right.csv")?;
    write_duplicates(file, columns, &records.duplicates_right, delimiter)?;
    let file = create("difference.csv")?;
    write_difference_sheet(
        file,
        left,
        right,
        &joined(&records.left_only),
        &joined(&records.right_only),
        delimiter,
    )
}
