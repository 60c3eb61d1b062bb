//! Output formatting utilities

use crate::engine::{Outcome, RecordResult, ReconReport, SingleColumnResult};
use crate::error::Result;
use crate::matcher::DuplicateRow;
use crate::mismatch::MismatchRecord;
use crate::normalize::{ColumnKind, KeyCell, KeyTuple};
use crate::resolver::column_letter;
use crate::table::Table;
use std::fmt::Write;

/// Entries listed per result set before eliding
const SAMPLE_LIMIT: usize = 10;

/// Pretty printer for tabrecon output
pub struct PrettyPrinter;

impl PrettyPrinter {
    /// Print a comparison report
    pub fn print_report(report: &ReconReport) {
        print!("{}", Self::render_report(report));
    }

    /// Print the columns of a table and a preview of its first rows
    pub fn print_columns(table: &Table, preview_rows: usize) {
        print!("{}", Self::render_columns(table, preview_rows));
    }

    pub fn render_report(report: &ReconReport) -> String {
        let mut out = String::new();
        let meta = &report.meta;
        let summary = &report.summary;

        let _ = writeln!(
            out,
            "🔍 Reconciliation ({}): {} ({} rows) ↔ {} ({} rows)",
            meta.mode, meta.left.name, meta.left.rows, meta.right.name, meta.right.rows
        );

        match &report.outcome {
            Outcome::Single(single) => render_single(&mut out, single, &meta.left.name, &meta.right.name),
            Outcome::Records(records) | Outcome::Rows(records) => {
                render_records(&mut out, records, &meta.left.name, &meta.right.name)
            }
            Outcome::Mismatches { records, mismatches } => {
                render_records(&mut out, records, &meta.left.name, &meta.right.name);
                let _ = writeln!(
                    out,
                    "├─ Compared columns: {}",
                    join_or_none(&mismatches.compared_columns)
                );
                render_mismatches(&mut out, &mismatches.key_columns, &mismatches.mismatches);
            }
        }

        if summary.has_differences() {
            let _ = writeln!(out, "└─ ❌ Differences found (fingerprint {})", short(&report.fingerprint));
        } else {
            let _ = writeln!(out, "└─ ✅ No differences (fingerprint {})", short(&report.fingerprint));
        }
        out
    }

    pub fn render_columns(table: &Table, preview_rows: usize) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "📋 {}: {} rows, {} columns",
            table.name(),
            table.row_count(),
            table.column_count()
        );

        let names = table.column_names();
        for (i, name) in names.iter().enumerate() {
            let prefix = if i == names.len() - 1 { "└─" } else { "├─" };
            let letter = column_letter(i).map(|c| c.to_string()).unwrap_or_else(|| "-".to_string());
            let _ = writeln!(out, "{} {}: {}", prefix, letter, name);
        }

        let head = table.head(preview_rows);
        if !head.is_empty() {
            let _ = writeln!(out, "\nFirst {} row(s):", head.len());
            let _ = writeln!(out, "{}", names.join(" | "));
            for row in head {
                let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
                let _ = writeln!(out, "{}", cells.join(" | "));
            }
        }
        out
    }
}

fn render_single(out: &mut String, single: &SingleColumnResult, left: &str, right: &str) {
    let _ = writeln!(out, "├─ Columns: {} ↔ {}", single.column_a, single.column_b);
    render_cells(out, &format!("Only in {}", left), &single.only_left);
    render_cells(out, &format!("Only in {}", right), &single.only_right);
    let _ = writeln!(out, "├─ Common: {}", single.common.len());
    render_duplicates(out, left, &single.duplicates_left);
    render_duplicates(out, right, &single.duplicates_right);
}

fn render_records(out: &mut String, records: &RecordResult, left: &str, right: &str) {
    let kinds: Vec<String> = records
        .key_columns
        .iter()
        .zip(&records.column_kinds)
        .map(|(c, k)| {
            let kind = match k {
                ColumnKind::Numeric => "numeric",
                ColumnKind::Text => "text",
            };
            format!("{} ({})", c, kind)
        })
        .collect();
    let _ = writeln!(out, "├─ Key columns: {}", join_or_none(&kinds));
    render_keys(out, &format!("Only in {}", left), &records.left_only);
    render_keys(out, &format!("Only in {}", right), &records.right_only);
    let _ = writeln!(out, "├─ In both: {}", records.both.len());
    render_duplicates(out, left, &records.duplicates_left);
    render_duplicates(out, right, &records.duplicates_right);
}

fn render_mismatches(out: &mut String, key_columns: &[String], records: &[MismatchRecord]) {
    if records.is_empty() {
        let _ = writeln!(out, "├─ ✅ Mismatches: none");
        return;
    }
    let _ = writeln!(out, "├─ ❌ Mismatches: {}", records.len());
    let shown = records.len().min(SAMPLE_LIMIT);
    for (i, record) in records.iter().take(shown).enumerate() {
        let prefix = if i == shown - 1 && records.len() <= SAMPLE_LIMIT {
            "│  └─"
        } else {
            "│  ├─"
        };
        let key: Vec<String> = key_columns
            .iter()
            .zip(&record.key)
            .map(|(c, v)| format!("{}={}", c, show_cell(v)))
            .collect();
        let fields: Vec<String> = record
            .differences
            .iter()
            .map(|d| format!("{}: {} → {}", d.column, show_cell(&d.left), show_cell(&d.right)))
            .collect();
        let flag = if record.ambiguous { " (ambiguous)" } else { "" };
        let _ = writeln!(out, "{} {}{}: {}", prefix, key.join(", "), flag, fields.join("; "));
    }
    if records.len() > SAMPLE_LIMIT {
        let _ = writeln!(out, "│  └─ ... and {} more", records.len() - SAMPLE_LIMIT);
    }
}

fn render_keys(out: &mut String, label: &str, keys: &[KeyTuple]) {
    let rendered: Vec<String> = keys
        .iter()
        .map(|k| k.iter().map(show_cell).collect::<Vec<_>>().join(" | "))
        .collect();
    render_list(out, label, &rendered);
}

fn render_cells(out: &mut String, label: &str, cells: &[KeyCell]) {
    let rendered: Vec<String> = cells.iter().map(|c| show_cell(c).to_string()).collect();
    render_list(out, label, &rendered);
}

fn render_list(out: &mut String, label: &str, items: &[String]) {
    if items.is_empty() {
        let _ = writeln!(out, "├─ ✅ {}: none", label);
        return;
    }
    let _ = writeln!(out, "├─ ❌ {}: {}", label, items.len());
    let shown: Vec<&str> = items.iter().take(SAMPLE_LIMIT).map(String::as_str).collect();
    let more = if items.len() > SAMPLE_LIMIT {
        format!(", ... and {} more", items.len() - SAMPLE_LIMIT)
    } else {
        String::new()
    };
    let _ = writeln!(out, "│  └─ {}{}", shown.join(", "), more);
}

fn render_duplicates(out: &mut String, table: &str, duplicates: &[DuplicateRow]) {
    if duplicates.is_empty() {
        return;
    }
    let rows: Vec<String> = duplicates
        .iter()
        .take(SAMPLE_LIMIT)
        .map(|d| d.row_index.to_string())
        .collect();
    let more = if duplicates.len() > SAMPLE_LIMIT { ", ..." } else { "" };
    let _ = writeln!(
        out,
        "├─ ⚠️  Duplicate rows in {}: {} (rows {}{})",
        table,
        duplicates.len(),
        rows.join(", "),
        more
    );
}

fn show_cell(cell: &KeyCell) -> &str {
    cell.as_deref().unwrap_or("<null>")
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}

fn short(fingerprint: &str) -> &str {
    fingerprint.get(..12).unwrap_or(fingerprint)
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl JsonFormatter {
    /// Format any serializable data as JSON
    pub fn format<T: serde::Serialize + ?Sized>(data: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(data)?)
    }

    /// Column listing with letter tokens and preview rows
    pub fn format_columns(table: &Table, preview_rows: usize) -> Result<String> {
        let columns: Vec<serde_json::Value> = table
            .column_names()
            .iter()
            .enumerate()
            .map(|(i, name)| {
                serde_json::json!({
                    "letter": column_letter(i).map(|c| c.to_string()),
                    "name": name,
                })
            })
            .collect();
        let json = serde_json::json!({
            "name": table.name(),
            "rows": table.row_count(),
            "columns": columns,
            "preview": table.head(preview_rows),
        });
        Ok(serde_json::to_string_pretty(&json)?)
    }
}
