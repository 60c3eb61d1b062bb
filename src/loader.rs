//! File loading through an in-memory DuckDB connection

use crate::error::{ReconError, Result};
use crate::table::{Table, Value};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use duckdb::types::{TimeUnit, ValueRef};
use duckdb::Connection;
use std::path::Path;

/// Loads tabular files into [`Table`]s
pub struct TableLoader {
    connection: Connection,
}

impl TableLoader {
    pub fn new() -> Result<Self> {
        let connection = Connection::open_in_memory()?;
        connection.execute("SET enable_progress_bar=false", [])?;
        // Row indices reported by the engine are file positions
        connection.execute("SET preserve_insertion_order=true", [])?;
        Ok(Self { connection })
    }

    /// Load a file, naming the table after the file stem
    pub fn load(&self, file_path: &Path) -> Result<Table> {
        let name = file_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| file_path.display().to_string());
        self.load_as(file_path, name)
    }

    /// Load a file under an explicit table name
    pub fn load_as(&self, file_path: &Path, name: impl Into<String>) -> Result<Table> {
        if !file_path.exists() {
            return Err(ReconError::invalid_input(format!(
                "File not found: {}",
                file_path.display()
            )));
        }
        if !file_path.is_file() {
            return Err(ReconError::invalid_input(format!(
                "Not a file: {}",
                file_path.display()
            )));
        }
        if !Self::is_supported_format(file_path) {
            return Err(ReconError::invalid_input(format!(
                "Unsupported file format: {} (expected csv, tsv, parquet, json, jsonl or xlsx)",
                file_path.display()
            )));
        }

        let source = self.source_expression(file_path)?;
        let create_view_sql = format!("CREATE OR REPLACE VIEW data_view AS SELECT * FROM {}", source);
        self.connection
            .execute(&create_view_sql, [])
            .map_err(|e| convert_duckdb_error(e, file_path))?;

        let columns = self.column_names()?;
        let mut table = Table::new(name, columns.iter().map(String::as_str))?;
        let column_count = columns.len();

        if column_count > 0 {
            let mut stmt = self.connection.prepare("SELECT * FROM data_view").map_err(|e| {
                ReconError::data_processing(format!("Failed to prepare data extraction query: {}", e))
            })?;
            let rows = stmt
                .query_map([], |row| {
                    let mut values = Vec::with_capacity(column_count);
                    for i in 0..column_count {
                        values.push(convert_value(row.get_ref(i)?));
                    }
                    Ok(values)
                })
                .map_err(|e| convert_duckdb_error(e, file_path))?;

            for row in rows {
                table.push_row(row.map_err(|e| convert_duckdb_error(e, file_path))?)?;
            }
        }

        log::debug!(
            "Loaded {} with {} rows and {} columns",
            file_path.display(),
            table.row_count(),
            table.column_count()
        );
        Ok(table)
    }

    /// Check if file format is supported
    pub fn is_supported_format(file_path: &Path) -> bool {
        matches!(
            extension(file_path).as_deref(),
            Some("csv" | "tsv" | "parquet" | "json" | "jsonl" | "xlsx")
        )
    }

    fn source_expression(&self, file_path: &Path) -> Result<String> {
        let quoted = format!("'{}'", file_path.to_string_lossy().replace('\'', "''"));
        match extension(file_path).as_deref() {
            Some("xlsx") => {
                self.connection
                    .execute_batch("INSTALL excel; LOAD excel;")
                    .map_err(|e| {
                        ReconError::invalid_input(format!(
                            "Reading {} needs the DuckDB excel extension: {}",
                            file_path.display(),
                            e
                        ))
                    })?;
                Ok(format!("read_xlsx({}, header = true)", quoted))
            }
            // Delimited cells stay text; the normalizer decides what is numeric
            Some("csv") => Ok(format!("read_csv_auto({}, header = true, all_varchar = true)", quoted)),
            Some("tsv") => Ok(format!(
                "read_csv_auto({}, header = true, all_varchar = true, delim = '\\t')",
                quoted
            )),
            _ => Ok(quoted),
        }
    }

    /// Column names of the current view, in file order
    fn column_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.connection.prepare("DESCRIBE data_view").map_err(|e| {
            ReconError::data_processing(format!("Failed to prepare describe query: {}", e))
        })?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| ReconError::data_processing(format!("Failed to query column info: {}", e)))?;

        let mut columns = Vec::new();
        for row in rows {
            columns.push(row.map_err(|e| {
                ReconError::data_processing(format!("Failed to process column info row: {}", e))
            })?);
        }
        Ok(columns)
    }
}

fn extension(file_path: &Path) -> Option<String> {
    file_path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase())
}

/// Map DuckDB read failures to user-facing input errors
fn convert_duckdb_error(error: duckdb::Error, file_path: &Path) -> ReconError {
    let error_msg = error.to_string();

    if error_msg.contains("CSV Error")
        || error_msg.contains("Could not convert")
        || error_msg.contains("Invalid CSV")
        || error_msg.contains("Unterminated quoted field")
    {
        ReconError::invalid_input(format!("Malformed CSV file '{}': {}", file_path.display(), error_msg))
    } else if error_msg.contains("JSON") {
        ReconError::invalid_input(format!("Malformed JSON file '{}': {}", file_path.display(), error_msg))
    } else if error_msg.contains("No files found") || error_msg.contains("does not exist") {
        ReconError::invalid_input(format!("File not found: {}", file_path.display()))
    } else if error_msg.contains("Permission denied") {
        ReconError::invalid_input(format!("Permission denied accessing file: {}", file_path.display()))
    } else if error_msg.contains("UTF-8") || error_msg.contains("encoding") {
        ReconError::invalid_input(format!("File encoding error '{}': {}", file_path.display(), error_msg))
    } else {
        ReconError::DuckDb(error)
    }
}

fn to_micros(unit: TimeUnit, value: i64) -> i64 {
    match unit {
        TimeUnit::Second => value.saturating_mul(1_000_000),
        TimeUnit::Millisecond => value.saturating_mul(1_000),
        TimeUnit::Microsecond => value,
        TimeUnit::Nanosecond => value / 1_000,
    }
}

fn int_or_float(value: i128) -> Value {
    i64::try_from(value)
        .map(Value::Int)
        .unwrap_or(Value::Float(value as f64))
}

fn convert_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Boolean(b) => Value::Bool(b),
        ValueRef::TinyInt(i) => Value::Int(i.into()),
        ValueRef::SmallInt(i) => Value::Int(i.into()),
        ValueRef::Int(i) => Value::Int(i.into()),
        ValueRef::BigInt(i) => Value::Int(i),
        ValueRef::HugeInt(i) => int_or_float(i),
        ValueRef::UTinyInt(i) => Value::Int(i.into()),
        ValueRef::USmallInt(i) => Value::Int(i.into()),
        ValueRef::UInt(i) => Value::Int(i.into()),
        ValueRef::UBigInt(i) => int_or_float(i.into()),
        ValueRef::Float(f) => Value::Float(f.into()),
        ValueRef::Double(f) => Value::Float(f),
        ValueRef::Decimal(d) => {
            let text = d.to_string();
            text.parse::<f64>().map(Value::Float).unwrap_or(Value::Text(text))
        }
        ValueRef::Text(s) => Value::Text(String::from_utf8_lossy(s).to_string()),
        ValueRef::Blob(b) => Value::Text(format!("<blob:{} bytes>", b.len())),
        ValueRef::Date32(days) => NaiveDate::from_ymd_opt(1970, 1, 1)
            .and_then(|epoch| epoch.checked_add_signed(chrono::Duration::days(days.into())))
            .map(Value::Date)
            .unwrap_or(Value::Null),
        ValueRef::Timestamp(unit, v) => DateTime::<Utc>::from_timestamp_micros(to_micros(unit, v))
            .map(|dt| Value::DateTime(dt.naive_utc()))
            .unwrap_or(Value::Null),
        ValueRef::Time64(unit, v) => {
            let micros = to_micros(unit, v);
            let secs = micros.div_euclid(1_000_000);
            let nanos = micros.rem_euclid(1_000_000) * 1_000;
            u32::try_from(secs)
                .ok()
                .zip(u32::try_from(nanos).ok())
                .and_then(|(s, n)| NaiveTime::from_num_seconds_from_midnight_opt(s, n))
                .map(|t| Value::Text(t.format("%H:%M:%S").to_string()))
                .unwrap_or(Value::Null)
        }
        other => Value::Text(format!("{:?}", other)),
    }
}
