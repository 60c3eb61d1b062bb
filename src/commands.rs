//! Command implementations for tabrecon CLI

use crate::cli::{Commands, OutputFormat};
use crate::config::{Overrides, ReconConfig};
use crate::engine::{ReconEngine, ReconReport};
use crate::error::{ReconError, Result};
use crate::export;
use crate::loader::TableLoader;
use crate::output::{JsonFormatter, PrettyPrinter};
use crate::progress::ProgressReporter;
use crate::table::Table;
use std::path::{Path, PathBuf};

/// Execute a command
pub fn execute_command(command: Commands, config_path: Option<&Path>) -> Result<()> {
    match command {
        Commands::Init { path, force } => init_command(&path, force),
        Commands::Columns { input, rows, format } => {
            let config = ReconConfig::load_or_default(config_path)?.apply(Overrides {
                output_format: format,
                ..Overrides::default()
            })?;
            columns_command(&input, rows, config.output_format()?)
        }
        Commands::Compare {
            left,
            right,
            mode,
            column_a,
            column_b,
            keys,
            folds,
            tolerance,
            threshold,
            format,
            output_dir,
            delimiter,
        } => {
            let overrides = Overrides {
                mode,
                column_a,
                column_b,
                key_columns: keys,
                text_fold: folds,
                tolerance,
                similarity_threshold: threshold,
                output_format: format,
                delimiter,
            };
            let config = ReconConfig::load_or_default(config_path)?.apply(overrides)?;
            compare_command(&left, &right, &config, output_dir.as_deref())
        }
    }
}

/// Follow-up advice for errors the user can fix by changing the request
pub fn error_hint(error: &ReconError) -> Option<&'static str> {
    if !error.is_user_error() {
        return None;
    }
    match error {
        ReconError::EmptyKeySelection => Some("Pass --key <column> or set key_columns in the profile"),
        ReconError::InvalidTolerance { .. } | ReconError::InvalidThreshold { .. } => {
            Some("Check --tolerance and --threshold, or the profile values they override")
        }
        _ => Some("Run `tabrecon columns <file>` to list column names and letter tokens"),
    }
}

/// Write a default comparison profile
fn init_command(path: &Path, force: bool) -> Result<()> {
    ReconConfig::default().save(path, force)?;
    println!("✅ Wrote comparison profile to: {}", path.display());
    Ok(())
}

/// List columns with their letter tokens and preview the first rows
fn columns_command(input: &Path, rows: usize, format: OutputFormat) -> Result<()> {
    let table = TableLoader::new()?.load(input)?;
    match format {
        OutputFormat::Json => println!("{}", JsonFormatter::format_columns(&table, rows)?),
        OutputFormat::Pretty => PrettyPrinter::print_columns(&table, rows),
    }
    Ok(())
}

fn compare_command(left: &Path, right: &Path, config: &ReconConfig, output_dir: Option<&Path>) -> Result<()> {
    let format = config.output_format()?;
    let mut progress = match format {
        OutputFormat::Json => ProgressReporter::new_minimal(),
        OutputFormat::Pretty => ProgressReporter::new_for_compare(),
    };

    let (left_table, right_table) = load_pair(left, right)?;
    progress.finish_load(&format!(
        "Loaded {} ({} rows) and {} ({} rows)",
        left_table.name(),
        left_table.row_count(),
        right_table.name(),
        right_table.row_count()
    ));

    let report = run_comparison(&left_table, &right_table, config)?;
    progress.finish_compare("Comparison complete");

    let written = match output_dir {
        Some(dir) => {
            progress.update_export(&format!("Writing results to {}", dir.display()));
            let written = export::export_report(&report, dir, config.delimiter_byte()?)?;
            progress.finish_export(&format!("Wrote {} file(s)", written.len()));
            written
        }
        None => Vec::new(),
    };
    let elapsed = progress.elapsed();
    drop(progress);

    match format {
        OutputFormat::Json => println!("{}", JsonFormatter::format(&report)?),
        OutputFormat::Pretty => {
            PrettyPrinter::print_report(&report);
            print_written(&written);
            log::debug!("Comparison finished in {:.2?}", elapsed);
        }
    }
    Ok(())
}

fn print_written(written: &[PathBuf]) {
    if written.is_empty() {
        return;
    }
    println!("\n💾 Results saved:");
    for (i, path) in written.iter().enumerate() {
        let prefix = if i == written.len() - 1 { "└─" } else { "├─" };
        println!("{} {}", prefix, path.display());
    }
}

/// Load both inputs. Inputs with the same file stem are told apart by a
/// side suffix so exported column headers stay distinct.
pub fn load_pair(left: &Path, right: &Path) -> Result<(Table, Table)> {
    let loader = TableLoader::new()?;
    let mut left_table = loader.load(left)?;
    let mut right_table = loader.load(right)?;

    if left_table.name() == right_table.name() {
        let name = left_table.name().to_string();
        left_table.set_name(format!("{}_left", name));
        right_table.set_name(format!("{}_right", name));
    }
    Ok((left_table, right_table))
}

/// Run the comparison a profile describes
pub fn run_comparison(left: &Table, right: &Table, config: &ReconConfig) -> Result<ReconReport> {
    let engine = ReconEngine::with_resolver(config.resolver()?);
    let mode = config.compare_mode()?;
    engine.run(left, right, &mode)
}

/// Load two files and compare them as `config` describes
pub fn compare_files(left: &Path, right: &Path, config: &ReconConfig) -> Result<ReconReport> {
    let (left_table, right_table) = load_pair(left, right)?;
    run_comparison(&left_table, &right_table, config)
}
