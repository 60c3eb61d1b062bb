//! Unit tests for comparison profiles

use std::fs;
use tabrecon::config::{Overrides, ReconConfig};
use tabrecon::{CompareMode, ReconError};
use tempfile::TempDir;

#[test]
fn test_default_profile_values() {
    let config = ReconConfig::default();
    assert_eq!(config.version, tabrecon::FORMAT_VERSION);
    assert_eq!(config.mode, "records");
    assert!(config.key_columns.is_empty());
    assert_eq!(config.tolerance, 0.0);
    assert_eq!(config.similarity_threshold, 0.4);
    assert_eq!(config.output_format, "pretty");
    assert_eq!(config.delimiter, ",");
}

#[test]
fn test_profile_json_shape() {
    let json = serde_json::to_value(ReconConfig::default()).unwrap();
    for key in [
        "version",
        "mode",
        "column_a",
        "column_b",
        "key_columns",
        "text_fold",
        "tolerance",
        "similarity_threshold",
        "output_format",
        "delimiter",
    ] {
        assert!(json.get(key).is_some(), "missing key {}", key);
    }
    assert!(json["column_a"].is_null());
}

#[test]
fn test_mode_from_profile() {
    let config = ReconConfig {
        mode: "mismatches".to_string(),
        key_columns: vec!["Invoice".to_string()],
        text_fold: vec!["Customer".to_string()],
        tolerance: 0.5,
        ..ReconConfig::default()
    };
    match config.compare_mode().unwrap() {
        CompareMode::Mismatches {
            key_columns,
            normalization,
        } => {
            assert_eq!(key_columns, vec!["Invoice"]);
            assert!(normalization.folds("Customer"));
            assert_eq!(normalization.tolerance, 0.5);
        }
        other => panic!("unexpected mode {:?}", other),
    }

    let rows = ReconConfig {
        mode: "rows".to_string(),
        ..ReconConfig::default()
    };
    assert_eq!(rows.compare_mode().unwrap(), CompareMode::FullRows);
}

#[test]
fn test_overrides_are_validated() {
    let err = ReconConfig::default()
        .apply(Overrides {
            delimiter: Some("||".to_string()),
            ..Overrides::default()
        })
        .unwrap_err();
    assert!(matches!(err, ReconError::Config { .. }));

    let err = ReconConfig::default()
        .apply(Overrides {
            similarity_threshold: Some(1.5),
            ..Overrides::default()
        })
        .unwrap_err();
    assert!(matches!(err, ReconError::InvalidThreshold { .. }));
}

#[test]
fn test_tab_delimiter() {
    let config = ReconConfig {
        delimiter: "\\t".to_string(),
        ..ReconConfig::default()
    };
    assert_eq!(config.delimiter_byte().unwrap(), b'\t');
}

#[test]
fn test_load_missing_profile() {
    let temp_dir = TempDir::new().unwrap();
    let err = ReconConfig::load(&temp_dir.path().join("absent.json")).unwrap_err();
    assert!(err.to_string().contains("absent.json"));
}

#[test]
fn test_load_or_default_without_path() {
    assert_eq!(ReconConfig::load_or_default(None).unwrap(), ReconConfig::default());
}

#[test]
fn test_resolver_uses_profile_threshold() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("strict.json");
    fs::write(&path, r#"{"similarity_threshold": 0.9}"#).unwrap();
    let config = ReconConfig::load(&path).unwrap();
    assert_eq!(config.resolver().unwrap().threshold(), 0.9);
}
