//! Integration tests for the init command

use crate::common::CliTestRunner;
use tabrecon::{ReconConfig, ReconError};

#[test]
fn test_init_writes_default_profile() {
    let runner = CliTestRunner::new().unwrap();
    let path = runner.fixture().arg("recon.json");

    runner.expect_success(&["init", "--path", &path]);

    let config = ReconConfig::load(std::path::Path::new(&path)).unwrap();
    assert_eq!(config, ReconConfig::default());
}

#[test]
fn test_init_does_not_overwrite_without_force() {
    let runner = CliTestRunner::new().unwrap();
    let path = runner.fixture().arg("recon.json");
    std::fs::write(&path, r#"{"mode": "rows"}"#).unwrap();

    let err = runner.expect_failure(&["init", "--path", &path]);
    assert!(matches!(err, ReconError::Config { .. }));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), r#"{"mode": "rows"}"#);

    runner.expect_success(&["init", "--path", &path, "--force"]);
    assert_eq!(
        ReconConfig::load(std::path::Path::new(&path)).unwrap().mode,
        "records"
    );
}

#[test]
fn test_init_creates_parent_directories() {
    let runner = CliTestRunner::new().unwrap();
    let path = runner.fixture().arg("profiles/monthly/recon.json");
    runner.expect_success(&["init", "--path", &path]);
    assert!(std::path::Path::new(&path).exists());
}
