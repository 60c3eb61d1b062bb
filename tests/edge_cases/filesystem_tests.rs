//! Filesystem edge cases: missing, unsupported and malformed inputs

use crate::common::{sample_data, CliTestRunner, TestFixture};
use tabrecon::loader::TableLoader;
use tabrecon::ReconError;

#[test]
fn test_missing_input_file() {
    let runner = CliTestRunner::new().unwrap();
    let f = runner.fixture();
    f.create_csv("a.csv", &sample_data::invoices_a()).unwrap();

    let err = runner.expect_failure(&["compare", &f.arg("a.csv"), &f.arg("missing.csv"), "--key", "A"]);
    assert!(matches!(err, ReconError::InvalidInput { .. }));
    assert!(err.to_string().contains("missing.csv"));
}

#[test]
fn test_directory_as_input() {
    let fixture = TestFixture::new().unwrap();
    let err = TableLoader::new().unwrap().load(fixture.root()).unwrap_err();
    assert!(matches!(err, ReconError::InvalidInput { .. }));
}

#[test]
fn test_unsupported_extension() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.create_csv_raw("data.txt", "a,b\n1,2\n").unwrap();
    let err = TableLoader::new().unwrap().load(&path).unwrap_err();
    assert!(err.to_string().contains("Unsupported file format"));
}

#[test]
fn test_corrupted_parquet_file() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.create_corrupted_file("broken.parquet").unwrap();
    assert!(TableLoader::new().unwrap().load(&path).is_err());
}

#[test]
fn test_malformed_json_file() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.create_csv_raw("broken.json", "{\"a\": [1, 2").unwrap();
    assert!(TableLoader::new().unwrap().load(&path).is_err());
}

#[test]
fn test_path_with_quote_character() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture
        .create_csv("o'brien.csv", &sample_data::invoices_a())
        .unwrap();
    let table = TableLoader::new().unwrap().load(&path).unwrap();
    assert_eq!(table.name(), "o'brien");
    assert_eq!(table.row_count(), 2);
}

#[test]
fn test_tsv_input() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture
        .create_csv_raw("ledger.tsv", "Invoice\tCustomer\n1\tAcme, Inc.\n")
        .unwrap();
    let table = TableLoader::new().unwrap().load(&path).unwrap();
    assert_eq!(table.column_names(), vec!["Invoice", "Customer"]);
    assert_eq!(
        table.value(0, "Customer").and_then(|v| v.render()).as_deref(),
        Some("Acme, Inc.")
    );
}

#[test]
fn test_export_into_nested_directory() {
    let runner = CliTestRunner::new().unwrap();
    let f = runner.fixture();
    f.create_csv("a.csv", &sample_data::invoices_a()).unwrap();
    f.create_csv("b.csv", &sample_data::invoices_b()).unwrap();
    let out = f.arg("reports/2024/jan");

    runner.expect_success(&[
        "compare", &f.arg("a.csv"), &f.arg("b.csv"), "--key", "Invoice", "--output-dir", &out,
    ]);
    assert!(f.root().join("reports/2024/jan/only_left.csv").exists());
    assert!(f.read("reports/2024/jan/both.csv").starts_with("Invoice"));
}
