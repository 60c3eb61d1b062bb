//! Edge cases in the data being reconciled

use crate::common::{text_table, TestFixture};
use tabrecon::loader::TableLoader;
use tabrecon::normalize::ColumnKind;
use tabrecon::{NormalizationSpec, ReconEngine, ReconError, Table, Value};

fn key(column: &str) -> Vec<String> {
    vec![column.to_string()]
}

#[test]
fn test_null_keys_match_each_other() {
    let a = text_table("a", &["Invoice"], &[&[""], &["1"]]);
    let b = text_table("b", &["Invoice"], &[&[""]]);

    let result = ReconEngine::new()
        .compare_records(&a, &b, &key("Invoice"), &NormalizationSpec::new())
        .unwrap();
    assert_eq!(result.both, vec![vec![None]]);
    assert_eq!(result.left_only, vec![vec![Some("1".to_string())]]);
}

#[test]
fn test_null_differs_from_empty_string() {
    let a = Table::from_rows("a", ["Ref"], vec![vec![Value::Null]]).unwrap();
    let b = Table::from_rows("b", ["Ref"], vec![vec![Value::from("")]]).unwrap();

    let result = ReconEngine::new().compare_single_column(&a, &b, "Ref", "Ref").unwrap();
    assert_eq!(result.only_left, vec![None]);
    assert_eq!(result.only_right, vec![Some(String::new())]);
}

#[test]
fn test_mixed_numeric_column_degrades_to_text() {
    let a = text_table("a", &["Ref"], &[&["1.0"], &["X-1"]]);
    let b = text_table("b", &["Ref"], &[&["1"]]);

    let result = ReconEngine::new()
        .compare_records(&a, &b, &key("Ref"), &NormalizationSpec::new().with_tolerance(1.0))
        .unwrap();
    assert_eq!(result.column_kinds, vec![ColumnKind::Text]);
    assert!(result.both.is_empty());
    assert_eq!(result.left_only.len(), 2);
}

#[test]
fn test_numeric_representations_match() {
    let a = Table::from_rows("a", ["Amt"], vec![vec![Value::Float(1.0)], vec![Value::Int(2)]]).unwrap();
    let b = text_table("b", &["Amt"], &[&["1"], &["2.00"]]);

    let result = ReconEngine::new()
        .compare_records(&a, &b, &key("Amt"), &NormalizationSpec::new())
        .unwrap();
    assert_eq!(result.both.len(), 2);
    assert!(result.left_only.is_empty() && result.right_only.is_empty());
}

#[test]
fn test_empty_tables() {
    let a = Table::new("a", ["Invoice"]).unwrap();
    let b = Table::new("b", ["Invoice"]).unwrap();

    let result = ReconEngine::new()
        .compare_records(&a, &b, &key("Invoice"), &NormalizationSpec::new())
        .unwrap();
    assert!(result.left_only.is_empty());
    assert!(result.right_only.is_empty());
    assert!(result.both.is_empty());
    assert_eq!(result.column_kinds, vec![ColumnKind::Text]);
}

#[test]
fn test_one_empty_side() {
    let a = text_table("a", &["Invoice"], &[&["1"], &["2"]]);
    let b = Table::new("b", ["Invoice"]).unwrap();

    let result = ReconEngine::new().compare_full_rows(&a, &b).unwrap();
    assert_eq!(result.left_only.len(), 2);
    assert!(result.right_only.is_empty());
}

#[test]
fn test_unicode_values_and_fold() {
    let a = text_table("a", &["Name"], &[&["Café"], &["北京"]]);
    let b = text_table("b", &["Name"], &[&["Café"], &["东京"]]);

    let exact = ReconEngine::new()
        .compare_records(&a, &b, &key("Name"), &NormalizationSpec::new())
        .unwrap();
    assert_eq!(exact.both, vec![vec![Some("Café".to_string())]]);
    assert_eq!(exact.left_only, vec![vec![Some("北京".to_string())]]);

    // Folding keeps only ASCII letters and digits
    let folded = ReconEngine::new()
        .compare_records(&a, &b, &key("Name"), &NormalizationSpec::new().fold("Name"))
        .unwrap();
    assert_eq!(folded.both.len(), 2);
}

#[test]
fn test_ambiguous_join_is_flagged_not_an_error() {
    let a = text_table("a", &["Invoice", "Amt"], &[&["1", "10"]]);
    let b = text_table("b", &["Invoice", "Amt"], &[&["1", "11"], &["1", "12"]]);

    let result = ReconEngine::new()
        .detect_mismatches(&a, &b, &key("Invoice"), &NormalizationSpec::new(), None)
        .unwrap();
    assert_eq!(result.mismatches.len(), 2);
    assert!(result.mismatches.iter().all(|m| m.ambiguous));
}

#[test]
fn test_mismatch_with_only_key_columns_shared() {
    let a = text_table("a", &["Invoice", "Amt"], &[&["1", "10"]]);
    let b = text_table("b", &["Invoice", "Total"], &[&["1", "99"]]);

    let result = ReconEngine::new()
        .detect_mismatches(&a, &b, &key("Invoice"), &NormalizationSpec::new(), None)
        .unwrap();
    assert!(result.compared_columns.is_empty());
    assert!(result.mismatches.is_empty());
    assert_eq!(result.matched_keys, 1);
}

#[test]
fn test_negative_tolerance_is_rejected() {
    let a = text_table("a", &["Amt"], &[&["1"]]);
    let err = ReconEngine::new()
        .compare_records(&a, &a, &key("Amt"), &NormalizationSpec::new().with_tolerance(-0.1))
        .unwrap_err();
    assert!(matches!(err, ReconError::InvalidTolerance { .. }));
}

#[test]
fn test_csv_with_quotes_and_commas() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture
        .create_csv_raw(
            "quoted.csv",
            "Invoice,Customer\n1,\"Acme, Inc.\"\n2,\"Say \"\"hi\"\"\"\n",
        )
        .unwrap();
    let table = TableLoader::new().unwrap().load(&path).unwrap();
    assert_eq!(table.row_count(), 2);
    assert_eq!(
        table.value(0, "Customer").and_then(|v| v.render()).as_deref(),
        Some("Acme, Inc.")
    );
    assert_eq!(
        table.value(1, "Customer").and_then(|v| v.render()).as_deref(),
        Some("Say \"hi\"")
    );
}

#[test]
fn test_csv_keeps_leading_zeros_in_raw_values() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.create_csv_raw("ids.csv", "Id,Amt\n007,1\n").unwrap();
    let table = TableLoader::new().unwrap().load(&path).unwrap();
    assert_eq!(table.value(0, "Id").and_then(|v| v.render()).as_deref(), Some("007"));
}

#[test]
fn test_header_only_csv() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.create_csv_raw("empty.csv", "Invoice,Amt\n").unwrap();
    let table = TableLoader::new().unwrap().load(&path).unwrap();
    assert_eq!(table.column_names(), vec!["Invoice", "Amt"]);
    assert!(table.is_empty());
}

#[test]
fn test_long_invoice_numbers_do_not_collide() {
    let a = text_table("a", &["Invoice"], &[&["12345678901234567"]]);
    let b = text_table("b", &["Invoice"], &[&["12345678901234568"]]);

    let result = ReconEngine::new()
        .compare_records(&a, &b, &key("Invoice"), &NormalizationSpec::new())
        .unwrap();
    assert_eq!(result.column_kinds, vec![ColumnKind::Numeric]);
    assert!(result.both.is_empty());
    assert_eq!(result.left_only, vec![vec![Some("12345678901234567".to_string())]]);
    assert_eq!(result.right_only, vec![vec![Some("12345678901234568".to_string())]]);
}

#[test]
fn test_tiny_amounts_are_not_rounded_together() {
    let a = text_table("a", &["Rate"], &[&["0.00000000001"]]);
    let b = text_table("b", &["Rate"], &[&["0.00000000002"]]);

    let result = ReconEngine::new()
        .compare_records(&a, &b, &key("Rate"), &NormalizationSpec::new())
        .unwrap();
    assert!(result.both.is_empty());
    assert_eq!(result.left_only, vec![vec![Some("0.00000000001".to_string())]]);
}

#[test]
fn test_exact_numeric_keys_still_equalize_representations() {
    let a = text_table("a", &["Invoice"], &[&["0042.50"], &["1e3"]]);
    let b = text_table("b", &["Invoice"], &[&["42.5"], &["1000"]]);

    let result = ReconEngine::new()
        .compare_records(&a, &b, &key("Invoice"), &NormalizationSpec::new())
        .unwrap();
    assert!(result.left_only.is_empty() && result.right_only.is_empty());
    assert_eq!(result.both.len(), 2);
}
