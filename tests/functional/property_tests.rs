//! Properties that hold for every comparison, checked over a spread of
//! generated tables

use crate::common::text_table;
use std::collections::BTreeSet;
use tabrecon::{CompareMode, NormalizationSpec, ReconEngine, Table, Value};

/// Small deterministic generator so the tables differ between cases
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }
}

fn numeric_table(name: &str, seed: u64, rows: usize) -> Table {
    let mut rng = Lcg(seed);
    let rows = (0..rows)
        .map(|_| {
            let whole = rng.next() % 40;
            let cents = rng.next() % 100;
            vec![Value::from(format!("{}.{:02}", whole, cents)), Value::from(format!("r{}", rng.next() % 7))]
        })
        .collect();
    Table::from_rows(name, ["Amt", "Ref"], rows).unwrap()
}

fn invoice_key() -> Vec<String> {
    vec!["Ref".to_string()]
}

#[test]
fn test_single_column_partitions_are_disjoint_and_cover_union() {
    for seed in 0..20 {
        let a = numeric_table("a", seed, 15);
        let b = numeric_table("b", seed + 100, 12);
        let result = ReconEngine::new().compare_single_column(&a, &b, "Ref", "Ref").unwrap();

        let left: BTreeSet<_> = result.only_left.iter().collect();
        let right: BTreeSet<_> = result.only_right.iter().collect();
        let common: BTreeSet<_> = result.common.iter().collect();
        assert!(left.is_disjoint(&right));
        assert!(left.is_disjoint(&common));
        assert!(right.is_disjoint(&common));

        let union: BTreeSet<Option<String>> = a
            .rows()
            .iter()
            .chain(b.rows())
            .map(|r| r[1].render())
            .collect();
        let covered: BTreeSet<Option<String>> = left
            .into_iter()
            .chain(right)
            .chain(common)
            .cloned()
            .collect();
        assert_eq!(covered, union);
    }
}

#[test]
fn test_comparison_is_symmetric() {
    let engine = ReconEngine::new();
    for seed in 0..20 {
        let a = numeric_table("a", seed, 10);
        let b = numeric_table("b", seed + 7, 10);
        let spec = NormalizationSpec::new().with_tolerance(0.25);

        let ab = engine.compare_records(&a, &b, &invoice_key(), &spec).unwrap();
        let ba = engine.compare_records(&b, &a, &invoice_key(), &spec).unwrap();
        assert_eq!(ab.left_only, ba.right_only);
        assert_eq!(ab.right_only, ba.left_only);
        assert_eq!(ab.both, ba.both);
    }
}

#[test]
fn test_comparison_is_idempotent() {
    let engine = ReconEngine::new();
    let mode = CompareMode::Mismatches {
        key_columns: invoice_key(),
        normalization: NormalizationSpec::new(),
    };
    for seed in 0..10 {
        let a = numeric_table("a", seed, 10);
        let b = numeric_table("b", seed + 3, 10);
        let first = engine.run(&a, &b, &mode).unwrap();
        let second = engine.run(&a, &b, &mode).unwrap();
        assert_eq!(first.outcome, second.outcome);
        assert_eq!(first.fingerprint, second.fingerprint);
    }
}

/// Each tolerance is three times the previous one, so every bucket of a
/// step lies inside one bucket of the next and raising the tolerance can
/// only merge keys.
#[test]
fn test_raising_tolerance_never_adds_unmatched_keys() {
    let engine = ReconEngine::new();
    let tolerances = [0.0, 0.01, 0.03, 0.09, 0.27, 0.81, 2.43, 7.29];
    let key = vec!["Amt".to_string()];

    for seed in 0..20 {
        let a = numeric_table("a", seed, 12);
        let b = numeric_table("b", seed + 50, 12);
        let mut previous: Option<(usize, usize)> = None;

        for tolerance in tolerances {
            let spec = NormalizationSpec::new().with_tolerance(tolerance);
            let result = engine.compare_records(&a, &b, &key, &spec).unwrap();
            let counts = (result.left_only.len(), result.right_only.len());
            if let Some((left, right)) = previous {
                assert!(
                    counts.0 <= left && counts.1 <= right,
                    "seed {} tolerance {}: {:?} after {:?}",
                    seed,
                    tolerance,
                    counts,
                    (left, right)
                );
            }
            previous = Some(counts);
        }
    }
}

#[test]
fn test_record_partition_is_disjoint() {
    let engine = ReconEngine::new();
    for seed in 0..20 {
        let a = numeric_table("a", seed, 10);
        let b = numeric_table("b", seed + 11, 10);
        let result = engine
            .compare_records(&a, &b, &invoice_key(), &NormalizationSpec::new())
            .unwrap();

        let left: BTreeSet<_> = result.left_only.iter().collect();
        let right: BTreeSet<_> = result.right_only.iter().collect();
        let both: BTreeSet<_> = result.both.iter().collect();
        assert!(left.is_disjoint(&right));
        assert!(left.is_disjoint(&both));
        assert!(right.is_disjoint(&both));
    }
}

#[test]
fn test_mismatch_keys_are_matched_keys() {
    let engine = ReconEngine::new();
    let a = text_table("a", &["Ref", "Amt"], &[&["r1", "1"], &["r2", "2"], &["r3", "3"]]);
    let b = text_table("b", &["Ref", "Amt"], &[&["r2", "20"], &["r3", "3"], &["r4", "4"]]);
    let spec = NormalizationSpec::new();

    let records = engine.compare_records(&a, &b, &invoice_key(), &spec).unwrap();
    let mismatches = engine
        .detect_mismatches(&a, &b, &invoice_key(), &spec, Some(&records))
        .unwrap();

    for record in &mismatches.mismatches {
        assert!(records.both.contains(&record.key));
    }
    assert_eq!(mismatches.mismatches.len(), 1);
}
