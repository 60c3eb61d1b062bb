//! Order-independent set difference and in-table duplicate detection

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Distinct values split by where they occur, each list sorted ascending
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetDiff<T> {
    pub only_left: Vec<T>,
    pub only_right: Vec<T>,
    pub common: Vec<T>,
}

impl<T> SetDiff<T> {
    pub fn has_differences(&self) -> bool {
        !self.only_left.is_empty() || !self.only_right.is_empty()
    }
}

/// Split the distinct values of two multisets into left-only, right-only and
/// common. Multiplicity is discarded.
pub fn diff<T, L, R>(left: L, right: R) -> SetDiff<T>
where
    T: Ord + Clone,
    L: IntoIterator<Item = T>,
    R: IntoIterator<Item = T>,
{
    let left: BTreeSet<T> = left.into_iter().collect();
    let right: BTreeSet<T> = right.into_iter().collect();

    SetDiff {
        only_left: left.difference(&right).cloned().collect(),
        only_right: right.difference(&left).cloned().collect(),
        common: left.intersection(&right).cloned().collect(),
    }
}

/// Indices of every row whose value occurs more than once, in row order.
/// All occurrences are listed, the first one included.
pub fn duplicate_indices<T: Ord>(values: &[T]) -> Vec<usize> {
    let mut counts: BTreeMap<&T, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }

    values
        .iter()
        .enumerate()
        .filter(|(_, v)| counts.get(v).copied().unwrap_or(0) > 1)
        .map(|(i, _)| i)
        .collect()
}
