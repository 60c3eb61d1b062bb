//! Column token resolution: letter position, exact name, fuzzy keyword

use crate::error::{ReconError, Result};
use crate::table::Table;
use serde::Serialize;

/// Minimum similarity a fuzzy keyword match must reach
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.4;

/// How a token was matched to a column
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum MatchKind {
    /// Single letter standing for an ordinal position
    Letter { index: usize },
    /// Verbatim, case-sensitive column name
    Exact,
    /// Closest column name by edit similarity
    Fuzzy { score: f64 },
}

/// A successfully resolved column token
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub column: String,
    pub kind: MatchKind,
}

/// Resolves user column tokens against a table's columns
#[derive(Debug, Clone)]
pub struct ColumnResolver {
    threshold: f64,
}

impl Default for ColumnResolver {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

impl ColumnResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver with a custom fuzzy threshold in `[0, 1]`
    pub fn with_threshold(threshold: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ReconError::InvalidThreshold { value: threshold });
        }
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Resolve `token` against `columns`.
    ///
    /// Strategies are tried in a fixed order and the first hit wins: a single
    /// letter is a position (`A` is the first column), then an exact name,
    /// then the most similar name scoring at least the threshold. Equal
    /// fuzzy scores go to the column that comes first.
    pub fn resolve<S: AsRef<str>>(&self, token: &str, columns: &[S]) -> Option<Resolution> {
        if token.trim().is_empty() {
            return None;
        }

        if let Some(index) = letter_index(token) {
            if let Some(column) = columns.get(index) {
                return Some(Resolution {
                    column: column.as_ref().to_string(),
                    kind: MatchKind::Letter { index },
                });
            }
        }

        if let Some(column) = columns.iter().find(|c| c.as_ref() == token) {
            return Some(Resolution {
                column: column.as_ref().to_string(),
                kind: MatchKind::Exact,
            });
        }

        let needle = token.trim().to_lowercase();
        let mut best: Option<(usize, f64)> = None;
        for (i, column) in columns.iter().enumerate() {
            let score = similarity(&needle, &column.as_ref().to_lowercase());
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((i, score));
            }
        }

        match best {
            Some((i, score)) if score >= self.threshold => Some(Resolution {
                column: columns[i].as_ref().to_string(),
                kind: MatchKind::Fuzzy { score },
            }),
            _ => None,
        }
    }

    /// Resolve against a table, turning a miss into `ColumnNotFound`
    pub fn resolve_in(&self, token: &str, table: &Table) -> Result<String> {
        let columns = table.column_names();
        match self.resolve(token, &columns) {
            Some(resolution) => {
                log::debug!(
                    "Resolved '{}' in {} to '{}' ({:?})",
                    token,
                    table.name(),
                    resolution.column,
                    resolution.kind
                );
                Ok(resolution.column)
            }
            None => Err(ReconError::column_not_found(token, table.name())),
        }
    }
}

/// Zero-based position for a single ASCII letter token
fn letter_index(token: &str) -> Option<usize> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => {
            Some((c.to_ascii_uppercase() as u8 - b'A') as usize)
        }
        _ => None,
    }
}

/// Letter token for a zero-based column position, if it has one
pub fn column_letter(index: usize) -> Option<char> {
    if index < 26 {
        Some((b'A' + index as u8) as char)
    } else {
        None
    }
}

/// Normalized edit similarity in `[0, 1]`
pub fn similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }

    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }

    let distance = levenshtein(a, b);
    1.0 - (distance as f64 / max_len as f64)
}

/// Levenshtein distance over Unicode scalar values
fn levenshtein(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0usize; b_chars.len() + 1];

    for (i, ca) in a_chars.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_chars.len()]
}
