//! Deterministic type-matrix enumeration.
//!
//! Pairwise checks (aggregate argument pairs) run over the unique
//! unordered pairs of a column set: permutations with replacement,
//! normalized so the lexicographically smaller column comes first,
//! deduplicated, and sorted. The sorted order is the dispatch order, so
//! failure reports are reproducible run to run even when dispatch is
//! concurrent.

use std::collections::BTreeSet;

use crate::capability::Column;

/// Unique unordered pairs `{(ci, cj) : i <= j}` over `columns`, sorted.
pub fn unordered_pairs(columns: &[Column]) -> Vec<(Column, Column)> {
    let mut pairs = BTreeSet::new();
    for a in columns {
        for b in columns {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            pairs.insert((lo.clone(), hi.clone()));
        }
    }
    pairs.into_iter().collect()
}

/// Expected pair count for `n` distinct columns: n * (n + 1) / 2.
pub const fn pair_count(n: usize) -> usize {
    n * (n + 1) / 2
}
