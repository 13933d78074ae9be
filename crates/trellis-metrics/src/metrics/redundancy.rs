//! Redundant neighborhoods: linked pairs that link to nearly the same
//! places.
//!
//! For every edge `s → t`, compare `out(s) \ {t}` with `out(t) \ {s}` by
//! Jaccard similarity. Pairs above the threshold are consolidation
//! candidates. Edges where both remaining sets are empty are skipped.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::graph::Adjacency;
use crate::metrics::round_to;

/// Similarity must strictly exceed this to be reported.
pub const REDUNDANCY_THRESHOLD: f64 = 0.7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedundantPair {
    pub source: String,
    pub target: String,
    /// Jaccard similarity, rounded to 3 places.
    pub similarity: f64,
    pub shared: usize,
    pub union: usize,
}

/// `(shared, union)` of two sorted slices, ignoring one excluded element in
/// each.
fn overlap(a: &[usize], skip_a: usize, b: &[usize], skip_b: usize) -> (usize, usize) {
    let mut a = a.iter().copied().filter(|&x| x != skip_a).peekable();
    let mut b = b.iter().copied().filter(|&x| x != skip_b).peekable();
    let (mut shared, mut union) = (0, 0);

    loop {
        match (a.peek().copied(), b.peek().copied()) {
            (Some(x), Some(y)) => {
                match x.cmp(&y) {
                    Ordering::Less => {
                        a.next();
                    }
                    Ordering::Greater => {
                        b.next();
                    }
                    Ordering::Equal => {
                        shared += 1;
                        a.next();
                        b.next();
                    }
                }
                union += 1;
            }
            (Some(_), None) => {
                union += 1;
                a.next();
            }
            (None, Some(_)) => {
                union += 1;
                b.next();
            }
            (None, None) => break,
        }
    }

    (shared, union)
}

/// Every edge whose endpoint neighborhoods exceed `threshold` similarity,
/// sorted by descending similarity then `(source, target)`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn redundant_neighborhoods(adj: &Adjacency, threshold: f64) -> Vec<RedundantPair> {
    let mut pairs: Vec<(f64, RedundantPair)> = adj
        .edges()
        .filter_map(|(s, t)| {
            let (shared, union) = overlap(adj.out(s), t, adj.out(t), s);
            if union == 0 {
                return None;
            }
            let similarity = shared as f64 / union as f64;
            (similarity > threshold).then(|| {
                (
                    similarity,
                    RedundantPair {
                        source: adj.id(s).to_string(),
                        target: adj.id(t).to_string(),
                        similarity: round_to(similarity, 3),
                        shared,
                        union,
                    },
                )
            })
        })
        .collect();

    // edges() yields (source, target) order; a stable sort keeps it for ties.
    pairs.sort_by(|a, b| b.0.total_cmp(&a.0));
    pairs.into_iter().map(|(_, pair)| pair).collect()
}
