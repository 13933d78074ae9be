//! Degree distributions, hubs, and leaves.
//!
//! # Hubs
//!
//! A hub is a node whose total degree strictly exceeds
//! `mean + 2 * stddev`, using the population standard deviation of total
//! degree over all nodes. Its z-score is `(degree - mean) / stddev`, or 0
//! when every node has the same degree.
//!
//! # Leaves
//!
//! Nodes with total degree at most 1.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::graph::Adjacency;
use crate::metrics::round_to;

/// Degree value → number of nodes with that degree.
pub type Histogram = BTreeMap<usize, usize>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hub {
    pub slug: String,
    pub degree: usize,
    pub in_degree: usize,
    pub out_degree: usize,
    pub z_score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DegreeSummary {
    pub in_distribution: Histogram,
    pub out_distribution: Histogram,
    pub total_distribution: Histogram,
    pub mean: f64,
    pub stddev: f64,
    pub hub_threshold: f64,
    pub hubs: Vec<Hub>,
    pub leaves: Vec<String>,
}

/// Compute every degree-based metric in one pass over the nodes.
///
/// Mean, standard deviation, and threshold are unrounded here; hub
/// membership is decided on the exact values.
#[must_use]
pub fn degree_summary(adj: &Adjacency) -> DegreeSummary {
    let mut in_distribution = Histogram::new();
    let mut out_distribution = Histogram::new();
    let mut total_distribution = Histogram::new();
    let mut totals = Vec::with_capacity(adj.len());

    for node in 0..adj.len() {
        *in_distribution.entry(adj.in_degree(node)).or_default() += 1;
        *out_distribution.entry(adj.out_degree(node)).or_default() += 1;
        *total_distribution.entry(adj.total_degree(node)).or_default() += 1;
        totals.push(adj.total_degree(node));
    }

    let (mean, stddev) = mean_and_stddev(&totals);
    let hub_threshold = 2.0_f64.mul_add(stddev, mean);

    let mut hubs: Vec<Hub> = (0..adj.len())
        .filter(|&node| as_f64(totals[node]) > hub_threshold)
        .map(|node| Hub {
            slug: adj.id(node).to_string(),
            degree: totals[node],
            in_degree: adj.in_degree(node),
            out_degree: adj.out_degree(node),
            z_score: if stddev > 0.0 {
                round_to((as_f64(totals[node]) - mean) / stddev, 3)
            } else {
                0.0
            },
        })
        .collect();
    hubs.sort_by(|a, b| b.degree.cmp(&a.degree).then_with(|| a.slug.cmp(&b.slug)));

    // Node ids are already sorted, so leaves come out sorted.
    let leaves = (0..adj.len())
        .filter(|&node| totals[node] <= 1)
        .map(|node| adj.id(node).to_string())
        .collect();

    DegreeSummary {
        in_distribution,
        out_distribution,
        total_distribution,
        mean,
        stddev,
        hub_threshold,
        hubs,
        leaves,
    }
}

/// Mean and population standard deviation; `(0, 0)` for no values.
#[must_use]
pub fn mean_and_stddev(values: &[usize]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = as_f64(values.len());
    let mean = values.iter().map(|&v| as_f64(v)).sum::<f64>() / n;
    let variance = values
        .iter()
        .map(|&v| {
            let d = as_f64(v) - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    (mean, variance.sqrt())
}

#[allow(clippy::cast_precision_loss)]
const fn as_f64(value: usize) -> f64 {
    value as f64
}
