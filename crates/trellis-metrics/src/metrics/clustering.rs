//! Local clustering coefficient on the undirected neighborhood.
//!
//! For a node with `k >= 2` undirected neighbors, the coefficient is
//! `2 * closed / (k * (k - 1))`, where a neighbor pair is closed when an
//! edge runs between them in either direction. Nodes with fewer than two
//! neighbors score 0.

use tracing::instrument;

use crate::graph::Adjacency;

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn local_clustering(adj: &Adjacency, node: usize) -> f64 {
    let neighbors = adj.neighbors(node);
    let k = neighbors.len();
    if k < 2 {
        return 0.0;
    }

    let mut closed = 0usize;
    for (i, &u) in neighbors.iter().enumerate() {
        for &v in &neighbors[i + 1..] {
            if adj.has_edge(u, v) || adj.has_edge(v, u) {
                closed += 1;
            }
        }
    }

    (2 * closed) as f64 / (k * (k - 1)) as f64
}

/// Arithmetic mean of [`local_clustering`] over all nodes; 0 when empty.
#[instrument(skip(adj), fields(nodes = adj.len()))]
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean_clustering(adj: &Adjacency) -> f64 {
    if adj.is_empty() {
        return 0.0;
    }
    let sum: f64 = (0..adj.len()).map(|node| local_clustering(adj, node)).sum();
    sum / adj.len() as f64
}
