//! The stats report: every topology metric in one serializable record.
//!
//! # Precision
//!
//! | field                              | places |
//! |------------------------------------|--------|
//! | averages, mean, stddev, threshold  | 3      |
//! | hub z-scores, redundancy similarity| 3      |
//! | clustering coefficient             | 4      |
//! | largest weak component percentage  | 1      |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use trellis_core::contract::{CONTRACT_VERSION, format_timestamp};
use trellis_core::graph::{Edge, Node};

use crate::graph::{Adjacency, strong_components, weak_components};
use crate::metrics::{
    Histogram, Hub, REDUNDANCY_THRESHOLD, RedundantPair, degree_summary, mean_clustering,
    redundant_neighborhoods, round_to,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsReport {
    pub contract_version: String,
    pub timestamp: String,
    /// Documents root the graph was built from, as given.
    pub source: String,
    pub node_count: usize,
    pub edge_count: usize,
    pub avg_out_degree: f64,
    pub avg_in_degree: f64,
    pub avg_total_degree: f64,
    pub degree_mean: f64,
    pub degree_stddev: f64,
    /// `mean + 2·sd` of total degree, unrounded: a node is a hub exactly
    /// when its total degree is greater than this value.
    pub hub_threshold: f64,
    pub degree_distribution: Histogram,
    pub in_degree_distribution: Histogram,
    pub out_degree_distribution: Histogram,
    pub hubs: Vec<Hub>,
    pub hub_count: usize,
    pub leaves: Vec<String>,
    pub leaf_count: usize,
    pub clustering_coefficient: f64,
    pub weak_component_count: usize,
    pub strong_component_count: usize,
    pub largest_weak_component_pct: f64,
    pub redundant_neighborhoods: Vec<RedundantPair>,
    pub redundant_neighborhood_count: usize,
}

/// Compute the full report for a graph.
///
/// Pure apart from the supplied `source` label and `now` stamp. Edges with
/// unknown endpoints, self-loops, and duplicates are ignored.
#[instrument(skip(nodes, edges), fields(nodes = nodes.len(), edges = edges.len()))]
#[must_use]
pub fn compute_stats(
    nodes: &[Node],
    edges: &[Edge],
    source: &str,
    now: DateTime<Utc>,
) -> StatsReport {
    let adj = Adjacency::from_graph(nodes, edges);
    let report = stats_for(&adj, source, now);
    info!(
        hubs = report.hub_count,
        weak = report.weak_component_count,
        strong = report.strong_component_count,
        "stats computed"
    );
    report
}

/// [`compute_stats`] over a prebuilt adjacency.
#[must_use]
pub fn stats_for(adj: &Adjacency, source: &str, now: DateTime<Utc>) -> StatsReport {
    let node_count = adj.len();
    let edge_count = adj.edge_count();

    let degrees = degree_summary(adj);
    let weak = weak_components(adj);
    let strong = strong_components(adj);
    let largest_weak = weak.iter().map(Vec::len).max().unwrap_or(0);
    let redundant = redundant_neighborhoods(adj, REDUNDANCY_THRESHOLD);

    let avg_out = ratio(edge_count, node_count);

    StatsReport {
        contract_version: CONTRACT_VERSION.to_string(),
        timestamp: format_timestamp(now),
        source: source.to_string(),
        node_count,
        edge_count,
        avg_out_degree: round_to(avg_out, 3),
        avg_in_degree: round_to(avg_out, 3),
        avg_total_degree: round_to(2.0 * avg_out, 3),
        degree_mean: round_to(degrees.mean, 3),
        degree_stddev: round_to(degrees.stddev, 3),
        hub_threshold: degrees.hub_threshold,
        degree_distribution: degrees.total_distribution,
        in_degree_distribution: degrees.in_distribution,
        out_degree_distribution: degrees.out_distribution,
        hub_count: degrees.hubs.len(),
        hubs: degrees.hubs,
        leaf_count: degrees.leaves.len(),
        leaves: degrees.leaves,
        clustering_coefficient: round_to(mean_clustering(adj), 4),
        weak_component_count: weak.len(),
        strong_component_count: strong.len(),
        largest_weak_component_pct: round_to(100.0 * ratio(largest_weak, node_count), 1),
        redundant_neighborhood_count: redundant.len(),
        redundant_neighborhoods: redundant,
    }
}

#[allow(clippy::cast_precision_loss)]
fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    numerator as f64 / denominator as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::path::PathBuf;

    fn node(id: &str) -> Node {
        Node {
            id: id.to_string(),
            short_key: id.to_lowercase(),
            title: id.to_string(),
            rel_path: PathBuf::new(),
        }
    }

    fn stats(ids: &[&str], edges: &[(&str, &str)]) -> StatsReport {
        let nodes: Vec<Node> = ids.iter().map(|id| node(id)).collect();
        let edges: Vec<Edge> = edges.iter().map(|(s, t)| Edge::new(*s, *t)).collect();
        let now = Utc
            .with_ymd_and_hms(2026, 2, 3, 4, 5, 6)
            .single()
            .expect("valid");
        compute_stats(&nodes, &edges, "docs", now)
    }

    #[test]
    fn three_document_example() {
        let r = stats(&["A", "B", "C"], &[("A", "B"), ("A", "C"), ("B", "A")]);
        assert_eq!(r.node_count, 3);
        assert_eq!(r.edge_count, 3);
        assert_eq!(r.leaves, vec!["C"]);
        assert_eq!(r.leaf_count, 1);
        assert_eq!(r.weak_component_count, 1);
        assert_eq!(r.strong_component_count, 2);
        assert!((r.largest_weak_component_pct - 100.0).abs() < f64::EPSILON);
        assert!((r.avg_out_degree - 1.0).abs() < f64::EPSILON);
        assert!((r.avg_total_degree - 2.0).abs() < f64::EPSILON);
        assert_eq!(r.timestamp, "2026-02-03T04:05:06Z");
        assert_eq!(r.source, "docs");
    }

    #[test]
    fn empty_corpus_reports_zeros() {
        let r = stats(&[], &[]);
        assert_eq!(r.node_count, 0);
        assert!(r.avg_out_degree.abs() < f64::EPSILON);
        assert!(r.degree_mean.abs() < f64::EPSILON);
        assert!(r.clustering_coefficient.abs() < f64::EPSILON);
        assert!(r.largest_weak_component_pct.abs() < f64::EPSILON);
        assert_eq!(r.weak_component_count, 0);
        assert_eq!(r.strong_component_count, 0);
        assert!(r.hubs.is_empty());
        assert!(r.redundant_neighborhoods.is_empty());
    }

    #[test]
    fn nodes_without_edges() {
        let r = stats(&["a", "b", "c", "d"], &[("a", "b")]);
        assert_eq!(r.weak_component_count, 3);
        assert_eq!(r.strong_component_count, 4);
        assert!((r.largest_weak_component_pct - 50.0).abs() < f64::EPSILON);
        assert_eq!(r.leaves, vec!["a", "b", "c", "d"]);
        assert_eq!(r.degree_distribution, Histogram::from([(0, 2), (1, 2)]));
    }

    #[test]
    fn largest_component_percentage_rounds_to_one_place() {
        let r = stats(&["a", "b", "c"], &[("a", "b")]);
        assert!((r.largest_weak_component_pct - 66.7).abs() < 1e-9);
    }

    #[test]
    fn json_has_every_field() {
        let r = stats(&["A", "B"], &[("A", "B")]);
        let value = serde_json::to_value(&r).expect("json");
        for key in [
            "contract_version",
            "timestamp",
            "source",
            "node_count",
            "edge_count",
            "avg_out_degree",
            "avg_in_degree",
            "avg_total_degree",
            "degree_mean",
            "degree_stddev",
            "hub_threshold",
            "degree_distribution",
            "in_degree_distribution",
            "out_degree_distribution",
            "hubs",
            "hub_count",
            "leaves",
            "leaf_count",
            "clustering_coefficient",
            "weak_component_count",
            "strong_component_count",
            "largest_weak_component_pct",
            "redundant_neighborhoods",
            "redundant_neighborhood_count",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["degree_distribution"]["1"], 2);
    }

    #[test]
    #[allow(clippy::cast_precision_loss)]
    fn published_threshold_separates_hubs() {
        // totals: hub 6, every other node 1; the threshold is irrational
        let ids = ["a", "b", "c", "d", "e", "f", "g", "h", "hub"];
        let edges: Vec<(&str, &str)> = ["a", "b", "c", "d", "e", "f"]
            .iter()
            .map(|s| ("hub", *s))
            .chain([("g", "h")])
            .collect();
        let r = stats(&ids, &edges);
        assert_eq!(r.hub_count, 1);
        for hub in &r.hubs {
            assert!(hub.degree as f64 > r.hub_threshold);
        }
        for (degree, _) in &r.degree_distribution {
            let listed = r.hubs.iter().any(|h| h.degree == *degree);
            assert_eq!(*degree as f64 > r.hub_threshold, listed);
        }
    }

    #[test]
    fn unknown_endpoints_are_ignored() {
        let r = stats(&["a", "b"], &[("a", "b"), ("a", "ghost"), ("a", "a")]);
        assert_eq!(r.edge_count, 1);
    }
}
