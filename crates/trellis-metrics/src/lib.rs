#![forbid(unsafe_code)]
//! trellis-metrics: topology and density analysis of a trellis link graph.
//!
//! One entry point, [`compute_stats`], turns `(nodes, edges)` into a
//! [`StatsReport`]. All algorithms run on an index-based [`graph::Adjacency`]
//! built once per call; traversals are iterative.
//!
//! # Conventions
//!
//! - **Errors**: none; every metric is defined for every graph, including
//!   the empty one.
//! - **Logging**: `tracing` macros; spans on the public entry points.

pub mod graph;
pub mod metrics;
pub mod report;

pub use report::{StatsReport, compute_stats, stats_for};
