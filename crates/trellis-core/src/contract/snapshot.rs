//! Snapshot artifact generation and persistence.
//!
//! ## Artifact Layout
//!
//! ```json
//! {
//!   "contract_version": "1.1",
//!   "generated": "2026-03-09T07:05:01Z",
//!   "node_count": 2,
//!   "edge_count": 1,
//!   "nodes": [{ "slug": "a/One", "title": "One" }, ...],
//!   "edges": [{ "source": "a/One", "target": "a/Two", "type": "semantic",
//!               "weight": 1.0, "importance": null, "defaultVisible": true }]
//! }
//! ```
//!
//! Nodes are ordered by slug and edges by `(source, target)`, so regenerating
//! unchanged input only moves the `generated` timestamp.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::config::ScanConfig;
use crate::contract::classify::{EdgeType, classify_edge};
use crate::contract::{CONTRACT_VERSION, format_timestamp};
use crate::error::CorpusError;
use crate::graph::LinkGraph;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotNode {
    pub slug: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEdge {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
    pub weight: f64,
    /// Reserved for renderer-side ranking; always `null` for now.
    pub importance: Option<f64>,
    #[serde(rename = "defaultVisible")]
    pub default_visible: bool,
}

/// The persisted contract artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub contract_version: String,
    pub generated: String,
    pub node_count: usize,
    pub edge_count: usize,
    pub nodes: Vec<SnapshotNode>,
    pub edges: Vec<SnapshotEdge>,
}

/// Build the artifact for `graph`, stamped with `now`.
#[must_use]
pub fn generate(graph: &LinkGraph, cfg: &ScanConfig, now: DateTime<Utc>) -> Snapshot {
    let nodes: Vec<SnapshotNode> = graph
        .nodes
        .iter()
        .map(|n| SnapshotNode {
            slug: n.id.clone(),
            title: n.title.clone(),
        })
        .collect();

    let edges: Vec<SnapshotEdge> = graph
        .edges
        .iter()
        .filter_map(|e| {
            let source = graph.node(&e.source)?;
            let target = graph.node(&e.target)?;
            let edge_type = classify_edge(source, target, cfg);
            Some(SnapshotEdge {
                source: e.source.clone(),
                target: e.target.clone(),
                edge_type,
                weight: 1.0,
                importance: None,
                default_visible: edge_type.default_visible(),
            })
        })
        .collect();

    Snapshot {
        contract_version: CONTRACT_VERSION.to_string(),
        generated: format_timestamp(now),
        node_count: nodes.len(),
        edge_count: edges.len(),
        nodes,
        edges,
    }
}

impl Snapshot {
    /// Count of edges per [`EdgeType`], in declaration order.
    #[must_use]
    pub fn type_counts(&self) -> [(EdgeType, usize); 3] {
        let mut counts = [
            (EdgeType::Structural, 0),
            (EdgeType::Semantic, 0),
            (EdgeType::Navigational, 0),
        ];
        for edge in &self.edges {
            for (kind, count) in &mut counts {
                if *kind == edge.edge_type {
                    *count += 1;
                }
            }
        }
        counts
    }
}

/// Write `snapshot` as pretty JSON with a trailing newline, creating parent
/// directories as needed.
///
/// # Errors
///
/// Returns [`CorpusError::Write`] if the directory or file cannot be written.
#[instrument(skip(snapshot), fields(path = %path.display()))]
pub fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<(), CorpusError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| CorpusError::write(parent, e))?;
    }
    let mut json = serde_json::to_string_pretty(snapshot)?;
    json.push('\n');
    fs::write(path, json).map_err(|e| CorpusError::write(path, e))?;
    info!(
        nodes = snapshot.node_count,
        edges = snapshot.edge_count,
        "snapshot written"
    );
    Ok(())
}

/// Read a full artifact back.
///
/// # Errors
///
/// Returns [`CorpusError::Read`] if the file cannot be read and
/// [`CorpusError::ArtifactParse`] if it does not match the artifact layout.
pub fn read_snapshot(path: &Path) -> Result<Snapshot, CorpusError> {
    let raw = fs::read_to_string(path).map_err(|e| CorpusError::read(path, e))?;
    serde_json::from_str(&raw).map_err(|source| CorpusError::ArtifactParse {
        path: path.to_path_buf(),
        source,
    })
}
