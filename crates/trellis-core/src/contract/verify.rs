//! Drift detection between a persisted snapshot and the live graph.
//!
//! The artifact is read through a lenient view (only slugs and edge
//! endpoints), so artifacts written by older contract versions still
//! produce a useful diff. A version mismatch is reported alongside the diff
//! and never decides the status by itself.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::contract::CONTRACT_VERSION;
use crate::error::{CorpusError, ErrorCode};
use crate::graph::{Edge, LinkGraph};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerifyStatus {
    Ok,
    Diverged,
}

/// Structured diff between an artifact and the live graph.
///
/// The `live_*` counts keep their historical JSON names for consumers that
/// already parse the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyReport {
    pub snapshot_version: String,
    pub current_contract_version: String,
    pub version_match: bool,
    pub divergence_count: usize,
    pub snapshot_node_count: usize,
    #[serde(rename = "python_node_count")]
    pub live_node_count: usize,
    pub snapshot_edge_count: usize,
    #[serde(rename = "python_edge_count")]
    pub live_edge_count: usize,
    /// In the artifact, gone from the live graph.
    pub stale_nodes: Vec<String>,
    /// In the live graph, absent from the artifact.
    pub missing_nodes: Vec<String>,
    pub stale_edges: Vec<String>,
    pub missing_edges: Vec<String>,
    pub status: VerifyStatus,
}

impl VerifyReport {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == VerifyStatus::Ok
    }
}

/// Result when no artifact exists at the requested path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingSnapshot {
    pub status: &'static str,
    pub snapshot_path: String,
    pub error_code: &'static str,
    pub message: String,
    pub hint: Option<&'static str>,
}

impl MissingSnapshot {
    #[must_use]
    pub fn new(path: &Path) -> Self {
        let code = ErrorCode::SnapshotNotFound;
        Self {
            status: "NOT_FOUND",
            snapshot_path: path.display().to_string(),
            error_code: code.code(),
            message: format!("{}: {}", code.message(), path.display()),
            hint: code.hint(),
        }
    }
}

/// Outcome of [`verify_snapshot`]: either a diff or a structured "not found".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum VerifyOutcome {
    Report(VerifyReport),
    NotFound(MissingSnapshot),
}

impl VerifyOutcome {
    /// True only for a report with zero divergence.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Report(r) if r.is_ok())
    }
}

// ---------------------------------------------------------------------------
// Lenient artifact view
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ArtifactView {
    #[serde(default)]
    contract_version: Option<String>,
    #[serde(default)]
    nodes: Vec<ArtifactNode>,
    #[serde(default)]
    edges: Vec<ArtifactEdge>,
}

#[derive(Debug, Deserialize)]
struct ArtifactNode {
    slug: String,
}

#[derive(Debug, Deserialize)]
struct ArtifactEdge {
    source: String,
    target: String,
}

// ---------------------------------------------------------------------------
// Diff
// ---------------------------------------------------------------------------

/// Diff an artifact's node ids and edges against `graph`.
///
/// Pure: no I/O, no clock. Duplicate entries in the artifact are collapsed
/// before comparison.
#[must_use]
pub fn diff_snapshot<'a>(
    snapshot_version: &str,
    snapshot_nodes: impl IntoIterator<Item = &'a str>,
    snapshot_edges: impl IntoIterator<Item = (&'a str, &'a str)>,
    graph: &LinkGraph,
) -> VerifyReport {
    let old_nodes: BTreeSet<&str> = snapshot_nodes.into_iter().collect();
    let new_nodes: BTreeSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();

    let old_edges: BTreeSet<(&str, &str)> = snapshot_edges.into_iter().collect();
    let new_edges: BTreeSet<(&str, &str)> = graph
        .edges
        .iter()
        .map(|e| (e.source.as_str(), e.target.as_str()))
        .collect();

    let arrow = |(s, t): &(&str, &str)| Edge::new(*s, *t).arrow();

    let stale_nodes: Vec<String> = old_nodes
        .difference(&new_nodes)
        .map(|s| (*s).to_string())
        .collect();
    let missing_nodes: Vec<String> = new_nodes
        .difference(&old_nodes)
        .map(|s| (*s).to_string())
        .collect();
    let stale_edges: Vec<String> = old_edges.difference(&new_edges).map(arrow).collect();
    let missing_edges: Vec<String> = new_edges.difference(&old_edges).map(arrow).collect();

    let divergence_count =
        stale_nodes.len() + missing_nodes.len() + stale_edges.len() + missing_edges.len();

    VerifyReport {
        snapshot_version: snapshot_version.to_string(),
        current_contract_version: CONTRACT_VERSION.to_string(),
        version_match: snapshot_version == CONTRACT_VERSION,
        divergence_count,
        snapshot_node_count: old_nodes.len(),
        live_node_count: new_nodes.len(),
        snapshot_edge_count: old_edges.len(),
        live_edge_count: new_edges.len(),
        stale_nodes,
        missing_nodes,
        stale_edges,
        missing_edges,
        status: if divergence_count == 0 {
            VerifyStatus::Ok
        } else {
            VerifyStatus::Diverged
        },
    }
}

/// Load the artifact at `path` and diff it against `graph`.
///
/// A missing file yields [`VerifyOutcome::NotFound`] rather than an error.
///
/// # Errors
///
/// Returns [`CorpusError::Read`] if the file exists but cannot be read and
/// [`CorpusError::ArtifactParse`] if it is not a JSON object of the expected
/// shape.
#[instrument(skip(graph), fields(path = %path.display()))]
pub fn verify_snapshot(path: &Path, graph: &LinkGraph) -> Result<VerifyOutcome, CorpusError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!("snapshot not found");
            return Ok(VerifyOutcome::NotFound(MissingSnapshot::new(path)));
        }
        Err(e) => return Err(CorpusError::read(path, e)),
    };

    let view: ArtifactView =
        serde_json::from_str(&raw).map_err(|source| CorpusError::ArtifactParse {
            path: path.to_path_buf(),
            source,
        })?;

    let version = view.contract_version.unwrap_or_default();
    let report = diff_snapshot(
        &version,
        view.nodes.iter().map(|n| n.slug.as_str()),
        view.edges
            .iter()
            .map(|e| (e.source.as_str(), e.target.as_str())),
        graph,
    );

    if !report.version_match {
        warn!(
            snapshot = %report.snapshot_version,
            current = CONTRACT_VERSION,
            "contract version mismatch"
        );
    }
    info!(
        divergence = report.divergence_count,
        hash = %graph.content_hash(),
        "snapshot verified"
    );

    Ok(VerifyOutcome::Report(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScanConfig;
    use crate::contract::snapshot::{generate, write_snapshot};
    use crate::corpus::slug;
    use crate::graph::Node;
    use std::path::PathBuf;

    fn node(id: &str) -> Node {
        Node {
            id: id.to_string(),
            short_key: slug::short_key(id),
            title: id.to_string(),
            rel_path: PathBuf::new(),
        }
    }

    fn graph(ids: &[&str], edges: &[(&str, &str)]) -> LinkGraph {
        LinkGraph::from_parts(
            ids.iter().map(|id| node(id)).collect(),
            edges.iter().map(|(s, t)| Edge::new(*s, *t)),
        )
    }

    #[test]
    fn identical_inputs_have_no_divergence() {
        let g = graph(&["a", "b"], &[("a", "b")]);
        let report = diff_snapshot(CONTRACT_VERSION, ["a", "b"], [("a", "b")], &g);
        assert_eq!(report.divergence_count, 0);
        assert_eq!(report.status, VerifyStatus::Ok);
        assert!(report.version_match);
    }

    #[test]
    fn reports_all_four_difference_sets() {
        let g = graph(&["a", "b", "new"], &[("a", "new"), ("a", "b")]);
        let report = diff_snapshot(
            CONTRACT_VERSION,
            ["a", "b", "old"],
            [("a", "b"), ("old", "a")],
            &g,
        );
        assert_eq!(report.stale_nodes, vec!["old"]);
        assert_eq!(report.missing_nodes, vec!["new"]);
        assert_eq!(report.stale_edges, vec!["old→a"]);
        assert_eq!(report.missing_edges, vec!["a→new"]);
        assert_eq!(report.divergence_count, 4);
        assert_eq!(report.status, VerifyStatus::Diverged);
        assert_eq!(report.snapshot_node_count, 3);
        assert_eq!(report.live_node_count, 3);
        assert_eq!(report.snapshot_edge_count, 2);
        assert_eq!(report.live_edge_count, 2);
    }

    #[test]
    fn version_mismatch_alone_is_ok() {
        let g = graph(&["a"], &[]);
        let report = diff_snapshot("0.9", ["a"], std::iter::empty(), &g);
        assert!(!report.version_match);
        assert_eq!(report.status, VerifyStatus::Ok);
    }

    #[test]
    fn report_json_keeps_legacy_field_names() {
        let g = graph(&["a"], &[]);
        let report = diff_snapshot(CONTRACT_VERSION, ["a"], std::iter::empty(), &g);
        let value = serde_json::to_value(&report).expect("json");
        assert_eq!(value["python_node_count"], 1);
        assert_eq!(value["python_edge_count"], 0);
        assert_eq!(value["status"], "OK");
        assert!(value.get("live_node_count").is_none());
    }

    #[test]
    fn missing_artifact_is_structured() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nope.json");
        let outcome = verify_snapshot(&path, &graph(&["a"], &[])).expect("non-fatal");
        let VerifyOutcome::NotFound(missing) = &outcome else {
            panic!("expected NotFound, got {outcome:?}");
        };
        assert_eq!(missing.status, "NOT_FOUND");
        assert_eq!(missing.error_code, "E3001");
        assert!(missing.hint.is_some());
        assert!(!outcome.is_ok());
    }

    #[test]
    fn generate_then_verify_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("graph.snapshot.json");
        let g = graph(&["a/x", "a/y", "b/z"], &[("a/x", "a/y"), ("b/z", "a/x")]);

        let snap = generate(&g, &ScanConfig::default(), chrono::Utc::now());
        write_snapshot(&path, &snap).expect("write");

        let outcome = verify_snapshot(&path, &g).expect("verify");
        let VerifyOutcome::Report(report) = outcome else {
            panic!("expected report");
        };
        assert_eq!(report.divergence_count, 0);
        assert_eq!(report.status, VerifyStatus::Ok);
    }

    #[test]
    fn lenient_view_accepts_minimal_artifact() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("old.json");
        std::fs::write(
            &path,
            r#"{"nodes":[{"slug":"a"},{"slug":"b"}],"edges":[{"source":"a","target":"b"}]}"#,
        )
        .expect("write");

        let outcome = verify_snapshot(&path, &graph(&["a", "b"], &[("a", "b")])).expect("verify");
        let VerifyOutcome::Report(report) = outcome else {
            panic!("expected report");
        };
        assert_eq!(report.snapshot_version, "");
        assert!(!report.version_match);
        assert!(report.is_ok());
    }

    #[test]
    fn malformed_artifact_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "[1, 2, 3]").expect("write");
        let err = verify_snapshot(&path, &graph(&[], &[])).expect_err("should fail");
        assert_eq!(err.code(), ErrorCode::SnapshotParseError);
    }
}
