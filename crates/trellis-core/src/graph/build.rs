//! Graph construction from a loaded corpus.
//!
//! ## Edge Direction
//!
//! An edge `A → B` means "document A links to document B".
//!
//! ## What Is Dropped
//!
//! - links whose target resolves to nothing (the integrity checker reports
//!   those; the analytic graph stays free of dangling edges),
//! - links resolving to the source document itself,
//! - repeated links from one document to the same target.

#![allow(clippy::module_name_repetitions)]

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::corpus::{Corpus, Document};
use crate::graph::resolve::Resolver;
use crate::parse::{extract_links, sanitize};

/// One published document as a graph node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub short_key: String,
    pub title: String,
    #[serde(skip)]
    pub rel_path: PathBuf,
}

impl Node {
    #[must_use]
    pub fn from_document(doc: &Document) -> Self {
        Self {
            id: doc.id.clone(),
            short_key: doc.short_key.clone(),
            title: doc.title.clone(),
            rel_path: doc.rel_path.clone(),
        }
    }
}

/// A resolved, non-self-referential link.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
}

impl Edge {
    #[must_use]
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    /// `source→target`, the form used in drift reports.
    #[must_use]
    pub fn arrow(&self) -> String {
        format!("{}→{}", self.source, self.target)
    }
}

/// Counters collected while building; useful for logs and diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildCounters {
    pub links_seen: usize,
    pub unresolved: usize,
    pub self_links: usize,
    pub duplicates: usize,
}

/// Node set and edge list of a corpus.
///
/// Nodes are sorted by id and edges by `(source, target)`, so two builds of
/// unchanged input compare equal and serialize identically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkGraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub counters: BuildCounters,
}

impl LinkGraph {
    /// Build the graph for every published document in `corpus`.
    #[instrument(skip(corpus), fields(documents = corpus.documents.len()))]
    #[must_use]
    pub fn build(corpus: &Corpus) -> Self {
        let resolver = Resolver::new(&corpus.documents);

        let mut nodes: Vec<Node> = Vec::with_capacity(corpus.documents.len());
        let mut seen_ids: BTreeSet<&str> = BTreeSet::new();
        for doc in &corpus.documents {
            if seen_ids.insert(doc.id.as_str()) {
                nodes.push(Node::from_document(doc));
            } else {
                warn!(id = %doc.id, path = %doc.rel_path.display(), "duplicate node id, keeping first");
            }
        }

        let mut edges: BTreeSet<Edge> = BTreeSet::new();
        let mut counters = BuildCounters::default();

        for doc in &corpus.documents {
            let clean = sanitize(doc.text());
            let mut targets: BTreeSet<&str> = BTreeSet::new();

            for raw in extract_links(&clean) {
                counters.links_seen += 1;
                let Some(hit) = resolver.resolve(raw) else {
                    counters.unresolved += 1;
                    debug!(source = %doc.id, target = raw, "unresolved link dropped");
                    continue;
                };
                if hit.id == doc.id {
                    counters.self_links += 1;
                    continue;
                }
                if !targets.insert(hit.id) {
                    counters.duplicates += 1;
                    continue;
                }
                edges.insert(Edge::new(doc.id.as_str(), hit.id));
            }
        }

        nodes.sort_by(|a, b| a.id.cmp(&b.id));

        let graph = Self {
            nodes,
            edges: edges.into_iter().collect(),
            counters,
        };

        info!(
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            unresolved = counters.unresolved,
            hash = %graph.content_hash(),
            "link graph built"
        );

        graph
    }

    /// Assemble a graph from parts, normalizing order and dropping
    /// self-loops, duplicates, and edges with unknown endpoints.
    #[must_use]
    pub fn from_parts(mut nodes: Vec<Node>, edges: impl IntoIterator<Item = Edge>) -> Self {
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        nodes.dedup_by(|a, b| a.id == b.id);

        let ids: BTreeSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        let edges: BTreeSet<Edge> = edges
            .into_iter()
            .filter(|e| e.source != e.target)
            .filter(|e| ids.contains(e.source.as_str()) && ids.contains(e.target.as_str()))
            .collect();

        Self {
            nodes,
            edges: edges.into_iter().collect(),
            counters: BuildCounters::default(),
        }
    }

    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes
            .binary_search_by(|n| n.id.as_str().cmp(id))
            .ok()
            .map(|idx| &self.nodes[idx])
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// BLAKE3 hash over the sorted node ids and edges.
    #[must_use]
    pub fn content_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for node in &self.nodes {
            hasher.update(node.id.as_bytes());
            hasher.update(b"\n");
        }
        hasher.update(b"--\n");
        for edge in &self.edges {
            hasher.update(edge.source.as_bytes());
            hasher.update(b"\t");
            hasher.update(edge.target.as_bytes());
            hasher.update(b"\n");
        }
        format!("blake3:{}", hasher.finalize().to_hex())
    }
}
