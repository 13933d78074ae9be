//! Versioned snapshot contract shared with the rendering consumer.
//!
//! `generate` serializes a [`crate::graph::LinkGraph`] into the artifact the
//! renderer reads; `verify` diffs a persisted artifact against a fresh
//! build. The artifact layout is a compatibility surface: field names,
//! ordering, and edge classification must stay stable within a
//! [`CONTRACT_VERSION`].

pub mod classify;
pub mod snapshot;
pub mod verify;

pub use classify::{EdgeType, classify_edge};
pub use snapshot::{Snapshot, SnapshotEdge, SnapshotNode, generate, read_snapshot, write_snapshot};
pub use verify::{MissingSnapshot, VerifyOutcome, VerifyReport, VerifyStatus, diff_snapshot, verify_snapshot};

/// Contract version written into every artifact and report.
pub const CONTRACT_VERSION: &str = "1.1";

/// Default artifact file name.
pub const DEFAULT_SNAPSHOT_FILE: &str = "graph.snapshot.json";

/// UTC timestamp with seconds precision, as written into artifacts.
#[must_use]
pub fn format_timestamp(at: chrono::DateTime<chrono::Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
