//! Link graph construction.
//!
//! ## Pipeline
//!
//! ```text
//! Corpus (published documents, path order)
//!        ↓  parse::sanitize()        header + code regions removed
//!        ↓  parse::extract_links()   raw targets, document order
//!        ↓  Resolver::resolve()      exact → decoded → case-folded → short key
//! LinkGraph { nodes (by id), edges (by source, target) }
//! ```
//!
//! The graph is rebuilt from scratch on every run and never mutated after
//! [`LinkGraph::build`] returns. Both the metrics engine and the snapshot
//! contract read it; neither depends on the other.

pub mod build;
pub mod resolve;

pub use build::{BuildCounters, Edge, LinkGraph, Node};
pub use resolve::{Resolution, Resolver, Strategy};
