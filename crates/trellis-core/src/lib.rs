#![forbid(unsafe_code)]
//! trellis-core: turn a directory of wiki-linked documents into a
//! deterministic link graph, and keep a versioned snapshot of it honest.
//!
//! ```text
//! load_corpus ─► LinkGraph::build ─┬─► contract::generate / verify_snapshot
//!                                  ├─► check::check_corpus
//!                                  └─► (trellis-metrics) compute_stats
//! ```
//!
//! # Conventions
//!
//! - **Errors**: library functions return [`error::CorpusError`]; per-file
//!   problems are collected as [`corpus::FileIssue`]s instead of aborting.
//! - **Logging**: `tracing` macros only; the binary installs the subscriber.
//! - **Ordering**: every collection that reaches output is sorted, so
//!   unchanged input yields byte-identical artifacts.

pub mod check;
pub mod config;
pub mod contract;
pub mod corpus;
pub mod error;
pub mod graph;
pub mod parse;

pub use error::{CorpusError, ErrorCode};
