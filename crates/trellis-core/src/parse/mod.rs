//! Text sanitizing and wiki-link extraction.

pub mod links;
pub mod sanitize;

pub use links::{LinkTargets, MalformedLink, MalformedReason, extract_links, malformed_links};
pub use sanitize::{sanitize, strip_code};
