use serde::{Deserialize, Serialize};

use crate::config::ScanConfig;
use crate::corpus::slug;
use crate::graph::Node;

/// Advisory edge classification for the renderer.
///
/// Evaluated in order: `Structural` when either endpoint is a map/index
/// document, `Semantic` when both live in the same directory, otherwise
/// `Navigational`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeType {
    Structural,
    Semantic,
    Navigational,
}

impl EdgeType {
    /// Structural edges fan out from maps to everything; the renderer hides
    /// them until asked.
    #[must_use]
    pub const fn default_visible(self) -> bool {
        !matches!(self, Self::Structural)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Structural => "structural",
            Self::Semantic => "semantic",
            Self::Navigational => "navigational",
        }
    }
}

#[must_use]
pub fn classify_edge(source: &Node, target: &Node, cfg: &ScanConfig) -> EdgeType {
    if cfg.is_map_key(&source.short_key) || cfg.is_map_key(&target.short_key) {
        EdgeType::Structural
    } else if slug::parent_dir(&source.id) == slug::parent_dir(&target.id) {
        EdgeType::Semantic
    } else {
        EdgeType::Navigational
    }
}
