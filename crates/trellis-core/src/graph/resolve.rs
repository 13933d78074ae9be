//! Link target resolution.
//!
//! Strategies are tried in order and the first hit wins:
//!
//! 1. **Exact**: the target, percent-encoded as a path, is a node id.
//! 2. **Decoded**: the target as written is a node id.
//! 3. **Case-insensitive**: the encoded target matches a node id ignoring
//!    case, or the target matches a decoded node id ignoring case.
//! 4. **Short key**: the lower-cased last segment of the target matches a
//!    document's short key; the first document in path order owns a key.
//!
//! Every index keeps the first document inserted for a key, and documents
//! are inserted in path order, so resolution is independent of hash order.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::corpus::{Document, slug};

/// Which strategy produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    Exact,
    Decoded,
    CaseInsensitive,
    ShortKey,
}

/// A resolved link target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution<'a> {
    pub id: &'a str,
    pub strategy: Strategy,
}

/// Lookup tables over the node ids of one corpus.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    ids: BTreeSet<String>,
    /// Lower-cased id → id.
    ids_folded: BTreeMap<String, String>,
    /// Lower-cased decoded id → id.
    decoded_folded: BTreeMap<String, String>,
    /// Short key → id.
    short_keys: BTreeMap<String, String>,
}

impl Resolver {
    /// Index `documents`, which must already be in deterministic path order.
    #[must_use]
    pub fn new(documents: &[Document]) -> Self {
        let mut resolver = Self::default();
        for doc in documents {
            resolver.insert(&doc.id, &doc.short_key);
        }
        resolver
    }

    /// Build from bare ids (short keys derived from the ids).
    #[must_use]
    pub fn from_ids<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        let mut resolver = Self::default();
        for id in ids {
            resolver.insert(id, &slug::short_key(id));
        }
        resolver
    }

    fn insert(&mut self, id: &str, short_key: &str) {
        if !self.ids.insert(id.to_string()) {
            return;
        }
        self.ids_folded
            .entry(id.to_lowercase())
            .or_insert_with(|| id.to_string());
        self.decoded_folded
            .entry(slug::decode(id).to_lowercase())
            .or_insert_with(|| id.to_string());
        self.short_keys
            .entry(short_key.to_string())
            .or_insert_with(|| id.to_string());
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Resolve a raw link target to a node id.
    #[must_use]
    pub fn resolve(&self, raw: &str) -> Option<Resolution<'_>> {
        let encoded = slug::encode_path(raw);

        if let Some(id) = self.ids.get(encoded.as_str()) {
            return Some(Resolution {
                id,
                strategy: Strategy::Exact,
            });
        }

        if let Some(id) = self.ids.get(raw) {
            return Some(Resolution {
                id,
                strategy: Strategy::Decoded,
            });
        }

        let folded = self
            .ids_folded
            .get(&encoded.to_lowercase())
            .or_else(|| self.decoded_folded.get(&raw.to_lowercase()));
        if let Some(id) = folded {
            return Some(Resolution {
                id,
                strategy: Strategy::CaseInsensitive,
            });
        }

        let key = slug::last_segment(raw).to_lowercase();
        self.short_keys.get(&key).map(|id| Resolution {
            id,
            strategy: Strategy::ShortKey,
        })
    }
}
