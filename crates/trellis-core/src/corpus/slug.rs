//! Stable node identifiers derived from relative document paths.
//!
//! A slug is the document's relative path with the extension removed,
//! segments joined by `/`, and every byte outside the unreserved set
//! percent-encoded. Slugs are case-sensitive.

use std::path::{Component, Path};

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// Bytes left literal when encoding: unreserved characters plus `/`.
const PATH_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

/// Percent-encode `raw` as a path, keeping `/` separators literal.
#[must_use]
pub fn encode_path(raw: &str) -> String {
    utf8_percent_encode(raw, PATH_SAFE).to_string()
}

/// Percent-decode `encoded`, replacing invalid UTF-8 sequences.
#[must_use]
pub fn decode(encoded: &str) -> String {
    percent_decode_str(encoded).decode_utf8_lossy().into_owned()
}

/// Build the slug for a document at `rel_path` (relative to the corpus root).
///
/// The final segment loses its extension; `.`/`..` components are ignored.
#[must_use]
pub fn slug_for(rel_path: &Path) -> String {
    let mut segments: Vec<String> = rel_path
        .components()
        .filter_map(|component| match component {
            Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if let Some(last) = segments.last_mut() {
        let stem = Path::new(last.as_str())
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned());
        if let Some(stem) = stem {
            *last = stem;
        }
    }

    encode_path(&segments.join("/"))
}

/// Last `/`-separated segment of `path_like`.
#[must_use]
pub fn last_segment(path_like: &str) -> &str {
    path_like.rsplit('/').next().unwrap_or(path_like)
}

/// Lower-cased, decoded last segment of a slug.
#[must_use]
pub fn short_key(slug: &str) -> String {
    decode(last_segment(slug)).to_lowercase()
}

/// Directory part of a slug (everything before the final `/`), or `""`.
#[must_use]
pub fn parent_dir(slug: &str) -> &str {
    slug.rfind('/').map_or("", |idx| &slug[..idx])
}
