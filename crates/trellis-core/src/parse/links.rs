//! Wiki-link extraction.
//!
//! Recognized form: `[[target]]` or `[[target|alias]]`. The target may not
//! contain `]`, `|`, `#`, or `\`; the alias may contain anything but `]`.
//! Only the target is yielded, trimmed. Links that fail the target rules
//! (`[[a#b]]`, `[[a\|b]]`) are not links; [`malformed_links`] reports the
//! backslash forms separately.

use serde::Serialize;

/// Lazy iterator over raw link targets in document order.
#[derive(Debug, Clone)]
pub struct LinkTargets<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Iterator for LinkTargets<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(offset) = self.text[self.pos..].find("[[") {
            let start = self.pos + offset;
            if let Some((target, end)) = match_link(self.text, start) {
                self.pos = end;
                let target = target.trim();
                if !target.is_empty() {
                    return Some(target);
                }
            } else {
                self.pos = start + 1;
            }
        }
        self.pos = self.text.len();
        None
    }
}

/// Extract link targets from already-sanitized text.
///
/// Duplicates are yielded every time they occur.
#[must_use]
pub const fn extract_links(text: &str) -> LinkTargets<'_> {
    LinkTargets { text, pos: 0 }
}

/// Try to match a link at `start` (which points at `[[`).
///
/// Returns the untrimmed target and the byte offset just past `]]`.
fn match_link(text: &str, start: usize) -> Option<(&str, usize)> {
    let inner_start = start + 2;
    let inner = &text[inner_start..];
    let target_len = inner
        .find([']', '|', '#', '\\'])
        .unwrap_or(inner.len());
    if target_len == 0 {
        return None;
    }

    let target = &inner[..target_len];
    let rest = &inner[target_len..];

    if rest.starts_with("]]") {
        return Some((target, inner_start + target_len + 2));
    }

    let alias = rest.strip_prefix('|')?;
    let alias_len = alias.find(']').unwrap_or(alias.len());
    if alias_len == 0 || !alias[alias_len..].starts_with("]]") {
        return None;
    }

    Some((target, inner_start + target_len + 1 + alias_len + 2))
}

/// Why a bracketed link was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MalformedReason {
    /// `[[target\|alias]]`: an escaped pipe left behind by table editing.
    BackslashPipe,
    BackslashInTarget,
}

/// A bracketed span rejected for backslash content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MalformedLink {
    pub raw: String,
    pub reason: MalformedReason,
}

/// Report `[[...]]` spans whose content contains a backslash.
#[must_use]
pub fn malformed_links(text: &str) -> Vec<MalformedLink> {
    let mut found = Vec::new();
    let mut pos = 0;

    while let Some(offset) = text[pos..].find("[[") {
        let inner_start = pos + offset + 2;
        let inner = &text[inner_start..];
        let Some(close) = inner.find(']') else {
            break;
        };

        let content = &inner[..close];
        if inner[close..].starts_with("]]") && content.contains('\\') && !content.contains("[[") {
            let reason = if content.contains("\\|") {
                MalformedReason::BackslashPipe
            } else {
                MalformedReason::BackslashInTarget
            };
            found.push(MalformedLink {
                raw: content.to_string(),
                reason,
            });
            pos = inner_start + close + 2;
        } else {
            pos = inner_start - 1;
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links(text: &str) -> Vec<&str> {
        extract_links(text).collect()
    }

    #[test]
    fn plain_and_aliased_links() {
        assert_eq!(links("see [[Alpha]] and [[Beta|the beta]]."), vec!["Alpha", "Beta"]);
    }

    #[test]
    fn duplicates_are_yielded_in_order() {
        assert_eq!(links("[[b]] [[a]] [[b]]"), vec!["b", "a", "b"]);
    }

    #[test]
    fn path_targets_are_kept_verbatim() {
        assert_eq!(links("[[arch/Root Doc]]"), vec!["arch/Root Doc"]);
        assert_eq!(links("[[a%20b]]"), vec!["a%20b"]);
    }

    #[test]
    fn fragment_and_backslash_targets_are_not_links() {
        assert!(links("[[Doc#Heading]]").is_empty());
        assert!(links("[[Doc\\|alias]]").is_empty());
        assert!(links("[[a\\b]]").is_empty());
    }

    #[test]
    fn empty_and_unclosed_links_are_ignored() {
        assert!(links("[[]] [[ ]] [[open").is_empty());
        assert!(links("[[a|]]").is_empty());
        assert!(links("[[a] b]]").is_empty());
    }

    #[test]
    fn targets_are_trimmed() {
        assert_eq!(links("[[  spaced  |x]]"), vec!["spaced"]);
    }

    #[test]
    fn alias_may_contain_hash_and_pipes() {
        assert_eq!(links("[[t|a#b|c]]"), vec!["t"]);
    }

    #[test]
    fn extra_opening_bracket_becomes_part_of_target() {
        assert_eq!(links("[[[x]]"), vec!["[x"]);
    }

    #[test]
    fn cyrillic_targets() {
        assert_eq!(links("[[КАРТА_ГРАФУ|карта]] [[Вузол]]"), vec!["КАРТА_ГРАФУ", "Вузол"]);
    }

    #[test]
    fn malformed_backslash_links_are_reported() {
        let found = malformed_links("ok [[fine]] bad [[Target\\|alias]] odd [[a\\b]]");
        assert_eq!(
            found,
            vec![
                MalformedLink {
                    raw: "Target\\|alias".to_string(),
                    reason: MalformedReason::BackslashPipe,
                },
                MalformedLink {
                    raw: "a\\b".to_string(),
                    reason: MalformedReason::BackslashInTarget,
                },
            ]
        );
    }
}
