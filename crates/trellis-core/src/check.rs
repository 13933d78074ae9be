//! Document integrity checker.
//!
//! A linear per-document pass that turns connectivity expectations into a
//! fix-it list. It is stricter than the graph builder on purpose: a link
//! the resolver cannot place is silently dropped from the [`LinkGraph`] but
//! reported here as a [`Rule::DanglingLink`].
//!
//! Documents carrying the configured isolation marker are exempt from the
//! section, orphan, and outbound rules; dangling and malformed links are
//! reported for every document.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::config::ScanConfig;
use crate::corpus::{Corpus, Document};
use crate::graph::{LinkGraph, Resolver};
use crate::parse::{extract_links, malformed_links, sanitize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rule {
    MissingLinksSection,
    Orphan,
    TooFewOutbound,
    DanglingLink,
    MalformedLink,
}

impl Rule {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingLinksSection => "missing-links-section",
            Self::Orphan => "orphan",
            Self::TooFewOutbound => "too-few-outbound",
            Self::DanglingLink => "dangling-link",
            Self::MalformedLink => "malformed-link",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Violation {
    /// Relative path with `/` separators.
    pub path: String,
    pub rule: Rule,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub scanned: usize,
    pub isolated: usize,
    pub orphans: usize,
    pub violation_count: usize,
    pub violations: Vec<Violation>,
}

impl CheckReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Run every rule over `corpus`. `graph` must have been built from the
/// same corpus; it supplies inbound counts.
#[instrument(skip_all, fields(documents = corpus.documents.len()))]
#[must_use]
pub fn check_corpus(corpus: &Corpus, graph: &LinkGraph, cfg: &ScanConfig) -> CheckReport {
    let resolver = Resolver::new(&corpus.documents);

    let mut inbound: BTreeMap<&str, usize> = BTreeMap::new();
    for edge in &graph.edges {
        *inbound.entry(edge.target.as_str()).or_default() += 1;
    }

    let mut report = CheckReport {
        scanned: corpus.documents.len(),
        ..CheckReport::default()
    };

    for doc in &corpus.documents {
        let path = display_path(doc);
        let isolated = doc.text().contains(cfg.isolation_marker.as_str());
        if isolated {
            report.isolated += 1;
        }

        let clean = sanitize(doc.text());
        let links: Vec<&str> = extract_links(&clean).collect();

        if !isolated {
            let has_section = cfg
                .links_section_markers
                .iter()
                .any(|marker| doc.text().contains(marker.as_str()));
            if !has_section {
                report.violations.push(Violation {
                    path: path.clone(),
                    rule: Rule::MissingLinksSection,
                    message: "no links section heading".to_string(),
                });
            }

            if inbound.get(doc.id.as_str()).copied().unwrap_or(0) == 0 {
                report.orphans += 1;
                report.violations.push(Violation {
                    path: path.clone(),
                    rule: Rule::Orphan,
                    message: "0 inbound links".to_string(),
                });
            }

            if !is_exempt(doc, cfg) && links.len() < cfg.min_outbound_links {
                report.violations.push(Violation {
                    path: path.clone(),
                    rule: Rule::TooFewOutbound,
                    message: format!(
                        "only {} outbound links (need at least {})",
                        links.len(),
                        cfg.min_outbound_links
                    ),
                });
            }
        }

        for target in &links {
            if resolver.resolve(target).is_none()
                && !cfg.external_refs.contains(&target.to_lowercase())
            {
                report.violations.push(Violation {
                    path: path.clone(),
                    rule: Rule::DanglingLink,
                    message: format!("[[{target}]] does not resolve"),
                });
            }
        }

        for bad in malformed_links(&clean) {
            report.violations.push(Violation {
                path: path.clone(),
                rule: Rule::MalformedLink,
                message: format!("[[{}]] contains a backslash", bad.raw),
            });
        }
    }

    report.violations.sort();
    report.violation_count = report.violations.len();

    for v in &report.violations {
        debug!(path = %v.path, rule = %v.rule, "{}", v.message);
    }
    info!(
        scanned = report.scanned,
        violations = report.violation_count,
        "integrity check finished"
    );

    report
}

fn display_path(doc: &Document) -> String {
    doc.rel_path
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn is_exempt(doc: &Document, cfg: &ScanConfig) -> bool {
    doc.rel_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .is_some_and(|stem| cfg.exempt_from_outbound.contains(stem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    const SECTION: &str = "## Семантичні зв'язки";

    fn run(docs: &[(&str, &str)]) -> CheckReport {
        let cfg = ScanConfig::default();
        let documents = docs
            .iter()
            .filter_map(|(p, t)| Document::from_text(Path::new(p), (*t).to_string(), &cfg))
            .collect();
        let corpus = Corpus::from_documents("/virtual", documents);
        let graph = LinkGraph::build(&corpus);
        check_corpus(&corpus, &graph, &cfg)
    }

    fn rules_for(report: &CheckReport, path: &str) -> Vec<Rule> {
        report
            .violations
            .iter()
            .filter(|v| v.path == path)
            .map(|v| v.rule)
            .collect()
    }

    #[test]
    fn well_linked_triangle_is_clean() {
        let report = run(&[
            ("a.md", &*format!("{SECTION}\n[[b]] [[c]]")),
            ("b.md", &*format!("{SECTION}\n[[a]] [[c]]")),
            ("c.md", &*format!("{SECTION}\n[[a]] [[b]]")),
        ]);
        assert!(report.is_clean(), "{:?}", report.violations);
        assert_eq!(report.scanned, 3);
        assert_eq!(report.orphans, 0);
    }

    #[test]
    fn flags_missing_section_orphan_and_outbound() {
        let report = run(&[
            ("a.md", &*format!("{SECTION}\n[[b]] [[b]]")),
            ("b.md", "[[a]]"),
        ]);
        assert_eq!(
            rules_for(&report, "b.md"),
            vec![Rule::MissingLinksSection, Rule::TooFewOutbound]
        );
        assert!(rules_for(&report, "a.md").is_empty());

        let lonely = run(&[("solo.md", SECTION)]);
        assert_eq!(
            rules_for(&lonely, "solo.md"),
            vec![Rule::Orphan, Rule::TooFewOutbound]
        );
        assert_eq!(lonely.orphans, 1);
    }

    #[test]
    fn isolated_documents_skip_connectivity_rules() {
        let report = run(&[("iso.md", "isolated: intentional\n[[nowhere]]")]);
        assert_eq!(report.isolated, 1);
        assert_eq!(rules_for(&report, "iso.md"), vec![Rule::DanglingLink]);
    }

    #[test]
    fn exempt_stems_skip_outbound_minimum() {
        let report = run(&[
            ("maps/ІНДЕКС.md", &*format!("{SECTION}\n[[a]]")),
            ("a.md", &*format!("{SECTION}\n[[ІНДЕКС]] [[maps/ІНДЕКС]]")),
        ]);
        assert!(
            !rules_for(&report, "maps/ІНДЕКС.md").contains(&Rule::TooFewOutbound),
            "{:?}",
            report.violations
        );
    }

    #[test]
    fn external_refs_are_not_dangling() {
        let report = run(&[
            ("a.md", &*format!("{SECTION}\n[[b]] [[Graph-Linter]] [[ghost]]")),
            ("b.md", &*format!("{SECTION}\n[[a]] [[a]]")),
        ]);
        let dangling: Vec<&str> = report
            .violations
            .iter()
            .filter(|v| v.rule == Rule::DanglingLink)
            .map(|v| v.message.as_str())
            .collect();
        assert_eq!(dangling, vec!["[[ghost]] does not resolve"]);
    }

    #[test]
    fn malformed_links_are_reported() {
        let report = run(&[("a.md", "isolated: intentional\n| [[b\\|alias]] |")]);
        assert_eq!(rules_for(&report, "a.md"), vec![Rule::MalformedLink]);
    }

    #[test]
    fn links_in_code_do_not_count() {
        let report = run(&[("a.md", &*format!("{SECTION}\n```\n[[ghost]]\n```\n`[[ghost2]]`"))]);
        assert!(!rules_for(&report, "a.md").contains(&Rule::DanglingLink));
    }

    #[test]
    fn violations_are_sorted_and_counted() {
        let report = run(&[("z.md", "[[x]]"), ("a.md", "[[y]]")]);
        let mut sorted = report.violations.clone();
        sorted.sort();
        assert_eq!(report.violations, sorted);
        assert_eq!(report.violation_count, report.violations.len());
    }
}
