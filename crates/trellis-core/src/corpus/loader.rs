//! Directory walk and document decoding.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use crate::config::ScanConfig;
use crate::corpus::header::{HeaderFormat, Metadata, parse_header, split_header};
use crate::corpus::slug;
use crate::error::{CorpusError, ErrorCode};

/// One published document.
#[derive(Debug, Clone)]
pub struct Document {
    /// Path relative to the corpus root.
    pub rel_path: PathBuf,
    /// Slug derived from `rel_path`.
    pub id: String,
    /// Lower-cased decoded last segment of `id`.
    pub short_key: String,
    /// Metadata title, else the bare file name.
    pub title: String,
    pub metadata: Metadata,
    text: String,
    body_offset: usize,
}

impl Document {
    /// Build a document from already-decoded text.
    ///
    /// Returns `None` when the header unpublishes it.
    #[must_use]
    pub fn from_text(rel_path: &Path, text: String, cfg: &ScanConfig) -> Option<Self> {
        let text = match text.strip_prefix('\u{feff}') {
            Some(stripped) => stripped.to_string(),
            None => text,
        };

        let (header, body_offset) = split_header(&text);
        let metadata = header.map_or_else(Metadata::empty, parse_header);
        if !metadata.is_published(&cfg.publish_key) {
            return None;
        }

        let id = slug::slug_for(rel_path);
        let short_key = slug::short_key(&id);
        let title = metadata.string(&cfg.title_key).map_or_else(
            || {
                rel_path
                    .file_stem()
                    .map_or_else(|| id.clone(), |stem| stem.to_string_lossy().into_owned())
            },
            str::to_string,
        );

        Some(Self {
            rel_path: rel_path.to_path_buf(),
            id,
            short_key,
            title,
            metadata,
            text,
            body_offset,
        })
    }

    /// Full document text, header included.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Text after the metadata header.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.text[self.body_offset..]
    }
}

/// A per-file problem that did not abort the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileIssue {
    pub rel_path: PathBuf,
    pub code: ErrorCode,
    pub detail: String,
}

/// Outcome of loading a document tree.
#[derive(Debug, Clone)]
pub struct Corpus {
    pub root: PathBuf,
    /// Published documents in lexicographic relative-path order.
    pub documents: Vec<Document>,
    /// Number of documents skipped because their header unpublished them.
    pub unpublished: usize,
    pub issues: Vec<FileIssue>,
}

impl Corpus {
    /// Assemble a corpus from in-memory documents, sorted by path.
    #[must_use]
    pub fn from_documents(root: impl Into<PathBuf>, mut documents: Vec<Document>) -> Self {
        documents.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
        Self {
            root: root.into(),
            documents,
            unpublished: 0,
            issues: Vec::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Walk `root` and load every published document.
///
/// Excluded directories are pruned during the walk. Unreadable files and
/// walk errors are recorded as [`FileIssue`]s; invalid UTF-8 is decoded
/// lossily and also recorded.
///
/// # Errors
///
/// Returns [`CorpusError::SourceMissing`] if `root` is not a directory.
#[instrument(skip(cfg), fields(root = %root.display()))]
pub fn load_corpus(root: &Path, cfg: &ScanConfig) -> Result<Corpus, CorpusError> {
    if !root.is_dir() {
        return Err(CorpusError::SourceMissing {
            path: root.to_path_buf(),
        });
    }

    let mut documents = Vec::new();
    let mut issues = Vec::new();
    let mut unpublished = 0usize;

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| cfg.excluded_dirs.contains(name))
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let rel_path = err
                    .path()
                    .and_then(|p| p.strip_prefix(root).ok())
                    .map(Path::to_path_buf)
                    .unwrap_or_default();
                warn!(path = %rel_path.display(), error = %err, "skipping unreadable entry");
                issues.push(FileIssue {
                    rel_path,
                    code: ErrorCode::FileUnreadable,
                    detail: err.to_string(),
                });
                continue;
            }
        };

        if !entry.file_type().is_file() || !cfg.has_document_extension(entry.path()) {
            continue;
        }

        let Ok(rel_path) = entry.path().strip_prefix(root) else {
            continue;
        };
        if cfg.is_excluded(rel_path) {
            debug!(path = %rel_path.display(), "excluded");
            continue;
        }

        let Some(text) = read_text(entry.path(), rel_path, &mut issues) else {
            continue;
        };

        match Document::from_text(rel_path, text, cfg) {
            Some(doc) => {
                if doc.metadata.format == HeaderFormat::Lines && doc.metadata.fields.is_empty() {
                    let (header, _) = split_header(doc.text());
                    if header.is_some_and(|h| !h.trim().is_empty()) {
                        warn!(path = %rel_path.display(), "metadata header not understood");
                        issues.push(FileIssue {
                            rel_path: rel_path.to_path_buf(),
                            code: ErrorCode::HeaderUnparsable,
                            detail: "header yielded no fields".to_string(),
                        });
                    }
                }
                documents.push(doc);
            }
            None => unpublished += 1,
        }
    }

    documents.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));

    info!(
        documents = documents.len(),
        unpublished,
        issues = issues.len(),
        "corpus loaded"
    );

    Ok(Corpus {
        root: root.to_path_buf(),
        documents,
        unpublished,
        issues,
    })
}

fn read_text(path: &Path, rel_path: &Path, issues: &mut Vec<FileIssue>) -> Option<String> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(path = %rel_path.display(), error = %err, "skipping unreadable file");
            issues.push(FileIssue {
                rel_path: rel_path.to_path_buf(),
                code: ErrorCode::FileUnreadable,
                detail: err.to_string(),
            });
            return None;
        }
    };

    match String::from_utf8(bytes) {
        Ok(text) => Some(text),
        Err(err) => {
            warn!(path = %rel_path.display(), "invalid UTF-8, decoding lossily");
            issues.push(FileIssue {
                rel_path: rel_path.to_path_buf(),
                code: ErrorCode::FileUnreadable,
                detail: format!("lossy decode: {}", err.utf8_error()),
            });
            Some(String::from_utf8_lossy(err.as_bytes()).into_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &[u8]) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, content).expect("write");
    }

    #[test]
    fn missing_root_is_a_configuration_error() {
        let tmp = TempDir::new().expect("tmp");
        let err = load_corpus(&tmp.path().join("docs"), &ScanConfig::default())
            .expect_err("must fail");
        assert!(matches!(err, CorpusError::SourceMissing { .. }));
    }

    #[test]
    fn loads_published_markdown_in_path_order() {
        let tmp = TempDir::new().expect("tmp");
        write(tmp.path(), "b.md", b"# b");
        write(tmp.path(), "a/z.md", b"# z");
        write(tmp.path(), "a.md", b"# a");
        write(tmp.path(), "notes.txt", b"not markdown");

        let corpus = load_corpus(tmp.path(), &ScanConfig::default()).expect("load");
        let ids: Vec<&str> = corpus.documents.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a/z", "a", "b"]);
        assert!(corpus.issues.is_empty());
    }

    #[test]
    fn excluded_directories_and_files_are_skipped() {
        let tmp = TempDir::new().expect("tmp");
        write(tmp.path(), "keep.md", b"keep");
        write(tmp.path(), "_quarantine/old.md", b"old");
        write(tmp.path(), "deep/historical/x.md", b"x");
        write(tmp.path(), "deep/CLAUDE.md", b"instructions");

        let corpus = load_corpus(tmp.path(), &ScanConfig::default()).expect("load");
        let ids: Vec<&str> = corpus.documents.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["keep"]);
    }

    #[test]
    fn unpublished_documents_are_counted_not_loaded() {
        let tmp = TempDir::new().expect("tmp");
        write(tmp.path(), "draft.md", b"---\ndg-publish: false\n---\nsecret");
        write(tmp.path(), "json.md", b"---\n{\"dg-publish\": false}\n---\nsecret");
        write(tmp.path(), "live.md", b"---\ndg-publish: true\n---\nhello");

        let corpus = load_corpus(tmp.path(), &ScanConfig::default()).expect("load");
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.unpublished, 2);
        assert_eq!(corpus.documents[0].body(), "hello");
    }

    #[test]
    fn invalid_utf8_is_decoded_lossily() {
        let tmp = TempDir::new().expect("tmp");
        write(tmp.path(), "bad.md", b"hello \xff\xfe [[good]]");
        write(tmp.path(), "good.md", b"fine");

        let corpus = load_corpus(tmp.path(), &ScanConfig::default()).expect("load");
        assert_eq!(corpus.len(), 2);
        let bad = &corpus.documents[0];
        assert!(bad.text().contains('\u{fffd}'));
        assert!(bad.text().contains("[[good]]"));
        assert_eq!(corpus.issues.len(), 1);
        assert_eq!(corpus.issues[0].code, ErrorCode::FileUnreadable);
    }

    #[test]
    fn title_prefers_metadata_then_file_name() {
        let tmp = TempDir::new().expect("tmp");
        write(tmp.path(), "with.md", b"---\ntitle: Proper Title\n---\n");
        write(tmp.path(), "sub/Без назви.md", b"plain");

        let corpus = load_corpus(tmp.path(), &ScanConfig::default()).expect("load");
        let titles: Vec<&str> = corpus.documents.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["Без назви", "Proper Title"]);
    }

    #[test]
    fn bom_is_stripped_before_header_detection() {
        let doc = Document::from_text(
            Path::new("bom.md"),
            "\u{feff}---\ndg-publish: false\n---\n".to_string(),
            &ScanConfig::default(),
        );
        assert!(doc.is_none());
    }

    #[test]
    fn unparsable_header_is_reported_but_published() {
        let tmp = TempDir::new().expect("tmp");
        write(tmp.path(), "odd.md", b"---\njust some words\n---\nbody");

        let corpus = load_corpus(tmp.path(), &ScanConfig::default()).expect("load");
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.issues.len(), 1);
        assert_eq!(corpus.issues[0].code, ErrorCode::HeaderUnparsable);
    }
}
