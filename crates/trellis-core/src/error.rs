use std::fmt;
use std::path::PathBuf;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    SourceMissing,
    ConfigParseError,
    FileUnreadable,
    HeaderUnparsable,
    SnapshotNotFound,
    SnapshotParseError,
    SnapshotWriteFailed,
    ReadFailed,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::SourceMissing => "E1001",
            Self::ConfigParseError => "E1002",
            Self::FileUnreadable => "E2001",
            Self::HeaderUnparsable => "E2002",
            Self::SnapshotNotFound => "E3001",
            Self::SnapshotParseError => "E3002",
            Self::SnapshotWriteFailed => "E5001",
            Self::ReadFailed => "E5002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::SourceMissing => "Source directory not found",
            Self::ConfigParseError => "Config file parse error",
            Self::FileUnreadable => "Document could not be read",
            Self::HeaderUnparsable => "Metadata header could not be parsed",
            Self::SnapshotNotFound => "Snapshot artifact not found",
            Self::SnapshotParseError => "Snapshot artifact is not valid JSON",
            Self::SnapshotWriteFailed => "Snapshot artifact write failed",
            Self::ReadFailed => "File could not be read",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::SourceMissing => Some("Pass --source <DIR> pointing at the documents root."),
            Self::ConfigParseError => Some("Fix syntax in .trellis/config.toml and retry."),
            Self::FileUnreadable => Some("Check file permissions; the file was skipped."),
            Self::HeaderUnparsable => {
                Some("Use a JSON object or `key: value` lines between the `---` fences.")
            }
            Self::SnapshotNotFound => {
                Some("Run `trellis snapshot generate` to create the snapshot first.")
            }
            Self::SnapshotParseError => {
                Some("Regenerate the snapshot with `trellis snapshot generate`.")
            }
            Self::SnapshotWriteFailed => Some("Check disk space and write permissions."),
            Self::ReadFailed => Some("Check that the path is a regular file you can read."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors raised while loading a corpus or reading/writing artifacts.
///
/// Per-file problems are not errors: they are collected as
/// [`crate::corpus::FileIssue`] entries and the batch continues.
#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    /// The configured documents root does not exist or is not a directory.
    #[error("source directory not found: {}", path.display())]
    SourceMissing { path: PathBuf },

    /// The project config file exists but is not valid TOML for [`crate::config::ProjectConfig`].
    #[error("failed to parse {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A snapshot artifact exists but could not be decoded.
    #[error("failed to parse snapshot {}: {source}", path.display())]
    ArtifactParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A config or artifact file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An artifact or its parent directory could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON encoding failed (should not happen for well-formed graphs).
    #[error("JSON encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

impl CorpusError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::SourceMissing { .. } => ErrorCode::SourceMissing,
            Self::ConfigParse { .. } => ErrorCode::ConfigParseError,
            Self::ArtifactParse { .. } => ErrorCode::SnapshotParseError,
            Self::Read { .. } => ErrorCode::ReadFailed,
            Self::Write { .. } => ErrorCode::SnapshotWriteFailed,
            Self::Encode(_) => ErrorCode::InternalUnexpected,
        }
    }

    /// Optional remediation hint for operators and agents.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }

    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}
