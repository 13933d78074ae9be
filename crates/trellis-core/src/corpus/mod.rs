//! Document corpus: directory walk, metadata headers, and slugs.
//!
//! ```text
//! root/
//!   ├─ arch/Root.md        → id "arch/Root", short key "root"
//!   ├─ _quarantine/old.md  → excluded (any segment match)
//!   └─ draft.md            → skipped when `dg-publish: false`
//! ```

pub mod header;
pub mod loader;
pub mod slug;

pub use header::{HeaderFormat, Metadata};
pub use loader::{Corpus, Document, FileIssue, load_corpus};
