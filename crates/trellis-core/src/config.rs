use std::collections::BTreeSet;
use std::path::{Component, Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::CorpusError;

/// Project configuration read from `.trellis/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Static lookup tables consumed by the loader, builder, and checker.
///
/// Passed explicitly through the pipeline so tests can swap in alternate
/// exclusion sets or map keys without touching process state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Directory names excluded wherever they appear in a relative path.
    #[serde(default = "default_excluded_dirs")]
    pub excluded_dirs: BTreeSet<String>,
    /// File names excluded regardless of directory.
    #[serde(default = "default_excluded_files")]
    pub excluded_files: BTreeSet<String>,
    /// Document extension, without the leading dot.
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Metadata key whose literal `false` unpublishes a document.
    #[serde(default = "default_publish_key")]
    pub publish_key: String,
    /// Metadata key used for the node title.
    #[serde(default = "default_title_key")]
    pub title_key: String,
    /// Lower-cased short keys of map/index documents.
    #[serde(default = "default_map_keys")]
    pub map_keys: BTreeSet<String>,
    /// Stems exempt from the outbound-link minimum.
    #[serde(default = "default_exempt_from_outbound")]
    pub exempt_from_outbound: BTreeSet<String>,
    /// Lower-cased link targets known to live outside the corpus.
    #[serde(default = "default_external_refs")]
    pub external_refs: BTreeSet<String>,
    /// Headings that count as a links section.
    #[serde(default = "default_links_section_markers")]
    pub links_section_markers: Vec<String>,
    /// Marker text that opts a document out of connectivity rules.
    #[serde(default = "default_isolation_marker")]
    pub isolation_marker: String,
    #[serde(default = "default_min_outbound_links")]
    pub min_outbound_links: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            excluded_dirs: default_excluded_dirs(),
            excluded_files: default_excluded_files(),
            extension: default_extension(),
            publish_key: default_publish_key(),
            title_key: default_title_key(),
            map_keys: default_map_keys(),
            exempt_from_outbound: default_exempt_from_outbound(),
            external_refs: default_external_refs(),
            links_section_markers: default_links_section_markers(),
            isolation_marker: default_isolation_marker(),
            min_outbound_links: default_min_outbound_links(),
        }
    }
}

impl ScanConfig {
    /// Return `true` if any segment of `rel_path` is an excluded directory,
    /// or its file name is an excluded file.
    #[must_use]
    pub fn is_excluded(&self, rel_path: &Path) -> bool {
        let excluded_file = rel_path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| self.excluded_files.contains(name));
        if excluded_file {
            return true;
        }

        rel_path.components().any(|component| match component {
            Component::Normal(segment) => segment
                .to_str()
                .is_some_and(|segment| self.excluded_dirs.contains(segment)),
            _ => false,
        })
    }

    /// Return `true` if `path` carries the configured document extension.
    #[must_use]
    pub fn has_document_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.extension))
    }

    #[must_use]
    pub fn is_map_key(&self, short_key: &str) -> bool {
        self.map_keys.contains(short_key)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Preferred output mode: `pretty`, `text`, or `json`.
    #[serde(default)]
    pub format: Option<String>,
}

/// Per-user settings from `~/.config/trellis/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
}

/// Load `.trellis/config.toml` under `project_root`, or defaults if absent.
///
/// # Errors
///
/// Returns [`CorpusError::ConfigParse`] for malformed TOML and
/// [`CorpusError::Read`] when the file exists but cannot be read.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig, CorpusError> {
    let path = project_root.join(".trellis/config.toml");
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content =
        std::fs::read_to_string(&path).map_err(|source| CorpusError::read(&path, source))?;

    toml::from_str::<ProjectConfig>(&content)
        .map_err(|source| CorpusError::ConfigParse { path, source })
}

/// Load the per-user config, or defaults when there is no config directory.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("trellis/config.toml");
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Normalize a configured output mode name, accepting legacy aliases.
#[must_use]
pub fn normalize_output_mode(raw: &str) -> Option<&'static str> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pretty" | "human" => Some("pretty"),
        "text" | "table" => Some("text"),
        "json" => Some("json"),
        _ => None,
    }
}

fn string_set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn default_excluded_dirs() -> BTreeSet<String> {
    string_set(&["_quarantine", ".git", "historical"])
}

fn default_excluded_files() -> BTreeSet<String> {
    string_set(&["CLAUDE.md"])
}

fn default_extension() -> String {
    "md".to_string()
}

fn default_publish_key() -> String {
    "dg-publish".to_string()
}

fn default_title_key() -> String {
    "title".to_string()
}

fn default_map_keys() -> BTreeSet<String> {
    string_set(&["карта_системи", "карта_графу", "індекс"])
}

fn default_exempt_from_outbound() -> BTreeSet<String> {
    string_set(&[
        "КАРТА_СИСТЕМИ",
        "КАРТА_ГРАФУ",
        "ІНДЕКС",
        "АУДІО_ПРОМПТ_NOTEBOOKLM",
    ])
}

fn default_external_refs() -> BTreeSet<String> {
    string_set(&[
        "graph-linter",
        "semantic-guard",
        "content-router",
        "tag-auditor",
        "somedoc",
        "wiki-links",
        "wiki-link",
        "targetname",
        "відповідний вузол",
    ])
}

fn default_links_section_markers() -> Vec<String> {
    vec![
        "## Семантичні зв'язки".to_string(),
        "## ЗВ'ЯЗКИ".to_string(),
        "## ЗВ\\'ЯЗКИ".to_string(),
    ]
}

fn default_isolation_marker() -> String {
    "isolated: intentional".to_string()
}

const fn default_min_outbound_links() -> usize {
    2
}
