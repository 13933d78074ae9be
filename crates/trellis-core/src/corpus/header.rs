//! Metadata header detection and parsing.
//!
//! A header is the region between an opening line of exactly `---` at the
//! top of the document and the next line of exactly `---`. The content is
//! tried as a JSON object, then as a YAML mapping, then as naive
//! `key: value` lines.

use std::collections::BTreeMap;

use serde_json::Value;

/// How a header was decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderFormat {
    /// No header fences present.
    Absent,
    Json,
    Yaml,
    /// Fallback line scan.
    Lines,
}

/// Parsed metadata fields of one document.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    pub fields: BTreeMap<String, Value>,
    pub format: HeaderFormat,
}

impl Metadata {
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            fields: BTreeMap::new(),
            format: HeaderFormat::Absent,
        }
    }

    /// A document is published unless `key` is literally `false`.
    #[must_use]
    pub fn is_published(&self, key: &str) -> bool {
        !matches!(self.fields.get(key), Some(Value::Bool(false)))
    }

    /// Non-empty string value for `key`, trimmed.
    #[must_use]
    pub fn string(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Split `text` into `(header, body_offset)`.
///
/// `header` is the raw text between the fences; `body_offset` is the byte
/// offset where the body starts. Without a closed header the body is the
/// whole text.
#[must_use]
pub fn split_header(text: &str) -> (Option<&str>, usize) {
    let Some(first_end) = text.find('\n') else {
        return (None, 0);
    };
    if !is_fence(&text[..first_end]) {
        return (None, 0);
    }

    let header_start = first_end + 1;
    let mut cursor = header_start;
    while cursor <= text.len() {
        let line_end = text[cursor..].find('\n').map_or(text.len(), |i| cursor + i);
        if is_fence(&text[cursor..line_end]) {
            let header = &text[header_start..cursor.max(header_start)];
            let header = header.strip_suffix('\n').unwrap_or(header);
            let body_offset = (line_end + 1).min(text.len());
            return (Some(header), body_offset);
        }
        if line_end == text.len() {
            break;
        }
        cursor = line_end + 1;
    }

    (None, 0)
}

fn is_fence(line: &str) -> bool {
    line.trim_end_matches('\r') == "---"
}

/// Parse header content into metadata fields.
///
/// Never fails: content that none of the strategies understand yields an
/// empty field map tagged [`HeaderFormat::Lines`].
#[must_use]
pub fn parse_header(header: &str) -> Metadata {
    let trimmed = header.trim();

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) {
        return Metadata {
            fields: map.into_iter().collect(),
            format: HeaderFormat::Json,
        };
    }

    if let Some(fields) = parse_yaml(trimmed) {
        return Metadata {
            fields,
            format: HeaderFormat::Yaml,
        };
    }

    Metadata {
        fields: parse_lines(trimmed),
        format: HeaderFormat::Lines,
    }
}

fn parse_yaml(yaml: &str) -> Option<BTreeMap<String, Value>> {
    let yaml_value: serde_yaml::Value = serde_yaml::from_str(yaml).ok()?;
    let json_value: Value = serde_json::to_value(yaml_value).ok()?;

    match json_value {
        Value::Object(map) => Some(map.into_iter().collect()),
        _ => None,
    }
}

fn parse_lines(content: &str) -> BTreeMap<String, Value> {
    let mut fields = BTreeMap::new();
    for line in content.lines() {
        let Some(colon) = line.find(':') else {
            continue;
        };
        if colon == 0 {
            continue;
        }
        let key = line[..colon].trim();
        let raw = line[colon + 1..].trim();
        fields.insert(key.to_string(), scalar(raw));
    }
    fields
}

fn scalar(raw: &str) -> Value {
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" => Value::Null,
        _ if raw.starts_with('[') && raw.ends_with(']') => {
            serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
        }
        _ if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') => {
            Value::String(raw[1..raw.len() - 1].to_string())
        }
        _ => Value::String(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_header_means_whole_text_is_body() {
        let text = "# Title\nbody";
        assert_eq!(split_header(text), (None, 0));
    }

    #[test]
    fn unclosed_header_is_body() {
        let text = "---\ntitle: x\nno closing fence";
        assert_eq!(split_header(text), (None, 0));
    }

    #[test]
    fn header_and_body_are_split() {
        let text = "---\ntitle: Hello\n---\nbody line\n";
        let (header, offset) = split_header(text);
        assert_eq!(header, Some("title: Hello"));
        assert_eq!(&text[offset..], "body line\n");
    }

    #[test]
    fn empty_header_is_recognized() {
        let text = "---\n---\nbody";
        let (header, offset) = split_header(text);
        assert_eq!(header, Some(""));
        assert_eq!(&text[offset..], "body");
    }

    #[test]
    fn crlf_fences_are_accepted() {
        let text = "---\r\ntitle: x\r\n---\r\nbody";
        let (header, offset) = split_header(text);
        assert!(header.is_some());
        assert_eq!(&text[offset..], "body");
    }

    #[test]
    fn header_at_end_of_file() {
        let text = "---\ndg-publish: false\n---";
        let (header, offset) = split_header(text);
        assert_eq!(header, Some("dg-publish: false"));
        assert_eq!(&text[offset..], "");
    }

    #[test]
    fn json_header_is_tried_first() {
        let meta = parse_header(r#"{"title": "Json Title", "dg-publish": false}"#);
        assert_eq!(meta.format, HeaderFormat::Json);
        assert_eq!(meta.string("title"), Some("Json Title"));
        assert!(!meta.is_published("dg-publish"));
    }

    #[test]
    fn yaml_header_parses_lists() {
        let meta = parse_header("title: Notes\ntags:\n  - a\n  - b\ndg-publish: true");
        assert_eq!(meta.format, HeaderFormat::Yaml);
        assert_eq!(meta.string("title"), Some("Notes"));
        assert!(meta.is_published("dg-publish"));
        assert_eq!(meta.fields["tags"], serde_json::json!(["a", "b"]));
    }

    #[test]
    fn invalid_yaml_falls_back_to_line_scan() {
        // Tab indentation and a bare colon value are invalid YAML.
        let meta = parse_header("title: A: B\n\tbroken: [\ndg-publish: false");
        assert_eq!(meta.format, HeaderFormat::Lines);
        assert_eq!(meta.string("title"), Some("A: B"));
        assert!(!meta.is_published("dg-publish"));
    }

    #[test]
    fn missing_flag_defaults_to_published() {
        let meta = parse_header("title: x");
        assert!(meta.is_published("dg-publish"));
        assert!(Metadata::empty().is_published("dg-publish"));
    }

    #[test]
    fn string_false_does_not_unpublish() {
        let meta = parse_header(r#"{"dg-publish": "false"}"#);
        assert!(meta.is_published("dg-publish"));
    }

    #[test]
    fn blank_title_is_ignored() {
        let meta = parse_header("title: \"  \"");
        assert_eq!(meta.string("title"), None);
    }
}
