//! Code-region stripping.
//!
//! Fenced blocks and inline code spans are deleted whole so that link-like
//! text inside them is never extracted.

use crate::corpus::header::split_header;

/// Remove the metadata header and every code region from `text`.
#[must_use]
pub fn sanitize(text: &str) -> String {
    let (_, body_offset) = split_header(text);
    strip_code(&text[body_offset..])
}

/// Remove fenced blocks, then inline code spans.
#[must_use]
pub fn strip_code(text: &str) -> String {
    strip_inline_code(&strip_fences(text))
}

/// Delete fenced regions.
///
/// A fence opens on a line starting (after indentation) with three or more
/// backticks and no further backtick on the line, and closes on a line
/// consisting of at least as many backticks. An opener with no closing line
/// is ordinary text.
#[must_use]
pub fn strip_fences(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while !rest.is_empty() {
        let Some((opener, width)) = find_opener(rest) else {
            out.push_str(rest);
            break;
        };
        out.push_str(&rest[..opener.start]);
        let body = &rest[opener.end..];
        if let Some(close_end) = find_closer(body, width) {
            rest = &body[close_end..];
            continue;
        }
        out.push_str(&rest[opener]);
        rest = body;
    }

    out
}

/// Byte range of the first opening fence line in `text`, with its width.
fn find_opener(text: &str) -> Option<(std::ops::Range<usize>, usize)> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']).trim_start();
        let ticks = content.chars().take_while(|&c| c == '`').count();
        if ticks >= 3 && !content[ticks..].contains('`') {
            return Some((offset..offset + line.len(), ticks));
        }
        offset += line.len();
    }
    None
}

/// End offset of the line closing a fence of `width` backticks.
fn find_closer(text: &str, width: usize) -> Option<usize> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        offset += line.len();
        let content = line.trim_end_matches(['\n', '\r']).trim_start();
        let ticks = content.chars().take_while(|&c| c == '`').count();
        if ticks >= width && content[ticks..].trim().is_empty() {
            return Some(offset);
        }
    }
    None
}

/// Delete backtick spans that contain no newline and no backtick.
#[must_use]
pub fn strip_inline_code(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('`') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let span_end = after
            .find(['`', '\n'])
            .filter(|&end| end > 0 && after.as_bytes()[end] == b'`');

        if let Some(end) = span_end {
            rest = &after[end + 1..];
        } else {
            out.push('`');
            rest = after;
        }
    }
    out.push_str(rest);
    out
}
