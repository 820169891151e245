//! Heading outline extraction.
//!
//! Collects ATX headings (`# Title`) into [`TocEntry`] records with stable,
//! de-duplicated slugs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Table of contents entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Anchor id (unique within the document).
    pub id: String,
    /// Heading text.
    pub text: String,
    /// Heading level (1-6).
    pub depth: u8,
}

/// Generate a URL-safe slug from heading text.
///
/// Lowercases, drops everything except word characters, whitespace and
/// hyphens, then turns each whitespace run into a single hyphen.
///
/// # Examples
///
/// ```
/// use folio_renderer::slugify;
///
/// assert_eq!(slugify("Getting Started"), "getting-started");
/// assert_eq!(slugify("What's new in v2.0?"), "whats-new-in-v20");
/// assert_eq!(slugify("snake_case & kebab-case"), "snake_case-kebab-case");
/// ```
pub fn slugify(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.trim().chars() {
        if c.is_whitespace() {
            pending_dash = !result.is_empty();
        } else if c.is_alphanumeric() || c == '_' || c == '-' {
            if pending_dash {
                result.push('-');
                pending_dash = false;
            }
            result.extend(c.to_lowercase());
        }
    }

    result
}

/// Fallback slug for headings without any word characters.
const EMPTY_SLUG: &str = "section";

/// Assigns unique heading ids in document order.
#[derive(Debug, Default)]
pub(crate) struct HeadingIds {
    /// Counter for generating unique heading IDs.
    id_counts: HashMap<String, usize>,
}

impl HeadingIds {
    /// Return a unique id for `base`: `base`, then `base-1`, `base-2`, ...
    pub(crate) fn unique(&mut self, base: &str) -> String {
        let base = if base.is_empty() { EMPTY_SLUG } else { base };
        let count = self.id_counts.entry(base.to_owned()).or_insert(0);
        let id = if *count == 0 {
            base.to_owned()
        } else {
            format!("{base}-{count}")
        };
        *count += 1;
        id
    }
}

/// ATX heading parsed from a single line.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct AtxHeading<'a> {
    pub(crate) depth: u8,
    pub(crate) text: &'a str,
    /// Explicit `{#id}` already attached to the heading.
    pub(crate) explicit_id: Option<&'a str>,
}

/// Parse a line as an ATX heading.
///
/// Up to three leading spaces are allowed; the marker must be followed by
/// whitespace or end of line. Closing `#` sequences are dropped.
pub(crate) fn parse_atx_heading(line: &str) -> Option<AtxHeading<'_>> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return None;
    }
    let rest = &line[indent..];
    let hashes = rest.chars().take_while(|&c| c == '#').count();
    if !(1..=6).contains(&hashes) {
        return None;
    }
    let after = &rest[hashes..];
    if !after.is_empty() && !after.starts_with([' ', '\t']) {
        return None;
    }

    let mut text = after.trim();
    let closing = text.trim_end_matches('#');
    if closing.is_empty() || closing.ends_with([' ', '\t']) {
        text = closing.trim_end();
    }

    let (text, explicit_id) = split_attribute_block(text);

    Some(AtxHeading {
        depth: u8::try_from(hashes).ok()?,
        text,
        explicit_id,
    })
}

/// Split a trailing `{...}` attribute block off heading text.
///
/// Returns the text and the `#id` inside the block, if any.
fn split_attribute_block(text: &str) -> (&str, Option<&str>) {
    let Some(stripped) = text.strip_suffix('}') else {
        return (text, None);
    };
    let Some(open) = stripped.rfind('{') else {
        return (text, None);
    };
    let id = stripped[open + 1..]
        .split_whitespace()
        .find_map(|part| part.strip_prefix('#'))
        .filter(|id| !id.is_empty());
    (stripped[..open].trim_end(), id)
}

/// Check whether heading text already carries an attribute block.
pub(crate) fn has_attribute_block(line: &str) -> bool {
    let trimmed = line.trim_end();
    trimmed.ends_with('}') && trimmed.contains('{')
}
