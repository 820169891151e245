//! Frontmatter extraction.
//!
//! A document may start with a YAML block delimited by `---` lines:
//!
//! ```text
//! ---
//! title: Getting Started
//! description: First steps
//! sidebar: false
//! ---
//! # Body
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Declared page metadata.
///
/// `title` and `description` are typed; every other key lands in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frontmatter {
    /// Page title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Page description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Free-form keys not covered above.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Frontmatter {
    /// Check whether no metadata was declared.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.extra.is_empty()
    }
}

/// Frontmatter block delimiter.
const DELIMITER: &str = "---";

/// Split a leading frontmatter block from the document body.
///
/// Returns the raw YAML (if a complete block is present) and the body.
/// An opening delimiter without a closing one is treated as ordinary content.
pub(crate) fn split(raw: &str) -> (Option<&str>, &str) {
    let text = raw.strip_prefix('\u{feff}').unwrap_or(raw);

    let Some(first_end) = text.find('\n') else {
        return (None, raw);
    };
    if text[..first_end].trim_end() != DELIMITER {
        return (None, raw);
    }

    let yaml_start = first_end + 1;
    let mut offset = yaml_start;
    for line in text[yaml_start..].split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            let yaml = &text[yaml_start..offset];
            let body = &text[offset + line.len()..];
            return (Some(yaml), body);
        }
        offset += line.len();
    }

    (None, raw)
}

/// Parse a YAML block into [`Frontmatter`].
pub(crate) fn parse(yaml: &str) -> Result<Frontmatter, serde_yaml::Error> {
    if yaml.trim().is_empty() {
        return Ok(Frontmatter::default());
    }
    serde_yaml::from_str(yaml)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_split_without_block() {
        let (yaml, body) = split("# Hello\n");
        assert_eq!(yaml, None);
        assert_eq!(body, "# Hello\n");
    }

    #[test]
    fn test_split_with_block() {
        let (yaml, body) = split("---\ntitle: Hi\n---\n# Body\n");
        assert_eq!(yaml, Some("title: Hi\n"));
        assert_eq!(body, "# Body\n");
    }

    #[test]
    fn test_split_crlf_block() {
        let (yaml, body) = split("---\r\ntitle: Hi\r\n---\r\nBody");
        assert_eq!(yaml, Some("title: Hi\r\n"));
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_split_unclosed_block_is_content() {
        let raw = "---\ntitle: Hi\n# Body\n";
        let (yaml, body) = split(raw);
        assert_eq!(yaml, None);
        assert_eq!(body, raw);
    }

    #[test]
    fn test_split_thematic_break_later_is_ignored() {
        let raw = "Intro\n---\n";
        assert_eq!(split(raw), (None, raw));
    }

    #[test]
    fn test_parse_typed_and_extra_keys() {
        let fm = parse("title: Setup\ndescription: How to\norder: 3\ntags: [a, b]\n").unwrap();
        assert_eq!(fm.title.as_deref(), Some("Setup"));
        assert_eq!(fm.description.as_deref(), Some("How to"));
        assert_eq!(fm.extra.get("order"), Some(&serde_json::json!(3)));
        assert_eq!(fm.extra.get("tags"), Some(&serde_json::json!(["a", "b"])));
    }

    #[test]
    fn test_parse_empty_block() {
        assert!(parse("\n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_malformed_yaml() {
        assert!(parse("title: [unterminated\n").is_err());
    }
}
