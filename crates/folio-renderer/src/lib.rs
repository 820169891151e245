//! Document transformation for Folio.
//!
//! Turns one markdown file's raw text into a [`TransformedDocument`]:
//!
//! 1. A leading `---` YAML block becomes [`Frontmatter`].
//! 2. Top-level ATX headings become the [`TocEntry`] outline.
//! 3. `:::name` container directives become [`ComponentReference`] nodes
//!    (`callout`, `tab-group`, `steps`, `file-tree`).
//! 4. `mermaid`/`mmd` code fences become `diagram` components.
//!
//! Transformation never fails as a whole: malformed syntax degrades to
//! literal text and is logged with the source file.
//!
//! # Example
//!
//! ```
//! use folio_renderer::{ContentNode, transform};
//!
//! let doc = transform("---\ntitle: Intro\n---\n# Hello\n\n:::tip\nUse it.\n:::\n", "intro.md");
//! assert_eq!(doc.frontmatter.title.as_deref(), Some("Intro"));
//! assert_eq!(doc.toc[0].id, "hello");
//! assert!(matches!(&doc.body[1], ContentNode::Component(c) if c.name == "callout"));
//! ```

mod directive;
mod fence;
mod frontmatter;
mod html;
mod toc;
mod transform;
mod tree;

pub use frontmatter::Frontmatter;
pub use html::{escape_html, markdown_to_html, parser_options};
pub use toc::{TocEntry, slugify};
pub use transform::DIAGRAM_LANGUAGES;
pub use tree::{COMPONENTS, ComponentReference, ContentNode, ContentTree, FileEntry, FileKind};

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Output of transforming one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformedDocument {
    /// Declared page metadata.
    pub frontmatter: Frontmatter,
    /// Heading outline.
    pub toc: Vec<TocEntry>,
    /// Structured body.
    pub body: ContentTree,
}

impl TransformedDocument {
    /// Sorted set of component names referenced anywhere in the body.
    pub fn components(&self) -> Vec<&str> {
        let mut names = BTreeSet::new();
        collect_components(&self.body, &mut names);
        names.into_iter().collect()
    }
}

fn collect_components<'a>(tree: &'a [ContentNode], names: &mut BTreeSet<&'a str>) {
    for node in tree {
        match node {
            ContentNode::Component(component) => {
                names.insert(component.name.as_str());
                collect_components(&component.children, names);
            }
            ContentNode::Panel { children, .. } => collect_components(children, names),
            ContentNode::Markdown { .. } | ContentNode::Text { .. } => {}
        }
    }
}

/// Error raised while transforming directive syntax.
///
/// Never escapes [`transform`]; it triggers the raw-text fallback.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// A `[title]` or `{attrs}` group on a directive line never closes.
    #[error("line {line}: unbalanced '{delimiter}' in directive")]
    Unbalanced {
        /// 1-based line number.
        line: usize,
        /// Opening delimiter.
        delimiter: char,
    },
    /// Directives nested deeper than the supported limit.
    #[error("line {line}: directives nested deeper than {max} levels")]
    TooDeep {
        /// 1-based line number.
        line: usize,
        /// Nesting limit.
        max: usize,
    },
    /// Component attributes could not be serialized.
    #[error("invalid component attributes: {0}")]
    Attributes(#[from] serde_json::Error),
}

/// Transform one document's raw text.
///
/// `source` names the file in diagnostics. Invalid frontmatter is ignored
/// with a warning; a directive parse failure falls back to a single
/// [`ContentNode::Text`] holding the body, keeping frontmatter and outline.
pub fn transform(raw: &str, source: &str) -> TransformedDocument {
    let (yaml, body) = frontmatter::split(raw);

    let frontmatter = match yaml.map(frontmatter::parse).transpose() {
        Ok(frontmatter) => frontmatter.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(file = source, error = %e, "Invalid frontmatter, ignoring");
            Frontmatter::default()
        }
    };

    let (body, toc) = match transform::transform_body(body) {
        Ok(out) => {
            for (directive, line) in out.unterminated {
                tracing::warn!(
                    file = source,
                    directive = %directive,
                    line,
                    "Unterminated directive, leaving as text"
                );
            }
            (out.tree, out.toc)
        }
        Err(e) => {
            tracing::warn!(file = source, error = %e, "Failed to transform document, emitting raw text");
            let text = vec![ContentNode::Text {
                text: body.to_owned(),
            }];
            (text, transform::outline(body))
        }
    };

    TransformedDocument {
        frontmatter,
        toc,
        body,
    }
}

/// Escape text for embedding inside a template literal.
///
/// Backslash, backtick and `$` are each prefixed with a backslash.
///
/// # Examples
///
/// ```
/// use folio_renderer::escape_template_literal;
///
/// assert_eq!(escape_template_literal("a`b${c}\\d"), "a\\`b\\${c}\\\\d");
/// ```
pub fn escape_template_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '`' | '$') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_transform_without_frontmatter() {
        let doc = transform("# Hello\nWorld", "hello.md");
        assert!(doc.frontmatter.is_empty());
        assert_eq!(doc.toc.len(), 1);
        assert_eq!(
            doc.body,
            vec![ContentNode::Markdown {
                source: "# Hello {#hello}\nWorld".to_owned()
            }]
        );
    }

    #[test]
    fn test_invalid_frontmatter_is_dropped() {
        let doc = transform("---\ntitle: [oops\n---\n# Body\n", "bad.md");
        assert!(doc.frontmatter.is_empty());
        assert_eq!(doc.toc[0].text, "Body");
    }

    #[test]
    fn test_parse_failure_falls_back_to_text() {
        let raw = "---\ntitle: Broken\n---\n# Heading\n:::info{#unclosed\nbody\n:::\n";
        let doc = transform(raw, "broken.md");
        assert_eq!(doc.frontmatter.title.as_deref(), Some("Broken"));
        assert_eq!(doc.toc.len(), 1);
        assert_eq!(
            doc.body,
            vec![ContentNode::Text {
                text: "# Heading\n:::info{#unclosed\nbody\n:::\n".to_owned()
            }]
        );
    }

    #[test]
    fn test_unterminated_directive_keeps_following_siblings() {
        let doc = transform(":::warning\nopen\n\n## Later\n\n:::note\nclosed\n:::\n", "x.md");
        assert_eq!(doc.body.len(), 2);
        assert!(matches!(&doc.body[0], ContentNode::Markdown { source } if source.contains("## Later")));
        assert!(matches!(&doc.body[1], ContentNode::Component(c) if c.attributes["variant"] == "note"));
        assert_eq!(doc.toc[0].id, "later");
    }

    #[test]
    fn test_outline_matches_anchored_headings_after_unterminated_directive() {
        let doc = transform("# Title\n:::tip\nhint\n\n## Later\n\n## Another\n", "open.md");
        let ids: Vec<&str> = doc.toc.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["title", "later", "another"]);
        let ContentNode::Markdown { source } = &doc.body[0] else {
            panic!("expected markdown");
        };
        for id in ids {
            assert!(source.contains(&format!("{{#{id}}}")), "{id} not anchored in {source}");
        }
    }

    #[test]
    fn test_component_names_stay_in_closed_set() {
        let raw = ":::info\na\n:::\n:::tabs\n@tab x\ny\n:::\n:::steps\n1. a\n:::\n:::tree\nf\n:::\n```mermaid\nA\n```\n:::custom\nz\n:::\n";
        let doc = transform(raw, "all.md");
        let names: Vec<&str> = doc
            .body
            .iter()
            .filter_map(|node| match node {
                ContentNode::Component(c) => Some(c.name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["callout", "tab-group", "steps", "file-tree", "diagram"]);
        assert!(names.iter().all(|n| COMPONENTS.contains(n)));
        assert_eq!(
            doc.components(),
            vec!["callout", "diagram", "file-tree", "steps", "tab-group"]
        );
    }

    #[test]
    fn test_components_include_nested() {
        let doc = transform(":::tabs\n@tab A\n```mermaid\nA-->B\n```\n:::\n", "nested.md");
        assert_eq!(doc.components(), vec!["diagram", "tab-group"]);
        assert!(transform("plain", "plain.md").components().is_empty());
    }

    #[test]
    fn test_escape_template_literal() {
        assert_eq!(escape_template_literal("plain"), "plain");
        assert_eq!(escape_template_literal("`$\\"), "\\`\\$\\\\");
    }
}
