//! Structured document body.

use std::collections::BTreeMap;
use std::iter::Peekable;

use serde::{Deserialize, Serialize};

/// Ordered sequence of block nodes.
pub type ContentTree = Vec<ContentNode>;

/// One block in a transformed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ContentNode {
    /// Plain markdown source, rendered as `CommonMark`.
    Markdown {
        /// Markdown text.
        source: String,
    },
    /// Opaque text emitted verbatim (escaped) without markdown processing.
    Text {
        /// Literal text.
        text: String,
    },
    /// Custom block resolved to a named component.
    Component(ComponentReference),
    /// Labelled child group of a `tab-group` or `steps` component.
    Panel {
        /// Tab label or step title.
        label: String,
        /// Panel body.
        children: ContentTree,
    },
}

impl ContentNode {
    pub(crate) fn markdown(source: impl Into<String>) -> Self {
        Self::Markdown {
            source: source.into(),
        }
    }
}

/// Reference to a component from the closed set in [`COMPONENTS`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentReference {
    /// Component name.
    pub name: String,
    /// Component attributes.
    pub attributes: BTreeMap<String, serde_json::Value>,
    /// Nested content.
    pub children: ContentTree,
}

/// Every component name a transformed document may reference.
pub const COMPONENTS: &[&str] = &["callout", "tab-group", "steps", "file-tree", "diagram"];

/// Components a directive expands into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ComponentKind {
    Callout,
    TabGroup,
    Steps,
    FileTree,
}

impl ComponentKind {
    /// Map a directive name to its component.
    pub(crate) fn from_directive(name: &str) -> Option<Self> {
        match name {
            "info" | "warning" | "tip" | "danger" | "note" => Some(Self::Callout),
            "tabs" => Some(Self::TabGroup),
            "steps" => Some(Self::Steps),
            "tree" | "file-tree" | "files" => Some(Self::FileTree),
            _ => None,
        }
    }

    pub(crate) fn component_name(self) -> &'static str {
        match self {
            Self::Callout => "callout",
            Self::TabGroup => "tab-group",
            Self::Steps => "steps",
            Self::FileTree => "file-tree",
        }
    }
}

/// Entry of a `file-tree` component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// File or directory name.
    pub name: String,
    /// Entry kind.
    pub kind: FileKind,
    /// Nested entries (directories only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FileEntry>,
}

/// Kind of a [`FileEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// Regular file.
    File,
    /// Directory.
    Dir,
}

/// Parse an indented listing into nested file entries.
///
/// Each non-blank line is one entry; list bullets (`-`, `*`, `+`) are
/// ignored, indentation sets nesting, and a trailing `/` marks a directory.
/// An entry with children is a directory even without the slash.
pub(crate) fn parse_file_tree(body: &str) -> Vec<FileEntry> {
    let mut lines = body.lines().filter_map(parse_entry_line).peekable();
    collect_level(&mut lines, None)
}

/// Parse one listing line into its indent and entry.
fn parse_entry_line(line: &str) -> Option<(usize, FileEntry)> {
    let content = line.trim_start();
    let indent = line.len() - content.len();
    let name = content
        .strip_prefix(['-', '*', '+'])
        .map_or(content, str::trim_start)
        .trim_end();
    if name.is_empty() {
        return None;
    }

    let (name, kind) = match name.strip_suffix('/') {
        Some(dir) => (dir, FileKind::Dir),
        None => (name, FileKind::File),
    };
    Some((
        indent,
        FileEntry {
            name: name.to_owned(),
            kind,
            children: Vec::new(),
        },
    ))
}

/// Collect consecutive entries indented deeper than `parent_indent`.
fn collect_level<I>(lines: &mut Peekable<I>, parent_indent: Option<usize>) -> Vec<FileEntry>
where
    I: Iterator<Item = (usize, FileEntry)>,
{
    let mut entries = Vec::new();
    while let Some((indent, mut entry)) =
        lines.next_if(|(indent, _)| parent_indent.is_none_or(|parent| *indent > parent))
    {
        entry.children = collect_level(lines, Some(indent));
        if !entry.children.is_empty() {
            entry.kind = FileKind::Dir;
        }
        entries.push(entry);
    }
    entries
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn file(name: &str) -> FileEntry {
        FileEntry {
            name: name.to_owned(),
            kind: FileKind::File,
            children: Vec::new(),
        }
    }

    fn dir(name: &str, children: Vec<FileEntry>) -> FileEntry {
        FileEntry {
            name: name.to_owned(),
            kind: FileKind::Dir,
            children,
        }
    }

    #[test]
    fn test_directive_mapping() {
        for name in ["info", "warning", "tip", "danger", "note"] {
            assert_eq!(ComponentKind::from_directive(name), Some(ComponentKind::Callout));
        }
        assert_eq!(ComponentKind::from_directive("tabs"), Some(ComponentKind::TabGroup));
        assert_eq!(ComponentKind::from_directive("files"), Some(ComponentKind::FileTree));
        assert_eq!(ComponentKind::from_directive("video"), None);
    }

    #[test]
    fn test_component_names_are_closed_set() {
        for kind in [
            ComponentKind::Callout,
            ComponentKind::TabGroup,
            ComponentKind::Steps,
            ComponentKind::FileTree,
        ] {
            assert!(COMPONENTS.contains(&kind.component_name()));
        }
    }

    #[test]
    fn test_parse_file_tree_nesting() {
        let entries = parse_file_tree("src/\n  main.rs\n  lib/\n    mod.rs\nCargo.toml\n");
        assert_eq!(
            entries,
            vec![
                dir("src", vec![file("main.rs"), dir("lib", vec![file("mod.rs")])]),
                file("Cargo.toml"),
            ]
        );
    }

    #[test]
    fn test_parse_file_tree_bullets_and_implicit_dir() {
        let entries = parse_file_tree("- docs\n  - index.md\n- README.md\n");
        assert_eq!(
            entries,
            vec![dir("docs", vec![file("index.md")]), file("README.md")]
        );
    }

    #[test]
    fn test_parse_file_tree_empty() {
        assert!(parse_file_tree("\n   \n").is_empty());
    }
}
