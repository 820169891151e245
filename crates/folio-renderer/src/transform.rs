//! Line-based document transformation.
//!
//! [`transform_body`] rewrites container directives and diagram fences into
//! component references using an explicit frame stack. The outline is then
//! read from the finished tree: every ATX heading in a top-level markdown run
//! outside fenced code becomes a [`TocEntry`] and gets a `{#id}` attribute.
//! Frames unwound at end of input are already back in the top level by then,
//! so their headings are outlined like any other.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::TransformError;
use crate::directive::{ContainerLine, DirectiveArgs, parse_container_line};
use crate::fence::{FenceMarker, FenceTracker};
use crate::toc::{HeadingIds, TocEntry, has_attribute_block, parse_atx_heading, slugify};
use crate::tree::{ComponentKind, ComponentReference, ContentNode, ContentTree, parse_file_tree};

/// Fence languages rendered as diagrams.
pub const DIAGRAM_LANGUAGES: &[&str] = &["mermaid", "mmd"];

/// Maximum directive nesting depth.
const MAX_NESTING: usize = 16;

static STEP_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.(?:\s+(.*))?$").expect("valid step regex"));

static INLINE_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!?\[([^\]]*)\]\([^)]*\)").expect("valid link regex"));

/// Strip inline markup from heading text for display in the outline.
fn plain_text(text: &str) -> String {
    INLINE_LINK
        .replace_all(text, "$1")
        .chars()
        .filter(|c| !matches!(c, '`' | '*'))
        .collect::<String>()
        .trim()
        .to_owned()
}

/// Outline of `body` read as plain markdown, directive markers included.
///
/// Used when directive parsing fails and the body is kept as raw text.
pub(crate) fn outline(body: &str) -> Vec<TocEntry> {
    let mut toc = Vec::new();
    anchor_run(body, &mut HeadingIds::default(), &mut toc);
    toc
}

/// Outline the top-level markdown runs of `tree`, anchoring each heading.
fn anchor_headings(tree: &mut ContentTree) -> Vec<TocEntry> {
    let mut ids = HeadingIds::default();
    let mut toc = Vec::new();
    for node in tree {
        if let ContentNode::Markdown { source } = node {
            *source = anchor_run(source, &mut ids, &mut toc);
        }
    }
    toc
}

/// Add outline entries for the headings of one markdown run.
///
/// Returns the run with `{#id}` attached to every heading that lacks one.
fn anchor_run(source: &str, ids: &mut HeadingIds, toc: &mut Vec<TocEntry>) -> String {
    let mut fences = FenceTracker::new();
    let mut out = String::with_capacity(source.len());

    for (i, line) in source.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let in_code = fences.in_fence();
        if fences.update(line).is_some() || in_code {
            out.push_str(line);
            continue;
        }
        let Some(heading) = parse_atx_heading(line) else {
            out.push_str(line);
            continue;
        };
        let text = plain_text(heading.text);
        if text.is_empty() {
            out.push_str(line);
            continue;
        }
        let id = if let Some(id) = heading.explicit_id {
            out.push_str(line);
            id.to_owned()
        } else {
            let id = ids.unique(&slugify(&text));
            out.push_str(&with_id(line, &id));
            id
        };
        toc.push(TocEntry {
            id,
            text,
            depth: heading.depth,
        });
    }

    out
}

/// Attach `{#id}` to a heading line, merging into a trailing `{...}` block.
fn with_id(line: &str, id: &str) -> String {
    if has_attribute_block(line)
        && let Some(open) = line.rfind('{')
    {
        format!("{}{{#{id} {}", &line[..open], &line[open + 1..])
    } else {
        format!("{} {{#{id}}}", line.trim_end())
    }
}

/// Transformed body plus recovered parse problems.
#[derive(Debug)]
pub(crate) struct Body {
    pub(crate) tree: ContentTree,
    /// Top-level heading outline, ids matching the anchored headings.
    pub(crate) toc: Vec<TocEntry>,
    /// Directives left open at end of input: (name, 1-based line).
    pub(crate) unterminated: Vec<(String, usize)>,
}

/// Accumulates content nodes, merging consecutive markdown lines.
#[derive(Debug, Default)]
struct Builder {
    nodes: ContentTree,
}

impl Builder {
    fn push_line(&mut self, line: &str) {
        if let Some(ContentNode::Markdown { source }) = self.nodes.last_mut() {
            source.push('\n');
            source.push_str(line);
        } else {
            self.nodes.push(ContentNode::markdown(line));
        }
    }

    fn push_node(&mut self, node: ContentNode) {
        self.nodes.push(node);
    }

    /// Splice another builder's nodes in, continuing any open markdown run.
    fn absorb(&mut self, other: Self) {
        for node in other.nodes {
            match node {
                ContentNode::Markdown { source } => self.push_line(&source),
                node => self.push_node(node),
            }
        }
    }

    /// Concatenated markdown text (used for raw-bodied directives).
    fn into_text(self) -> String {
        self.nodes
            .into_iter()
            .filter_map(|node| match node {
                ContentNode::Markdown { source } => Some(source),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn finish(self) -> ContentTree {
        self.nodes
            .into_iter()
            .filter(|node| !matches!(node, ContentNode::Markdown { source } if source.trim().is_empty()))
            .collect()
    }
}

/// What an open directive expands into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Component(ComponentKind),
    /// Unknown directive name, kept as literal text.
    Literal,
}

/// Labelled child group (tab or step).
#[derive(Debug)]
struct Group<'a> {
    label: String,
    marker_line: &'a str,
    body: Builder,
}

/// One open directive on the stack.
#[derive(Debug)]
struct Frame<'a> {
    kind: FrameKind,
    directive: String,
    title: Option<String>,
    args: DirectiveArgs,
    open_line: &'a str,
    line_no: usize,
    /// Content before the first group marker.
    lead: Builder,
    groups: Vec<Group<'a>>,
}

impl Frame<'_> {
    /// Builder receiving the next content line.
    fn current(&mut self) -> &mut Builder {
        match self.groups.last_mut() {
            Some(group) => &mut group.body,
            None => &mut self.lead,
        }
    }

    /// Body lines are collected verbatim, not parsed.
    fn is_raw(&self) -> bool {
        self.kind == FrameKind::Component(ComponentKind::FileTree)
    }

    /// Check whether `line` starts a new child group in this frame.
    fn group_label(&self, line: &str) -> Option<String> {
        match self.kind {
            FrameKind::Component(ComponentKind::TabGroup) => {
                let rest = line.trim().strip_prefix("@tab")?;
                if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
                    return None;
                }
                Some(rest.trim().to_owned())
            }
            FrameKind::Component(ComponentKind::Steps) => {
                let caps = STEP_MARKER.captures(line)?;
                Some(caps.get(1).map_or("", |m| m.as_str()).trim().to_owned())
            }
            _ => None,
        }
    }

    /// Close the frame on a matching `:::` and emit it into `parent`.
    fn close(self, close_line: &str, parent: &mut Builder) -> Result<(), TransformError> {
        let kind = match self.kind {
            FrameKind::Literal => {
                parent.push_line(self.open_line);
                parent.absorb(self.lead);
                parent.push_line(close_line);
                return Ok(());
            }
            FrameKind::Component(kind) => kind,
        };

        let mut attributes = self.args.into_attributes();
        if let Some(title) = self.title {
            attributes.insert("title".to_owned(), title.into());
        }

        let children = match kind {
            ComponentKind::Callout => {
                attributes.insert("variant".to_owned(), self.directive.into());
                self.lead.finish()
            }
            ComponentKind::TabGroup | ComponentKind::Steps => {
                let mut children = self.lead.finish();
                children.extend(self.groups.into_iter().map(|group| ContentNode::Panel {
                    label: group.label,
                    children: group.body.finish(),
                }));
                children
            }
            ComponentKind::FileTree => {
                let entries = parse_file_tree(&self.lead.into_text());
                attributes.insert("entries".to_owned(), serde_json::to_value(entries)?);
                Vec::new()
            }
        };

        parent.push_node(ContentNode::Component(ComponentReference {
            name: kind.component_name().to_owned(),
            attributes,
            children,
        }));
        Ok(())
    }

    /// Give up on an unterminated frame: restore its lines into `parent`.
    fn unwind(self, parent: &mut Builder) {
        parent.push_line(self.open_line);
        parent.absorb(self.lead);
        for group in self.groups {
            parent.push_line(group.marker_line);
            parent.absorb(group.body);
        }
    }
}

/// Open diagram fence being collected.
#[derive(Debug)]
struct Diagram<'a> {
    open_line: &'a str,
    language: String,
    lines: Vec<&'a str>,
}

impl Diagram<'_> {
    fn into_node(self) -> ContentNode {
        let attributes = BTreeMap::from([
            ("code".to_owned(), self.lines.join("\n").into()),
            ("language".to_owned(), self.language.into()),
        ]);
        ContentNode::Component(ComponentReference {
            name: "diagram".to_owned(),
            attributes,
            children: Vec::new(),
        })
    }
}

/// Parser state for one body.
struct Transformer<'a> {
    root: Builder,
    stack: Vec<Frame<'a>>,
    fences: FenceTracker,
    diagram: Option<Diagram<'a>>,
}

impl<'a> Transformer<'a> {
    fn current(&mut self) -> &mut Builder {
        match self.stack.last_mut() {
            Some(frame) => frame.current(),
            None => &mut self.root,
        }
    }

    fn close_top(&mut self, close_line: &str) -> Result<(), TransformError> {
        let Some(frame) = self.stack.pop() else {
            self.root.push_line(close_line);
            return Ok(());
        };
        frame.close(close_line, self.current())
    }

    /// Handle fence state. Returns `true` if the line was consumed.
    fn fence_line(&mut self, line: &'a str) -> bool {
        if self.diagram.is_some() {
            if self.fences.update(line) == Some(FenceMarker::Close) {
                if let Some(diagram) = self.diagram.take() {
                    let node = diagram.into_node();
                    self.current().push_node(node);
                }
            } else if let Some(diagram) = &mut self.diagram {
                diagram.lines.push(line);
            }
            return true;
        }

        if self.fences.in_fence() {
            self.fences.update(line);
            self.current().push_line(line);
            return true;
        }

        match self.fences.update(line) {
            Some(FenceMarker::Open { language })
                if DIAGRAM_LANGUAGES.contains(&language.as_str()) =>
            {
                self.diagram = Some(Diagram {
                    open_line: line,
                    language,
                    lines: Vec::new(),
                });
                true
            }
            Some(_) => {
                self.current().push_line(line);
                true
            }
            None => false,
        }
    }

    fn line(&mut self, line: &'a str, line_no: usize) -> Result<(), TransformError> {
        if self.stack.last().is_some_and(Frame::is_raw) {
            if matches!(
                parse_container_line(line, line_no),
                Ok(Some(ContainerLine::Close))
            ) {
                return self.close_top(line);
            }
            self.current().push_line(line);
            return Ok(());
        }

        if self.fence_line(line) {
            return Ok(());
        }

        match parse_container_line(line, line_no)? {
            Some(ContainerLine::Open { name, title, args }) => {
                if self.stack.len() >= MAX_NESTING {
                    return Err(TransformError::TooDeep {
                        line: line_no,
                        max: MAX_NESTING,
                    });
                }
                let kind = ComponentKind::from_directive(&name)
                    .map_or(FrameKind::Literal, FrameKind::Component);
                self.stack.push(Frame {
                    kind,
                    directive: name,
                    title,
                    args,
                    open_line: line,
                    line_no,
                    lead: Builder::default(),
                    groups: Vec::new(),
                });
            }
            Some(ContainerLine::Close) => self.close_top(line)?,
            None => {
                if let Some(frame) = self.stack.last_mut() {
                    if let Some(label) = frame.group_label(line) {
                        frame.groups.push(Group {
                            label,
                            marker_line: line,
                            body: Builder::default(),
                        });
                    } else {
                        frame.current().push_line(line);
                    }
                } else {
                    self.root.push_line(line);
                }
            }
        }
        Ok(())
    }

    fn finish(mut self) -> Body {
        if let Some(diagram) = self.diagram.take() {
            let builder = self.current();
            builder.push_line(diagram.open_line);
            for line in diagram.lines {
                builder.push_line(line);
            }
        }

        let mut unterminated = Vec::new();
        while let Some(frame) = self.stack.pop() {
            unterminated.push((frame.directive.clone(), frame.line_no));
            frame.unwind(self.current());
        }
        unterminated.reverse();

        let mut tree = self.root.finish();
        let toc = anchor_headings(&mut tree);
        Body {
            tree,
            toc,
            unterminated,
        }
    }
}

/// Transform a document body into a content tree and its outline.
pub(crate) fn transform_body(body: &str) -> Result<Body, TransformError> {
    let mut transformer = Transformer {
        root: Builder::default(),
        stack: Vec::new(),
        fences: FenceTracker::new(),
        diagram: None,
    };

    for (i, line) in body.lines().enumerate() {
        transformer.line(line, i + 1)?;
    }

    Ok(transformer.finish())
}
