//! Component rendering.
//!
//! Maps [`ComponentReference`] nodes from the transformed body onto markup.
//! A renderer may decline a component by returning `None`; the reference is
//! then emitted as literal directive text so nothing is silently dropped.

use folio_renderer::{ComponentReference, ContentNode, FileEntry, FileKind, markdown_to_html};
use serde_json::Value;

use crate::node::Node;

/// Renders named components into markup.
pub trait ComponentRenderer: Send + Sync {
    /// Render `component`, or return `None` to fall back to literal text.
    ///
    /// `content` renders nested content trees with the same renderer.
    fn render(&self, component: &ComponentReference, content: &Content<'_>) -> Option<Node>;
}

/// Renders content trees through a [`ComponentRenderer`].
pub struct Content<'a> {
    renderer: &'a dyn ComponentRenderer,
}

impl<'a> Content<'a> {
    pub fn new(renderer: &'a dyn ComponentRenderer) -> Self {
        Self { renderer }
    }

    /// Render a content tree to nodes.
    pub fn render(&self, tree: &[ContentNode]) -> Vec<Node> {
        tree.iter().map(|node| self.render_node(node)).collect()
    }

    fn render_node(&self, node: &ContentNode) -> Node {
        match node {
            ContentNode::Markdown { source } => Node::Raw(markdown_to_html(source)),
            ContentNode::Text { text } => Node::element("pre")
                .attr("class", "raw-text")
                .child(Node::text(text.clone())),
            ContentNode::Panel { label, children } => Node::element("section")
                .attr("class", "panel")
                .attr("data-label", label.clone())
                .children(self.render(children)),
            ContentNode::Component(component) => self
                .renderer
                .render(component, self)
                .unwrap_or_else(|| self.literal(component)),
        }
    }

    /// Literal directive text for a component nobody renders.
    fn literal(&self, component: &ComponentReference) -> Node {
        tracing::debug!(component = %component.name, "No renderer for component, emitting text");
        Node::element("div")
            .attr("class", "component-fallback")
            .attr("data-component", component.name.clone())
            .child(Node::element("p").child(Node::text(format!(":::{}", component.name))))
            .children(self.render(&component.children))
            .child(Node::element("p").child(Node::text(":::")))
    }
}

/// Built-in renderer for `callout`, `tab-group`, `steps`, `file-tree` and `diagram`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultComponents;

impl ComponentRenderer for DefaultComponents {
    fn render(&self, component: &ComponentReference, content: &Content<'_>) -> Option<Node> {
        match component.name.as_str() {
            "callout" => Some(callout(component, content)),
            "tab-group" => Some(tab_group(component, content)),
            "steps" => Some(steps(component, content)),
            "file-tree" => Some(file_tree(component)),
            "diagram" => Some(diagram(component)),
            _ => None,
        }
    }
}

fn string_attr<'a>(component: &'a ComponentReference, key: &str) -> Option<&'a str> {
    component.attributes.get(key).and_then(Value::as_str)
}

fn with_id(node: Node, component: &ComponentReference) -> Node {
    match string_attr(component, "id") {
        Some(id) => node.attr("id", id),
        None => node,
    }
}

fn class_list(base: String, component: &ComponentReference) -> String {
    match string_attr(component, "class") {
        Some(extra) => format!("{base} {extra}"),
        None => base,
    }
}

fn callout(component: &ComponentReference, content: &Content<'_>) -> Node {
    let variant = string_attr(component, "variant").unwrap_or("note");
    let mut node = with_id(
        Node::element("aside")
            .attr("class", class_list(format!("callout callout-{variant}"), component))
            .attr("role", "note"),
        component,
    );
    if let Some(title) = string_attr(component, "title") {
        node = node.child(
            Node::element("p")
                .attr("class", "callout-title")
                .child(Node::text(title)),
        );
    }
    node.child(
        Node::element("div")
            .attr("class", "callout-body")
            .children(content.render(&component.children)),
    )
}

/// Split children into leading content and labelled panels.
fn panels(children: &[ContentNode]) -> (Vec<ContentNode>, Vec<(&str, &[ContentNode])>) {
    let mut lead = Vec::new();
    let mut groups = Vec::new();
    for child in children {
        match child {
            ContentNode::Panel { label, children } => groups.push((label.as_str(), children.as_slice())),
            other => lead.push(other.clone()),
        }
    }
    (lead, groups)
}

fn tab_group(component: &ComponentReference, content: &Content<'_>) -> Node {
    let (lead, tabs) = panels(&component.children);
    let tablist = Node::element("div").attr("role", "tablist").children(
        tabs.iter().enumerate().map(|(i, (label, _))| {
            Node::element("button")
                .attr("type", "button")
                .attr("role", "tab")
                .attr("aria-selected", if i == 0 { "true" } else { "false" })
                .child(Node::text(*label))
        }),
    );
    let panes = tabs.iter().enumerate().map(|(i, (label, children))| {
        Node::element("div")
            .attr("role", "tabpanel")
            .attr("data-label", *label)
            .attr_if(i > 0, "hidden", "")
            .children(content.render(children))
    });

    with_id(
        Node::element("div").attr("class", class_list("tab-group".to_owned(), component)),
        component,
    )
    .children(content.render(&lead))
    .child(tablist)
    .children(panes)
}

fn steps(component: &ComponentReference, content: &Content<'_>) -> Node {
    let (lead, steps) = panels(&component.children);
    let items = steps.iter().enumerate().map(|(i, (label, children))| {
        let mut item = Node::element("li")
            .attr("class", "step")
            .attr("data-step", (i + 1).to_string());
        if !label.is_empty() {
            item = item.child(
                Node::element("p")
                    .attr("class", "step-title")
                    .child(Node::text(*label)),
            );
        }
        item.children(content.render(children))
    });

    with_id(
        Node::element("div").attr("class", class_list("steps".to_owned(), component)),
        component,
    )
    .children(content.render(&lead))
    .child(Node::element("ol").children(items))
}

fn file_tree(component: &ComponentReference) -> Node {
    let entries: Vec<FileEntry> = component
        .attributes
        .get("entries")
        .and_then(|value| serde_json::from_value(value.clone()).ok())
        .unwrap_or_default();
    with_id(file_list(&entries).attr("class", "file-tree"), component)
}

fn file_list(entries: &[FileEntry]) -> Node {
    Node::element("ul").children(entries.iter().map(|entry| {
        let kind = match entry.kind {
            FileKind::File => "file",
            FileKind::Dir => "dir",
        };
        let item = Node::element("li")
            .attr("data-kind", kind)
            .child(Node::element("span").child(Node::text(entry.name.clone())));
        if entry.children.is_empty() {
            item
        } else {
            item.child(file_list(&entry.children))
        }
    }))
}

fn diagram(component: &ComponentReference) -> Node {
    let language = string_attr(component, "language").unwrap_or("mermaid");
    let code = string_attr(component, "code").unwrap_or_default();
    Node::element("pre")
        .attr("class", "mermaid")
        .attr("data-language", language)
        .child(Node::text(code))
}
