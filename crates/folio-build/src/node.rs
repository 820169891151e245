//! Abstract render tree.
//!
//! The page shell is described as a [`Node`] tree and serialized once, so the
//! static pass and the interactive first paint cannot drift apart in markup.

use folio_renderer::escape_html;

/// Elements without a closing tag.
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "link", "meta", "source"];

/// One node of the render tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// HTML element with ordered attributes.
    Element {
        /// Tag name.
        tag: &'static str,
        /// Attributes in insertion order.
        attrs: Vec<(&'static str, String)>,
        /// Child nodes.
        children: Vec<Node>,
    },
    /// Text content (escaped on output).
    Text(String),
    /// Trusted pre-rendered HTML (inserted verbatim).
    Raw(String),
}

impl Node {
    /// Create an element with no attributes or children.
    pub fn element(tag: &'static str) -> Self {
        Self::Element {
            tag,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create a text node.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Add an attribute.
    #[must_use]
    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        if let Self::Element { attrs, .. } = &mut self {
            attrs.push((name, value.into()));
        }
        self
    }

    /// Add an attribute when `condition` holds.
    #[must_use]
    pub fn attr_if(self, condition: bool, name: &'static str, value: impl Into<String>) -> Self {
        if condition { self.attr(name, value) } else { self }
    }

    /// Append a child node.
    #[must_use]
    pub fn child(mut self, node: Node) -> Self {
        if let Self::Element { children, .. } = &mut self {
            children.push(node);
        }
        self
    }

    /// Append child nodes.
    #[must_use]
    pub fn children(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        if let Self::Element { children, .. } = &mut self {
            children.extend(nodes);
        }
        self
    }

    /// Get an attribute value.
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        match self {
            Self::Element { attrs, .. } => attrs
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    /// Serialize to HTML.
    pub fn to_html(&self) -> String {
        let mut out = String::with_capacity(4096);
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Self::Text(text) => out.push_str(&escape_html(text)),
            Self::Raw(html) => out.push_str(html),
            Self::Element {
                tag,
                attrs,
                children,
            } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_html(value));
                    out.push('"');
                }
                out.push('>');
                if VOID_ELEMENTS.contains(tag) {
                    return;
                }
                for child in children {
                    child.write_html(out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_element_serialization() {
        let node = Node::element("a")
            .attr("href", "/guide?a=1&b=2")
            .attr("class", "link")
            .child(Node::text("<Guide>"));
        assert_eq!(
            node.to_html(),
            "<a href=\"/guide?a=1&amp;b=2\" class=\"link\">&lt;Guide&gt;</a>"
        );
    }

    #[test]
    fn test_void_element() {
        let node = Node::element("input").attr("type", "search");
        assert_eq!(node.to_html(), "<input type=\"search\">");
    }

    #[test]
    fn test_raw_is_verbatim() {
        let node = Node::element("div").child(Node::Raw("<p>x</p>".to_owned()));
        assert_eq!(node.to_html(), "<div><p>x</p></div>");
    }

    #[test]
    fn test_attr_if() {
        let node = Node::element("a")
            .attr_if(true, "aria-current", "page")
            .attr_if(false, "hidden", "");
        assert_eq!(node.get_attr("aria-current"), Some("page"));
        assert_eq!(node.get_attr("hidden"), None);
    }
}
