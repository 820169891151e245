//! Markdown to HTML rendering.

use pulldown_cmark::{Options, Parser, html};

/// Parser options used for every markdown block.
///
/// Heading attributes are enabled so the `{#id}` anchors attached during
/// transformation become element ids.
pub fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_GFM
        | Options::ENABLE_HEADING_ATTRIBUTES
}

/// Render a markdown block to HTML.
///
/// # Example
///
/// ```
/// use folio_renderer::markdown_to_html;
///
/// let html = markdown_to_html("## Setup {#setup}\n\n**Bold**");
/// assert!(html.contains(r#"<h2 id="setup">Setup</h2>"#));
/// assert!(html.contains("<strong>Bold</strong>"));
/// ```
pub fn markdown_to_html(source: &str) -> String {
    let parser = Parser::new_ext(source, parser_options());
    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}
