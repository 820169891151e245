//! Machine-readable content index (`content-index.json`).

use folio_renderer::TocEntry;
use folio_site::Route;
use serde::Serialize;

/// Content index file name in the output root.
pub const CONTENT_INDEX_FILE: &str = "content-index.json";

/// One page in the content index.
#[derive(Debug, Serialize)]
pub struct ContentIndexEntry<'a> {
    /// Public URL (base included).
    pub url: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<&'a str>,
    pub toc: &'a [TocEntry],
    /// Original markdown source.
    pub content: &'a str,
}

/// Build index entries in catalog order.
pub fn entries<'a>(routes: &'a [Route], base: &str) -> Vec<ContentIndexEntry<'a>> {
    let base = base.trim_end_matches('/');
    routes
        .iter()
        .map(|route| ContentIndexEntry {
            url: format!("{base}{}", route.url_path),
            title: route.title(),
            description: route.frontmatter.description.as_deref(),
            version: route.version.as_deref(),
            locale: route.locale.as_deref(),
            toc: &route.toc,
            content: &route.raw_content,
        })
        .collect()
}

/// Serialize the content index.
pub fn render_content_index(routes: &[Route], base: &str) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&entries(routes, base))
}
