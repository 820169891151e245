//! Asset manifest captured from the client build's HTML shell.
//!
//! Asset names are content-hashed, so they are read back from what the
//! bundler emitted rather than predicted.

use std::sync::LazyLock;

use regex::Regex;

static SCRIPT_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b[^>]*>").expect("valid script regex"));

static LINK_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<link\b[^>]*>").expect("valid link regex"));

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b([a-z-]+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid attribute regex")
});

/// Script and stylesheet URLs, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetManifest {
    pub scripts: Vec<String>,
    pub styles: Vec<String>,
}

impl AssetManifest {
    /// Parse asset references from an HTML shell, normalized against `base`.
    pub fn from_shell(html: &str, base: &str) -> Self {
        let scripts = SCRIPT_TAG
            .find_iter(html)
            .filter_map(|tag| attribute(tag.as_str(), "src"))
            .map(|src| normalize(&src, base))
            .collect();
        let styles = LINK_TAG
            .find_iter(html)
            .filter(|tag| {
                attribute(tag.as_str(), "rel")
                    .is_some_and(|rel| rel.split_whitespace().any(|r| r.eq_ignore_ascii_case("stylesheet")))
            })
            .filter_map(|tag| attribute(tag.as_str(), "href"))
            .map(|href| normalize(&href, base))
            .collect();
        Self { scripts, styles }
    }

    /// Every reference: stylesheets first, then scripts.
    pub fn refs(&self) -> Vec<String> {
        self.styles.iter().chain(&self.scripts).cloned().collect()
    }

    /// `<link>` and `<script>` tags for a page head.
    pub fn head_tags(&self) -> String {
        let mut tags = String::new();
        for href in &self.styles {
            tags.push_str("<link rel=\"stylesheet\" href=\"");
            tags.push_str(&folio_renderer::escape_html(href));
            tags.push_str("\">\n");
        }
        for src in &self.scripts {
            tags.push_str("<script type=\"module\" src=\"");
            tags.push_str(&folio_renderer::escape_html(src));
            tags.push_str("\"></script>\n");
        }
        tags
    }
}

fn attribute(tag: &str, name: &str) -> Option<String> {
    ATTRIBUTE.captures_iter(tag).find_map(|caps| {
        caps[1]
            .eq_ignore_ascii_case(name)
            .then(|| caps.get(2).or_else(|| caps.get(3)).map_or("", |m| m.as_str()).to_owned())
    })
}

/// Resolve an asset reference against the base path.
///
/// Absolute URLs and references already under `base` are kept; root-relative
/// and relative references are re-rooted at `base`.
fn normalize(reference: &str, base: &str) -> String {
    if reference.contains("://") || reference.starts_with("//") || reference.starts_with("data:") {
        return reference.to_owned();
    }
    if base != "/" && reference.starts_with(base) {
        return reference.to_owned();
    }
    let relative = reference.trim_start_matches("./").trim_start_matches('/');
    format!("{base}{relative}")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const SHELL: &str = r#"<!DOCTYPE html>
<html><head>
<link rel="icon" href="/favicon.ico">
<link rel="stylesheet" href="/assets/style-abc.css">
<script type="module" crossorigin src="./assets/app-123.js"></script>
<script>window.inline = true;</script>
</head><body><div id="app"></div></body></html>"#;

    #[test]
    fn test_parse_shell() {
        let manifest = AssetManifest::from_shell(SHELL, "/");
        assert_eq!(manifest.styles, vec!["/assets/style-abc.css"]);
        assert_eq!(manifest.scripts, vec!["/assets/app-123.js"]);
        assert_eq!(
            manifest.refs(),
            vec!["/assets/style-abc.css", "/assets/app-123.js"]
        );
    }

    #[test]
    fn test_normalize_against_base() {
        let manifest = AssetManifest::from_shell(SHELL, "/docs/");
        assert_eq!(manifest.styles, vec!["/docs/assets/style-abc.css"]);
        assert_eq!(manifest.scripts, vec!["/docs/assets/app-123.js"]);

        assert_eq!(normalize("/docs/assets/a.js", "/docs/"), "/docs/assets/a.js");
        assert_eq!(normalize("https://cdn.example.com/a.js", "/docs/"), "https://cdn.example.com/a.js");
        assert_eq!(normalize("assets/a.js", "/"), "/assets/a.js");
    }

    #[test]
    fn test_head_tags() {
        let manifest = AssetManifest {
            scripts: vec!["/a.js".to_owned()],
            styles: vec!["/s.css".to_owned()],
        };
        assert_eq!(
            manifest.head_tags(),
            "<link rel=\"stylesheet\" href=\"/s.css\">\n<script type=\"module\" src=\"/a.js\"></script>\n"
        );
    }
}
