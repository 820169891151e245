//! Static page document around prerendered shell markup.


use folio_renderer::escape_html;

use crate::manifest::AssetManifest;
use crate::server::RenderedPage;
use crate::site_data::SiteMeta;

/// Head metadata for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageHead {
    pub lang: String,
    pub title: String,
    /// Omitted from the document when empty.
    pub description: String,
}

impl PageHead {
    /// Derive head metadata, falling back to site-level values.
    ///
    /// - title: `"<frontmatter title> | <site title>"`, or the site title
    /// - description: frontmatter description, or the site description
    /// - lang: route locale, then the default locale, then `en`
    pub fn new(site: &SiteMeta, page: &RenderedPage, locale: Option<&str>) -> Self {
        let title = match page.frontmatter.title.as_deref() {
            Some(title) if !title.is_empty() && title != site.title => {
                format!("{title} | {}", site.title)
            }
            _ => site.title.clone(),
        };
        let description = page
            .frontmatter
            .description
            .clone()
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| site.description.clone());
        let lang = locale
            .or(site.default_locale.as_deref())
            .unwrap_or("en")
            .to_owned();
        Self {
            lang,
            title,
            description,
        }
    }
}

/// Render a complete HTML document.
pub fn render_document(head: &PageHead, markup: &str, assets: &AssetManifest) -> String {
    let mut html = String::with_capacity(markup.len() + 1024);

    html.push_str(&format!("<!DOCTYPE html>\n<html lang=\"{}\">\n", escape_html(&head.lang)));
    html.push_str("<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_html(&head.title)));
    if !head.description.is_empty() {
        html.push_str(&format!(
            "<meta name=\"description\" content=\"{}\">\n",
            escape_html(&head.description)
        ));
    }
    html.push_str(&assets.head_tags());
    html.push_str("</head>\n<body>\n");
    html.push_str(markup);
    html.push_str("\n</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use folio_renderer::Frontmatter;
    use pretty_assertions::assert_eq;

    use super::*;

    fn site() -> SiteMeta {
        SiteMeta {
            title: "Docs".to_owned(),
            description: "All the docs".to_owned(),
            base: "/".to_owned(),
            ..SiteMeta::default()
        }
    }

    fn rendered(title: Option<&str>, description: Option<&str>) -> RenderedPage {
        RenderedPage {
            markup: "<div id=\"app\"></div>".to_owned(),
            frontmatter: Frontmatter {
                title: title.map(str::to_owned),
                description: description.map(str::to_owned),
                ..Frontmatter::default()
            },
            toc: Vec::new(),
        }
    }

    #[test]
    fn test_head_from_frontmatter() {
        let head = PageHead::new(&site(), &rendered(Some("Intro"), Some("Start here")), Some("ja"));
        assert_eq!(
            head,
            PageHead {
                lang: "ja".to_owned(),
                title: "Intro | Docs".to_owned(),
                description: "Start here".to_owned(),
            }
        );
    }

    #[test]
    fn test_head_falls_back_to_site() {
        let head = PageHead::new(&site(), &rendered(None, None), None);
        assert_eq!(head.title, "Docs");
        assert_eq!(head.description, "All the docs");
        assert_eq!(head.lang, "en");
    }

    #[test]
    fn test_document() {
        let head = PageHead {
            lang: "en".to_owned(),
            title: "A & B".to_owned(),
            description: String::new(),
        };
        let assets = AssetManifest {
            scripts: vec!["/assets/app.js".to_owned()],
            styles: Vec::new(),
        };
        assert_eq!(
            render_document(&head, "<div id=\"app\"></div>", &assets),
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
             <title>A &amp; B</title>\n\
             <script type=\"module\" src=\"/assets/app.js\"></script>\n\
             </head>\n<body>\n<div id=\"app\"></div>\n</body>\n</html>\n"
        );
    }
}
