//! Sitemap generation.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://docs.example.com/guide</loc>
//!   </url>
//! </urlset>
//! ```

use quick_xml::escape::escape;

use crate::site_data::SiteMeta;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Sitemap file name in the output root.
pub const SITEMAP_FILE: &str = "sitemap.xml";

/// Render a sitemap listing `url_paths` in the given order.
///
/// Returns `None` when the site has no absolute URL configured.
pub fn render_sitemap<'a>(site: &SiteMeta, url_paths: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let site_url = site.url.as_deref()?.trim_end_matches('/');

    let mut xml = String::with_capacity(4096);
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<urlset xmlns=\"");
    xml.push_str(SITEMAP_NS);
    xml.push_str("\">\n");

    for url_path in url_paths {
        let loc = format!("{site_url}{}", site.href(url_path));
        xml.push_str("  <url>\n    <loc>");
        xml.push_str(&escape(loc.as_str()));
        xml.push_str("</loc>\n  </url>\n");
    }

    xml.push_str("</urlset>\n");
    Some(xml)
}
