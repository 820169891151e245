//! Serializable site snapshot shared by the client and server entries.

use folio_config::SiteConfig;
use folio_renderer::{ContentTree, Frontmatter, TocEntry};
use folio_site::{Route, RouteCatalog};
use serde::{Deserialize, Serialize};

/// Resolved site configuration as seen by the entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteMeta {
    pub title: String,
    pub description: String,
    /// URL prefix, always `/`-delimited (`/`, `/docs/`).
    pub base: String,
    pub url: Option<String>,
    pub versions: Vec<String>,
    pub default_version: Option<String>,
    pub locales: Vec<String>,
    pub default_locale: Option<String>,
}

impl SiteMeta {
    /// Join a route URL path onto the base path.
    ///
    /// ```
    /// use folio_build::SiteMeta;
    ///
    /// let meta = SiteMeta { base: "/docs/".to_owned(), ..SiteMeta::default() };
    /// assert_eq!(meta.href("/guide"), "/docs/guide");
    /// assert_eq!(meta.href("/"), "/docs/");
    /// ```
    pub fn href(&self, url_path: &str) -> String {
        format!("{}{url_path}", self.base.trim_end_matches('/'))
    }

    /// Strip the base path from a browser location.
    ///
    /// Returns `None` when the location is outside the base.
    pub fn route_path<'a>(&self, location: &'a str) -> Option<&'a str> {
        let base = self.base.trim_end_matches('/');
        if base.is_empty() {
            return Some(location);
        }
        match location.strip_prefix(base) {
            Some("") => Some("/"),
            Some(rest) if rest.starts_with('/') => Some(rest),
            _ => None,
        }
    }
}

impl From<&SiteConfig> for SiteMeta {
    fn from(site: &SiteConfig) -> Self {
        Self {
            title: site.title.clone(),
            description: site.description.clone(),
            base: site.base.clone(),
            url: site.url.clone(),
            versions: site.versions.clone(),
            default_version: site.default_version.clone(),
            locales: site.locales.clone(),
            default_locale: site.default_locale.clone(),
        }
    }
}

/// Per-route data needed to paint a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteData {
    pub url_path: String,
    /// Display title (frontmatter, first `#` heading, or file name).
    pub title: String,
    pub version: Option<String>,
    pub locale: Option<String>,
    pub frontmatter: Frontmatter,
    pub toc: Vec<TocEntry>,
    pub body: ContentTree,
}

impl From<&Route> for RouteData {
    fn from(route: &Route) -> Self {
        Self {
            url_path: route.url_path.clone(),
            title: route.title(),
            version: route.version.clone(),
            locale: route.locale.clone(),
            frontmatter: route.frontmatter.clone(),
            toc: route.toc.clone(),
            body: route.body.clone(),
        }
    }
}

/// Everything the entries read from the synthetic modules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteData {
    pub meta: SiteMeta,
    /// Routes in catalog (URL) order.
    pub routes: Vec<RouteData>,
}

impl SiteData {
    /// Snapshot a catalog and site configuration.
    pub fn new(site: &SiteConfig, catalog: &RouteCatalog) -> Self {
        Self {
            meta: SiteMeta::from(site),
            routes: catalog.routes().iter().map(RouteData::from).collect(),
        }
    }

    /// Look up a route by URL path.
    pub fn route(&self, url_path: &str) -> Option<&RouteData> {
        self.routes
            .binary_search_by(|r| r.url_path.as_str().cmp(url_path))
            .ok()
            .map(|i| &self.routes[i])
    }

    /// Resolve a browser location (base included) to its route.
    ///
    /// A missing trailing slash on directory pages is tolerated.
    pub fn resolve(&self, location: &str) -> Option<&RouteData> {
        let path = self.meta.route_path(location)?;
        self.route(path).or_else(|| {
            if path.ends_with('/') {
                None
            } else {
                self.route(&format!("{path}/"))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn route(url_path: &str) -> RouteData {
        RouteData {
            url_path: url_path.to_owned(),
            title: url_path.to_owned(),
            version: None,
            locale: None,
            frontmatter: Frontmatter::default(),
            toc: Vec::new(),
            body: Vec::new(),
        }
    }

    fn data(base: &str) -> SiteData {
        SiteData {
            meta: SiteMeta {
                base: base.to_owned(),
                ..SiteMeta::default()
            },
            routes: vec![route("/"), route("/guide"), route("/v2/")],
        }
    }

    #[test]
    fn test_route_path_with_base() {
        let meta = data("/docs/").meta;
        assert_eq!(meta.route_path("/docs/guide"), Some("/guide"));
        assert_eq!(meta.route_path("/docs"), Some("/"));
        assert_eq!(meta.route_path("/docsx/guide"), None);
        assert_eq!(meta.route_path("/other"), None);
    }

    #[test]
    fn test_resolve() {
        let site = data("/");
        assert_eq!(site.resolve("/guide").map(|r| r.url_path.as_str()), Some("/guide"));
        assert_eq!(site.resolve("/v2").map(|r| r.url_path.as_str()), Some("/v2/"));
        assert!(site.resolve("/missing").is_none());

        let site = data("/docs/");
        assert_eq!(site.resolve("/docs/").map(|r| r.url_path.as_str()), Some("/"));
    }
}
