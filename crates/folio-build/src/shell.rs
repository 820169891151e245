//! Page shell shared by the server entry and the client app.
//!
//! [`page`] is the only function that lays out a page. The static pass calls
//! it with [`ShellState::default`]; the client calls it with its live state,
//! which equals the default until the user interacts. Anything that only
//! exists after mounting is gated on [`ShellState::mounted`] here, once.

use crate::components::{ComponentRenderer, Content};
use crate::node::Node;
use crate::search::SearchHit;
use crate::site_data::{RouteData, SiteData, SiteMeta};

/// Color theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// Interactive state of the page.
///
/// `Default` is the first-paint state: light theme, search closed, not
/// mounted, no highlighted heading.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShellState {
    pub theme: Theme,
    pub search_open: bool,
    pub search_query: String,
    pub search_hits: Vec<SearchHit>,
    /// Set once the client has taken over the static markup.
    pub mounted: bool,
    /// Outline entry currently scrolled into view.
    pub active_heading: Option<String>,
}

/// What a page is painted from.
#[derive(Debug, Clone, Copy)]
pub struct ShellContext<'a> {
    pub site: &'a SiteMeta,
    /// All routes, used for navigation.
    pub routes: &'a [RouteData],
    pub route: &'a RouteData,
}

impl<'a> ShellContext<'a> {
    pub fn new(data: &'a SiteData, route: &'a RouteData) -> Self {
        Self {
            site: &data.meta,
            routes: &data.routes,
            route,
        }
    }
}

/// Lay out a page.
pub fn page(ctx: &ShellContext<'_>, state: &ShellState, components: &dyn ComponentRenderer) -> Node {
    let app = Node::element("div")
        .attr("id", "app")
        .attr("class", "folio-app")
        .attr("data-theme", state.theme.as_str())
        .child(header(ctx, state))
        .child(
            Node::element("div")
                .attr("class", "layout")
                .child(sidebar(ctx))
                .child(main_content(ctx, components))
                .children(toc(ctx, state)),
        );

    if state.mounted && state.search_open {
        app.child(search_overlay(ctx.site, state))
    } else {
        app
    }
}

fn header(ctx: &ShellContext<'_>, state: &ShellState) -> Node {
    Node::element("header")
        .attr("class", "site-header")
        .child(
            Node::element("a")
                .attr("class", "site-title")
                .attr("href", ctx.site.base.clone())
                .child(Node::text(ctx.site.title.clone())),
        )
        .children(version_switcher(ctx))
        .children(locale_switcher(ctx))
        .child(
            Node::element("button")
                .attr("type", "button")
                .attr("class", "search-button")
                .attr("aria-controls", "search")
                .attr("aria-expanded", bool_attr(state.search_open))
                .child(Node::text("Search")),
        )
        .child(
            Node::element("button")
                .attr("type", "button")
                .attr("class", "theme-toggle")
                .attr("aria-label", "Toggle dark mode")
                .attr("aria-pressed", bool_attr(state.theme == Theme::Dark))
                .child(Node::text(state.theme.as_str())),
        )
}

fn bool_attr(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

/// Links to the current page under each configured token.
///
/// `current` is the token carried by the route (or the configured default),
/// `carried` the one actually present in its URL.
fn switcher(
    site: &SiteMeta,
    route: &RouteData,
    tokens: &[String],
    current: Option<&str>,
    carried: Option<&str>,
    class: &'static str,
    label: &'static str,
) -> Option<Node> {
    if tokens.is_empty() {
        return None;
    }
    let unscoped = match carried {
        Some(token) => folio_paths::strip_prefix(&route.url_path, token),
        None => route.url_path.clone(),
    };
    let links = tokens.iter().map(|token| {
        let target = folio_paths::add_prefix(&unscoped, token);
        Node::element("a")
            .attr("href", site.href(&target))
            .attr("hreflang", token.clone())
            .attr_if(current == Some(token.as_str()), "aria-current", "true")
            .child(Node::text(token.clone()))
    });
    Some(
        Node::element("nav")
            .attr("class", class)
            .attr("aria-label", label)
            .children(links),
    )
}

fn version_switcher(ctx: &ShellContext<'_>) -> Option<Node> {
    let carried = ctx.route.version.as_deref();
    switcher(
        ctx.site,
        ctx.route,
        &ctx.site.versions,
        carried.or(ctx.site.default_version.as_deref()),
        carried,
        "version-switcher",
        "Version",
    )
}

fn locale_switcher(ctx: &ShellContext<'_>) -> Option<Node> {
    let carried = ctx.route.locale.as_deref();
    switcher(
        ctx.site,
        ctx.route,
        &ctx.site.locales,
        carried.or(ctx.site.default_locale.as_deref()),
        carried,
        "locale-switcher",
        "Language",
    )
}

/// Pages in the same version and locale as the current one.
fn sidebar(ctx: &ShellContext<'_>) -> Node {
    let items = ctx
        .routes
        .iter()
        .filter(|r| r.version == ctx.route.version && r.locale == ctx.route.locale)
        .map(|r| {
            Node::element("li").child(
                Node::element("a")
                    .attr("href", ctx.site.href(&r.url_path))
                    .attr_if(r.url_path == ctx.route.url_path, "aria-current", "page")
                    .child(Node::text(r.title.clone())),
            )
        });
    Node::element("nav")
        .attr("class", "sidebar")
        .attr("aria-label", "Pages")
        .child(Node::element("ul").children(items))
}

fn main_content(ctx: &ShellContext<'_>, components: &dyn ComponentRenderer) -> Node {
    Node::element("main").attr("class", "content").child(
        Node::element("article")
            .attr("class", "page")
            .children(Content::new(components).render(&ctx.route.body)),
    )
}

fn toc(ctx: &ShellContext<'_>, state: &ShellState) -> Option<Node> {
    if ctx.route.toc.is_empty() {
        return None;
    }
    let items = ctx.route.toc.iter().map(|entry| {
        Node::element("li")
            .attr("class", format!("toc-depth-{}", entry.depth))
            .child(
                Node::element("a")
                    .attr("href", format!("#{}", entry.id))
                    .attr_if(
                        state.active_heading.as_deref() == Some(entry.id.as_str()),
                        "aria-current",
                        "location",
                    )
                    .child(Node::text(entry.text.clone())),
            )
    });
    Some(
        Node::element("aside")
            .attr("class", "toc")
            .child(
                Node::element("p")
                    .attr("class", "toc-title")
                    .child(Node::text("On this page")),
            )
            .child(Node::element("ul").children(items)),
    )
}

fn search_overlay(site: &SiteMeta, state: &ShellState) -> Node {
    let results = if state.search_hits.is_empty() {
        Node::element("p")
            .attr("class", "search-empty")
            .child(Node::text("No results"))
    } else {
        Node::element("ul")
            .attr("class", "search-results")
            .children(state.search_hits.iter().map(|hit| {
                Node::element("li").attr("data-id", hit.id.clone()).child(
                    Node::element("a")
                        .attr("href", site.href(&hit.url))
                        .child(Node::element("strong").child(Node::text(hit.title.clone())))
                        .child(Node::element("span").child(Node::text(hit.excerpt.clone()))),
                )
            }))
    };

    Node::element("div")
        .attr("id", "search")
        .attr("class", "search-overlay")
        .attr("role", "dialog")
        .attr("aria-label", "Search")
        .child(
            Node::element("input")
                .attr("type", "search")
                .attr("value", state.search_query.clone())
                .attr("aria-label", "Search query"),
        )
        .child(results)
}

#[cfg(test)]
mod tests {
    use folio_renderer::{Frontmatter, TocEntry};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::components::DefaultComponents;

    fn route(url_path: &str, version: Option<&str>, locale: Option<&str>) -> RouteData {
        RouteData {
            url_path: url_path.to_owned(),
            title: format!("Title {url_path}"),
            version: version.map(str::to_owned),
            locale: locale.map(str::to_owned),
            frontmatter: Frontmatter::default(),
            toc: Vec::new(),
            body: Vec::new(),
        }
    }

    fn versioned_site() -> SiteData {
        SiteData {
            meta: SiteMeta {
                title: "Docs".to_owned(),
                base: "/docs/".to_owned(),
                versions: vec!["v1".to_owned(), "v2".to_owned()],
                default_version: Some("v2".to_owned()),
                ..SiteMeta::default()
            },
            routes: vec![
                route("/v1/", Some("v1"), None),
                route("/v1/guide", Some("v1"), None),
                route("/v2/", Some("v2"), None),
                route("/v2/guide", Some("v2"), None),
            ],
        }
    }

    fn render(data: &SiteData, url: &str, state: &ShellState) -> String {
        let route = data.route(url).unwrap();
        page(&ShellContext::new(data, route), state, &DefaultComponents).to_html()
    }

    #[test]
    fn test_version_switcher_links() {
        let data = versioned_site();
        let html = render(&data, "/v1/guide", &ShellState::default());
        assert!(html.contains(
            "<nav class=\"version-switcher\" aria-label=\"Version\">\
             <a href=\"/docs/v1/guide\" hreflang=\"v1\" aria-current=\"true\">v1</a>\
             <a href=\"/docs/v2/guide\" hreflang=\"v2\">v2</a></nav>"
        ));
    }

    #[test]
    fn test_sidebar_scoped_to_version() {
        let data = versioned_site();
        let html = render(&data, "/v2/", &ShellState::default());
        assert!(html.contains("<a href=\"/docs/v2/\" aria-current=\"page\">Title /v2/</a>"));
        assert!(html.contains("<a href=\"/docs/v2/guide\">Title /v2/guide</a>"));
        assert!(!html.contains("Title /v1/guide"));
    }

    #[test]
    fn test_first_paint_has_no_overlay() {
        let data = versioned_site();
        let html = render(&data, "/v2/", &ShellState::default());
        assert!(html.starts_with("<div id=\"app\" class=\"folio-app\" data-theme=\"light\">"));
        assert!(html.contains("aria-expanded=\"false\""));
        assert!(!html.contains("search-overlay"));
    }

    #[test]
    fn test_search_overlay_requires_mount() {
        let data = versioned_site();
        let open = ShellState {
            search_open: true,
            ..ShellState::default()
        };
        assert!(!render(&data, "/v2/", &open).contains("search-overlay"));

        let mounted = ShellState {
            mounted: true,
            ..open
        };
        let html = render(&data, "/v2/", &mounted);
        assert!(html.contains("<div id=\"search\" class=\"search-overlay\" role=\"dialog\""));
        assert!(html.contains("<p class=\"search-empty\">No results</p>"));
    }

    #[test]
    fn test_toc_and_active_heading() {
        let mut data = versioned_site();
        data.routes[2].toc = vec![
            TocEntry {
                id: "setup".to_owned(),
                text: "Setup".to_owned(),
                depth: 2,
            },
        ];
        let state = ShellState {
            active_heading: Some("setup".to_owned()),
            ..ShellState::default()
        };
        let html = render(&data, "/v2/", &state);
        assert!(html.contains(
            "<li class=\"toc-depth-2\"><a href=\"#setup\" aria-current=\"location\">Setup</a></li>"
        ));
        assert!(!render(&data, "/v1/", &ShellState::default()).contains("class=\"toc\""));
    }

    #[test]
    fn test_theme_toggle() {
        assert_eq!(Theme::default().toggled(), Theme::Dark);
        let data = versioned_site();
        let dark = ShellState {
            theme: Theme::Dark,
            ..ShellState::default()
        };
        let html = render(&data, "/v2/", &dark);
        assert!(html.contains("data-theme=\"dark\""));
        assert!(html.contains("aria-pressed=\"true\""));
    }
}
