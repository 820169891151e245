//! Interactive client model.
//!
//! Mirrors what the browser bundle does at runtime: resolve the current
//! location against the route catalog, paint the shell, then react to user
//! input. The search provider is handed in at construction time.

use std::sync::Arc;

use crate::components::{ComponentRenderer, DefaultComponents};
use crate::error::RenderError;
use crate::node::Node;
use crate::search::SearchProvider;
use crate::shell::{self, ShellContext, ShellState};
use crate::site_data::SiteData;

/// Client application state for one browser session.
pub struct ClientApp {
    data: Arc<SiteData>,
    search: Arc<dyn SearchProvider>,
    components: Arc<dyn ComponentRenderer>,
    location: String,
    state: ShellState,
}

impl ClientApp {
    /// Start a session at `location` (base path included).
    pub fn new(data: Arc<SiteData>, search: Arc<dyn SearchProvider>, location: &str) -> Self {
        Self {
            data,
            search,
            components: Arc::new(DefaultComponents),
            location: location.to_owned(),
            state: ShellState::default(),
        }
    }

    /// Use a custom component renderer.
    #[must_use]
    pub fn with_components(mut self, components: Arc<dyn ComponentRenderer>) -> Self {
        self.components = components;
        self
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Mark the static markup as taken over.
    pub fn mount(&mut self) {
        self.state.mounted = true;
    }

    pub fn toggle_theme(&mut self) {
        self.state.theme = self.state.theme.toggled();
    }

    /// Open the search overlay and run `query`.
    pub fn open_search(&mut self, query: &str) {
        self.state.search_open = true;
        query.clone_into(&mut self.state.search_query);
        self.state.search_hits = self.search.search(query);
    }

    pub fn close_search(&mut self) {
        self.state.search_open = false;
        self.state.search_query.clear();
        self.state.search_hits.clear();
    }

    /// Highlight an outline entry.
    pub fn set_active_heading(&mut self, id: Option<&str>) {
        self.state.active_heading = id.map(str::to_owned);
    }

    /// Move to another location, closing search and clearing the highlight.
    ///
    /// Returns `false` (and stays put) when no route matches.
    pub fn navigate(&mut self, location: &str) -> bool {
        if self.data.resolve(location).is_none() {
            return false;
        }
        location.clone_into(&mut self.location);
        self.close_search();
        self.state.active_heading = None;
        true
    }

    /// Paint the current state.
    pub fn render(&self) -> Result<Node, RenderError> {
        self.paint(&self.state)
    }

    /// Paint as on first load, ignoring any interaction so far.
    pub fn first_paint(&self) -> Result<String, RenderError> {
        Ok(self.paint(&ShellState::default())?.to_html())
    }

    fn paint(&self, state: &ShellState) -> Result<Node, RenderError> {
        let route = self
            .data
            .resolve(&self.location)
            .ok_or_else(|| RenderError::NotFound(self.location.clone()))?;
        let ctx = ShellContext::new(&self.data, route);
        Ok(shell::page(&ctx, state, self.components.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use folio_renderer::Frontmatter;

    use super::*;
    use crate::search::{NullSearch, SearchHit};
    use crate::site_data::{RouteData, SiteMeta};

    struct FixedSearch;

    impl SearchProvider for FixedSearch {
        fn search(&self, query: &str) -> Vec<SearchHit> {
            vec![SearchHit {
                id: "guide".to_owned(),
                title: format!("Guide for {query}"),
                url: "/guide".to_owned(),
                excerpt: "Getting started".to_owned(),
                score: 1.0,
            }]
        }
    }

    fn data() -> Arc<SiteData> {
        let route = |url_path: &str| RouteData {
            url_path: url_path.to_owned(),
            title: url_path.to_owned(),
            version: None,
            locale: None,
            frontmatter: Frontmatter::default(),
            toc: Vec::new(),
            body: Vec::new(),
        };
        Arc::new(SiteData {
            meta: SiteMeta {
                title: "Docs".to_owned(),
                base: "/".to_owned(),
                ..SiteMeta::default()
            },
            routes: vec![route("/"), route("/guide")],
        })
    }

    #[test]
    fn test_search_renders_after_mount() {
        let mut app = ClientApp::new(data(), Arc::new(FixedSearch), "/");
        app.open_search("install");
        assert!(!app.render().unwrap().to_html().contains("search-overlay"));

        app.mount();
        let html = app.render().unwrap().to_html();
        assert!(html.contains("<strong>Guide for install</strong>"));
        assert!(html.contains("aria-expanded=\"true\""));
    }

    #[test]
    fn test_first_paint_ignores_interaction() {
        let mut app = ClientApp::new(data(), Arc::new(NullSearch), "/guide");
        let before = app.first_paint().unwrap();
        app.mount();
        app.toggle_theme();
        app.open_search("x");
        assert_eq!(app.first_paint().unwrap(), before);
        assert_ne!(app.render().unwrap().to_html(), before);
    }

    #[test]
    fn test_navigate() {
        let mut app = ClientApp::new(data(), Arc::new(NullSearch), "/");
        app.open_search("x");
        assert!(app.navigate("/guide"));
        assert_eq!(app.location(), "/guide");
        assert!(!app.state().search_open);
        assert!(!app.navigate("/missing"));
        assert_eq!(app.location(), "/guide");
    }

    #[test]
    fn test_unknown_location() {
        let app = ClientApp::new(data(), Arc::new(NullSearch), "/missing");
        assert!(matches!(app.render(), Err(RenderError::NotFound(_))));
    }
}
