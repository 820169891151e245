//! Non-interactive render entry.

use std::sync::Arc;

use folio_renderer::{Frontmatter, TocEntry};

use crate::components::ComponentRenderer;
use crate::error::RenderError;
use crate::shell::{self, ShellContext, ShellState};
use crate::site_data::SiteData;

/// Output of rendering one route outside a browser.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    /// Shell markup (the `#app` element).
    pub markup: String,
    pub frontmatter: Frontmatter,
    pub toc: Vec<TocEntry>,
}

/// Render function loaded from a server bundle.
pub trait ServerEntry: Send + Sync {
    /// Render the route at `url_path` (base path not included).
    fn render(&self, url_path: &str) -> Result<RenderedPage, RenderError>;
}

/// Server entry painting the shared shell in its first-paint state.
pub struct NativeServerEntry {
    data: SiteData,
    components: Arc<dyn ComponentRenderer>,
}

impl NativeServerEntry {
    pub fn new(data: SiteData, components: Arc<dyn ComponentRenderer>) -> Self {
        Self { data, components }
    }
}

impl ServerEntry for NativeServerEntry {
    fn render(&self, url_path: &str) -> Result<RenderedPage, RenderError> {
        let route = self
            .data
            .route(url_path)
            .ok_or_else(|| RenderError::NotFound(url_path.to_owned()))?;
        let ctx = ShellContext::new(&self.data, route);
        let markup = shell::page(&ctx, &ShellState::default(), self.components.as_ref()).to_html();
        Ok(RenderedPage {
            markup,
            frontmatter: route.frontmatter.clone(),
            toc: route.toc.clone(),
        })
    }
}
