//! Synthetic modules injected into the bundler's module graph.
//!
//! Each module is an ES module whose last line is `export default <json>;`.
//! The routes module also exports every diagram source as a template literal
//! keyed by route, so client-side diagram rendering needs no JSON decoding.

use folio_renderer::{ContentNode, escape_template_literal};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::BundleError;
use crate::search::SearchProvider;
use crate::site_data::{RouteData, SiteData, SiteMeta};

/// Route catalog module id.
pub const ROUTES_MODULE: &str = "virtual:folio/routes";
/// Resolved configuration module id.
pub const CONFIG_MODULE: &str = "virtual:folio/config";
/// Search module id.
pub const SEARCH_MODULE: &str = "virtual:folio/search";

const DEFAULT_EXPORT: &str = "export default ";

/// In-memory module with no file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticModule {
    pub id: String,
    pub source: String,
}

impl SyntheticModule {
    /// Decode the module's default export.
    pub fn default_export<T: DeserializeOwned>(&self) -> Result<T, BundleError> {
        let json = self
            .source
            .lines()
            .rev()
            .find_map(|line| line.strip_prefix(DEFAULT_EXPORT))
            .and_then(|rest| rest.strip_suffix(';'))
            .ok_or_else(|| self.invalid("missing default export"))?;
        serde_json::from_str(json).map_err(|e| self.invalid(&e.to_string()))
    }

    fn invalid(&self, message: &str) -> BundleError {
        BundleError::InvalidModule {
            id: self.id.clone(),
            message: message.to_owned(),
        }
    }
}

fn default_export(value: &impl Serialize) -> Result<String, serde_json::Error> {
    Ok(format!("{DEFAULT_EXPORT}{};\n", serde_json::to_string(value)?))
}

/// Build the routes module.
pub fn routes_module(routes: &[RouteData]) -> Result<SyntheticModule, serde_json::Error> {
    let mut source = String::from("export const diagrams = {\n");
    for route in routes {
        let mut codes = Vec::new();
        collect_diagrams(&route.body, &mut codes);
        if codes.is_empty() {
            continue;
        }
        source.push_str(&format!("  {}: [", serde_json::to_string(&route.url_path)?));
        for code in codes {
            source.push_str(&format!("`{}`, ", escape_template_literal(code)));
        }
        source.push_str("],\n");
    }
    source.push_str("};\n");
    source.push_str(&default_export(&routes)?);

    Ok(SyntheticModule {
        id: ROUTES_MODULE.to_owned(),
        source,
    })
}

fn collect_diagrams<'a>(tree: &'a [ContentNode], out: &mut Vec<&'a str>) {
    for node in tree {
        match node {
            ContentNode::Component(component) => {
                if component.name == "diagram"
                    && let Some(code) = component.attributes.get("code").and_then(serde_json::Value::as_str)
                {
                    out.push(code);
                }
                collect_diagrams(&component.children, out);
            }
            ContentNode::Panel { children, .. } => collect_diagrams(children, out),
            ContentNode::Markdown { .. } | ContentNode::Text { .. } => {}
        }
    }
}

/// Build the configuration module.
pub fn config_module(meta: &SiteMeta) -> Result<SyntheticModule, serde_json::Error> {
    Ok(SyntheticModule {
        id: CONFIG_MODULE.to_owned(),
        source: default_export(meta)?,
    })
}

/// Build the search module from a provider's exported index.
pub fn search_module(search: &dyn SearchProvider) -> Result<SyntheticModule, serde_json::Error> {
    Ok(SyntheticModule {
        id: SEARCH_MODULE.to_owned(),
        source: default_export(&search.export())?,
    })
}

/// All modules the entries import, in a fixed order.
pub fn site_modules(
    data: &SiteData,
    search: &dyn SearchProvider,
) -> Result<Vec<SyntheticModule>, serde_json::Error> {
    Ok(vec![
        routes_module(&data.routes)?,
        config_module(&data.meta)?,
        search_module(search)?,
    ])
}

/// Rebuild the site snapshot from the routes and config modules.
pub fn site_data(modules: &[SyntheticModule]) -> Result<SiteData, BundleError> {
    let find = |id: &str| {
        modules
            .iter()
            .find(|m| m.id == id)
            .ok_or_else(|| BundleError::MissingModule(id.to_owned()))
    };
    Ok(SiteData {
        meta: find(CONFIG_MODULE)?.default_export()?,
        routes: find(ROUTES_MODULE)?.default_export()?,
    })
}

/// Client entry source: reads the synthetic modules and paints `location`.
pub(crate) const CLIENT_ENTRY: &str = "\
import routes, { diagrams } from \"virtual:folio/routes\";
import config from \"virtual:folio/config\";
import searchIndex from \"virtual:folio/search\";
import { mount } from \"folio/client\";

mount(document.getElementById(\"app\"), { routes, diagrams, config, searchIndex, location: window.location.pathname });
";

/// Server entry source: exports `render(urlPath)`.
pub(crate) const SERVER_ENTRY: &str = "\
import routes from \"virtual:folio/routes\";
import config from \"virtual:folio/config\";
import { createRenderer } from \"folio/server\";

export const render = createRenderer({ routes, config });
";
