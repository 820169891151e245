//! Build orchestration and prerendering for Folio.
//!
//! [`BuildOrchestrator`] turns a docs tree into a site in three phases:
//!
//! 1. the client bundle, whose HTML shell yields the [`AssetManifest`]
//! 2. the server bundle, loaded as a [`ServerEntry`]
//! 3. prerendering every route to `<out>/<url>/index.html`
//!
//! Both bundles paint pages with the same [`shell::page`] function, so the
//! static markup equals the client's first paint. [`parity::compare`] checks
//! that per route when enabled.
//!
//! # Example
//!
//! ```no_run
//! use folio_build::{BuildOrchestrator, NativeBundler};
//! use folio_config::Config;
//!
//! let config = Config::load(None, None)?;
//! let report = BuildOrchestrator::new(&config, NativeBundler::new()).run()?;
//! println!("Rendered {} of {} pages", report.rendered, report.discovered);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod bundler;
mod client;
mod components;
mod content_index;
mod error;
mod linker;
mod manifest;
mod modules;
mod native;
mod node;
mod orchestrator;
mod page;
pub mod parity;
mod search;
mod server;
pub mod shell;
mod site_data;
mod sitemap;

pub use bundler::{BundleOutput, BundleRequest, BundleTarget, Bundler};
pub use client::ClientApp;
pub use components::{ComponentRenderer, Content, DefaultComponents};
pub use content_index::{CONTENT_INDEX_FILE, ContentIndexEntry, render_content_index};
pub use error::{BuildError, BuildPhase, BundleError, RenderError};
pub use manifest::AssetManifest;
pub use modules::{
    CONFIG_MODULE, ROUTES_MODULE, SEARCH_MODULE, SyntheticModule, config_module, routes_module,
    search_module, site_modules,
};
pub use native::{CLIENT_RUNTIME, NativeBundler, SERVER_RUNTIME};
pub use node::Node;
pub use orchestrator::{
    BuildArtifact, BuildOrchestrator, BuildReport, BuildState, RouteFailure, output_path,
};
pub use page::{PageHead, render_document};
pub use search::{NullSearch, SearchHit, SearchProvider};
pub use server::{NativeServerEntry, RenderedPage, ServerEntry};
pub use site_data::{RouteData, SiteData, SiteMeta};
pub use sitemap::{SITEMAP_FILE, render_sitemap};
