//! Bundler that needs no JavaScript toolchain.
//!
//! The client target links the entry, its synthetic modules and the
//! `folio/client` runtime into a single content-hashed script next to a
//! stylesheet and an HTML shell. The server target serializes the site
//! snapshot; loading it yields a [`NativeServerEntry`] painting the shared
//! shell, which is what `folio/server` stands for.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::bundler::{BundleOutput, BundleRequest, BundleTarget, Bundler};
use crate::components::{ComponentRenderer, DefaultComponents};
use crate::error::BundleError;
use crate::linker::{self, Module};
use crate::modules::{self, SyntheticModule};
use crate::server::{NativeServerEntry, ServerEntry};
use crate::site_data::SiteData;

/// Browser runtime the client entry mounts with.
pub const CLIENT_RUNTIME: &str = "folio/client";
/// Renderer the server entry is built around, provided natively.
pub const SERVER_RUNTIME: &str = "folio/server";

const CLIENT_RUNTIME_SOURCE: &str = include_str!("runtime/client.js");

/// Server bundle file name.
const SERVER_BUNDLE: &str = "server-bundle.json";

/// Base stylesheet for the page shell.
const SHELL_CSS: &str = "\
.folio-app{min-height:100vh;display:flex;flex-direction:column}
.folio-app[data-theme=dark]{background:#111827;color:#f3f4f6}
.site-header{display:flex;align-items:center;gap:1rem;padding:.75rem 1.5rem;border-bottom:1px solid #e5e7eb}
.site-title{font-weight:600;margin-right:auto}
.layout{display:flex;flex:1}
.sidebar{width:280px;flex-shrink:0;padding:1.5rem 1rem}
.sidebar [aria-current=page]{font-weight:600}
.content{flex:1;min-width:0;padding:1.5rem 2rem}
.toc{width:240px;flex-shrink:0;padding:1.5rem 1rem}
.toc-depth-3,.toc-depth-4,.toc-depth-5,.toc-depth-6{margin-left:.75rem}
.callout{border-left:4px solid;padding:.5rem 1rem;margin:1rem 0}
.callout-tip{border-color:#10b981}.callout-info,.callout-note{border-color:#3b82f6}
.callout-warning{border-color:#f59e0b}.callout-danger{border-color:#ef4444}
.steps ol{counter-reset:step}
.file-tree ul{list-style:none;padding-left:1rem}
.search-overlay{position:fixed;inset:10% 25% auto;background:inherit;border:1px solid #e5e7eb;padding:1rem}
";

/// Bundler emitting plain files.
#[derive(Clone)]
pub struct NativeBundler {
    components: Arc<dyn ComponentRenderer>,
}

impl Default for NativeBundler {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeBundler {
    pub fn new() -> Self {
        Self {
            components: Arc::new(DefaultComponents),
        }
    }

    /// Render components in loaded server entries with `components`.
    #[must_use]
    pub fn with_components(mut self, components: Arc<dyn ComponentRenderer>) -> Self {
        self.components = components;
        self
    }

    fn bundle_client(request: &BundleRequest, entry: &str) -> Result<BundleOutput, BundleError> {
        let mut linked: Vec<Module<'_>> = request
            .modules
            .iter()
            .map(|m| Module {
                id: &m.id,
                source: &m.source,
            })
            .collect();
        linked.push(Module {
            id: CLIENT_RUNTIME,
            source: CLIENT_RUNTIME_SOURCE,
        });
        let script = linker::link(entry, &linked)?;

        let assets_dir = request.out_dir.join("assets");
        let script_name = format!("app-{}.js", content_hash(&script));
        let style_name = format!("style-{}.css", content_hash(SHELL_CSS));
        let script_path = assets_dir.join(&script_name);
        let style_path = assets_dir.join(&style_name);
        write_file(&script_path, &script)?;
        write_file(&style_path, SHELL_CSS)?;

        let shell = format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
             <link rel=\"stylesheet\" href=\"{base}assets/{style_name}\">\n\
             <script type=\"module\" src=\"{base}assets/{script_name}\"></script>\n\
             </head>\n<body>\n<div id=\"app\"></div>\n</body>\n</html>\n",
            base = request.base,
        );
        let shell_path = request.out_dir.join("index.html");
        write_file(&shell_path, &shell)?;

        tracing::debug!(script = %script_name, style = %style_name, "Wrote client bundle");
        Ok(BundleOutput {
            out_dir: request.out_dir.clone(),
            html_shell: Some(shell_path.clone()),
            server_bundle: None,
            files: vec![script_path, style_path, shell_path],
        })
    }

    fn bundle_server(request: &BundleRequest) -> Result<BundleOutput, BundleError> {
        let data = modules::site_data(&request.modules)?;
        let json = serde_json::to_string(&data).map_err(|e| BundleError::InvalidModule {
            id: modules::ROUTES_MODULE.to_owned(),
            message: e.to_string(),
        })?;
        let path = request.out_dir.join(SERVER_BUNDLE);
        write_file(&path, &json)?;

        tracing::debug!(routes = data.routes.len(), path = %path.display(), "Wrote server bundle");
        Ok(BundleOutput {
            out_dir: request.out_dir.clone(),
            html_shell: None,
            server_bundle: Some(path.clone()),
            files: vec![path],
        })
    }
}

impl Bundler for NativeBundler {
    fn bundle(&self, request: &BundleRequest) -> Result<BundleOutput, BundleError> {
        let entry = fs::read_to_string(&request.entry).map_err(|e| BundleError::io(&request.entry, e))?;
        let runtime = match request.target {
            BundleTarget::Client => CLIENT_RUNTIME,
            BundleTarget::Server => SERVER_RUNTIME,
        };
        check_imports(&entry, &request.modules, runtime)?;

        match request.target {
            BundleTarget::Client => Self::bundle_client(request, &entry),
            BundleTarget::Server => Self::bundle_server(request),
        }
    }

    fn load_server(&self, output: &BundleOutput) -> Result<Box<dyn ServerEntry>, BundleError> {
        let path = output
            .server_bundle
            .as_deref()
            .ok_or_else(|| BundleError::Load {
                path: output.out_dir.clone(),
                message: "no server bundle emitted".to_owned(),
            })?;
        let json = fs::read_to_string(path).map_err(|e| BundleError::io(path, e))?;
        let data: SiteData = serde_json::from_str(&json).map_err(|e| BundleError::Load {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Box::new(NativeServerEntry::new(
            data,
            Arc::clone(&self.components),
        )))
    }
}

/// Fail on imports that neither a synthetic module nor the target's runtime
/// satisfies.
fn check_imports(entry: &str, modules: &[SyntheticModule], runtime: &str) -> Result<(), BundleError> {
    for module in modules {
        if let Some(id) = linker::imports(&module.source).into_iter().next() {
            return Err(BundleError::InvalidModule {
                id: module.id.clone(),
                message: format!("synthetic modules cannot import {id}"),
            });
        }
    }
    for id in linker::imports(entry) {
        if id != runtime && !modules.iter().any(|m| m.id == id) {
            return Err(BundleError::MissingModule(id.to_owned()));
        }
    }
    Ok(())
}

/// Truncated SHA-256 of `content`, hex encoded.
fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    hex::encode(&result[..6])
}

fn write_file(path: &Path, content: &str) -> Result<(), BundleError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| BundleError::io(parent, e))?;
    }
    fs::write(path, content).map_err(|e| BundleError::io(path, e))
}
