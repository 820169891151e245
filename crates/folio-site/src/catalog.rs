//! Route catalog.

use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use rayon::prelude::*;

use crate::scanner::{DEPENDENCY_DIRS, Scanner, SourceRef};
use crate::{CatalogError, Route};

/// Ordered, collision-free set of routes discovered under a source root.
///
/// Rebuilt wholesale on every build and on every relevant source change.
#[derive(Debug, Clone)]
pub struct RouteCatalog {
    source_dir: PathBuf,
    routes: Vec<Route>,
}

impl RouteCatalog {
    /// Discover, read and transform every page under `source_dir`.
    ///
    /// Routes are sorted by URL path (byte-wise). Fails on unreadable files
    /// and on two files resolving to the same URL; URLs differing only in
    /// case also collide since they share an output path on case-insensitive
    /// filesystems.
    pub fn build(source_dir: &Path) -> Result<Self, CatalogError> {
        let sources = Scanner::new(source_dir.to_path_buf()).scan()?;
        tracing::debug!(dir = %source_dir.display(), files = sources.len(), "Scanned sources");

        let mut routes = sources
            .into_par_iter()
            .map(load_route)
            .collect::<Result<Vec<_>, _>>()?;

        routes.sort_by(|a, b| {
            a.url_path
                .cmp(&b.url_path)
                .then_with(|| a.relative_path.cmp(&b.relative_path))
        });
        check_collisions(&routes)?;

        tracing::info!(routes = routes.len(), "Built route catalog");
        Ok(Self {
            source_dir: source_dir.to_path_buf(),
            routes,
        })
    }

    /// Routes in URL order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Look up a route by URL path.
    pub fn get(&self, url_path: &str) -> Option<&Route> {
        self.routes
            .binary_search_by(|r| r.url_path.as_str().cmp(url_path))
            .ok()
            .map(|i| &self.routes[i])
    }

    /// Number of routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Check whether the catalog has no routes.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Source root this catalog was built from.
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Check whether a changed filesystem path should trigger a rebuild.
    ///
    /// True for markdown files the scanner would pick up, and for
    /// extensionless paths (directories) inside the scanned tree.
    pub fn is_relevant_change(&self, path: &Path) -> bool {
        let Ok(relative) = path.strip_prefix(&self.source_dir) else {
            return false;
        };

        let mut names = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(name) => names.push(name.to_string_lossy()),
                _ => return false,
            }
        }
        let Some((file_name, dirs)) = names.split_last() else {
            return false;
        };

        if dirs
            .iter()
            .any(|d| d.starts_with('.') || DEPENDENCY_DIRS.contains(&&**d))
        {
            return false;
        }
        if file_name.starts_with('.') || file_name.starts_with('_') {
            return false;
        }
        folio_paths::is_markdown_file(file_name) || Path::new(&**file_name).extension().is_none()
    }
}

/// Read and transform one source file.
fn load_route(source: SourceRef) -> Result<Route, CatalogError> {
    let raw = fs::read_to_string(&source.path).map_err(|e| CatalogError::io(&source.path, e))?;
    let document = folio_renderer::transform(&raw, &source.relative_path);
    Ok(Route::new(source.relative_path, source.path, raw, document))
}

/// Reject routes sharing a URL path (ASCII case-insensitive).
fn check_collisions(routes: &[Route]) -> Result<(), CatalogError> {
    let mut seen: HashMap<String, &Route> = HashMap::with_capacity(routes.len());
    for route in routes {
        let key = route.url_path.to_ascii_lowercase();
        if let Some(first) = seen.insert(key, route) {
            return Err(CatalogError::DuplicateUrl {
                url_path: route.url_path.clone(),
                first: first.source_file.clone(),
                second: route.source_file.clone(),
            });
        }
    }
    Ok(())
}
