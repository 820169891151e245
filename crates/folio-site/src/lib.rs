//! Route discovery for Folio.
//!
//! Walks a documentation source tree and produces the ordered [`RouteCatalog`]
//! consumed by every build step:
//!
//! - markdown-family files (`.md`, `.mdx`) become routes
//! - hidden entries (including `.folio/`) and dependency directories are skipped
//! - files whose name starts with `_` are drafts and produce no route
//! - version (`v2/`) and locale (`ja/`) folders become route metadata
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use folio_site::RouteCatalog;
//!
//! let catalog = RouteCatalog::build(Path::new("docs"))?;
//! for route in catalog.routes() {
//!     println!("{} -> {}", route.url_path, route.source_file.display());
//! }
//! # Ok::<(), folio_site::CatalogError>(())
//! ```

mod catalog;
mod route;
mod scanner;

use std::path::{Path, PathBuf};

pub use catalog::RouteCatalog;
pub use route::Route;

/// Fatal error while building the route catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Source root missing or not a directory.
    #[error("Source directory not found: {}", .0.display())]
    SourceNotFound(PathBuf),
    /// File or directory could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// Path being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Two source files resolve to the same URL path.
    #[error(
        "Duplicate URL path {url_path}: {} and {}",
        first.display(),
        second.display()
    )]
    DuplicateUrl {
        /// Colliding URL path.
        url_path: String,
        /// First file claiming the URL.
        first: PathBuf,
        /// Second file claiming the URL.
        second: PathBuf,
    },
}

impl CatalogError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
