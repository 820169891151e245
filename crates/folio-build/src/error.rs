//! Build error types.

use std::fmt;
use std::path::{Path, PathBuf};

use folio_site::CatalogError;

/// Fatal build phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
    Catalog,
    ClientBuild,
    ServerBuild,
    /// Copying the staged client bundle into the output directory.
    Publish,
    Prerender,
    Outputs,
}

impl fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Catalog => "route discovery",
            Self::ClientBuild => "client build",
            Self::ServerBuild => "server build",
            Self::Publish => "publishing client assets",
            Self::Prerender => "prerender",
            Self::Outputs => "sitemap and content index",
        })
    }
}

/// Error aborting the whole build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Route discovery failed.
    #[error("route discovery failed: {0}")]
    Catalog(#[from] CatalogError),
    /// The bundler failed during a phase.
    #[error("{phase} failed: {source}")]
    Phase {
        /// Failing phase.
        phase: BuildPhase,
        /// Bundler diagnostic.
        #[source]
        source: BundleError,
    },
    /// Writing build inputs or outputs failed.
    #[error("{phase} failed: cannot write {}: {source}", path.display())]
    Io {
        /// Phase doing the write.
        phase: BuildPhase,
        /// Path being written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Serializing synthetic modules or outputs failed.
    #[error("{phase} failed: {source}")]
    Serialize {
        /// Failing phase.
        phase: BuildPhase,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
    /// The prerender worker pool could not start.
    #[error("prerender failed: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl BuildError {
    pub(crate) fn io(phase: BuildPhase, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            phase,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Phase the build stopped in.
    pub fn phase(&self) -> BuildPhase {
        match self {
            Self::Catalog(_) => BuildPhase::Catalog,
            Self::Phase { phase, .. } | Self::Io { phase, .. } | Self::Serialize { phase, .. } => {
                *phase
            }
            Self::ThreadPool(_) => BuildPhase::Prerender,
        }
    }
}

/// Error reported by a bundler.
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    /// File could not be read or written.
    #[error("{}: {source}", path.display())]
    Io {
        /// Path involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// A synthetic module the entry imports was not provided.
    #[error("unresolved module {0}")]
    MissingModule(String),
    /// A synthetic module could not be evaluated.
    #[error("invalid module {id}: {message}")]
    InvalidModule {
        /// Module id.
        id: String,
        /// What went wrong.
        message: String,
    },
    /// The client build emitted no HTML shell.
    #[error("client build produced no HTML shell")]
    MissingShell,
    /// The server bundle could not be loaded.
    #[error("cannot load server bundle {}: {message}", path.display())]
    Load {
        /// Bundle file.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },
}

impl BundleError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Error rendering a single route.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// No route for the URL path.
    #[error("no route for {0}")]
    NotFound(String),
    /// The render function failed.
    #[error("rendering {url_path} failed: {message}")]
    Failed {
        /// Route being rendered.
        url_path: String,
        /// What went wrong.
        message: String,
    },
}
