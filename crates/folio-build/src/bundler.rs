//! Bundler collaborator seam.

use std::path::PathBuf;

use crate::error::BundleError;
use crate::modules::SyntheticModule;
use crate::server::ServerEntry;

/// What a bundle is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleTarget {
    /// Browser-loadable assets plus an HTML shell.
    Client,
    /// Render function executable outside a browser.
    Server,
}

/// One bundler invocation.
#[derive(Debug, Clone)]
pub struct BundleRequest {
    pub target: BundleTarget,
    /// Entry file on disk.
    pub entry: PathBuf,
    /// Modules resolvable by id from the entry.
    pub modules: Vec<SyntheticModule>,
    /// Directory receiving the emitted files.
    pub out_dir: PathBuf,
    /// Public base path assets are served under.
    pub base: String,
}

/// Files emitted by a bundler invocation.
#[derive(Debug, Clone, Default)]
pub struct BundleOutput {
    pub out_dir: PathBuf,
    /// HTML shell referencing the emitted assets (client builds).
    pub html_shell: Option<PathBuf>,
    /// Loadable server bundle (server builds).
    pub server_bundle: Option<PathBuf>,
    /// Every file written.
    pub files: Vec<PathBuf>,
}

/// Module bundler able to build both targets from the same module graph.
pub trait Bundler {
    /// Build one target.
    fn bundle(&self, request: &BundleRequest) -> Result<BundleOutput, BundleError>;

    /// Load the render function from a server build.
    fn load_server(&self, output: &BundleOutput) -> Result<Box<dyn ServerEntry>, BundleError>;
}
