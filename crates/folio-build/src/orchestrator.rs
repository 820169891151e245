//! Build orchestration.
//!
//! A build walks `Idle -> ClientBuilt -> ServerBuilt -> Prerendered`, or ends
//! in `Failed`. Route discovery and both bundler phases are fatal; a failing
//! route during prerender is logged and skipped.
//!
//! The client bundle is staged under the project directory and only copied
//! into the output directory once the server build has loaded, so a fatal
//! phase leaves the output directory untouched.

use std::fs;
use std::io;
use std::num::NonZero;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use folio_config::Config;
use folio_site::{Route, RouteCatalog};
use rayon::prelude::*;

use crate::bundler::{BundleOutput, BundleRequest, BundleTarget, Bundler};
use crate::client::ClientApp;
use crate::components::{ComponentRenderer, DefaultComponents};
use crate::content_index::{CONTENT_INDEX_FILE, render_content_index};
use crate::error::{BuildError, BuildPhase, BundleError};
use crate::manifest::AssetManifest;
use crate::modules::{self, CLIENT_ENTRY, SERVER_ENTRY};
use crate::page::{PageHead, render_document};
use crate::parity;
use crate::search::{NullSearch, SearchProvider};
use crate::server::ServerEntry;
use crate::site_data::SiteData;
use crate::sitemap::{SITEMAP_FILE, render_sitemap};

/// Build progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    Idle,
    ClientBuilt,
    ServerBuilt,
    Prerendered,
    /// Stopped in the given phase.
    Failed(BuildPhase),
}

/// One prerendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildArtifact {
    pub url_path: String,
    /// Written HTML file.
    pub output_path: PathBuf,
    /// Shell markup returned by the server entry.
    pub server_markup: String,
    /// Script and style URLs injected into the page.
    pub client_asset_refs: Vec<String>,
}

/// Route that could not be prerendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteFailure {
    pub url_path: String,
    pub message: String,
}

/// Result of a build that got past both bundler phases.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    /// Routes in the catalog.
    pub discovered: usize,
    /// Pages written.
    pub rendered: usize,
    pub failures: Vec<RouteFailure>,
    /// Written pages in catalog order.
    pub artifacts: Vec<BuildArtifact>,
    /// Sitemap and content index, when written.
    pub extra_outputs: Vec<PathBuf>,
}

impl BuildReport {
    /// Check whether every discovered route was rendered.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.rendered == self.discovered
    }
}

/// Drives route discovery, both bundler phases and the prerender pass.
pub struct BuildOrchestrator<'a, B: Bundler> {
    config: &'a Config,
    bundler: B,
    search: Arc<dyn SearchProvider>,
    components: Arc<dyn ComponentRenderer>,
    verify_parity: bool,
    state: BuildState,
}

impl<'a, B: Bundler> BuildOrchestrator<'a, B> {
    pub fn new(config: &'a Config, bundler: B) -> Self {
        Self {
            config,
            bundler,
            search: Arc::new(NullSearch),
            components: Arc::new(DefaultComponents),
            verify_parity: false,
            state: BuildState::Idle,
        }
    }

    /// Search provider exported through the search module.
    #[must_use]
    pub fn with_search(mut self, search: Arc<dyn SearchProvider>) -> Self {
        self.search = search;
        self
    }

    /// Component renderer used by the client model during parity checks.
    ///
    /// Must render like the one inside the bundler's server entry.
    #[must_use]
    pub fn with_components(mut self, components: Arc<dyn ComponentRenderer>) -> Self {
        self.components = components;
        self
    }

    /// Compare every page against the client's first paint.
    ///
    /// A mismatch counts as a failed route.
    #[must_use]
    pub fn verify_parity(mut self, enabled: bool) -> Self {
        self.verify_parity = enabled;
        self
    }

    pub fn state(&self) -> BuildState {
        self.state
    }

    /// Run a full build from `Idle`.
    pub fn run(&mut self) -> Result<BuildReport, BuildError> {
        self.state = BuildState::Idle;
        let result = self.execute();
        if let Err(e) = &result {
            self.state = BuildState::Failed(e.phase());
            tracing::debug!(phase = %e.phase(), error = %e, "Build failed");
        }
        result
    }

    fn execute(&mut self) -> Result<BuildReport, BuildError> {
        let config = self.config;
        let docs = &config.docs_resolved;
        let base = config.site.base.clone();

        let catalog = RouteCatalog::build(&docs.source_dir)?;
        let data = Arc::new(SiteData::new(&config.site, &catalog));
        let modules = modules::site_modules(&data, self.search.as_ref()).map_err(|source| {
            BuildError::Serialize {
                phase: BuildPhase::ClientBuild,
                source,
            }
        })?;

        let mut transient = TransientFiles::new(&docs.project_dir);
        let client_entry = docs.project_dir.join("entry-client.js");
        let server_entry = docs.project_dir.join("entry-server.js");
        transient.file(&client_entry);
        transient.file(&server_entry);
        write_entry(&client_entry, CLIENT_ENTRY, BuildPhase::ClientBuild)?;
        write_entry(&server_entry, SERVER_ENTRY, BuildPhase::ServerBuild)?;

        // Client phase
        let client_dir = docs.project_dir.join("client");
        transient.dir(&client_dir);
        let client = self
            .bundler
            .bundle(&BundleRequest {
                target: BundleTarget::Client,
                entry: client_entry,
                modules: modules.clone(),
                out_dir: client_dir,
                base: base.clone(),
            })
            .map_err(|source| BuildError::Phase {
                phase: BuildPhase::ClientBuild,
                source,
            })?;
        let manifest = read_manifest(client.html_shell.as_deref(), &base).map_err(|source| {
            BuildError::Phase {
                phase: BuildPhase::ClientBuild,
                source,
            }
        })?;
        self.state = BuildState::ClientBuilt;
        tracing::info!(
            scripts = manifest.scripts.len(),
            styles = manifest.styles.len(),
            "Client build complete"
        );

        // Server phase
        let server_dir = docs.project_dir.join("server");
        transient.dir(&server_dir);
        let server_phase = |source| BuildError::Phase {
            phase: BuildPhase::ServerBuild,
            source,
        };
        let server = self
            .bundler
            .bundle(&BundleRequest {
                target: BundleTarget::Server,
                entry: server_entry,
                modules,
                out_dir: server_dir,
                base: base.clone(),
            })
            .map_err(server_phase)?;
        let entry = self.bundler.load_server(&server).map_err(server_phase)?;
        self.state = BuildState::ServerBuilt;
        tracing::info!("Server build complete");

        let published = publish(&client, &docs.out_dir)?;
        tracing::debug!(files = published.len(), out_dir = %docs.out_dir.display(), "Published client bundle");

        // Prerender phase
        let prerender = Prerender {
            data: &data,
            out_dir: &docs.out_dir,
            entry: entry.as_ref(),
            manifest: &manifest,
            parity: self.verify_parity.then(|| ParityCheck {
                data: Arc::clone(&data),
                search: Arc::clone(&self.search),
                components: Arc::clone(&self.components),
            }),
        };
        let mut report = prerender.run(catalog.routes(), self.jobs())?;
        self.state = BuildState::Prerendered;
        tracing::info!(
            rendered = report.rendered,
            discovered = report.discovered,
            "Prerender complete"
        );

        report.extra_outputs = self.write_extra_outputs(&catalog, &data)?;
        Ok(report)
    }

    fn jobs(&self) -> usize {
        self.config
            .build
            .jobs
            .unwrap_or_else(|| std::thread::available_parallelism().map_or(1, NonZero::get))
    }

    /// Write the sitemap and content index.
    fn write_extra_outputs(
        &self,
        catalog: &RouteCatalog,
        data: &SiteData,
    ) -> Result<Vec<PathBuf>, BuildError> {
        let out_dir = &self.config.docs_resolved.out_dir;
        let mut written = Vec::new();

        if self.config.build.sitemap {
            let urls = catalog.routes().iter().map(|r| r.url_path.as_str());
            match render_sitemap(&data.meta, urls) {
                Some(xml) => {
                    let path = out_dir.join(SITEMAP_FILE);
                    write_output(&path, &xml)?;
                    written.push(path);
                }
                None => tracing::debug!("No site.url configured, skipping sitemap"),
            }
        }

        if self.config.build.content_index {
            let json = render_content_index(catalog.routes(), &data.meta.base).map_err(|source| {
                BuildError::Serialize {
                    phase: BuildPhase::Outputs,
                    source,
                }
            })?;
            let path = out_dir.join(CONTENT_INDEX_FILE);
            write_output(&path, &json)?;
            written.push(path);
        }

        Ok(written)
    }
}

/// Inputs for checking pages against the client's first paint.
struct ParityCheck {
    data: Arc<SiteData>,
    search: Arc<dyn SearchProvider>,
    components: Arc<dyn ComponentRenderer>,
}

impl ParityCheck {
    fn check(&self, url_path: &str, server_markup: &str) -> Result<(), String> {
        let location = self.data.meta.href(url_path);
        let client = ClientApp::new(Arc::clone(&self.data), Arc::clone(&self.search), &location)
            .with_components(Arc::clone(&self.components))
            .first_paint()
            .map_err(|e| format!("client first paint failed: {e}"))?;
        parity::compare(server_markup, &client).map_err(|e| e.to_string())
    }
}

/// Prerender pass over the catalog.
struct Prerender<'a> {
    data: &'a SiteData,
    out_dir: &'a Path,
    entry: &'a dyn ServerEntry,
    manifest: &'a AssetManifest,
    parity: Option<ParityCheck>,
}

impl Prerender<'_> {
    fn run(&self, routes: &[Route], jobs: usize) -> Result<BuildReport, BuildError> {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;
        let results: Vec<Result<BuildArtifact, RouteFailure>> =
            pool.install(|| routes.par_iter().map(|route| self.route(route)).collect());

        let mut report = BuildReport {
            discovered: routes.len(),
            ..BuildReport::default()
        };
        for result in results {
            match result {
                Ok(artifact) => report.artifacts.push(artifact),
                Err(failure) => {
                    tracing::warn!(
                        route = %failure.url_path,
                        error = %failure.message,
                        "Failed to prerender route"
                    );
                    report.failures.push(failure);
                }
            }
        }
        report.rendered = report.artifacts.len();
        Ok(report)
    }

    fn route(&self, route: &Route) -> Result<BuildArtifact, RouteFailure> {
        let fail = |message: String| RouteFailure {
            url_path: route.url_path.clone(),
            message,
        };

        let page = self
            .entry
            .render(&route.url_path)
            .map_err(|e| fail(e.to_string()))?;
        if let Some(parity) = &self.parity {
            parity
                .check(&route.url_path, &page.markup)
                .map_err(|e| fail(format!("server markup differs from client first paint: {e}")))?;
        }

        let head = PageHead::new(&self.data.meta, &page, route.locale.as_deref());
        let html = render_document(&head, &page.markup, self.manifest);
        let output_path = output_path(self.out_dir, &route.url_path);
        write_page(&output_path, &html).map_err(|e| fail(format!("cannot write {}: {e}", output_path.display())))?;

        tracing::debug!(route = %route.url_path, path = %output_path.display(), "Wrote page");
        Ok(BuildArtifact {
            url_path: route.url_path.clone(),
            output_path,
            server_markup: page.markup,
            client_asset_refs: self.manifest.refs(),
        })
    }
}

/// Output file for a URL path: `/` is `index.html`, `/a/b` is `a/b/index.html`.
pub fn output_path(out_dir: &Path, url_path: &str) -> PathBuf {
    url_path
        .split('/')
        .filter(|s| !s.is_empty())
        .fold(out_dir.to_path_buf(), |path, segment| path.join(segment))
        .join("index.html")
}

/// Copy a staged bundle's files into `out_dir`, keeping their relative paths.
fn publish(bundle: &BundleOutput, out_dir: &Path) -> Result<Vec<PathBuf>, BuildError> {
    let mut published = Vec::with_capacity(bundle.files.len());
    for file in &bundle.files {
        let Ok(rel) = file.strip_prefix(&bundle.out_dir) else {
            tracing::warn!(path = %file.display(), "Bundle file outside its output directory, skipping");
            continue;
        };
        let target = out_dir.join(rel);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| BuildError::io(BuildPhase::Publish, parent, e))?;
        }
        fs::copy(file, &target).map_err(|e| BuildError::io(BuildPhase::Publish, &target, e))?;
        published.push(target);
    }
    Ok(published)
}

fn read_manifest(shell: Option<&Path>, base: &str) -> Result<AssetManifest, BundleError> {
    let shell = shell.ok_or(BundleError::MissingShell)?;
    let html = fs::read_to_string(shell).map_err(|e| BundleError::io(shell, e))?;
    Ok(AssetManifest::from_shell(&html, base))
}

fn write_page(path: &Path, html: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, html)
}

fn write_entry(path: &Path, source: &str, phase: BuildPhase) -> Result<(), BuildError> {
    write_page(path, source).map_err(|e| BuildError::io(phase, path, e))
}

fn write_output(path: &Path, content: &str) -> Result<(), BuildError> {
    write_page(path, content).map_err(|e| BuildError::io(BuildPhase::Outputs, path, e))
}

/// Transient build files, removed on drop.
struct TransientFiles {
    project_dir: PathBuf,
    files: Vec<PathBuf>,
    dirs: Vec<PathBuf>,
}

impl TransientFiles {
    fn new(project_dir: &Path) -> Self {
        Self {
            project_dir: project_dir.to_path_buf(),
            files: Vec::new(),
            dirs: Vec::new(),
        }
    }

    fn file(&mut self, path: &Path) {
        self.files.push(path.to_path_buf());
    }

    fn dir(&mut self, path: &Path) {
        self.dirs.push(path.to_path_buf());
    }
}

impl Drop for TransientFiles {
    fn drop(&mut self) {
        for path in &self.files {
            log_removal(path, fs::remove_file(path));
        }
        for path in &self.dirs {
            log_removal(path, fs::remove_dir_all(path));
        }
        // Only removed when nothing else lives there
        if let Err(e) = fs::remove_dir(&self.project_dir) {
            tracing::trace!(path = %self.project_dir.display(), error = %e, "Keeping project directory");
        }
    }
}

fn log_removal(path: &Path, result: io::Result<()>) {
    match result {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "Failed to remove transient file"),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::native::NativeBundler;

    fn config(root: &Path) -> Config {
        let mut config = Config::default_with_base(root);
        config.settle().unwrap();
        config
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    /// Bundler failing in a chosen phase.
    struct FailingBundler {
        fail_on: BundleTarget,
        calls: Cell<usize>,
    }

    impl Bundler for FailingBundler {
        fn bundle(&self, request: &BundleRequest) -> Result<BundleOutput, BundleError> {
            self.calls.set(self.calls.get() + 1);
            if request.target == self.fail_on {
                return Err(BundleError::MissingModule("virtual:folio/boom".to_owned()));
            }
            NativeBundler::new().bundle(request)
        }

        fn load_server(&self, output: &BundleOutput) -> Result<Box<dyn ServerEntry>, BundleError> {
            NativeBundler::new().load_server(output)
        }
    }

    #[test]
    fn test_output_path() {
        let out = Path::new("/out");
        assert_eq!(output_path(out, "/"), PathBuf::from("/out/index.html"));
        assert_eq!(output_path(out, "/guide"), PathBuf::from("/out/guide/index.html"));
        assert_eq!(output_path(out, "/v2/"), PathBuf::from("/out/v2/index.html"));
    }

    #[test]
    fn test_client_failure_is_fatal() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "docs/index.md", "# Home");
        let config = config(temp.path());

        let bundler = FailingBundler {
            fail_on: BundleTarget::Client,
            calls: Cell::new(0),
        };
        let mut build = BuildOrchestrator::new(&config, bundler);
        let err = build.run().unwrap_err();

        assert_eq!(err.phase(), BuildPhase::ClientBuild);
        assert_eq!(build.state(), BuildState::Failed(BuildPhase::ClientBuild));
        assert!(!temp.path().join("dist/index.html").exists());
        assert!(!temp.path().join(".folio").exists());
    }

    #[test]
    fn test_server_failure_is_fatal_and_cleans_up() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "docs/index.md", "# Home");
        let config = config(temp.path());

        let bundler = FailingBundler {
            fail_on: BundleTarget::Server,
            calls: Cell::new(0),
        };
        let mut build = BuildOrchestrator::new(&config, bundler);
        let err = build.run().unwrap_err();

        assert_eq!(err.phase(), BuildPhase::ServerBuild);
        assert!(err.to_string().starts_with("server build failed"));
        assert_eq!(build.state(), BuildState::Failed(BuildPhase::ServerBuild));
        assert_eq!(build.bundler.calls.get(), 2);
        // The client bundle was built but never published
        assert!(!temp.path().join("dist").exists());
        assert!(!temp.path().join(".folio").exists());
    }

    #[test]
    fn test_client_bundle_published_after_server_build() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "docs/guide.md", "# Guide");
        let config = config(temp.path());

        let report = BuildOrchestrator::new(&config, NativeBundler::new()).run().unwrap();
        assert_eq!(report.rendered, 1);

        let dist = temp.path().join("dist");
        let assets: Vec<String> = fs::read_dir(dist.join("assets"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(assets.len(), 2);
        for asset in &report.artifacts[0].client_asset_refs {
            let name = asset.rsplit('/').next().unwrap();
            assert!(assets.iter().any(|a| a == name), "{asset} not published");
        }
        // No root route, so the client shell stays as the fallback page
        assert!(dist.join("index.html").is_file());
        assert!(!temp.path().join(".folio").exists());
    }

    #[test]
    fn test_publish_keeps_relative_paths() {
        let temp = tempfile::tempdir().unwrap();
        let staged = temp.path().join("staged");
        write(&staged, "assets/app.js", "js");
        write(&staged, "index.html", "<html>");
        let bundle = BundleOutput {
            out_dir: staged.clone(),
            files: vec![staged.join("assets/app.js"), staged.join("index.html")],
            ..BundleOutput::default()
        };

        let out = temp.path().join("out");
        let published = publish(&bundle, &out).unwrap();
        assert_eq!(published, vec![out.join("assets/app.js"), out.join("index.html")]);
        assert_eq!(fs::read_to_string(out.join("assets/app.js")).unwrap(), "js");
    }

    #[test]
    fn test_catalog_failure_before_bundling() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "docs/guide/index.md", "# A");
        write(temp.path(), "docs/guide/README.md", "# B");
        let config = config(temp.path());

        let bundler = FailingBundler {
            fail_on: BundleTarget::Server,
            calls: Cell::new(0),
        };
        let mut build = BuildOrchestrator::new(&config, bundler);
        let err = build.run().unwrap_err();
        assert_eq!(err.phase(), BuildPhase::Catalog);
        assert_eq!(build.bundler.calls.get(), 0);
    }

    #[test]
    fn test_report_completeness() {
        let report = BuildReport {
            discovered: 2,
            rendered: 1,
            failures: vec![RouteFailure {
                url_path: "/x".to_owned(),
                message: "boom".to_owned(),
            }],
            ..BuildReport::default()
        };
        assert!(!report.is_complete());
        assert!(BuildReport::default().is_complete());
    }
}
