//! `folio build` command implementation.

use std::path::PathBuf;

use clap::Args;
use folio_build::{BuildOrchestrator, NativeBundler};
use folio_config::{CliSettings, Config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Path to configuration file (default: auto-discover folio.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Documentation source directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Output directory (overrides config).
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// URL prefix the site is served under (overrides config).
    #[arg(long, env = "FOLIO_BASE")]
    base: Option<String>,

    /// Compare every prerendered page with the client's first paint.
    #[arg(long)]
    verify_parity: bool,

    /// Enable verbose output (phase progress and per-page logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl BuildArgs {
    /// Execute the build command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, route discovery fails, or
    /// either bundler phase fails. Per-page failures are reported as warnings.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            source_dir: self.source_dir,
            out_dir: self.out_dir,
            base: self.base,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        output.info(&format!(
            "Source: {}",
            config.docs_resolved.source_dir.display()
        ));
        output.info(&format!("Output: {}", config.docs_resolved.out_dir.display()));

        let mut orchestrator =
            BuildOrchestrator::new(&config, NativeBundler::new()).verify_parity(self.verify_parity);
        let report = orchestrator.run()?;

        output.build_report(&report);

        Ok(())
    }
}
