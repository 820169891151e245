//! Configuration management for Folio.
//!
//! Parses `folio.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `site.url`
//! - `site.base`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override docs source directory.
    pub source_dir: Option<PathBuf>,
    /// Override output directory.
    pub out_dir: Option<PathBuf>,
    /// Override URL base path.
    pub base: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "folio.toml";

/// Reserved project directory for transient build files.
pub const PROJECT_DIR_NAME: &str = ".folio";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site-level metadata.
    pub site: SiteConfig,
    /// Documentation configuration (paths are relative strings from TOML).
    docs: DocsConfigRaw,
    /// Build output toggles.
    pub build: BuildConfig,

    /// Resolved docs configuration (set after loading).
    #[serde(skip)]
    pub docs_resolved: DocsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Site-level metadata exposed to every page.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site title, used as the fallback page title.
    pub title: String,
    /// Site description, used as the fallback page description.
    pub description: String,
    /// URL prefix the site is served under (normalized to `/.../`).
    pub base: String,
    /// Absolute site URL (`https://docs.example.com`), required for sitemaps.
    pub url: Option<String>,
    /// Known version tokens, oldest first.
    pub versions: Vec<String>,
    /// Version selected by default (last listed when unset).
    pub default_version: Option<String>,
    /// Known locale tokens.
    pub locales: Vec<String>,
    /// Locale selected by default (first listed when unset).
    pub default_locale: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Documentation".to_owned(),
            description: String::new(),
            base: "/".to_owned(),
            url: None,
            versions: Vec::new(),
            default_version: None,
            locales: Vec::new(),
            default_locale: None,
        }
    }
}

/// Raw docs configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocsConfigRaw {
    source_dir: Option<String>,
    out_dir: Option<String>,
}

/// Resolved documentation configuration with absolute paths.
#[derive(Debug, Default, Clone)]
pub struct DocsConfig {
    /// Source directory for markdown files.
    pub source_dir: PathBuf,
    /// Output directory for the built site.
    pub out_dir: PathBuf,
    /// Project directory for transient build files (.folio/).
    pub project_dir: PathBuf,
}

/// Build output configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Write `sitemap.xml` (requires `site.url`).
    pub sitemap: bool,
    /// Write `content-index.json`.
    pub content_index: bool,
    /// Worker threads for prerendering (defaults to available parallelism).
    pub jobs: Option<usize>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            sitemap: true,
            content_index: true,
            jobs: None,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`site.url`").
        field: String,
        /// Error message (e.g., "${`DOCS_URL`} not set").
        message: String,
    },
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

/// Normalize a base path to carry exactly one leading and one trailing `/`.
///
/// # Examples
///
/// ```
/// use folio_config::normalize_base;
///
/// assert_eq!(normalize_base(""), "/");
/// assert_eq!(normalize_base("docs"), "/docs/");
/// assert_eq!(normalize_base("/docs/v2/"), "/docs/v2/");
/// ```
pub fn normalize_base(base: &str) -> String {
    let trimmed = base.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_owned()
    } else {
        format!("/{trimmed}/")
    }
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `folio.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values. Defaults are
    /// settled and validated last.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the settled configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.settle()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source_dir) = &settings.source_dir {
            self.docs_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(out_dir) = &settings.out_dir {
            self.docs_resolved.out_dir.clone_from(out_dir);
        }
        if let Some(base) = &settings.base {
            self.site.base.clone_from(base);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    pub fn default_with_base(base: &Path) -> Self {
        Self {
            site: SiteConfig::default(),
            docs: DocsConfigRaw::default(),
            build: BuildConfig::default(),
            docs_resolved: DocsConfig {
                source_dir: base.join("docs"),
                out_dir: base.join("dist"),
                project_dir: base.join(PROJECT_DIR_NAME),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Normalize the base path, fill in default version/locale, then validate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn settle(&mut self) -> Result<(), ConfigError> {
        self.site.base = normalize_base(&self.site.base);
        if self.site.default_version.is_none() {
            self.site.default_version = self.site.versions.last().cloned();
        }
        if self.site.default_locale.is_none() {
            self.site.default_locale = self.site.locales.first().cloned();
        }
        self.validate()
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_site()?;
        self.validate_build()?;
        Ok(())
    }

    /// Validate site configuration.
    fn validate_site(&self) -> Result<(), ConfigError> {
        let site = &self.site;

        if let Some(ref url) = site.url {
            require_http_url(url, "site.url")?;
        }

        if let Some(bad) = site
            .versions
            .iter()
            .find(|v| !folio_paths::is_version_token(v))
        {
            return Err(ConfigError::Validation(format!(
                "site.versions entry '{bad}' is not a version token (expected v1, v2.1, ...)"
            )));
        }
        if let Some(ref default) = site.default_version
            && !site.versions.contains(default)
        {
            return Err(ConfigError::Validation(format!(
                "site.default_version '{default}' is not listed in site.versions"
            )));
        }

        if let Some(bad) = site
            .locales
            .iter()
            .find(|l| !folio_paths::is_locale_token(l))
        {
            return Err(ConfigError::Validation(format!(
                "site.locales entry '{bad}' is not a locale token (expected en, ja, en-US, ...)"
            )));
        }
        if let Some(ref default) = site.default_locale
            && !site.locales.contains(default)
        {
            return Err(ConfigError::Validation(format!(
                "site.default_locale '{default}' is not listed in site.locales"
            )));
        }

        Ok(())
    }

    /// Validate build configuration.
    fn validate_build(&self) -> Result<(), ConfigError> {
        if self.build.jobs == Some(0) {
            return Err(ConfigError::Validation(
                "build.jobs must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        expand::expand_site(&mut self.site)
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.docs_resolved = DocsConfig {
            source_dir: resolve(self.docs.source_dir.as_deref(), "docs"),
            out_dir: resolve(self.docs.out_dir.as_deref(), "dist"),
            project_dir: config_dir.join(PROJECT_DIR_NAME),
        };
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.site.title, "Documentation");
        assert_eq!(config.site.base, "/");
        assert_eq!(config.docs_resolved.source_dir, PathBuf::from("/test/docs"));
        assert_eq!(config.docs_resolved.out_dir, PathBuf::from("/test/dist"));
        assert_eq!(
            config.docs_resolved.project_dir,
            PathBuf::from("/test/.folio")
        );
        assert!(config.build.sitemap);
        assert!(config.build.content_index);
        assert!(config.build.jobs.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.site.title, "Documentation");
        assert!(config.site.versions.is_empty());
    }

    #[test]
    fn test_parse_site_config() {
        let toml = r#"
[site]
title = "Acme Docs"
description = "Everything about Acme"
base = "/acme/"
url = "https://docs.acme.dev"
versions = ["v1", "v2"]
locales = ["en", "ja"]
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.site.title, "Acme Docs");
        assert_eq!(config.site.description, "Everything about Acme");
        assert_eq!(config.site.url.as_deref(), Some("https://docs.acme.dev"));
        assert_eq!(config.site.versions, vec!["v1", "v2"]);
        assert_eq!(config.site.locales, vec!["en", "ja"]);
    }

    #[test]
    fn test_settle_fills_defaults() {
        let toml = r#"
[site]
base = "docs"
versions = ["v1", "v2"]
locales = ["en", "ja"]
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.settle().unwrap();

        assert_eq!(config.site.base, "/docs/");
        assert_eq!(config.site.default_version.as_deref(), Some("v2"));
        assert_eq!(config.site.default_locale.as_deref(), Some("en"));
    }

    #[test]
    fn test_default_version_must_be_listed() {
        let toml = r#"
[site]
versions = ["v1", "v2"]
default_version = "v3"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.settle().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("default_version"));
    }

    #[test]
    fn test_default_locale_must_be_listed() {
        let toml = r#"
[site]
locales = ["en"]
default_locale = "fr"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.settle().unwrap_err();
        assert!(err.to_string().contains("default_locale"));
    }

    #[test]
    fn test_versions_must_match_grammar() {
        let toml = r#"
[site]
versions = ["v1", "latest"]
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.settle().unwrap_err();
        assert!(err.to_string().contains("latest"));
    }

    #[test]
    fn test_locales_must_match_grammar() {
        let toml = r#"
[site]
locales = ["en_US"]
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.settle().unwrap_err();
        assert!(err.to_string().contains("en_US"));
    }

    #[test]
    fn test_url_requires_http_scheme() {
        let toml = r#"
[site]
url = "docs.acme.dev"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.settle().unwrap_err();
        assert!(err.to_string().contains("site.url"));
    }

    #[test]
    fn test_jobs_zero_rejected() {
        let toml = r"
[build]
jobs = 0
";
        let mut config: Config = toml::from_str(toml).unwrap();
        assert!(config.settle().is_err());
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[docs]
source_dir = "content"
out_dir = "public"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.docs_resolved.source_dir,
            PathBuf::from("/project/content")
        );
        assert_eq!(config.docs_resolved.out_dir, PathBuf::from("/project/public"));
        assert_eq!(
            config.docs_resolved.project_dir,
            PathBuf::from("/project/.folio")
        );
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            out_dir: Some(PathBuf::from("/tmp/site")),
            base: Some("preview".to_owned()),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);
        config.settle().unwrap();

        assert_eq!(config.docs_resolved.out_dir, PathBuf::from("/tmp/site"));
        assert_eq!(config.docs_resolved.source_dir, PathBuf::from("/test/docs"));
        assert_eq!(config.site.base, "/preview/");
    }

    #[test]
    fn test_normalize_base() {
        assert_eq!(normalize_base(""), "/");
        assert_eq!(normalize_base("/"), "/");
        assert_eq!(normalize_base("docs"), "/docs/");
        assert_eq!(normalize_base("/docs"), "/docs/");
        assert_eq!(normalize_base("docs/"), "/docs/");
        assert_eq!(normalize_base(" /a/b/ "), "/a/b/");
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/folio.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_from_file_resolves_relative_to_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("folio.toml");
        std::fs::write(
            &path,
            r#"
[site]
title = "Loaded"
base = "/guide"

[docs]
source_dir = "src/docs"
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.site.title, "Loaded");
        assert_eq!(config.site.base, "/guide/");
        assert_eq!(config.docs_resolved.source_dir, dir.path().join("src/docs"));
        assert_eq!(config.docs_resolved.out_dir, dir.path().join("dist"));
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_expands_env_in_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("folio.toml");
        std::fs::write(
            &path,
            "[site]\nurl = \"https://${FOLIO_TEST_UNSET_HOST:-docs.example.org}\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.site.url.as_deref(), Some("https://docs.example.org"));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("folio.toml");
        std::fs::write(&path, "[site\ntitle = ").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
