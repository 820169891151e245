//! Route record.

use std::path::PathBuf;

use folio_renderer::{ContentTree, Frontmatter, TocEntry, TransformedDocument};
use serde::Serialize;

/// One documentation page.
///
/// Built once per catalog build and never patched afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    /// Canonical absolute URL (`/`, `/guide`, `/v2/`).
    pub url_path: String,
    /// Absolute path of the backing file.
    pub source_file: PathBuf,
    /// Path relative to the source root, `/`-separated.
    pub relative_path: String,
    /// Version token from the first path segment.
    pub version: Option<String>,
    /// Locale token from the first path segment (never set with `version`).
    pub locale: Option<String>,
    /// Declared page metadata.
    pub frontmatter: Frontmatter,
    /// Heading outline.
    pub toc: Vec<TocEntry>,
    /// Structured body.
    #[serde(skip)]
    pub body: ContentTree,
    /// Original source text.
    pub raw_content: String,
}

impl Route {
    /// Assemble a route from a transformed document.
    pub(crate) fn new(
        relative_path: String,
        source_file: PathBuf,
        raw_content: String,
        document: TransformedDocument,
    ) -> Self {
        Self {
            url_path: folio_paths::file_to_url_path(&relative_path),
            version: folio_paths::detect_version(&relative_path),
            locale: folio_paths::detect_locale(&relative_path),
            source_file,
            relative_path,
            frontmatter: document.frontmatter,
            toc: document.toc,
            body: document.body,
            raw_content,
        }
    }

    /// Display title: frontmatter title, then first `#` heading, then file name.
    pub fn title(&self) -> String {
        if let Some(title) = &self.frontmatter.title {
            return title.clone();
        }
        if let Some(h1) = self.toc.iter().find(|e| e.depth == 1) {
            return h1.text.clone();
        }
        let stem = self
            .url_path
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default();
        if stem.is_empty() {
            "Home".to_owned()
        } else {
            stem.to_owned()
        }
    }

    /// URL path with the version or locale segment removed.
    ///
    /// Used to find the same page under another version or locale.
    pub fn unscoped_path(&self) -> String {
        match self.version.as_deref().or(self.locale.as_deref()) {
            Some(token) => folio_paths::strip_prefix(&self.url_path, token),
            None => self.url_path.clone(),
        }
    }
}
