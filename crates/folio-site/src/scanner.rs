//! Source discovery by filesystem walking.
//!
//! The scanner only identifies files that become routes; reading and
//! transforming them is the catalog's job.

use std::fs;
use std::path::{Path, PathBuf};

use crate::CatalogError;

/// Directory names never scanned (package manager dependencies).
pub(crate) const DEPENDENCY_DIRS: &[&str] = &["node_modules", "vendor", "bower_components"];

/// Reference to a discovered source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SourceRef {
    /// Path relative to the source root, `/`-separated.
    pub relative_path: String,
    /// Absolute path on disk.
    pub path: PathBuf,
}

/// Check whether a directory entry is skipped during discovery.
///
/// Hidden entries (including the `.folio/` project directory) and dependency
/// directories are skipped; underscore-prefixed files are drafts.
pub(crate) fn is_excluded(name: &str, is_dir: bool) -> bool {
    if name.starts_with('.') {
        return true;
    }
    if is_dir {
        DEPENDENCY_DIRS.contains(&name)
    } else {
        name.starts_with('_') || !folio_paths::is_markdown_file(name)
    }
}

/// Discovers markdown sources by walking the filesystem.
pub(crate) struct Scanner {
    source_dir: PathBuf,
}

impl Scanner {
    pub(crate) fn new(source_dir: PathBuf) -> Self {
        Self { source_dir }
    }

    /// Scan the source tree.
    ///
    /// Errors if the root is missing or any directory cannot be listed.
    pub(crate) fn scan(&self) -> Result<Vec<SourceRef>, CatalogError> {
        if !self.source_dir.is_dir() {
            return Err(CatalogError::SourceNotFound(self.source_dir.clone()));
        }
        let mut refs = Vec::new();
        self.scan_directory(&self.source_dir, "", &mut refs)?;
        Ok(refs)
    }

    fn scan_directory(
        &self,
        dir_path: &Path,
        rel_prefix: &str,
        refs: &mut Vec<SourceRef>,
    ) -> Result<(), CatalogError> {
        let entries = fs::read_dir(dir_path).map_err(|e| CatalogError::io(dir_path, e))?;

        for entry in entries {
            let entry = entry.map_err(|e| CatalogError::io(dir_path, e))?;
            let path = entry.path();
            let is_dir = entry
                .file_type()
                .map_err(|e| CatalogError::io(&path, e))?
                .is_dir();
            let name = entry.file_name().to_string_lossy().into_owned();

            if is_excluded(&name, is_dir) {
                continue;
            }

            let relative_path = if rel_prefix.is_empty() {
                name
            } else {
                format!("{rel_prefix}/{name}")
            };

            if is_dir {
                self.scan_directory(&path, &relative_path, refs)?;
            } else {
                refs.push(SourceRef {
                    relative_path,
                    path,
                });
            }
        }

        Ok(())
    }
}
