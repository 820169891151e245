//! Search provider seam.
//!
//! Index format and ranking live outside the build; the shell only needs the
//! hit shape. Providers are injected where they are used instead of being
//! registered globally.

use serde::{Deserialize, Serialize};

/// One search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub title: String,
    /// Route URL path (base not included).
    pub url: String,
    pub excerpt: String,
    pub score: f64,
}

/// Full-text search over the site.
pub trait SearchProvider: Send + Sync {
    /// Run a query, best hits first.
    fn search(&self, query: &str) -> Vec<SearchHit>;

    /// Index data shipped to the client through the search module.
    fn export(&self) -> serde_json::Value {
        serde_json::Value::Null
    }
}

/// Provider that never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSearch;

impl SearchProvider for NullSearch {
    fn search(&self, _query: &str) -> Vec<SearchHit> {
        Vec::new()
    }
}
