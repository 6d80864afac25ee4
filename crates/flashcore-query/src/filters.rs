use flashcore_config::FileCategory;
use flashcore_index::SearchParams;
use serde::{Deserialize, Serialize};

use crate::ParsedQuery;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    #[default]
    Content,
    Filename,
}

/// Filter-panel state that applies on top of the typed query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    pub category: FileCategory,
    pub min_size_bytes: Option<u64>,
    pub max_size_bytes: Option<u64>,
}

impl SearchFilters {
    /// Builds the content-search request. Chips take precedence over the
    /// panel: an `ext:` chip replaces the category allowlist and a `size:`
    /// chip replaces both panel bounds.
    pub fn resolve(&self, parsed: &ParsedQuery, limit: usize) -> SearchParams {
        let extensions = match parsed.extension() {
            Some(ext) => Some(vec![ext.to_string()]),
            None => self
                .category
                .extensions()
                .map(|list| list.iter().map(|ext| ext.to_string()).collect()),
        };

        let (min_size_bytes, max_size_bytes) = match parsed.size_bounds() {
            (None, None) => (self.min_size_bytes, self.max_size_bytes),
            bounds => bounds,
        };

        SearchParams {
            query: parsed.cleaned.clone(),
            limit,
            min_size_bytes,
            max_size_bytes,
            extensions,
        }
    }
}
