use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use flashcore_index::SearchBackend;
use flashcore_query::{highlight, highlight_terms};

pub const PREVIEW_FALLBACK: &str = "Failed to load preview";

/// Loads highlighted previews for the selected result and for quick-look.
///
/// Each load takes a token; a response for an older token is dropped so a
/// slow preview never replaces the one for the current selection.
#[derive(Clone)]
pub struct PreviewLoader {
    backend: Arc<dyn SearchBackend>,
    token: Arc<AtomicU64>,
}

impl PreviewLoader {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            backend,
            token: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Marked-up preview, or `None` if another load started meanwhile.
    pub async fn load(&self, path: &str, query: &str) -> Option<String> {
        let token = self.token.fetch_add(1, Ordering::SeqCst) + 1;

        let markup = if query.trim().is_empty() {
            match self.backend.preview(path).await {
                Ok(preview) => highlight(&preview.content, &[]),
                Err(error) => {
                    tracing::warn!(path, %error, "preview_failed");
                    PREVIEW_FALLBACK.to_string()
                }
            }
        } else {
            match self.backend.preview_highlighted(path, query).await {
                Ok(preview) => {
                    let terms = if preview.matched_terms.is_empty() {
                        highlight_terms(query)
                    } else {
                        preview.matched_terms
                    };
                    highlight(&preview.content, &terms)
                }
                Err(error) => {
                    tracing::warn!(path, %error, "preview_failed");
                    PREVIEW_FALLBACK.to_string()
                }
            }
        };

        if self.token.load(Ordering::SeqCst) != token {
            tracing::debug!(path, token, "preview_discarded");
            return None;
        }
        Some(markup)
    }

    /// Makes any in-flight load stale.
    pub fn cancel(&self) {
        self.token.fetch_add(1, Ordering::SeqCst);
    }
}
