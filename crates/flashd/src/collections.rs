use std::sync::Arc;

use flashcore_index::{BackendError, SearchBackend};
use parking_lot::Mutex;

#[derive(Default)]
struct CollectionState {
    pinned: Vec<String>,
    recent: Vec<String>,
}

/// Pinned files and recent searches.
///
/// Mutations apply locally first, then go to the backend. With rollback
/// enabled a failed backend call undoes the local change; otherwise the
/// failure is only logged and the next `load` reconciles.
#[derive(Clone)]
pub struct Collections {
    state: Arc<Mutex<CollectionState>>,
    backend: Arc<dyn SearchBackend>,
    rollback: bool,
    recent_limit: usize,
}

impl Collections {
    pub fn new(backend: Arc<dyn SearchBackend>, rollback: bool, recent_limit: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(CollectionState::default())),
            backend,
            rollback,
            recent_limit,
        }
    }

    pub fn pinned(&self) -> Vec<String> {
        self.state.lock().pinned.clone()
    }

    pub fn is_pinned(&self, path: &str) -> bool {
        self.state.lock().pinned.iter().any(|p| p == path)
    }

    pub fn recent(&self) -> Vec<String> {
        self.state.lock().recent.clone()
    }

    pub async fn load(&self) -> Result<(), BackendError> {
        let pinned = self.backend.get_pinned_files().await?;
        let recent = self.backend.get_recent_searches().await?;

        let mut state = self.state.lock();
        state.pinned = dedup(pinned);
        state.recent = recent;
        state.recent.truncate(self.recent_limit);
        Ok(())
    }

    /// Idempotent locally; the backend call is made every time.
    pub async fn pin(&self, path: &str) -> Result<(), BackendError> {
        let inserted = {
            let mut state = self.state.lock();
            if state.pinned.iter().any(|p| p == path) {
                false
            } else {
                state.pinned.push(path.to_string());
                true
            }
        };

        let result = self.backend.pin_file(path).await;
        if let Err(error) = &result {
            tracing::warn!(path, %error, rollback = self.rollback, "pin_failed");
            if self.rollback && inserted {
                self.state.lock().pinned.retain(|p| p != path);
            }
        }
        result
    }

    pub async fn unpin(&self, path: &str) -> Result<(), BackendError> {
        let position = {
            let mut state = self.state.lock();
            let position = state.pinned.iter().position(|p| p == path);
            if let Some(index) = position {
                state.pinned.remove(index);
            }
            position
        };

        let result = self.backend.unpin_file(path).await;
        if let Err(error) = &result {
            tracing::warn!(path, %error, rollback = self.rollback, "unpin_failed");
            if let (true, Some(index)) = (self.rollback, position) {
                let mut state = self.state.lock();
                if !state.pinned.iter().any(|p| p == path) {
                    let index = index.min(state.pinned.len());
                    state.pinned.insert(index, path.to_string());
                }
            }
        }
        result
    }

    pub async fn toggle_pin(&self, path: &str) -> Result<bool, BackendError> {
        if self.is_pinned(path) {
            self.unpin(path).await.map(|()| false)
        } else {
            self.pin(path).await.map(|()| true)
        }
    }

    /// Moves `query` to the front, dropping older duplicates.
    pub async fn record_search(&self, query: &str) -> Result<(), BackendError> {
        {
            let mut state = self.state.lock();
            state.recent.retain(|q| q != query);
            state.recent.insert(0, query.to_string());
            state.recent.truncate(self.recent_limit);
        }

        let result = self.backend.add_recent_search(query).await;
        if let Err(error) = &result {
            tracing::warn!(query, %error, rollback = self.rollback, "recent_search_failed");
            if self.rollback {
                self.reload_recent().await;
            }
        }
        result
    }

    pub async fn clear_recent(&self) -> Result<(), BackendError> {
        let previous = std::mem::take(&mut self.state.lock().recent);

        let result = self.backend.clear_recent_searches().await;
        if let Err(error) = &result {
            tracing::warn!(%error, rollback = self.rollback, "clear_recent_failed");
            if self.rollback {
                let mut state = self.state.lock();
                if state.recent.is_empty() {
                    state.recent = previous;
                }
            }
        }
        result
    }

    async fn reload_recent(&self) {
        match self.backend.get_recent_searches().await {
            Ok(mut recent) => {
                recent.truncate(self.recent_limit);
                self.state.lock().recent = recent;
            }
            Err(error) => tracing::warn!(%error, "recent_search_reload_failed"),
        }
    }
}

fn dedup(paths: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(paths.len());
    for path in paths {
        if !unique.contains(&path) {
            unique.push(path);
        }
    }
    unique
}
