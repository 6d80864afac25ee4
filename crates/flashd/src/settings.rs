use std::sync::Arc;

use flashcore_config::Settings;
use flashcore_index::{BackendError, SearchBackend};
use parking_lot::Mutex;

#[derive(Default)]
struct SettingsState {
    settings: Settings,
    dirty: bool,
    revision: u64,
}

/// Local copy of the persisted settings with a dirty flag gating save.
#[derive(Clone)]
pub struct SettingsStore {
    state: Arc<Mutex<SettingsState>>,
    backend: Arc<dyn SearchBackend>,
}

impl SettingsStore {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            state: Arc::new(Mutex::new(SettingsState::default())),
            backend,
        }
    }

    pub fn current(&self) -> Settings {
        self.state.lock().settings.clone()
    }

    pub fn is_dirty(&self) -> bool {
        self.state.lock().dirty
    }

    /// Any mutation marks the store dirty, even if nothing changed.
    pub fn update<F>(&self, mutate: F)
    where
        F: FnOnce(&mut Settings),
    {
        let mut state = self.state.lock();
        mutate(&mut state.settings);
        state.dirty = true;
        state.revision += 1;
    }

    /// Writes the current settings. The dirty flag is cleared only on success
    /// and only if nothing was edited while the call was in flight.
    pub async fn save(&self) -> Result<(), BackendError> {
        let (snapshot, revision) = {
            let state = self.state.lock();
            (state.settings.clone(), state.revision)
        };

        match self.backend.save_settings(&snapshot).await {
            Ok(()) => {
                let mut state = self.state.lock();
                if state.revision == revision {
                    state.dirty = false;
                }
                tracing::info!(revision, "settings_saved");
                Ok(())
            }
            Err(error) => {
                tracing::warn!(%error, "settings_save_failed");
                Err(error)
            }
        }
    }

    /// Replaces the local settings wholesale and clears the dirty flag.
    pub async fn load(&self) -> Result<(), BackendError> {
        let settings = self.backend.get_settings().await.map_err(|error| {
            tracing::warn!(%error, "settings_load_failed");
            error
        })?;

        let mut state = self.state.lock();
        state.settings = settings;
        state.dirty = false;
        state.revision += 1;
        Ok(())
    }
}
