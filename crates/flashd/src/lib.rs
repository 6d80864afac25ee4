//! The search client: query orchestration, selection, pinned/recent
//! collections, settings and indexing progress, composed behind
//! [`AppService`].

use std::sync::Arc;

use flashcore_config::ClientConfig;
use flashcore_index::{IndexStatistics, IndexStatus, ProgressEvent, SearchBackend};
use flashcore_shell::ShellActions;
use flashcore_watch::ProgressTracker;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

mod collections;
mod error;
mod events;
pub mod logging;
mod orchestrator;
mod preview;
mod selection;
mod settings;

pub use collections::Collections;
pub use error::ClientError;
pub use events::SearchEvent;
pub use orchestrator::{SearchOrchestrator, SearchOutcome};
pub use preview::{PreviewLoader, PREVIEW_FALLBACK};
pub use selection::{ResultList, PAGE_JUMP};
pub use settings::SettingsStore;

/// State container handed to the view layer. Every component is a cheap
/// cloneable handle over shared state.
pub struct AppService {
    backend: Arc<dyn SearchBackend>,
    config: ClientConfig,
    pub search: SearchOrchestrator,
    pub collections: Collections,
    pub settings: SettingsStore,
    pub progress: ProgressTracker,
    pub preview: PreviewLoader,
    statistics: Mutex<Option<IndexStatistics>>,
}

impl AppService {
    pub fn new(backend: Arc<dyn SearchBackend>, config: ClientConfig) -> Self {
        let settings = SettingsStore::new(backend.clone());
        let collections = Collections::new(
            backend.clone(),
            config.rollback_on_failure,
            config.recent_limit,
        );
        let search = SearchOrchestrator::new(
            backend.clone(),
            settings.clone(),
            collections.clone(),
            config.debounce(),
        );

        Self {
            progress: ProgressTracker::new(config.progress_reset()),
            preview: PreviewLoader::new(backend.clone()),
            backend,
            config,
            search,
            collections,
            settings,
            statistics: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Startup load of settings, pins and recent searches. The default
    /// file-type filter from settings seeds the category panel.
    pub async fn load(&self) -> Result<(), ClientError> {
        self.settings.load().await?;
        self.search.set_category(self.settings.current().default_file_type);
        self.collections.load().await?;
        Ok(())
    }

    /// Fire-and-forget; the backend decides what a second concurrent run
    /// means.
    pub async fn start_indexing(&self, root_path: &str) -> Result<(), ClientError> {
        let phase = self.progress.phase();
        if phase != IndexStatus::Idle {
            tracing::info!(root_path, phase = phase.label(), "indexing_requested_while_busy");
        }
        tracing::info!(root_path, "indexing_start");
        self.backend.start_indexing(root_path).await?;
        Ok(())
    }

    /// Feeds the `indexing-progress` push channel into the tracker.
    pub fn follow_progress(&self, events: mpsc::Receiver<ProgressEvent>) -> JoinHandle<()> {
        self.progress.follow(events)
    }

    pub async fn refresh_statistics(&self) -> Result<IndexStatistics, ClientError> {
        let stats = self.backend.get_statistics().await?;
        tracing::debug!(
            documents = stats.total_documents,
            size = %stats.size_label(),
            "statistics_refreshed"
        );
        *self.statistics.lock() = Some(stats.clone());
        Ok(stats)
    }

    pub fn statistics(&self) -> Option<IndexStatistics> {
        self.statistics.lock().clone()
    }

    /// Preview of the highlighted row, `None` if nothing is selected or a
    /// newer preview was requested meanwhile.
    pub async fn preview_selected(&self) -> Option<String> {
        let item = self.search.selected_item()?;
        let query = self
            .search
            .committed_query()
            .map(|parsed| parsed.raw)
            .unwrap_or_default();
        self.preview.load(&item.path, &query).await
    }

    /// Opens the highlighted row. Does nothing when no row is selected.
    pub fn open_selected(&self, shell: &dyn ShellActions) -> Result<(), ClientError> {
        let Some(item) = self.search.selected_item() else {
            tracing::debug!("open_selected_without_selection");
            return Ok(());
        };
        tracing::info!(path = %item.path, "open_selected");
        shell.open_path(&item.path)?;
        Ok(())
    }

    pub fn reveal_selected(&self, shell: &dyn ShellActions) -> Result<(), ClientError> {
        let Some(item) = self.search.selected_item() else {
            tracing::debug!("reveal_selected_without_selection");
            return Ok(());
        };
        tracing::info!(path = %item.path, "reveal_selected");
        shell.reveal_path(&item.path)?;
        Ok(())
    }
}
