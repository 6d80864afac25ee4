use std::sync::Arc;
use std::time::Duration;

use flashcore_config::FileCategory;
use flashcore_index::{BackendError, SearchBackend, SearchResult};
use flashcore_query::{ParsedQuery, SearchFilters, SearchMode};
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::collections::Collections;
use crate::events::SearchEvent;
use crate::selection::ResultList;
use crate::settings::SettingsStore;

const EVENT_CAPACITY: usize = 64;

/// How a search pass ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Nothing to search for; results were cleared without a backend call.
    Cleared,
    Committed { count: usize },
    /// A newer search was issued while this one was in flight.
    Discarded,
    Failed(BackendError),
}

enum Pass {
    Superseded,
    Blank,
    Ready {
        version: u64,
        parsed: ParsedQuery,
        mode: SearchMode,
        filters: SearchFilters,
    },
}

#[derive(Default)]
struct SearchState {
    query: String,
    version: u64,
    searching: bool,
    results: ResultList,
    committed: Option<ParsedQuery>,
    mode: SearchMode,
    filters: SearchFilters,
    debounce_ticket: u64,
}

/// Owns the live query, the request version and the committed results.
///
/// Every search pass takes a new version before it touches the backend and
/// only commits if that version is still current when the response arrives,
/// so the last search issued wins regardless of resolution order.
#[derive(Clone)]
pub struct SearchOrchestrator {
    state: Arc<Mutex<SearchState>>,
    backend: Arc<dyn SearchBackend>,
    settings: SettingsStore,
    collections: Collections,
    events: broadcast::Sender<SearchEvent>,
    debounce: Duration,
}

impl SearchOrchestrator {
    pub fn new(
        backend: Arc<dyn SearchBackend>,
        settings: SettingsStore,
        collections: Collections,
        debounce: Duration,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Arc::new(Mutex::new(SearchState::default())),
            backend,
            settings,
            collections,
            events,
            debounce,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SearchEvent> {
        self.events.subscribe()
    }

    /// Updates the live query. Does not dispatch.
    pub fn set_query(&self, text: impl Into<String>) {
        self.state.lock().query = text.into();
    }

    pub fn query(&self) -> String {
        self.state.lock().query.clone()
    }

    pub fn set_mode(&self, mode: SearchMode) {
        self.state.lock().mode = mode;
    }

    pub fn mode(&self) -> SearchMode {
        self.state.lock().mode
    }

    pub fn set_category(&self, category: FileCategory) {
        self.state.lock().filters.category = category;
    }

    pub fn set_size_range(&self, min_size_bytes: Option<u64>, max_size_bytes: Option<u64>) {
        let mut state = self.state.lock();
        state.filters.min_size_bytes = min_size_bytes;
        state.filters.max_size_bytes = max_size_bytes;
    }

    pub fn filters(&self) -> SearchFilters {
        self.state.lock().filters.clone()
    }

    pub fn version(&self) -> u64 {
        self.state.lock().version
    }

    pub fn is_searching(&self) -> bool {
        self.state.lock().searching
    }

    pub fn results(&self) -> Vec<SearchResult> {
        self.state.lock().results.items().to_vec()
    }

    /// Query of the last committed search, for chips and highlighting.
    pub fn committed_query(&self) -> Option<ParsedQuery> {
        self.state.lock().committed.clone()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.state.lock().results.selected_index()
    }

    pub fn selected_item(&self) -> Option<SearchResult> {
        self.state.lock().results.selected_item().cloned()
    }

    pub fn move_next(&self) -> Option<usize> {
        self.state.lock().results.move_next()
    }

    pub fn move_previous(&self) -> Option<usize> {
        self.state.lock().results.move_previous()
    }

    pub fn page_down(&self) -> Option<usize> {
        self.state.lock().results.page_down()
    }

    pub fn page_up(&self) -> Option<usize> {
        self.state.lock().results.page_up()
    }

    pub fn move_first(&self) -> Option<usize> {
        self.state.lock().results.move_first()
    }

    pub fn move_last(&self) -> Option<usize> {
        self.state.lock().results.move_last()
    }

    pub fn select_at(&self, index: usize) -> bool {
        self.state.lock().results.select_at(index)
    }

    /// (Re)starts the debounce timer. Only the timer armed by the most recent
    /// call runs a search; it reads the query as it is when the timer fires.
    pub fn debounced_search(&self) -> JoinHandle<()> {
        let ticket = {
            let mut state = self.state.lock();
            state.debounce_ticket += 1;
            state.debounce_ticket
        };

        let orchestrator = self.clone();
        let delay = self.debounce;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            orchestrator.run(Some(ticket)).await;
        })
    }

    /// Runs a search pass right away. Any armed debounce timer is dropped so
    /// a submit is never followed by a duplicate timed search.
    pub async fn perform_search(&self) -> SearchOutcome {
        // only a debounce ticket can be superseded
        self.run(None).await.unwrap_or(SearchOutcome::Discarded)
    }

    /// `None` when `ticket` belongs to a debounce timer that is no longer the
    /// latest.
    async fn run(&self, ticket: Option<u64>) -> Option<SearchOutcome> {
        let (version, parsed, mode, filters) = match self.begin(ticket) {
            Pass::Superseded => return None,
            Pass::Blank => return Some(SearchOutcome::Cleared),
            Pass::Ready {
                version,
                parsed,
                mode,
                filters,
            } => (version, parsed, mode, filters),
        };

        let settings = self.settings.current();
        let limit = settings.max_results;
        tracing::info!(version, query = %parsed.cleaned, mode = ?mode, "search_start");
        self.publish(SearchEvent::Started {
            version,
            query: parsed.cleaned.clone(),
        });

        let response = match mode {
            SearchMode::Content => self.backend.search(filters.resolve(&parsed, limit)).await,
            SearchMode::Filename => self
                .backend
                .search_filenames(&parsed.cleaned, limit)
                .await
                .map(|hits| hits.into_iter().map(SearchResult::from).collect()),
        };

        let outcome = self.commit(version, &parsed, response);

        if let SearchOutcome::Committed { .. } = outcome {
            let recorded = parsed.raw.trim();
            if settings.search_history_enabled && !recorded.is_empty() {
                // failures are logged by the collection itself
                let _ = self.collections.record_search(recorded).await;
            }
        }
        Some(outcome)
    }

    /// Takes a new version and retires every armed debounce timer. The ticket
    /// check and the version bump share one lock so a timer armed in between
    /// cannot be lost.
    fn begin(&self, ticket: Option<u64>) -> Pass {
        let mut state = self.state.lock();
        match ticket {
            Some(ticket) if ticket != state.debounce_ticket => {
                drop(state);
                tracing::trace!(ticket, "debounce_superseded");
                return Pass::Superseded;
            }
            Some(_) => {}
            None => state.debounce_ticket += 1,
        }
        state.version += 1;
        let version = state.version;
        let parsed = ParsedQuery::parse(&state.query);

        if parsed.is_blank() {
            state.results.clear();
            state.searching = false;
            state.committed = None;
            drop(state);
            tracing::debug!(version, "search_cleared_blank_query");
            self.publish(SearchEvent::Cleared { version });
            return Pass::Blank;
        }

        state.searching = true;
        state.results.clear_selection();
        Pass::Ready {
            version,
            parsed,
            mode: state.mode,
            filters: state.filters.clone(),
        }
    }

    fn commit(
        &self,
        version: u64,
        parsed: &ParsedQuery,
        response: Result<Vec<SearchResult>, BackendError>,
    ) -> SearchOutcome {
        let mut state = self.state.lock();
        if state.version != version {
            let current = state.version;
            drop(state);
            tracing::debug!(version, current, "search_discarded");
            self.publish(SearchEvent::Discarded { version, current });
            return SearchOutcome::Discarded;
        }

        match response {
            Ok(results) => {
                let results: Vec<SearchResult> =
                    results.into_iter().filter(|hit| parsed.matches(hit)).collect();
                let count = results.len();
                state.results.replace(results);
                state.searching = false;
                state.committed = Some(parsed.clone());
                drop(state);

                tracing::info!(version, count, "search_committed");
                self.publish(SearchEvent::Committed { version, count });
                SearchOutcome::Committed { count }
            }
            Err(error) => {
                state.results.clear();
                state.searching = false;
                state.committed = None;
                drop(state);

                tracing::warn!(version, %error, "search_failed");
                self.publish(SearchEvent::Failed {
                    version,
                    error: error.clone(),
                });
                SearchOutcome::Failed(error)
            }
        }
    }

    /// Cancel key: empties the query, drops any pending debounce and makes
    /// every in-flight response stale.
    pub fn clear(&self) {
        let version = {
            let mut state = self.state.lock();
            state.query.clear();
            state.debounce_ticket += 1;
            state.version += 1;
            state.results.clear();
            state.searching = false;
            state.committed = None;
            state.version
        };
        tracing::debug!(version, "search_cleared");
        self.publish(SearchEvent::Cleared { version });
    }

    fn publish(&self, event: SearchEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }
}
