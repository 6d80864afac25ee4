#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use flashcore_config::{ClientConfig, Settings};
use flashcore_index::{
    BackendError, FilenameHit, HighlightedPreview, IndexStatistics, Preview, SearchBackend,
    SearchParams, SearchResult,
};
use flashd::AppService;
use parking_lot::Mutex;
use tokio::sync::oneshot;

pub type SearchReply = Result<Vec<SearchResult>, BackendError>;
pub type PreviewReply = Result<HighlightedPreview, BackendError>;

/// In-memory backend. Search and preview calls can be held open with
/// [`ScriptedBackend::gate_search`] / [`ScriptedBackend::gate_preview`] so
/// tests decide the order responses resolve in.
#[derive(Default)]
pub struct ScriptedBackend {
    pub search_calls: Mutex<Vec<SearchParams>>,
    pub filename_calls: Mutex<Vec<String>>,
    search_gates: Mutex<VecDeque<oneshot::Receiver<SearchReply>>>,
    preview_gates: Mutex<VecDeque<oneshot::Receiver<PreviewReply>>>,
    pub results: Mutex<Vec<SearchResult>>,
    pub filename_hits: Mutex<Vec<FilenameHit>>,
    pub preview_content: Mutex<String>,
    pub preview_terms: Mutex<Vec<String>>,
    pub pinned: Mutex<Vec<String>>,
    pub recent: Mutex<Vec<String>>,
    pub settings: Mutex<Settings>,
    pub saved_settings: Mutex<Vec<Settings>>,
    pub statistics: Mutex<IndexStatistics>,
    pub pin_calls: AtomicUsize,
    pub indexing_calls: AtomicUsize,
    pub fail_search: AtomicBool,
    pub fail_mutations: AtomicBool,
    pub fail_preview: AtomicBool,
}

impl ScriptedBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn gate_search(&self) -> oneshot::Sender<SearchReply> {
        let (tx, rx) = oneshot::channel();
        self.search_gates.lock().push_back(rx);
        tx
    }

    pub fn gate_preview(&self) -> oneshot::Sender<PreviewReply> {
        let (tx, rx) = oneshot::channel();
        self.preview_gates.lock().push_back(rx);
        tx
    }

    pub fn search_queries(&self) -> Vec<String> {
        self.search_calls
            .lock()
            .iter()
            .map(|params| params.query.clone())
            .collect()
    }

    pub fn search_count(&self) -> usize {
        self.search_calls.lock().len()
    }

    pub fn set_results(&self, results: Vec<SearchResult>) {
        *self.results.lock() = results;
    }

    fn mutation(&self) -> Result<(), BackendError> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            Err(BackendError::Unavailable("scripted failure".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SearchBackend for ScriptedBackend {
    async fn search(&self, params: SearchParams) -> Result<Vec<SearchResult>, BackendError> {
        self.search_calls.lock().push(params);
        let gate = self.search_gates.lock().pop_front();
        if let Some(gate) = gate {
            return gate
                .await
                .unwrap_or_else(|_| Err(BackendError::Unavailable("gate dropped".into())));
        }
        if self.fail_search.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("scripted failure".into()));
        }
        Ok(self.results.lock().clone())
    }

    async fn search_filenames(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<FilenameHit>, BackendError> {
        self.filename_calls.lock().push(query.to_string());
        let mut hits = self.filename_hits.lock().clone();
        hits.truncate(limit);
        Ok(hits)
    }

    async fn preview(&self, _path: &str) -> Result<Preview, BackendError> {
        if self.fail_preview.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("scripted failure".into()));
        }
        Ok(Preview {
            content: self.preview_content.lock().clone(),
        })
    }

    async fn preview_highlighted(
        &self,
        _path: &str,
        _query: &str,
    ) -> Result<HighlightedPreview, BackendError> {
        let gate = self.preview_gates.lock().pop_front();
        if let Some(gate) = gate {
            return gate
                .await
                .unwrap_or_else(|_| Err(BackendError::Unavailable("gate dropped".into())));
        }
        if self.fail_preview.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("scripted failure".into()));
        }
        Ok(HighlightedPreview {
            content: self.preview_content.lock().clone(),
            matched_terms: self.preview_terms.lock().clone(),
        })
    }

    async fn start_indexing(&self, _root_path: &str) -> Result<(), BackendError> {
        self.indexing_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get_settings(&self) -> Result<Settings, BackendError> {
        Ok(self.settings.lock().clone())
    }

    async fn save_settings(&self, settings: &Settings) -> Result<(), BackendError> {
        self.mutation()?;
        self.saved_settings.lock().push(settings.clone());
        *self.settings.lock() = settings.clone();
        Ok(())
    }

    async fn get_pinned_files(&self) -> Result<Vec<String>, BackendError> {
        Ok(self.pinned.lock().clone())
    }

    async fn pin_file(&self, path: &str) -> Result<(), BackendError> {
        self.pin_calls.fetch_add(1, Ordering::SeqCst);
        self.mutation()?;
        let mut pinned = self.pinned.lock();
        if !pinned.iter().any(|p| p == path) {
            pinned.push(path.to_string());
        }
        Ok(())
    }

    async fn unpin_file(&self, path: &str) -> Result<(), BackendError> {
        self.mutation()?;
        self.pinned.lock().retain(|p| p != path);
        Ok(())
    }

    async fn get_recent_searches(&self) -> Result<Vec<String>, BackendError> {
        Ok(self.recent.lock().clone())
    }

    async fn add_recent_search(&self, query: &str) -> Result<(), BackendError> {
        self.mutation()?;
        let mut recent = self.recent.lock();
        recent.retain(|q| q != query);
        recent.insert(0, query.to_string());
        recent.truncate(10);
        Ok(())
    }

    async fn clear_recent_searches(&self) -> Result<(), BackendError> {
        self.mutation()?;
        self.recent.lock().clear();
        Ok(())
    }

    async fn get_statistics(&self) -> Result<IndexStatistics, BackendError> {
        Ok(self.statistics.lock().clone())
    }
}

pub fn hit(path: &str) -> SearchResult {
    SearchResult {
        path: path.to_string(),
        title: None,
        score: 1.0,
        matched_terms: Vec::new(),
    }
}

pub fn service(backend: &Arc<ScriptedBackend>) -> AppService {
    service_with(backend, ClientConfig::default())
}

pub fn service_with(backend: &Arc<ScriptedBackend>, config: ClientConfig) -> AppService {
    let backend: Arc<dyn SearchBackend> = backend.clone();
    AppService::new(backend, config)
}

/// Yields until the backend has seen `count` content searches.
pub async fn wait_for_searches(backend: &ScriptedBackend, count: usize) {
    for _ in 0..1_000 {
        if backend.search_count() >= count {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("backend saw {} searches, expected {count}", backend.search_count());
}
