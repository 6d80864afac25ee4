//! Types exchanged with the remote indexing service and the trait the client
//! talks to it through.
//!
//! Everything behind [`SearchBackend`] (tokenizing, ranking, file parsing,
//! metadata storage) is a black box to the client.

use async_trait::async_trait;
use flashcore_config::Settings;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A ranked content match. Immutable once received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(alias = "file_path")]
    pub path: String,
    pub title: Option<String>,
    pub score: f32,
    #[serde(default)]
    pub matched_terms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilenameHit {
    #[serde(alias = "file_path")]
    pub path: String,
    #[serde(alias = "file_name")]
    pub name: String,
}

impl From<FilenameHit> for SearchResult {
    fn from(hit: FilenameHit) -> Self {
        Self {
            path: hit.path,
            title: Some(hit.name),
            score: 1.0,
            matched_terms: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preview {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightedPreview {
    pub content: String,
    #[serde(default)]
    pub matched_terms: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStatistics {
    pub total_documents: u64,
    pub total_size_bytes: u64,
    pub last_updated: Option<String>,
}

impl IndexStatistics {
    pub fn size_label(&self) -> String {
        format!("{:.1} MB", (self.total_size_bytes as f64) / 1_048_576.0)
    }
}

/// Arguments of a content search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    pub query: String,
    pub limit: usize,
    pub min_size_bytes: Option<u64>,
    pub max_size_bytes: Option<u64>,
    pub extensions: Option<Vec<String>>,
}

/// Indexing phase reported by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum IndexStatus {
    #[default]
    Idle,
    Scanning,
    Indexing,
    Done,
}

impl IndexStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Scanning => "scanning",
            Self::Indexing => "indexing",
            Self::Done => "done",
        }
    }

    /// Accepts the canonical names as well as the free-form status lines the
    /// scanner emits ("Scanning filenames...", "All files indexed").
    ///
    /// Anything about filenames belongs to the scan pass, even "Filenames
    /// indexed": the content pass still follows it.
    pub fn from_label(label: &str) -> Option<Self> {
        let lower = label.trim().to_ascii_lowercase();
        match lower.as_str() {
            "idle" => return Some(Self::Idle),
            "scanning" => return Some(Self::Scanning),
            "indexing" => return Some(Self::Indexing),
            "done" => return Some(Self::Done),
            _ => {}
        }

        if lower.contains("filename") {
            Some(Self::Scanning)
        } else if lower.contains("complete") || lower.contains("done") || lower.ends_with("indexed") {
            Some(Self::Done)
        } else if lower.contains("scan") {
            Some(Self::Scanning)
        } else if lower.contains("index") {
            Some(Self::Indexing)
        } else {
            None
        }
    }
}

impl Serialize for IndexStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for IndexStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::from_label(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown index status `{raw}`")))
    }
}

/// Payload of the `indexing-progress` push channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub total: u64,
    pub processed: u64,
    #[serde(default)]
    pub current_file: String,
    pub status: IndexStatus,
    #[serde(default)]
    pub files_per_second: Option<f64>,
    #[serde(default)]
    pub eta_seconds: Option<u64>,
    #[serde(default)]
    pub current_folder: Option<String>,
}

impl ProgressEvent {
    pub fn new(status: IndexStatus, processed: u64, total: u64) -> Self {
        Self {
            total,
            processed,
            current_file: String::new(),
            status,
            files_per_second: None,
            eta_seconds: None,
            current_folder: None,
        }
    }

    pub fn from_json(payload: &str) -> Result<Self, BackendError> {
        serde_json::from_str(payload).map_err(|err| BackendError::Decode(err.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("search service unavailable: {0}")]
    Unavailable(String),
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error("malformed payload: {0}")]
    Decode(String),
}

/// The remote indexing service as seen by the client.
///
/// Calls resolve independently of issuance order; the client never assumes
/// that two calls complete in the order they were made.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, params: SearchParams) -> Result<Vec<SearchResult>, BackendError>;

    async fn search_filenames(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<FilenameHit>, BackendError>;

    async fn preview(&self, path: &str) -> Result<Preview, BackendError>;

    async fn preview_highlighted(
        &self,
        path: &str,
        query: &str,
    ) -> Result<HighlightedPreview, BackendError>;

    async fn start_indexing(&self, root_path: &str) -> Result<(), BackendError>;

    async fn get_settings(&self) -> Result<Settings, BackendError>;

    async fn save_settings(&self, settings: &Settings) -> Result<(), BackendError>;

    async fn get_pinned_files(&self) -> Result<Vec<String>, BackendError>;

    async fn pin_file(&self, path: &str) -> Result<(), BackendError>;

    async fn unpin_file(&self, path: &str) -> Result<(), BackendError>;

    async fn get_recent_searches(&self) -> Result<Vec<String>, BackendError>;

    async fn add_recent_search(&self, query: &str) -> Result<(), BackendError>;

    async fn clear_recent_searches(&self) -> Result<(), BackendError>;

    async fn get_statistics(&self) -> Result<IndexStatistics, BackendError>;
}
