use flashcore_index::BackendError;

/// Published by the orchestrator for whoever renders the result list.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    Started { version: u64, query: String },
    Committed { version: u64, count: usize },
    /// A response arrived after a newer search was issued.
    Discarded { version: u64, current: u64 },
    Failed { version: u64, error: BackendError },
    Cleared { version: u64 },
}

impl SearchEvent {
    pub fn version(&self) -> u64 {
        match self {
            Self::Started { version, .. }
            | Self::Committed { version, .. }
            | Self::Discarded { version, .. }
            | Self::Failed { version, .. }
            | Self::Cleared { version } => *version,
        }
    }
}
