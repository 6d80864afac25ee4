use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

mod client;

pub use client::{default_config_path, ClientConfig, ConfigError};

/// User settings. Owned by the client, persisted by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub index_dirs: Vec<String>,
    pub exclude_patterns: Vec<String>,
    pub exclude_folders: Vec<String>,
    pub max_results: usize,
    pub search_history_enabled: bool,
    pub case_sensitive: bool,
    pub default_file_type: FileCategory,
    pub results_per_page: usize,
    pub show_preview_panel: bool,
    /// Presentation settings (theme, font size, tray behaviour). Carried
    /// through untouched so saving never drops them.
    #[serde(flatten)]
    pub presentation: BTreeMap<String, serde_json::Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            index_dirs: Vec::new(),
            exclude_patterns: vec![
                ".git/".to_string(),
                "node_modules/".to_string(),
                "target/".to_string(),
                "AppData/".to_string(),
            ],
            exclude_folders: Vec::new(),
            max_results: 50,
            search_history_enabled: true,
            case_sensitive: false,
            default_file_type: FileCategory::All,
            results_per_page: 50,
            show_preview_panel: true,
            presentation: BTreeMap::new(),
        }
    }
}

const DOCUMENT_EXTENSIONS: &[&str] = &["doc", "docx", "odt", "rtf"];
const SPREADSHEET_EXTENSIONS: &[&str] = &["xls", "xlsx", "ods", "csv"];
const PRESENTATION_EXTENSIONS: &[&str] = &["ppt", "pptx", "odp"];
const PDF_EXTENSIONS: &[&str] = &["pdf"];
const EBOOK_EXTENSIONS: &[&str] = &["epub"];
const TEXT_EXTENSIONS: &[&str] = &["txt", "md", "log", "json", "xml", "html"];

/// Category selector of the filter panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileCategory {
    #[default]
    All,
    Documents,
    Spreadsheets,
    Presentations,
    Pdf,
    Ebooks,
    Text,
}

impl FileCategory {
    /// Extension allowlist, `None` when the category does not restrict.
    pub fn extensions(self) -> Option<&'static [&'static str]> {
        match self {
            Self::All => None,
            Self::Documents => Some(DOCUMENT_EXTENSIONS),
            Self::Spreadsheets => Some(SPREADSHEET_EXTENSIONS),
            Self::Presentations => Some(PRESENTATION_EXTENSIONS),
            Self::Pdf => Some(PDF_EXTENSIONS),
            Self::Ebooks => Some(EBOOK_EXTENSIONS),
            Self::Text => Some(TEXT_EXTENSIONS),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All files",
            Self::Documents => "Documents",
            Self::Spreadsheets => "Spreadsheets",
            Self::Presentations => "Presentations",
            Self::Pdf => "PDF",
            Self::Ebooks => "E-books",
            Self::Text => "Text",
        }
    }
}
