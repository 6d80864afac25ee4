//! Query-side helpers: operator parsing, request building and preview
//! highlighting. Pure functions, no I/O.

mod filters;
mod highlight;
mod parser;

pub use filters::{SearchFilters, SearchMode};
pub use highlight::{escape_html, highlight, MARK_CLOSE, MARK_OPEN};
pub use parser::{
    highlight_terms, parse_query, parse_size_literal, Chip, ChipKind, Comparator, ParsedQuery,
    WILDCARD,
};
