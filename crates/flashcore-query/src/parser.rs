use std::ops::Range;

use flashcore_index::SearchResult;
use serde::{Deserialize, Serialize};

/// Sent to the backend instead of an empty string.
pub const WILDCARD: &str = "*";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChipKind {
    Ext,
    Path,
    Title,
    Size,
}

impl ChipKind {
    fn from_operator(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "ext" => Some(Self::Ext),
            "path" => Some(Self::Path),
            "title" => Some(Self::Title),
            "size" => Some(Self::Size),
            _ => None,
        }
    }

    pub fn operator(self) -> &'static str {
        match self {
            Self::Ext => "ext",
            Self::Path => "path",
            Self::Title => "title",
            Self::Size => "size",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
    #[serde(rename = "<")]
    Less,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = "=")]
    Equal,
}

impl Comparator {
    pub fn symbol(self) -> char {
        match self {
            Self::Less => '<',
            Self::Greater => '>',
            Self::Equal => '=',
        }
    }
}

/// A structured filter lifted out of the query text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chip {
    pub kind: ChipKind,
    pub operand: String,
    pub comparator: Option<Comparator>,
    #[serde(skip)]
    span: Range<usize>,
    /// Identical repeats folded into this chip.
    #[serde(skip)]
    repeats: Vec<Range<usize>>,
}

impl Chip {
    pub fn label(&self) -> String {
        match self.kind {
            ChipKind::Ext => format!("Type: {}", self.operand.to_ascii_uppercase()),
            ChipKind::Path => format!("Path: {}", self.operand),
            ChipKind::Title => format!("Title: {}", self.operand),
            ChipKind::Size => format!(
                "Size {} {}",
                self.comparator.unwrap_or(Comparator::Equal).symbol(),
                self.operand
            ),
        }
    }

    /// `(min, max)` byte bounds of a size chip. Exact sizes are half-open.
    pub fn size_bounds(&self) -> (Option<u64>, Option<u64>) {
        if self.kind != ChipKind::Size {
            return (None, None);
        }
        let Some(bytes) = parse_size_literal(&self.operand) else {
            return (None, None);
        };
        match self.comparator {
            Some(Comparator::Greater) => (Some(bytes), None),
            Some(Comparator::Less) => (None, Some(bytes)),
            Some(Comparator::Equal) | None => (Some(bytes), Some(bytes.saturating_add(1))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedQuery {
    pub raw: String,
    /// Remainder shown in the search box, possibly empty.
    pub text: String,
    /// Remainder sent to the backend, [`WILDCARD`] when `text` is empty.
    pub cleaned: String,
    pub chips: Vec<Chip>,
}

impl ParsedQuery {
    /// Tokenizes once and lifts the first `ext:`, `path:`, `title:` and
    /// `size:` operator of each kind into a chip. Malformed operators stay in
    /// the text as plain terms.
    pub fn parse(raw: &str) -> Self {
        let mut chips: Vec<Chip> = Vec::new();
        let mut remaining: Vec<&str> = Vec::new();

        for span in tokenize(raw) {
            let token = &raw[span.clone()];
            match classify(token, span) {
                Some(chip) => {
                    if let Some(existing) = chips.iter_mut().find(|c| c.kind == chip.kind) {
                        // identical repeats are swallowed, different ones stay as text
                        if raw[existing.span.clone()].eq_ignore_ascii_case(token) {
                            existing.repeats.push(chip.span);
                            continue;
                        }
                        remaining.push(token);
                    } else {
                        chips.push(chip);
                    }
                }
                None => remaining.push(token),
            }
        }

        let text = remaining.join(" ");
        let cleaned = if text.is_empty() {
            WILDCARD.to_string()
        } else {
            text.clone()
        };

        Self {
            raw: raw.to_string(),
            text,
            cleaned,
            chips,
        }
    }

    /// No text and no chips: nothing to search for.
    pub fn is_blank(&self) -> bool {
        self.text.is_empty() && self.chips.is_empty()
    }

    pub fn chip(&self, kind: ChipKind) -> Option<&Chip> {
        self.chips.iter().find(|chip| chip.kind == kind)
    }

    pub fn extension(&self) -> Option<&str> {
        self.chip(ChipKind::Ext).map(|chip| chip.operand.as_str())
    }

    pub fn size_bounds(&self) -> (Option<u64>, Option<u64>) {
        self.chip(ChipKind::Size)
            .map(Chip::size_bounds)
            .unwrap_or((None, None))
    }

    /// Client-side check for chips the backend cannot filter on.
    pub fn matches(&self, result: &SearchResult) -> bool {
        let path_lower = result.path.to_lowercase();

        if let Some(ext) = self.extension() {
            if !path_lower.ends_with(&format!(".{ext}")) {
                return false;
            }
        }

        if let Some(chip) = self.chip(ChipKind::Path) {
            if !path_lower.contains(&chip.operand.to_lowercase()) {
                return false;
            }
        }

        if let Some(chip) = self.chip(ChipKind::Title) {
            let needle = chip.operand.to_lowercase();
            match result.title.as_deref() {
                Some(title) if title.to_lowercase().contains(&needle) => {}
                _ => return false,
            }
        }

        true
    }

    /// The raw query with one chip's source text cut out, including any
    /// identical repeats it swallowed.
    pub fn without_chip(&self, index: usize) -> String {
        let Some(chip) = self.chips.get(index) else {
            return self.raw.clone();
        };

        let mut spans: Vec<&Range<usize>> =
            std::iter::once(&chip.span).chain(&chip.repeats).collect();
        spans.sort_by(|a, b| b.start.cmp(&a.start));

        spans.into_iter().fold(self.raw.clone(), |text, span| {
            let left = text[..span.start].trim_end();
            let right = text[span.end..].trim_start();
            match (left.is_empty(), right.is_empty()) {
                (true, _) => right.to_string(),
                (_, true) => left.to_string(),
                _ => format!("{left} {right}"),
            }
        })
    }

    /// Lowercased plain terms plus the title operand, for preview highlighting.
    pub fn highlight_terms(&self) -> Vec<String> {
        let mut terms: Vec<String> = self
            .text
            .split_whitespace()
            .map(str::to_lowercase)
            .filter(|term| term != WILDCARD)
            .collect();

        if let Some(chip) = self.chip(ChipKind::Title) {
            terms.push(chip.operand.to_lowercase());
        }

        terms
    }
}

pub fn parse_query(raw: &str) -> ParsedQuery {
    ParsedQuery::parse(raw)
}

pub fn highlight_terms(raw: &str) -> Vec<String> {
    ParsedQuery::parse(raw).highlight_terms()
}

/// `"1.5MB"` → bytes. Units are binary multiples; no unit means bytes.
pub fn parse_size_literal(literal: &str) -> Option<u64> {
    let literal = literal.trim();
    let split_at = literal
        .find(|ch: char| !ch.is_ascii_digit() && ch != '.')
        .unwrap_or(literal.len());
    let (number, unit) = literal.split_at(split_at);
    if !number.starts_with(|ch: char| ch.is_ascii_digit()) {
        return None;
    }

    let value: f64 = number.parse().ok()?;
    let multiplier: u64 = match unit.trim().to_ascii_uppercase().as_str() {
        "" | "B" => 1,
        "KB" => 1024,
        "MB" => 1024 * 1024,
        "GB" => 1024 * 1024 * 1024,
        _ => return None,
    };

    Some((value * multiplier as f64) as u64)
}

/// Whitespace-separated tokens; `op:"quoted value"` stays one token.
fn tokenize(input: &str) -> Vec<Range<usize>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(start, ch)) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        let mut end = start;
        let mut prev = None;
        let mut in_quotes = false;
        while let Some(&(idx, c)) = chars.peek() {
            if !in_quotes && c.is_whitespace() {
                break;
            }
            if c == '"' {
                if in_quotes {
                    in_quotes = false;
                } else if prev == Some(':') {
                    in_quotes = true;
                }
            }
            prev = Some(c);
            end = idx + c.len_utf8();
            chars.next();
        }

        tokens.push(start..end);
    }

    tokens
}

fn classify(token: &str, span: Range<usize>) -> Option<Chip> {
    let (name, value) = token.split_once(':')?;
    let kind = ChipKind::from_operator(name)?;
    let value = unquote(value);

    let (operand, comparator) = match kind {
        ChipKind::Ext => {
            let ext = value.trim_start_matches('.').to_lowercase();
            if ext.is_empty() || ext.contains('"') {
                return None;
            }
            (ext, None)
        }
        ChipKind::Path | ChipKind::Title => {
            if value.trim().is_empty() {
                return None;
            }
            (value.to_string(), None)
        }
        ChipKind::Size => {
            let (comparator, literal) = match value.chars().next() {
                Some('>') => (Some(Comparator::Greater), &value[1..]),
                Some('<') => (Some(Comparator::Less), &value[1..]),
                Some('=') => (Some(Comparator::Equal), &value[1..]),
                _ => (None, value),
            };
            parse_size_literal(literal)?;
            (literal.to_string(), comparator)
        }
    };

    Some(Chip {
        kind,
        operand,
        comparator,
        span,
        repeats: Vec::new(),
    })
}

fn unquote(value: &str) -> &str {
    let Some(inner) = value.strip_prefix('"') else {
        return value;
    };
    inner.strip_suffix('"').unwrap_or(inner)
}
