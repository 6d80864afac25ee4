use regex::{Captures, RegexBuilder};

pub const MARK_OPEN: &str = "<mark>";
pub const MARK_CLOSE: &str = "</mark>";

/// Escapes `text` for markup, then wraps every case-insensitive occurrence of
/// each term in `<mark>`. Terms are applied in order; a later term never
/// matches inside tags or entities produced earlier.
pub fn highlight(text: &str, terms: &[String]) -> String {
    let mut output = escape_html(text);

    for term in terms {
        if term.trim().is_empty() {
            continue;
        }

        let pattern = format!(
            "({})|(<[^>]*>|&[#A-Za-z0-9]+;)",
            regex::escape(&escape_html(term))
        );
        let Ok(regex) = RegexBuilder::new(&pattern).case_insensitive(true).build() else {
            continue;
        };

        output = regex
            .replace_all(&output, |caps: &Captures<'_>| match caps.get(1) {
                Some(hit) => format!("{MARK_OPEN}{}{MARK_CLOSE}", hit.as_str()),
                None => caps[0].to_string(),
            })
            .into_owned();
    }

    output
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
