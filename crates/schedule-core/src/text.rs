//! Text helpers for session names and free-text queries.

use std::sync::OnceLock;

use regex::Regex;

/// Session kind whose names arrive with embedded markup.
pub const PLENARY_KIND: &str = "plenaria";

/// Runs of real line breaks or the escaped `\r` / `\n` sequences.
fn line_breaks() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:\\[rn]|[\r\n]+)+").expect("regex is valid"))
}

fn html_tags() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").expect("regex is valid"))
}

/// Flatten a plenary session name: line breaks become single spaces, HTML
/// tags are dropped and the result is trimmed.
pub fn clean_plenary_name(name: &str) -> String {
    let flattened = line_breaks().replace_all(name, " ");
    html_tags().replace_all(&flattened, "").trim().to_string()
}

/// Split a free-text query into lowercase search words.
///
/// Commas, periods and hyphens act as separators; empty words are dropped.
pub fn query_words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .replace([',', '.', '-'], " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
