//! Parser for the stream listing printed by `BBDown -info`.
//!
//! The listing is a loose, undocumented report. A stream candidate is announced
//! by a descriptor line (`<index>. <text with optional [tag] segments>`) that is
//! immediately followed by a line holding only its URL. Everything else in the
//! report (banners, timestamps, diagnostics) is skipped.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamRecord {
    pub index: u64,
    /// Bracket contents in left-to-right order, uninterpreted.
    pub tags: Vec<String>,
    pub url: String,
    /// The trimmed descriptor line.
    pub raw: String,
}

/// Extracts every descriptor/URL pair from the tool output, in input order.
pub fn parse_stream_list(text: &str) -> Vec<StreamRecord> {
    let lines: Vec<&str> = text.lines().collect();
    parse_stream_lines(&lines)
}

/// Two-line window scan. A matched pair consumes both lines; otherwise the
/// window slides by one. A final unpaired line is never inspected.
pub fn parse_stream_lines<S: AsRef<str>>(lines: &[S]) -> Vec<StreamRecord> {
    let mut out = Vec::new();
    let mut i = 0;
    while i + 1 < lines.len() {
        let line = lines[i].as_ref().trim();
        let next_line = lines[i + 1].as_ref().trim();

        if let Some((index, rest)) = parse_descriptor_line(line) {
            if is_url_line(next_line) {
                out.push(StreamRecord {
                    index,
                    tags: extract_tags(rest),
                    url: next_line.to_string(),
                    raw: line.to_string(),
                });
                i += 2;
                continue;
            }
        }

        i += 1;
    }
    out
}

/// Matches `digits "." whitespace rest` and returns the index and the rest.
/// An index that does not fit in a `u64` makes the line a non-match.
pub fn parse_descriptor_line(line: &str) -> Option<(u64, &str)> {
    static DESCRIPTOR_RE: OnceLock<Regex> = OnceLock::new();
    let re = DESCRIPTOR_RE
        .get_or_init(|| Regex::new(r"^(?P<idx>[0-9]+)\.\s+(?P<rest>.+)$").unwrap());

    let caps = re.captures(line.trim())?;
    let index = caps.name("idx")?.as_str().parse::<u64>().ok()?;
    let rest = caps.name("rest")?.as_str();
    Some((index, rest))
}

pub fn is_url_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with("http://") || trimmed.starts_with("https://")
}

/// Non-greedy `[...]` captures; nested brackets are not balanced.
pub fn extract_tags(rest: &str) -> Vec<String> {
    static BRACKET_RE: OnceLock<Regex> = OnceLock::new();
    let re = BRACKET_RE.get_or_init(|| Regex::new(r"\[(.*?)\]").unwrap());

    re.captures_iter(rest)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}
