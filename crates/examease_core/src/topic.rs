//! crates/examease_core/src/topic.rs
//!
//! Tags a question with the unit/chapter heading that precedes it.

use regex::Regex;
use std::sync::LazyLock;

/// How far back, in characters, to look for a heading.
pub const TOPIC_WINDOW_CHARS: usize = 500;

static RE_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:unit|chapter|module|section)\s*[-:]?\s*(\d+)\s*[-:]?\s*([^\n]+)")
        .expect("valid heading regex")
});

/// Looks for a `Unit 3: Trees`-style heading in the window before the
/// question's first occurrence in the document and returns its label.
///
/// Each question scans its own window independently; no running "current
/// section" is carried across the document.
pub fn detect_topic(question: &str, document: &str) -> Option<String> {
    let offset = document.find(question)?;
    let preceding = &document[..offset];
    let start = preceding
        .char_indices()
        .rev()
        .nth(TOPIC_WINDOW_CHARS - 1)
        .map(|(idx, _)| idx)
        .unwrap_or(0);
    let window = &preceding[start..];

    let caps = RE_HEADING.captures(window)?;
    let label = caps.get(2)?.as_str().trim();
    (!label.is_empty()).then(|| label.to_string())
}
