//! crates/examease_core/src/normalize.rs
//!
//! Canonicalizes whitespace in freshly extracted document text.

use regex::Regex;
use std::sync::LazyLock;

static RE_BLANK_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid blank-line regex"));
static RE_SPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" {2,}").expect("valid space-run regex"));

/// Cleans raw extracted text.
///
/// Line endings become `\n`, runs of three or more newlines shrink to one blank
/// line, tabs become spaces, repeated spaces collapse, and the result is trimmed.
/// Byte-order marks count as whitespace at either end.
pub fn normalize_text(raw: &str) -> String {
    let text = raw.replace("\r\n", "\n").replace('\r', "\n");
    let text = RE_BLANK_RUN.replace_all(&text, "\n\n");
    let text = text.replace('\t', " ");
    let text = RE_SPACE_RUN.replace_all(&text, " ");
    text.trim_matches(is_trimmable).to_string()
}

fn is_trimmable(c: char) -> bool {
    c.is_whitespace() || c == BYTE_ORDER_MARK
}

const BYTE_ORDER_MARK: char = '\u{feff}';
