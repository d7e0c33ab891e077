//! crates/examease_core/src/segment.rs
//!
//! Splits normalized document text into candidate exam questions.
//!
//! Segmentation is a cascade of independent matchers tried in a fixed order.
//! The first matcher that yields at least one candidate wins and the rest are
//! skipped:
//!
//! 1. marks annotations, e.g. `Explain paging. [5 marks]` or `Define RAM (2M)`
//! 2. numbered questions, e.g. `Q1. ...`, `Question 2) ...`, `3. ...`
//! 3. interrogative sentences, a capitalised span ending in `?`
//!
//! The winning candidates are de-duplicated case-insensitively (first
//! occurrence kept) and capped at [`MAX_QUESTIONS_PER_DOCUMENT`].

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Upper bound on the questions kept from one extraction run.
pub const MAX_QUESTIONS_PER_DOCUMENT: usize = 100;
/// Candidates must be longer than this many characters.
pub const MIN_QUESTION_CHARS: usize = 10;
/// Interrogative fragments are noisier and must be longer than this.
pub const MIN_INTERROGATIVE_CHARS: usize = 15;

static RE_MARKS_ANNOTATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^(.+?)[\[(]\s*([0-9]+)\s*(?:marks?|m)\s*[\])]")
        .expect("valid marks-annotation regex")
});
static RE_NUMBER_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:q(?:uestion)?\.?\s*)?\d+[.)]").expect("valid number-marker regex")
});
static RE_ANSWER_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:answer|solution|ans)").expect("valid answer regex"));
static RE_INTERROGATIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z][^.!?\n]*\?").expect("valid interrogative regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentTier {
    MarksAnnotation,
    NumberedQuestion,
    Interrogative,
}

/// A question-shaped span of text, with its marks when the text annotated them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub text: String,
    pub marks: Option<u32>,
}

impl Candidate {
    fn unmarked(text: &str) -> Self {
        Self {
            text: text.to_string(),
            marks: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segmentation {
    /// The tier that produced the candidates, or `None` if nothing matched.
    pub tier: Option<SegmentTier>,
    pub candidates: Vec<Candidate>,
}

type TierMatcher = fn(&str) -> Vec<Candidate>;

const CASCADE: [(SegmentTier, TierMatcher); 3] = [
    (SegmentTier::MarksAnnotation, match_marks_annotations),
    (SegmentTier::NumberedQuestion, match_numbered_questions),
    (SegmentTier::Interrogative, match_interrogatives),
];

/// Runs the tier cascade over normalized text.
pub fn segment_questions(text: &str) -> Segmentation {
    for (tier, matcher) in CASCADE {
        let candidates = matcher(text);
        if !candidates.is_empty() {
            return Segmentation {
                tier: Some(tier),
                candidates: dedup_and_cap(candidates),
            };
        }
    }
    Segmentation {
        tier: None,
        candidates: Vec::new(),
    }
}

/// Tier 1: `<text>[N marks]` or `<text>(NM)` at the start of a line.
/// The captured text runs from the line start, so leading numbering is kept.
/// Marks too large for a `u32` saturate.
pub fn match_marks_annotations(text: &str) -> Vec<Candidate> {
    RE_MARKS_ANNOTATION
        .captures_iter(text)
        .filter_map(|caps| {
            let question = caps.get(1)?.as_str().trim();
            let marks = caps.get(2)?.as_str().parse::<u32>().unwrap_or(u32::MAX);
            (question.chars().count() > MIN_QUESTION_CHARS).then(|| Candidate {
                text: question.to_string(),
                marks: Some(marks),
            })
        })
        .collect()
}

/// Tier 2: lines that start with an optional `Q`/`Question` prefix, a number
/// and `.` or `)`. A question runs until the next such line or the end of text.
/// Bodies that open with `Answer`, `Solution` or `Ans` are answer blocks.
pub fn match_numbered_questions(text: &str) -> Vec<Candidate> {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut candidates = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let Some(marker) = RE_NUMBER_MARKER.find(lines[i]) else {
            i += 1;
            continue;
        };

        let mut body = vec![&lines[i][marker.end()..]];
        let mut next = i + 1;
        while next < lines.len() && !RE_NUMBER_MARKER.is_match(lines[next]) {
            body.push(lines[next]);
            next += 1;
        }
        i = next;

        let joined = body.join("\n");
        let question = joined.trim();
        if question.chars().count() > MIN_QUESTION_CHARS && !RE_ANSWER_BLOCK.is_match(question) {
            candidates.push(Candidate::unmarked(question));
        }
    }

    candidates
}

/// Tier 3: any span that starts with a capital letter and ends in `?` without
/// crossing a sentence terminator or newline.
pub fn match_interrogatives(text: &str) -> Vec<Candidate> {
    RE_INTERROGATIVE
        .find_iter(text)
        .map(|m| m.as_str().trim())
        .filter(|q| q.chars().count() > MIN_INTERROGATIVE_CHARS)
        .map(Candidate::unmarked)
        .collect()
}

fn dedup_and_cap(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.text.to_lowercase()))
        .take(MAX_QUESTIONS_PER_DOCUMENT)
        .collect()
}
