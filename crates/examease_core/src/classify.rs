//! crates/examease_core/src/classify.rs
//!
//! Lexical and marks-based heuristics that label a segmented question.

use crate::domain::{Difficulty, QuestionType};

const MCQ_CUES: [&str; 3] = ["choose", "select", "which of"];
const NUMERICAL_CUES: [&str; 3] = ["calculate", "find the value", "solve"];

/// Marks at or above this value make a question long and hard.
pub const LONG_MARKS: u32 = 8;
/// Marks at or below this value make a question short and easy.
pub const SHORT_MARKS: u32 = 2;
/// Unannotated questions longer than this many characters count as long.
pub const LONG_TEXT_CHARS: usize = 200;

/// Picks a question type. Lexical cues win over marks, and marks win over length.
/// A marks value of zero is treated as absent.
pub fn classify_type(text: &str, marks: Option<u32>) -> QuestionType {
    let lower = text.to_lowercase();
    if MCQ_CUES.iter().any(|cue| lower.contains(cue)) {
        return QuestionType::Mcq;
    }
    if NUMERICAL_CUES.iter().any(|cue| lower.contains(cue)) {
        return QuestionType::Numerical;
    }
    match marks.filter(|m| *m > 0) {
        Some(m) if m >= LONG_MARKS => QuestionType::Long,
        Some(m) if m <= SHORT_MARKS => QuestionType::Short,
        _ if text.chars().count() > LONG_TEXT_CHARS => QuestionType::Long,
        _ => QuestionType::Short,
    }
}

pub fn classify_difficulty(marks: Option<u32>) -> Difficulty {
    match marks.filter(|m| *m > 0) {
        None => Difficulty::Medium,
        Some(m) if m <= SHORT_MARKS => Difficulty::Easy,
        Some(m) if m >= LONG_MARKS => Difficulty::Hard,
        Some(_) => Difficulty::Medium,
    }
}
