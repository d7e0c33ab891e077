//! crates/examease_core/src/domain.rs
//!
//! Defines the core data structures for the application.
//! These structs carry no database or HTTP concerns; nested records that are
//! persisted as documents (prep-pack content, study-plan schedules) derive
//! serde so adapters can store them without a parallel set of types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Maximum number of characters of extracted text kept on a document row.
pub const MAX_STORED_TEXT_CHARS: usize = 50_000;

/// Error returned when a stored or submitted string names no known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Implements `as_str`, `Display` and `FromStr` for a fieldless enum using
/// the same lowercase names serde uses on the wire.
macro_rules! text_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

//=========================================================================================
// Documents
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Pdf,
    Txt,
    Docx,
    Pptx,
    Image,
    Zip,
}

text_enum!(DocumentType, "document type", {
    Pdf => "pdf",
    Txt => "txt",
    Docx => "docx",
    Pptx => "pptx",
    Image => "image",
    Zip => "zip",
});

impl DocumentType {
    /// Maps an upload's MIME type onto the accepted document types.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "application/pdf" => Some(Self::Pdf),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                Some(Self::Docx)
            }
            "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            | "application/vnd.ms-powerpoint" => Some(Self::Pptx),
            "text/plain" => Some(Self::Txt),
            "image/jpeg" | "image/jpg" | "image/png" => Some(Self::Image),
            "application/zip" => Some(Self::Zip),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

text_enum!(DocumentStatus, "document status", {
    Pending => "pending",
    Processing => "processing",
    Completed => "completed",
    Failed => "failed",
});

/// An uploaded file and the state of its text extraction.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub id: Uuid,
    pub session_id: Uuid,
    pub filename: String,
    pub original_name: String,
    pub file_path: String,
    pub doc_type: DocumentType,
    pub mime_type: String,
    pub size: i64,
    pub status: DocumentStatus,
    pub extracted_text: Option<String>,
    pub error_message: Option<String>,
    /// Questions currently referencing this document, counted when read.
    pub question_count: i64,
    pub uploaded_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

/// The fields needed to register a freshly stored upload.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub session_id: Uuid,
    pub filename: String,
    pub original_name: String,
    pub file_path: String,
    pub doc_type: DocumentType,
    pub mime_type: String,
    pub size: i64,
}

//=========================================================================================
// Questions
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Mcq,
    Short,
    Long,
    Numerical,
}

text_enum!(QuestionType, "question type", {
    Mcq => "mcq",
    Short => "short",
    Long => "long",
    Numerical => "numerical",
});

impl QuestionType {
    pub const ALL: [QuestionType; 4] = [Self::Mcq, Self::Short, Self::Long, Self::Numerical];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

text_enum!(Difficulty, "difficulty", {
    Easy => "easy",
    Medium => "medium",
    Hard => "hard",
});

/// A single exam-style question, either extracted from a document or entered by hand.
#[derive(Debug, Clone, Serialize)]
pub struct Question {
    pub id: Uuid,
    pub session_id: Uuid,
    pub text: String,
    pub answer: Option<String>,
    pub marks: Option<u32>,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub difficulty: Difficulty,
    pub topic: Option<String>,
    pub source_doc_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Question {
    /// The marks this question contributes to a section, falling back to the
    /// section's per-question default when no positive marks were recorded.
    pub fn effective_marks(&self, fallback: u32) -> u32 {
        self.marks.filter(|m| *m > 0).unwrap_or(fallback)
    }
}

/// A question that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    pub text: String,
    pub answer: Option<String>,
    pub marks: Option<u32>,
    pub question_type: QuestionType,
    pub difficulty: Difficulty,
    pub topic: Option<String>,
    pub source_doc_id: Option<Uuid>,
}

/// A partial update to a stored question. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestionPatch {
    pub text: Option<String>,
    pub answer: Option<String>,
    pub marks: Option<u32>,
    #[serde(rename = "type")]
    pub question_type: Option<QuestionType>,
    pub difficulty: Option<Difficulty>,
    pub topic: Option<String>,
}

/// Filters applied when browsing the question bank.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestionFilter {
    pub difficulty: Option<Difficulty>,
    #[serde(rename = "type")]
    pub question_type: Option<QuestionType>,
    pub topic: Option<String>,
    pub search: Option<String>,
    pub source_doc_id: Option<Uuid>,
}

impl QuestionFilter {
    pub fn matches(&self, question: &Question) -> bool {
        if self.difficulty.is_some_and(|d| d != question.difficulty) {
            return false;
        }
        if self.question_type.is_some_and(|t| t != question.question_type) {
            return false;
        }
        if self.source_doc_id.is_some() && self.source_doc_id != question.source_doc_id {
            return false;
        }
        if let Some(topic) = &self.topic {
            let hit = question
                .topic
                .as_deref()
                .is_some_and(|t| contains_ignore_case(t, topic));
            if !hit {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let in_text = contains_ignore_case(&question.text, search);
            let in_topic = question
                .topic
                .as_deref()
                .is_some_and(|t| contains_ignore_case(t, search));
            if !in_text && !in_topic {
                return false;
            }
        }
        true
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

//=========================================================================================
// Prep packs
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackPattern {
    #[default]
    Standard,
    Competitive,
    Custom,
}

/// Difficulty restriction for a prep pack's question pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyFilter {
    Easy,
    Medium,
    Hard,
    #[default]
    Mixed,
}

impl DifficultyFilter {
    pub fn admits(&self, difficulty: Difficulty) -> bool {
        match self {
            Self::Mixed => true,
            Self::Easy => difficulty == Difficulty::Easy,
            Self::Medium => difficulty == Difficulty::Medium,
            Self::Hard => difficulty == Difficulty::Hard,
        }
    }
}

/// Which question types a custom section prefers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionTypeFilter {
    Mixed,
    Mcq,
    Short,
    Long,
    Numerical,
}

impl SectionTypeFilter {
    pub fn preferred_types(&self) -> Vec<QuestionType> {
        match self {
            Self::Mixed => QuestionType::ALL.to_vec(),
            Self::Mcq => vec![QuestionType::Mcq],
            Self::Short => vec![QuestionType::Short],
            Self::Long => vec![QuestionType::Long],
            Self::Numerical => vec![QuestionType::Numerical],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomSection {
    pub name: String,
    pub marks: u32,
    pub question_type: SectionTypeFilter,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrepPackConfig {
    pub pattern: PackPattern,
    pub difficulty: DifficultyFilter,
    pub sections: Option<Vec<CustomSection>>,
    pub include_answers: bool,
    pub include_formulas: bool,
    pub include_tips: bool,
}

/// A denormalized copy of a question taken when the pack was generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionQuestion {
    pub id: Uuid,
    pub text: String,
    pub marks: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub marks: u32,
    pub questions: Vec<SectionQuestion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrepPackContent {
    pub sections: Vec<Section>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formulas: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tips: Option<Vec<String>>,
    pub summary: String,
}

impl PrepPackContent {
    pub fn question_count(&self) -> usize {
        self.sections.iter().map(|s| s.questions.len()).sum()
    }

    pub fn section_marks(&self) -> u32 {
        self.sections.iter().map(|s| s.marks).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrepPackStatus {
    Generated,
    InProgress,
    Completed,
}

text_enum!(PrepPackStatus, "prep pack status", {
    Generated => "generated",
    InProgress => "in_progress",
    Completed => "completed",
});

#[derive(Debug, Clone, Serialize)]
pub struct PrepPack {
    pub id: Uuid,
    pub session_id: Uuid,
    pub title: String,
    pub subject: String,
    pub description: Option<String>,
    pub content: PrepPackContent,
    pub config: PrepPackConfig,
    pub total_marks: u32,
    pub status: PrepPackStatus,
    pub created_at: DateTime<Utc>,
}

//=========================================================================================
// Study plans
//=========================================================================================

/// Topic priority. Variant order is scheduling order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyTopic {
    pub name: String,
    pub priority: Priority,
    pub estimated_hours: f64,
    pub completed: bool,
}

/// One calendar day of a study plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleItem {
    pub date: NaiveDate,
    pub topics: Vec<String>,
    pub estimated_hours: f64,
    pub completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    Active,
    Completed,
}

text_enum!(PlanStatus, "plan status", {
    Active => "active",
    Completed => "completed",
});

//=========================================================================================
// Focus sessions
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusKind {
    #[default]
    Focus,
    Break,
}

text_enum!(FocusKind, "focus session type", {
    Focus => "focus",
    Break => "break",
});

/// One timed focus or break interval. `duration_seconds` stays 0 until the
/// interval is ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FocusSession {
    pub id: Uuid,
    pub session_id: Uuid,
    pub kind: FocusKind,
    pub target_seconds: u32,
    pub duration_seconds: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub completed: bool,
    pub task_name: Option<String>,
    pub notes: Option<String>,
}

/// What ending a focus interval writes back.
#[derive(Debug, Clone, PartialEq)]
pub struct FocusOutcome {
    pub end_time: DateTime<Utc>,
    pub duration_seconds: i64,
    pub completed: bool,
    pub notes: Option<String>,
}

/// Minutes spent in completed intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FocusStats {
    pub total_sessions: u64,
    pub today_minutes: i64,
    pub week_minutes: i64,
    pub total_minutes: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudyPlan {
    pub id: Uuid,
    pub session_id: Uuid,
    pub title: String,
    pub subject: Option<String>,
    pub exam_date: Option<NaiveDate>,
    pub daily_hours: f64,
    pub schedule: Vec<ScheduleItem>,
    pub topics: Vec<StudyTopic>,
    pub progress: f64,
    pub status: PlanStatus,
    pub created_at: DateTime<Utc>,
}
