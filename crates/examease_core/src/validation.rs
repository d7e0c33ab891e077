//! crates/examease_core/src/validation.rs
//!
//! Input payloads for the core services and the rules that accept or reject
//! them. Validation happens before any persistence write.

use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{
    CustomSection, Difficulty, DifficultyFilter, FocusKind, NewQuestion, PackPattern,
    PrepPackConfig, Priority, QuestionPatch, QuestionType, StudyTopic,
};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

fn min_chars(field: &'static str, value: &str, min: usize, label: &str) -> Result<(), ValidationError> {
    if value.trim().chars().count() < min {
        return Err(ValidationError::new(
            field,
            format!("{label} must be at least {min} characters"),
        ));
    }
    Ok(())
}

//=========================================================================================
// Questions
//=========================================================================================

pub const MIN_MANUAL_QUESTION_CHARS: usize = 10;
pub const MAX_MANUAL_MARKS: u32 = 20;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateQuestionInput {
    pub text: String,
    pub answer: Option<String>,
    pub marks: Option<u32>,
    pub difficulty: Option<Difficulty>,
    #[serde(rename = "type")]
    pub question_type: Option<QuestionType>,
    pub topic: Option<String>,
    pub source_doc_id: Option<Uuid>,
}

fn check_marks(marks: Option<u32>) -> Result<(), ValidationError> {
    match marks {
        Some(m) if !(1..=MAX_MANUAL_MARKS).contains(&m) => Err(ValidationError::new(
            "marks",
            format!("marks must be between 1 and {MAX_MANUAL_MARKS}"),
        )),
        _ => Ok(()),
    }
}

impl CreateQuestionInput {
    pub fn validate(self) -> Result<NewQuestion, ValidationError> {
        min_chars("text", &self.text, MIN_MANUAL_QUESTION_CHARS, "Question")?;
        check_marks(self.marks)?;
        Ok(NewQuestion {
            text: self.text.trim().to_string(),
            answer: self.answer,
            marks: self.marks,
            question_type: self.question_type.unwrap_or(QuestionType::Short),
            difficulty: self.difficulty.unwrap_or(Difficulty::Medium),
            topic: self.topic,
            source_doc_id: self.source_doc_id,
        })
    }
}

pub fn validate_question_patch(patch: &QuestionPatch) -> Result<(), ValidationError> {
    if let Some(text) = &patch.text {
        min_chars("text", text, MIN_MANUAL_QUESTION_CHARS, "Question")?;
    }
    check_marks(patch.marks)
}

//=========================================================================================
// Prep packs
//=========================================================================================

pub const DEFAULT_TOTAL_MARKS: u32 = 100;
pub const MIN_TOTAL_MARKS: u32 = 10;
pub const MAX_TOTAL_MARKS: u32 = 500;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrepPackConfigInput {
    pub pattern: Option<PackPattern>,
    pub difficulty: Option<DifficultyFilter>,
    pub sections: Option<Vec<CustomSection>>,
    pub include_answers: Option<bool>,
    pub include_formulas: Option<bool>,
    pub include_tips: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePrepPackInput {
    pub title: String,
    pub subject: String,
    pub description: Option<String>,
    pub total_marks: Option<u32>,
    #[serde(default)]
    pub config: PrepPackConfigInput,
}

/// A prep-pack request that passed validation, with every default filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepPackRequest {
    pub title: String,
    pub subject: String,
    pub description: Option<String>,
    pub total_marks: u32,
    pub config: PrepPackConfig,
}

impl CreatePrepPackInput {
    pub fn validate(self) -> Result<PrepPackRequest, ValidationError> {
        min_chars("title", &self.title, 3, "Title")?;
        min_chars("subject", &self.subject, 2, "Subject")?;

        let total_marks = self.total_marks.unwrap_or(DEFAULT_TOTAL_MARKS);
        if !(MIN_TOTAL_MARKS..=MAX_TOTAL_MARKS).contains(&total_marks) {
            return Err(ValidationError::new(
                "total_marks",
                format!("total marks must be between {MIN_TOTAL_MARKS} and {MAX_TOTAL_MARKS}"),
            ));
        }

        if let Some(sections) = &self.config.sections {
            if sections.iter().any(|s| s.name.trim().is_empty()) {
                return Err(ValidationError::new("config.sections", "section name is required"));
            }
        }

        let input = self.config;
        Ok(PrepPackRequest {
            title: self.title.trim().to_string(),
            subject: self.subject.trim().to_string(),
            description: self.description,
            total_marks,
            config: PrepPackConfig {
                pattern: input.pattern.unwrap_or_default(),
                difficulty: input.difficulty.unwrap_or_default(),
                sections: input.sections,
                include_answers: input.include_answers.unwrap_or(true),
                include_formulas: input.include_formulas.unwrap_or(true),
                include_tips: input.include_tips.unwrap_or(true),
            },
        })
    }
}

//=========================================================================================
// Study plans
//=========================================================================================

pub const DEFAULT_DAILY_HOURS: f64 = 2.0;
pub const MIN_DAILY_HOURS: f64 = 0.5;
pub const MAX_DAILY_HOURS: f64 = 12.0;
pub const DEFAULT_TOPIC_HOURS: f64 = 2.0;

#[derive(Debug, Clone, Deserialize)]
pub struct StudyTopicInput {
    pub name: String,
    pub priority: Option<Priority>,
    pub estimated_hours: Option<f64>,
    pub completed: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateStudyPlanInput {
    pub title: String,
    pub subject: Option<String>,
    pub exam_date: Option<NaiveDate>,
    pub daily_hours: Option<f64>,
    pub topics: Vec<StudyTopicInput>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudyPlanRequest {
    pub title: String,
    pub subject: Option<String>,
    pub exam_date: Option<NaiveDate>,
    pub daily_hours: f64,
    pub topics: Vec<StudyTopic>,
}

impl CreateStudyPlanInput {
    pub fn validate(self) -> Result<StudyPlanRequest, ValidationError> {
        min_chars("title", &self.title, 3, "Title")?;

        let daily_hours = self.daily_hours.unwrap_or(DEFAULT_DAILY_HOURS);
        if !(MIN_DAILY_HOURS..=MAX_DAILY_HOURS).contains(&daily_hours) {
            return Err(ValidationError::new(
                "daily_hours",
                format!("daily hours must be between {MIN_DAILY_HOURS} and {MAX_DAILY_HOURS}"),
            ));
        }

        let topics = self
            .topics
            .into_iter()
            .map(|t| {
                if t.name.trim().is_empty() {
                    return Err(ValidationError::new("topics", "topic name is required"));
                }
                let estimated_hours = t.estimated_hours.unwrap_or(DEFAULT_TOPIC_HOURS);
                if !estimated_hours.is_finite() || estimated_hours < 0.0 {
                    return Err(ValidationError::new(
                        "topics",
                        format!("estimated hours for '{}' must be zero or more", t.name),
                    ));
                }
                Ok(StudyTopic {
                    name: t.name.trim().to_string(),
                    priority: t.priority.unwrap_or_default(),
                    estimated_hours,
                    completed: t.completed.unwrap_or(false),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(StudyPlanRequest {
            title: self.title.trim().to_string(),
            subject: self.subject,
            exam_date: self.exam_date,
            daily_hours,
            topics,
        })
    }
}

//=========================================================================================
// Focus sessions
//=========================================================================================

pub const MIN_FOCUS_TARGET_SECONDS: u32 = 60;
pub const MAX_FOCUS_TARGET_SECONDS: u32 = 2 * 60 * 60;

#[derive(Debug, Clone, Deserialize)]
pub struct StartFocusSessionInput {
    #[serde(rename = "type")]
    pub kind: Option<FocusKind>,
    /// Planned length in seconds.
    pub target_time: u32,
    pub task_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusStartRequest {
    pub kind: FocusKind,
    pub target_seconds: u32,
    pub task_name: Option<String>,
}

impl StartFocusSessionInput {
    pub fn validate(self) -> Result<FocusStartRequest, ValidationError> {
        if !(MIN_FOCUS_TARGET_SECONDS..=MAX_FOCUS_TARGET_SECONDS).contains(&self.target_time) {
            return Err(ValidationError::new(
                "target_time",
                format!(
                    "target time must be between {MIN_FOCUS_TARGET_SECONDS} and {MAX_FOCUS_TARGET_SECONDS} seconds"
                ),
            ));
        }
        Ok(FocusStartRequest {
            kind: self.kind.unwrap_or_default(),
            target_seconds: self.target_time,
            task_name: self
                .task_name
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty()),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EndFocusSessionInput {
    #[serde(default)]
    pub completed: bool,
    pub notes: Option<String>,
}
