//! crates/examease_core/src/prep_pack.rs
//!
//! Composes prep packs: picks a section layout for the requested pattern,
//! fills each section from a shuffled question pool and attaches the static
//! study material.

use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::domain::{
    PackPattern, PrepPack, PrepPackConfig, PrepPackContent, PrepPackStatus, Question,
    QuestionType, SectionTypeFilter,
};
use crate::error::{ServiceError, ServiceResult};
use crate::ports::DatabaseService;
use crate::sections::{build_section, SectionSpec};
use crate::validation::{CreatePrepPackInput, PrepPackRequest};

/// Marks-per-question default for user-defined sections.
pub const CUSTOM_SECTION_MARKS_PER_QUESTION: u32 = 5;

/// `percent` of `total`, rounded down.
fn share(total: u32, percent: u32) -> u32 {
    total * percent / 100
}

/// Lays out the sections for a pack. For the fixed patterns the last section
/// takes whatever the rounded-down shares leave, so the targets always sum
/// to `total_marks`.
pub fn section_specs(total_marks: u32, config: &PrepPackConfig) -> Vec<SectionSpec> {
    use QuestionType::*;

    match config.pattern {
        PackPattern::Standard => {
            let a = share(total_marks, 20);
            let b = share(total_marks, 40);
            vec![
                SectionSpec::new("Section A - Short Answer", a, 2, &[Short, Mcq]),
                SectionSpec::new("Section B - Medium Answer", b, 5, &[Short, Numerical]),
                SectionSpec::new("Section C - Long Answer", total_marks - a - b, 10, &[Long]),
            ]
        }
        PackPattern::Competitive => {
            let mcq = share(total_marks, 40);
            let numerical = share(total_marks, 30);
            vec![
                SectionSpec::new("Part I - Multiple Choice", mcq, 1, &[Mcq, Short]),
                SectionSpec::new("Part II - Numerical Problems", numerical, 5, &[Numerical]),
                SectionSpec::new(
                    "Part III - Descriptive",
                    total_marks - mcq - numerical,
                    8,
                    &[Long, Short],
                ),
            ]
        }
        PackPattern::Custom => match &config.sections {
            Some(sections) => sections
                .iter()
                .map(|s| {
                    SectionSpec::new(
                        s.name.clone(),
                        s.marks,
                        CUSTOM_SECTION_MARKS_PER_QUESTION,
                        &s.question_type.preferred_types(),
                    )
                })
                .collect(),
            None => vec![SectionSpec::new(
                "Questions",
                total_marks,
                CUSTOM_SECTION_MARKS_PER_QUESTION,
                &SectionTypeFilter::Mixed.preferred_types(),
            )],
        },
    }
}

/// Builds a pack's content from the session's question pool.
///
/// The pool is filtered by difficulty and shuffled once with `rng`; every
/// section then draws from that same shuffled order.
pub fn generate_content<R: Rng + ?Sized>(
    request: &PrepPackRequest,
    questions: Vec<Question>,
    rng: &mut R,
) -> ServiceResult<PrepPackContent> {
    if questions.is_empty() {
        return Err(ServiceError::NoQuestions);
    }

    let config = &request.config;
    let mut pool: Vec<Question> = questions
        .into_iter()
        .filter(|q| config.difficulty.admits(q.difficulty))
        .collect();
    pool.shuffle(rng);

    let mut sections: Vec<_> = section_specs(request.total_marks, config)
        .iter()
        .map(|spec| build_section(spec, &pool))
        .collect();

    if !config.include_answers {
        for question in sections.iter_mut().flat_map(|s| s.questions.iter_mut()) {
            question.answer = None;
        }
    }

    let question_count: usize = sections.iter().map(|s| s.questions.len()).sum();
    let summary = format!(
        "This preparation pack contains {} questions across {} sections, totaling {} marks.",
        question_count,
        sections.len(),
        request.total_marks
    );

    Ok(PrepPackContent {
        formulas: config.include_formulas.then(|| formulas_for(&request.subject)),
        tips: config.include_tips.then(|| tips_for(&request.subject)),
        sections,
        summary,
    })
}

/// General reminders plus a few standard formulas for known subjects.
pub fn formulas_for(subject: &str) -> Vec<String> {
    let common = [
        "Important: Review all formulas from your course material",
        "Focus on derivations that appear frequently in exams",
        "Practice applying formulas to different problem types",
    ];
    let specific: &[&str] = match subject.to_lowercase().as_str() {
        "mathematics" => &[
            "Quadratic Formula: x = (-b ± √(b² - 4ac)) / 2a",
            "Area of Circle: A = πr²",
            "Pythagorean Theorem: a² + b² = c²",
        ],
        "physics" => &[
            "Newton's Second Law: F = ma",
            "Kinetic Energy: KE = ½mv²",
            "Ohm's Law: V = IR",
        ],
        "chemistry" => &[
            "Ideal Gas Law: PV = nRT",
            "Molarity: M = moles of solute / liters of solution",
            "pH = -log[H⁺]",
        ],
        _ => &[],
    };
    common
        .iter()
        .chain(specific)
        .map(|s| s.to_string())
        .collect()
}

pub fn tips_for(subject: &str) -> Vec<String> {
    let mut tips: Vec<String> = [
        "Read all questions carefully before starting",
        "Allocate time proportionally based on marks",
        "Start with questions you're most confident about",
        "Show all working for numerical problems",
        "Review your answers if time permits",
        "Don't leave any question unanswered",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    tips.push(format!("Focus on key concepts from {subject}"));
    tips
}

//=========================================================================================
// Service
//=========================================================================================

/// Creates and manages persisted prep packs.
#[derive(Clone)]
pub struct PrepPackService {
    db: Arc<dyn DatabaseService>,
}

impl PrepPackService {
    pub fn new(db: Arc<dyn DatabaseService>) -> Self {
        Self { db }
    }

    /// Validates the request, generates content from every question in the
    /// session and stores the pack as `generated`.
    pub async fn create<R: Rng + Send + ?Sized>(
        &self,
        session_id: Uuid,
        input: CreatePrepPackInput,
        rng: &mut R,
    ) -> ServiceResult<PrepPack> {
        let request = input.validate()?;
        let questions = self
            .db
            .list_questions(session_id, &Default::default())
            .await?;
        let content = generate_content(&request, questions, rng)?;

        let pack = PrepPack {
            id: Uuid::new_v4(),
            session_id,
            title: request.title,
            subject: request.subject,
            description: request.description,
            content,
            config: request.config,
            total_marks: request.total_marks,
            status: PrepPackStatus::Generated,
            created_at: Utc::now(),
        };
        self.db.save_prep_pack(&pack).await?;

        info!(
            pack_id = %pack.id,
            sections = pack.content.sections.len(),
            questions = pack.content.question_count(),
            "Prep pack generated"
        );
        Ok(pack)
    }

    pub async fn list(&self, session_id: Uuid) -> ServiceResult<Vec<PrepPack>> {
        Ok(self.db.list_prep_packs(session_id).await?)
    }

    pub async fn get(&self, session_id: Uuid, pack_id: Uuid) -> ServiceResult<PrepPack> {
        Ok(self.db.get_prep_pack(session_id, pack_id).await?)
    }

    pub async fn update_status(
        &self,
        session_id: Uuid,
        pack_id: Uuid,
        status: PrepPackStatus,
    ) -> ServiceResult<()> {
        Ok(self
            .db
            .update_prep_pack_status(session_id, pack_id, status)
            .await?)
    }

    pub async fn delete(&self, session_id: Uuid, pack_id: Uuid) -> ServiceResult<()> {
        Ok(self.db.delete_prep_pack(session_id, pack_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CustomSection, Difficulty, DifficultyFilter};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rstest::rstest;

    fn request(total_marks: u32, config: PrepPackConfig) -> PrepPackRequest {
        PrepPackRequest {
            title: "Finals".to_string(),
            subject: "Physics".to_string(),
            description: None,
            total_marks,
            config,
        }
    }

    fn config(pattern: PackPattern) -> PrepPackConfig {
        PrepPackConfig {
            pattern,
            difficulty: DifficultyFilter::Mixed,
            sections: None,
            include_answers: true,
            include_formulas: true,
            include_tips: true,
        }
    }

    fn pool() -> Vec<Question> {
        let kinds = [
            (QuestionType::Short, Some(2), Difficulty::Easy),
            (QuestionType::Mcq, Some(1), Difficulty::Easy),
            (QuestionType::Numerical, Some(5), Difficulty::Medium),
            (QuestionType::Long, Some(10), Difficulty::Hard),
            (QuestionType::Short, None, Difficulty::Medium),
        ];
        (0..40u128)
            .map(|n| {
                let (qt, marks, difficulty) = kinds[n as usize % kinds.len()];
                Question {
                    id: Uuid::from_u128(n + 1),
                    session_id: Uuid::nil(),
                    text: format!("Pool question {n}"),
                    answer: Some(format!("Answer {n}")),
                    marks,
                    question_type: qt,
                    difficulty,
                    topic: None,
                    source_doc_id: None,
                    created_at: Utc::now(),
                }
            })
            .collect()
    }

    #[rstest]
    #[case(PackPattern::Standard, 80, [16, 32, 32])]
    #[case(PackPattern::Standard, 15, [3, 6, 6])]
    #[case(PackPattern::Competitive, 100, [40, 30, 30])]
    #[case(PackPattern::Competitive, 33, [13, 9, 11])]
    fn fixed_patterns_split_marks_exactly(
        #[case] pattern: PackPattern,
        #[case] total: u32,
        #[case] expected: [u32; 3],
    ) {
        let specs = section_specs(total, &config(pattern));
        let targets: Vec<u32> = specs.iter().map(|s| s.target_marks).collect();
        assert_eq!(targets, expected);
        assert_eq!(targets.iter().sum::<u32>(), total);
    }

    #[test]
    fn custom_pattern_defaults_to_one_mixed_section() {
        let specs = section_specs(60, &config(PackPattern::Custom));
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].name, "Questions");
        assert_eq!(specs[0].target_marks, 60);
        assert_eq!(specs[0].preferred_types.len(), 4);
    }

    #[test]
    fn custom_sections_keep_their_own_types() {
        let mut cfg = config(PackPattern::Custom);
        cfg.sections = Some(vec![CustomSection {
            name: "Numericals".to_string(),
            marks: 25,
            question_type: SectionTypeFilter::Numerical,
        }]);
        let specs = section_specs(100, &cfg);
        assert_eq!(specs[0].preferred_types, vec![QuestionType::Numerical]);
        assert_eq!(specs[0].marks_per_question, CUSTOM_SECTION_MARKS_PER_QUESTION);
    }

    #[test]
    fn empty_pool_is_reported_not_panicked() {
        let mut rng = StdRng::seed_from_u64(7);
        let err = generate_content(&request(80, config(PackPattern::Standard)), vec![], &mut rng)
            .unwrap_err();
        assert!(matches!(err, ServiceError::NoQuestions));
    }

    #[test]
    fn same_seed_gives_the_same_pack() {
        let req = request(80, config(PackPattern::Standard));
        let a = generate_content(&req, pool(), &mut StdRng::seed_from_u64(42)).unwrap();
        let b = generate_content(&req, pool(), &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.sections.len(), 3);
        assert!(a.question_count() > 0);
    }

    #[test]
    fn sections_stay_within_their_slack() {
        let req = request(80, config(PackPattern::Standard));
        let content = generate_content(&req, pool(), &mut StdRng::seed_from_u64(3)).unwrap();
        let specs = section_specs(80, &req.config);
        for (section, spec) in content.sections.iter().zip(&specs) {
            assert!(section.marks <= spec.target_marks + spec.marks_per_question);
        }
        let ceiling: u32 = specs.iter().map(|s| s.target_marks + s.marks_per_question).sum();
        assert!(content.section_marks() > 0);
        assert!(content.section_marks() <= ceiling);
        assert_eq!(
            content.section_marks(),
            content.sections.iter().flat_map(|s| &s.questions).map(|q| q.marks).sum::<u32>()
        );
    }

    #[test]
    fn difficulty_filter_limits_the_pool() {
        let mut cfg = config(PackPattern::Custom);
        cfg.difficulty = DifficultyFilter::Hard;
        let content =
            generate_content(&request(100, cfg), pool(), &mut StdRng::seed_from_u64(1)).unwrap();
        assert!(content
            .sections
            .iter()
            .flat_map(|s| &s.questions)
            .all(|q| q.question_type == QuestionType::Long));
    }

    #[test]
    fn toggles_control_extras_and_answers() {
        let mut cfg = config(PackPattern::Standard);
        cfg.include_answers = false;
        cfg.include_formulas = false;
        let content =
            generate_content(&request(50, cfg), pool(), &mut StdRng::seed_from_u64(9)).unwrap();
        assert!(content.formulas.is_none());
        assert_eq!(content.tips.as_ref().map(Vec::len), Some(7));
        assert!(content
            .sections
            .iter()
            .flat_map(|s| &s.questions)
            .all(|q| q.answer.is_none()));
        assert!(content.summary.ends_with("across 3 sections, totaling 50 marks."));
    }

    #[test]
    fn formulas_are_keyed_by_subject() {
        assert_eq!(formulas_for("Physics").len(), 6);
        assert_eq!(formulas_for("History").len(), 3);
        assert!(tips_for("Biology").last().unwrap().contains("Biology"));
    }
}
