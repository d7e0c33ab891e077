//! crates/examease_core/src/sections.rs
//!
//! Fills one marks-bounded prep-pack section from a shuffled question pool.

use std::collections::HashSet;

use crate::domain::{Question, QuestionType, Section, SectionQuestion};

/// Pass one admits only preferred types; pass two tops up from the whole pool.
/// Each pass visits every pool entry at most once, so building a section
/// never looks at more than `SELECTION_PASSES * pool.len()` questions.
pub const SELECTION_PASSES: usize = 2;

/// Parameters for one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionSpec {
    pub name: String,
    pub target_marks: u32,
    /// Marks assumed for a question without its own, and the overshoot
    /// allowed past `target_marks` when admitting a question.
    pub marks_per_question: u32,
    pub preferred_types: Vec<QuestionType>,
}

impl SectionSpec {
    pub fn new(
        name: impl Into<String>,
        target_marks: u32,
        marks_per_question: u32,
        preferred_types: &[QuestionType],
    ) -> Self {
        Self {
            name: name.into(),
            target_marks,
            marks_per_question,
            preferred_types: preferred_types.to_vec(),
        }
    }

    fn budget_ceiling(&self) -> u32 {
        self.target_marks.saturating_add(self.marks_per_question)
    }
}

/// Greedily admits questions in pool order until the section reaches its target.
///
/// A question is admitted when the running total plus its marks stays within
/// `target + marks_per_question`. Questions already admitted to this section
/// are skipped; other sections keep their own used-set, so the same question
/// may appear in more than one section of a pack.
pub fn build_section(spec: &SectionSpec, pool: &[Question]) -> Section {
    let mut admitted: Vec<SectionQuestion> = Vec::new();
    let mut used: HashSet<uuid::Uuid> = HashSet::new();
    let mut running = 0u32;

    for pass in 0..SELECTION_PASSES {
        if running >= spec.target_marks {
            break;
        }
        let type_filtered = pass == 0;

        for question in pool {
            if running >= spec.target_marks {
                break;
            }
            if used.contains(&question.id) {
                continue;
            }
            if type_filtered && !spec.preferred_types.contains(&question.question_type) {
                continue;
            }

            let marks = question.effective_marks(spec.marks_per_question);
            if running.saturating_add(marks) <= spec.budget_ceiling() {
                running += marks;
                used.insert(question.id);
                admitted.push(SectionQuestion {
                    id: question.id,
                    text: question.text.clone(),
                    marks,
                    answer: question.answer.clone(),
                    question_type: question.question_type,
                });
            }
        }
    }

    Section {
        name: spec.name.clone(),
        marks: running,
        questions: admitted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Difficulty;
    use chrono::Utc;
    use proptest::prelude::*;
    use uuid::Uuid;

    fn question(n: u128, qt: QuestionType, marks: Option<u32>) -> Question {
        Question {
            id: Uuid::from_u128(n),
            session_id: Uuid::nil(),
            text: format!("Question number {n} text"),
            answer: Some(format!("Answer {n}")),
            marks,
            question_type: qt,
            difficulty: Difficulty::Medium,
            topic: None,
            source_doc_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn preferred_types_are_taken_first() {
        let pool = vec![
            question(1, QuestionType::Long, Some(2)),
            question(2, QuestionType::Short, Some(2)),
            question(3, QuestionType::Mcq, Some(2)),
        ];
        let spec = SectionSpec::new("A", 4, 2, &[QuestionType::Short, QuestionType::Mcq]);
        let section = build_section(&spec, &pool);
        let ids: Vec<_> = section.questions.iter().map(|q| q.id.as_u128()).collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(section.marks, 4);
    }

    #[test]
    fn second_pass_tops_up_from_any_type() {
        let pool = vec![
            question(1, QuestionType::Long, Some(10)),
            question(2, QuestionType::Short, Some(2)),
            question(3, QuestionType::Numerical, Some(5)),
        ];
        let spec = SectionSpec::new("C", 20, 10, &[QuestionType::Long]);
        let section = build_section(&spec, &pool);
        let ids: Vec<_> = section.questions.iter().map(|q| q.id.as_u128()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(section.marks, 17);
    }

    #[test]
    fn slack_admits_one_question_past_the_target() {
        let pool = vec![
            question(1, QuestionType::Short, Some(4)),
            question(2, QuestionType::Short, Some(5)),
            question(3, QuestionType::Short, Some(1)),
        ];
        let spec = SectionSpec::new("B", 8, 2, &[QuestionType::Short]);
        let section = build_section(&spec, &pool);
        // 4 + 5 = 9 fits within 8 + 2, and the target is then met.
        assert_eq!(section.marks, 9);
        assert_eq!(section.questions.len(), 2);
    }

    #[test]
    fn missing_marks_use_the_per_question_default() {
        let pool = vec![question(1, QuestionType::Mcq, None), question(2, QuestionType::Mcq, Some(0))];
        let spec = SectionSpec::new("MCQ", 10, 1, &[QuestionType::Mcq]);
        let section = build_section(&spec, &pool);
        assert_eq!(section.marks, 2);
        assert!(section.questions.iter().all(|q| q.marks == 1));
    }

    #[test]
    fn zero_target_admits_nothing() {
        let pool = vec![question(1, QuestionType::Short, Some(2))];
        let section = build_section(&SectionSpec::new("Empty", 0, 2, &[QuestionType::Short]), &pool);
        assert!(section.questions.is_empty());
        assert_eq!(section.marks, 0);
    }

    fn arb_type() -> impl Strategy<Value = QuestionType> {
        prop_oneof![
            Just(QuestionType::Mcq),
            Just(QuestionType::Short),
            Just(QuestionType::Long),
            Just(QuestionType::Numerical),
        ]
    }

    fn arb_pool() -> impl Strategy<Value = Vec<Question>> {
        prop::collection::vec((arb_type(), prop::option::of(0u32..25)), 0..60).prop_map(|items| {
            items
                .into_iter()
                .enumerate()
                .map(|(i, (qt, marks))| question(i as u128, qt, marks))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn section_never_exceeds_target_plus_slack(
            pool in arb_pool(),
            target in 0u32..200,
            per_question in 1u32..12,
            preferred in prop::collection::vec(arb_type(), 0..4),
        ) {
            let spec = SectionSpec::new("P", target, per_question, &preferred);
            let section = build_section(&spec, &pool);
            prop_assert!(section.marks <= target + per_question);
            let summed: u32 = section.questions.iter().map(|q| q.marks).sum();
            prop_assert_eq!(summed, section.marks);
        }

        #[test]
        fn no_question_repeats_within_a_section(
            pool in arb_pool(),
            target in 0u32..200,
            per_question in 1u32..12,
        ) {
            let spec = SectionSpec::new("P", target, per_question, &[QuestionType::Short]);
            let section = build_section(&spec, &pool);
            let unique: HashSet<_> = section.questions.iter().map(|q| q.id).collect();
            prop_assert_eq!(unique.len(), section.questions.len());
        }
    }
}
