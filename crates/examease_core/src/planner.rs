//! crates/examease_core/src/planner.rs
//!
//! Spreads study topics over the days before an exam and tracks how many of
//! those days have been completed.

use chrono::{Duration, NaiveDate, Utc};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::domain::{PlanStatus, ScheduleItem, StudyPlan, StudyTopic};
use crate::error::{ServiceError, ServiceResult};
use crate::ports::{DatabaseService, PortError};
use crate::validation::CreateStudyPlanInput;

/// Planning horizon when no exam date is given.
pub const DEFAULT_PLANNING_DAYS: i64 = 30;
/// The walk stops once the day cursor passes the horizon by this many days.
pub const OVERRUN_LIMIT_DAYS: i64 = 30;
/// Days past the horizon that survive the final truncation.
pub const SCHEDULE_BUFFER_DAYS: i64 = 7;
/// Hour amounts at or below this are treated as exhausted.
const HOURS_EPSILON: f64 = 1e-9;

/// Whole days from `today` until the exam, never less than one.
pub fn days_available(exam_date: Option<NaiveDate>, today: NaiveDate) -> i64 {
    match exam_date {
        Some(exam) => (exam - today).num_days().max(1),
        None => DEFAULT_PLANNING_DAYS,
    }
}

/// Builds a day-by-day schedule starting at `today`.
///
/// Topics are visited highest priority first (input order kept among equals)
/// and poured into days of `daily_hours` capacity; a topic that does not fit
/// spills into the following day. The day cursor never passes
/// `days_available + OVERRUN_LIMIT_DAYS`, and the result keeps at most
/// `days_available + SCHEDULE_BUFFER_DAYS` days.
pub fn generate_schedule(
    topics: &[StudyTopic],
    exam_date: Option<NaiveDate>,
    daily_hours: f64,
    today: NaiveDate,
) -> Vec<ScheduleItem> {
    let days = days_available(exam_date, today);
    let last_day = days + OVERRUN_LIMIT_DAYS;

    let mut ordered: Vec<&StudyTopic> = topics.iter().collect();
    ordered.sort_by_key(|t| t.priority);

    let mut schedule: Vec<ScheduleItem> = Vec::new();
    let mut current_day = 0i64;
    let mut remaining_today = daily_hours;

    'walk: for topic in ordered {
        let mut topic_left = topic.estimated_hours;

        while topic_left > HOURS_EPSILON {
            if current_day > last_day {
                break 'walk;
            }

            let date = today + Duration::days(current_day);
            if schedule.last().map_or(true, |day| day.date != date) {
                schedule.push(ScheduleItem {
                    date,
                    topics: Vec::new(),
                    estimated_hours: 0.0,
                    completed: false,
                });
            }
            let idx = schedule.len() - 1;
            let day = &mut schedule[idx];

            let hours = topic_left.min(remaining_today).max(0.0);
            if !day.topics.contains(&topic.name) {
                day.topics.push(topic.name.clone());
            }
            day.estimated_hours += hours;
            topic_left -= hours;
            remaining_today -= hours;

            if remaining_today <= HOURS_EPSILON {
                current_day += 1;
                remaining_today = daily_hours;
            }
        }
    }

    schedule.truncate(usize::try_from(days + SCHEDULE_BUFFER_DAYS).unwrap_or(usize::MAX));
    schedule
}

/// Sets the completion flag of the day matching `date`, or flips it when
/// `completed` is `None`. Returns whether such a day exists.
pub fn mark_day(schedule: &mut [ScheduleItem], date: NaiveDate, completed: Option<bool>) -> bool {
    match schedule.iter_mut().find(|day| day.date == date) {
        Some(day) => {
            day.completed = completed.unwrap_or(!day.completed);
            true
        }
        None => false,
    }
}

/// Percentage (0-100) of schedule days marked completed. An empty schedule is 0.
pub fn progress_percent(schedule: &[ScheduleItem]) -> f64 {
    if schedule.is_empty() {
        return 0.0;
    }
    let done = schedule.iter().filter(|day| day.completed).count();
    done as f64 / schedule.len() as f64 * 100.0
}

pub fn status_for_progress(progress: f64) -> PlanStatus {
    if progress >= 100.0 {
        PlanStatus::Completed
    } else {
        PlanStatus::Active
    }
}

//=========================================================================================
// Service
//=========================================================================================

#[derive(Clone)]
pub struct StudyPlanService {
    db: Arc<dyn DatabaseService>,
}

impl StudyPlanService {
    pub fn new(db: Arc<dyn DatabaseService>) -> Self {
        Self { db }
    }

    /// Validates the request, schedules it from `today` and stores the plan.
    pub async fn create(
        &self,
        session_id: Uuid,
        input: CreateStudyPlanInput,
        today: NaiveDate,
    ) -> ServiceResult<StudyPlan> {
        let request = input.validate()?;
        let schedule =
            generate_schedule(&request.topics, request.exam_date, request.daily_hours, today);

        let plan = StudyPlan {
            id: Uuid::new_v4(),
            session_id,
            title: request.title,
            subject: request.subject,
            exam_date: request.exam_date,
            daily_hours: request.daily_hours,
            schedule,
            topics: request.topics,
            progress: 0.0,
            status: PlanStatus::Active,
            created_at: Utc::now(),
        };
        self.db.save_study_plan(&plan).await?;

        info!(plan_id = %plan.id, days = plan.schedule.len(), "Study plan created");
        Ok(plan)
    }

    /// Marks one day done or not done (toggling when `completed` is `None`)
    /// and recomputes progress and status.
    pub async fn update_progress(
        &self,
        session_id: Uuid,
        plan_id: Uuid,
        date: NaiveDate,
        completed: Option<bool>,
    ) -> ServiceResult<StudyPlan> {
        let mut plan = self
            .db
            .get_study_plan(session_id, plan_id)
            .await
            .map_err(|e| match e {
                PortError::NotFound(_) => ServiceError::NotFound("Plan not found".to_string()),
                other => other.into(),
            })?;

        mark_day(&mut plan.schedule, date, completed);
        plan.progress = progress_percent(&plan.schedule);
        plan.status = status_for_progress(plan.progress);

        self.db
            .update_study_plan_progress(plan.id, &plan.schedule, plan.progress, plan.status)
            .await?;
        Ok(plan)
    }

    pub async fn list(&self, session_id: Uuid) -> ServiceResult<Vec<StudyPlan>> {
        Ok(self.db.list_study_plans(session_id).await?)
    }

    pub async fn get(&self, session_id: Uuid, plan_id: Uuid) -> ServiceResult<StudyPlan> {
        Ok(self.db.get_study_plan(session_id, plan_id).await?)
    }

    pub async fn delete(&self, session_id: Uuid, plan_id: Uuid) -> ServiceResult<()> {
        Ok(self.db.delete_study_plan(session_id, plan_id).await?)
    }
}
