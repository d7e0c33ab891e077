//! crates/examease_core/src/focus.rs
//!
//! Timed focus and break intervals, and the minute totals built from them.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::domain::{FocusOutcome, FocusSession, FocusStats};
use crate::error::{ServiceError, ServiceResult};
use crate::ports::{DatabaseService, PortError};
use crate::validation::{EndFocusSessionInput, StartFocusSessionInput};

/// Intervals returned by a listing when the caller names no limit.
pub const DEFAULT_FOCUS_LIST_LIMIT: u32 = 10;
/// Upper bound on a caller-chosen listing limit.
pub const MAX_FOCUS_LIST_LIMIT: u32 = 100;
/// The "week" total looks back this many days from the start of today.
pub const FOCUS_WEEK_DAYS: i64 = 7;

/// Whole seconds between start and end, never negative.
pub fn elapsed_seconds(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (end - start).num_seconds().max(0)
}

/// Totals over completed intervals. "Today" starts at UTC midnight of `now`.
pub fn focus_stats(sessions: &[FocusSession], now: DateTime<Utc>) -> FocusStats {
    let today = now.date_naive().and_time(NaiveTime::MIN).and_utc();
    let week_start = today - Duration::days(FOCUS_WEEK_DAYS);

    let completed: Vec<&FocusSession> = sessions.iter().filter(|s| s.completed).collect();
    let seconds_since = |from: DateTime<Utc>| -> i64 {
        completed
            .iter()
            .filter(|s| s.start_time >= from)
            .map(|s| s.duration_seconds)
            .sum()
    };
    let total_seconds: i64 = completed.iter().map(|s| s.duration_seconds).sum();

    FocusStats {
        total_sessions: completed.len() as u64,
        today_minutes: seconds_since(today) / 60,
        week_minutes: seconds_since(week_start) / 60,
        total_minutes: total_seconds / 60,
    }
}

#[derive(Clone)]
pub struct FocusService {
    db: Arc<dyn DatabaseService>,
}

fn focus_not_found(e: PortError) -> ServiceError {
    match e {
        PortError::NotFound(_) => ServiceError::NotFound("Session not found".to_string()),
        other => other.into(),
    }
}

impl FocusService {
    pub fn new(db: Arc<dyn DatabaseService>) -> Self {
        Self { db }
    }

    /// Opens an interval starting at `now`.
    pub async fn start(
        &self,
        session_id: Uuid,
        input: StartFocusSessionInput,
        now: DateTime<Utc>,
    ) -> ServiceResult<FocusSession> {
        let request = input.validate()?;
        let focus = FocusSession {
            id: Uuid::new_v4(),
            session_id,
            kind: request.kind,
            target_seconds: request.target_seconds,
            duration_seconds: 0,
            start_time: now,
            end_time: None,
            completed: false,
            task_name: request.task_name,
            notes: None,
        };
        self.db.save_focus_session(&focus).await?;
        info!(focus_id = %focus.id, kind = %focus.kind, "Focus session started");
        Ok(focus)
    }

    /// Closes an interval at `now`, measuring its duration from the start
    /// time. Ending it again re-measures from the same start.
    pub async fn end(
        &self,
        session_id: Uuid,
        focus_id: Uuid,
        input: EndFocusSessionInput,
        now: DateTime<Utc>,
    ) -> ServiceResult<FocusSession> {
        let focus = self
            .db
            .get_focus_session(session_id, focus_id)
            .await
            .map_err(focus_not_found)?;

        let outcome = FocusOutcome {
            end_time: now,
            duration_seconds: elapsed_seconds(focus.start_time, now),
            completed: input.completed,
            notes: input.notes,
        };
        let ended = self
            .db
            .end_focus_session(session_id, focus_id, &outcome)
            .await
            .map_err(focus_not_found)?;
        info!(focus_id = %ended.id, seconds = ended.duration_seconds, "Focus session ended");
        Ok(ended)
    }

    /// The most recent intervals, newest first.
    pub async fn list(&self, session_id: Uuid, limit: Option<u32>) -> ServiceResult<Vec<FocusSession>> {
        let limit = limit
            .unwrap_or(DEFAULT_FOCUS_LIST_LIMIT)
            .clamp(1, MAX_FOCUS_LIST_LIMIT);
        Ok(self.db.list_focus_sessions(session_id, Some(limit)).await?)
    }

    pub async fn stats(&self, session_id: Uuid, now: DateTime<Utc>) -> ServiceResult<FocusStats> {
        let sessions = self.db.list_focus_sessions(session_id, None).await?;
        Ok(focus_stats(&sessions, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FocusKind;
    use chrono::TimeZone;

    fn interval(start: DateTime<Utc>, seconds: i64, completed: bool) -> FocusSession {
        FocusSession {
            id: Uuid::new_v4(),
            session_id: Uuid::nil(),
            kind: FocusKind::Focus,
            target_seconds: 1500,
            duration_seconds: seconds,
            start_time: start,
            end_time: Some(start + Duration::seconds(seconds)),
            completed,
            task_name: None,
            notes: None,
        }
    }

    #[test]
    fn elapsed_time_floors_to_whole_seconds() {
        let start = Utc.with_ymd_and_hms(2026, 5, 4, 9, 0, 0).unwrap();
        let end = start + Duration::milliseconds(90_900);
        assert_eq!(elapsed_seconds(start, end), 90);
        assert_eq!(elapsed_seconds(end, start), 0);
    }

    #[test]
    fn stats_count_only_completed_intervals() {
        let now = Utc.with_ymd_and_hms(2026, 5, 10, 15, 0, 0).unwrap();
        let sessions = vec![
            interval(Utc.with_ymd_and_hms(2026, 5, 10, 8, 0, 0).unwrap(), 25 * 60, true),
            interval(Utc.with_ymd_and_hms(2026, 5, 10, 9, 0, 0).unwrap(), 50 * 60, false),
            interval(Utc.with_ymd_and_hms(2026, 5, 6, 9, 0, 0).unwrap(), 30 * 60 + 59, true),
            interval(Utc.with_ymd_and_hms(2026, 4, 1, 9, 0, 0).unwrap(), 60 * 60, true),
        ];

        let stats = focus_stats(&sessions, now);
        assert_eq!(
            stats,
            FocusStats {
                total_sessions: 3,
                today_minutes: 25,
                week_minutes: 55,
                total_minutes: 115,
            }
        );
    }

    #[test]
    fn no_intervals_means_zero_everywhere() {
        assert_eq!(focus_stats(&[], Utc::now()), FocusStats::default());
    }
}
