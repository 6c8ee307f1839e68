//! Chore schedule and member history use-cases.
//!
//! # Responsibility
//! - List tasks due on one calendar day in a caller-chosen time zone.
//! - Build a member's task history with a completion summary.
//!
//! # Invariants
//! - A calendar day is the half-open range `[local 00:00, next local 00:00)`.
//! - History counts are derived from the returned task list, never stored.

use crate::model::member::MemberId;
use crate::model::task::Task;
use crate::repo::task_repo::TaskRepository;
use crate::repo::RepoError;
use chrono::{DateTime, NaiveDate, TimeZone};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for chore use-cases.
#[derive(Debug)]
pub enum ChoreServiceError {
    /// The day has no representable local midnight in the given zone.
    InvalidDay(NaiveDate),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for ChoreServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDay(day) => write!(f, "cannot resolve day bounds for {day}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ChoreServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::InvalidDay(_) => None,
        }
    }
}

impl From<RepoError> for ChoreServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// All tasks assigned to one member plus completion counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberHistory {
    pub member_id: MemberId,
    /// Sorted by due date.
    pub tasks: Vec<Task>,
    pub completed: usize,
    pub total: usize,
}

impl MemberHistory {
    fn from_tasks(member_id: MemberId, tasks: Vec<Task>) -> Self {
        let completed = tasks.iter().filter(|task| task.is_checked).count();
        let total = tasks.len();
        Self {
            member_id,
            tasks,
            completed,
            total,
        }
    }

    /// `completed / total` label shown on the history screen.
    pub fn completion_label(&self) -> String {
        format!("{} / {}", self.completed, self.total)
    }
}

/// Read-side facade over a task repository.
pub struct ChoreService<R: TaskRepository> {
    repo: R,
}

impl<R: TaskRepository> ChoreService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists tasks due on `day` as seen in time zone `tz`.
    pub fn tasks_due_on<Tz: TimeZone>(
        &self,
        day: NaiveDate,
        tz: &Tz,
    ) -> Result<Vec<Task>, ChoreServiceError> {
        let (start_ms, end_ms) =
            day_bounds_ms(day, tz).ok_or(ChoreServiceError::InvalidDay(day))?;
        Ok(self.repo.list_tasks_due_between(start_ms, end_ms)?)
    }

    /// Builds the task history for one member.
    pub fn member_history(&self, member_id: MemberId) -> Result<MemberHistory, ChoreServiceError> {
        let tasks = self.repo.list_tasks_for_member(member_id)?;
        Ok(MemberHistory::from_tasks(member_id, tasks))
    }
}

/// Returns `[start, end)` epoch milliseconds of `day` in `tz`.
pub fn day_bounds_ms<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> Option<(i64, i64)> {
    let start = local_midnight(day, tz)?;
    let end = local_midnight(day.succ_opt()?, tz)?;
    Some((start.timestamp_millis(), end.timestamp_millis()))
}

fn local_midnight<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&day.and_hms_opt(0, 0, 0)?).earliest()
}

#[cfg(test)]
mod tests {
    use super::day_bounds_ms;
    use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};

    #[test]
    fn utc_day_spans_exactly_one_day() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let (start, end) = day_bounds_ms(day, &Utc).unwrap();
        assert_eq!(end - start, 24 * 60 * 60 * 1000);
        let day_at = |ms: i64| Utc.timestamp_millis_opt(ms).unwrap().date_naive();
        assert_eq!(day_at(start), day);
        assert_eq!(day_at(end - 1), day);
        assert_ne!(day_at(end), day);
    }

    #[test]
    fn offset_shifts_day_start() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let (utc_start, _) = day_bounds_ms(day, &Utc).unwrap();
        let (local_start, _) = day_bounds_ms(day, &plus_two).unwrap();
        assert_eq!(utc_start - local_start, 2 * 3600 * 1000);
    }
}
