//! Activity events consumed by the scoring core.
//!
//! Events arrive from the task, habit, goal and time-tracking collaborators.
//! Each kind carries exactly the fields it needs; payloads are parsed and
//! validated here, before any counter is touched.
//!
//! Timestamps keep the user's local UTC offset so that time-of-day rules
//! (early bird, night owl) read the hour the user actually saw.

use std::ops::RangeInclusive;

use chrono::{DateTime, FixedOffset, NaiveDate, Timelike};
use serde::{Deserialize, Serialize};

use crate::{
    award::TaskPriority,
    error::{Error, Result},
};

/// Goal progress marks that count as intermediate milestones.
pub const MILESTONE_PERCENT: RangeInclusive<u8> = 1..=99;

/// Local hour before which a completion counts as early bird.
pub const EARLY_BIRD_BEFORE_HOUR: u32 = 9;

/// Local hour from which a completion counts as night owl.
pub const NIGHT_OWL_FROM_HOUR: u32 = 22;

// ============================================================================
// Activity Event Enum
// ============================================================================

/// Something the user did that may move counters or earn XP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActivityEvent {
    /// A task transitioned to completed
    TaskCompleted(TaskCompleted),

    /// A habit was checked off for the day
    HabitCompleted(HabitCompleted),

    /// A goal crossed an intermediate progress mark
    GoalMilestone(GoalMilestone),

    /// A goal reached 100% progress
    GoalCompleted(GoalCompleted),

    /// A running time entry was stopped
    TimeEntryClosed(TimeEntryClosed),

    /// End-of-day summary of due tasks
    DayClosed(DayClosed),

    /// First visit of a calendar day
    DailyLogin(DailyLogin),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCompleted {
    pub task_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub priority: TaskPriority,
    pub completed_at: DateTime<FixedOffset>,
}

impl TaskCompleted {
    /// Completed before 09:00 local time.
    #[must_use]
    pub fn is_early_bird(&self) -> bool {
        self.completed_at.hour() < EARLY_BIRD_BEFORE_HOUR
    }

    /// Completed at or after 22:00 local time.
    #[must_use]
    pub fn is_night_owl(&self) -> bool {
        self.completed_at.hour() >= NIGHT_OWL_FROM_HOUR
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitCompleted {
    pub habit_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// The habit's own streak after this completion
    pub current_streak: u32,
    /// The habit's own historical best, including this completion
    pub longest_streak: u32,
    pub completed_at: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalMilestone {
    pub goal_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Progress mark reached, strictly between 0 and 100
    pub percent: u8,
    pub reached_at: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalCompleted {
    pub goal_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub completed_at: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeEntryClosed {
    pub entry_id: String,
    pub duration_minutes: u64,
    pub closed_at: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayClosed {
    pub date: NaiveDate,
    pub tasks_due: u32,
    pub tasks_done: u32,
}

impl DayClosed {
    /// Every due task was done. A day with nothing due qualifies.
    #[must_use]
    pub const fn is_perfect(&self) -> bool {
        self.tasks_done >= self.tasks_due
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyLogin {
    pub date: NaiveDate,
}

impl ActivityEvent {
    /// Parse a single JSON event and validate it.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` if the payload is malformed, has an
    /// unknown `kind`, misses a required field, or fails [`Self::validate`].
    pub fn parse_json(input: &str) -> Result<Self> {
        let event: Self = serde_json::from_str(input)
            .map_err(|e| Error::invalid(format!("malformed activity event: {e}")))?;
        event.validate()?;
        Ok(event)
    }

    /// Parse newline-delimited JSON events. Blank lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` naming the first offending line.
    pub fn parse_json_lines(input: &str) -> Result<Vec<Self>> {
        input
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| {
                Self::parse_json(line).map_err(|e| {
                    Error::invalid(format!("line {}: {e}", index.saturating_add(1)))
                })
            })
            .collect()
    }

    /// Reject payloads that parse but cannot describe real activity.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` describing the first violated rule.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::TaskCompleted(e) => require_id("task_id", &e.task_id),
            Self::HabitCompleted(e) => {
                require_id("habit_id", &e.habit_id)?;
                if e.longest_streak < e.current_streak {
                    return Err(Error::invalid(format!(
                        "habit {}: longest_streak ({}) is below current_streak ({})",
                        e.habit_id, e.longest_streak, e.current_streak
                    )));
                }
                Ok(())
            }
            Self::GoalMilestone(e) => {
                require_id("goal_id", &e.goal_id)?;
                if !MILESTONE_PERCENT.contains(&e.percent) {
                    return Err(Error::invalid(format!(
                        "goal {}: milestone percent must be within 1..=99, got {}",
                        e.goal_id, e.percent
                    )));
                }
                Ok(())
            }
            Self::GoalCompleted(e) => require_id("goal_id", &e.goal_id),
            Self::TimeEntryClosed(e) => {
                require_id("entry_id", &e.entry_id)?;
                if e.duration_minutes == 0 {
                    return Err(Error::invalid(format!(
                        "time entry {}: duration must be positive",
                        e.entry_id
                    )));
                }
                Ok(())
            }
            Self::DayClosed(e) => {
                if e.tasks_done > e.tasks_due {
                    return Err(Error::invalid(format!(
                        "day {}: tasks_done ({}) exceeds tasks_due ({})",
                        e.date, e.tasks_done, e.tasks_due
                    )));
                }
                Ok(())
            }
            Self::DailyLogin(_) => Ok(()),
        }
    }

    /// Event kind as written in the `kind` tag.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::TaskCompleted(_) => "task_completed",
            Self::HabitCompleted(_) => "habit_completed",
            Self::GoalMilestone(_) => "goal_milestone",
            Self::GoalCompleted(_) => "goal_completed",
            Self::TimeEntryClosed(_) => "time_entry_closed",
            Self::DayClosed(_) => "day_closed",
            Self::DailyLogin(_) => "daily_login",
        }
    }

    /// Local calendar day the event belongs to.
    #[must_use]
    pub fn local_date(&self) -> NaiveDate {
        match self {
            Self::TaskCompleted(e) => e.completed_at.date_naive(),
            Self::HabitCompleted(e) => e.completed_at.date_naive(),
            Self::GoalMilestone(e) => e.reached_at.date_naive(),
            Self::GoalCompleted(e) => e.completed_at.date_naive(),
            Self::TimeEntryClosed(e) => e.closed_at.date_naive(),
            Self::DayClosed(e) => e.date,
            Self::DailyLogin(e) => e.date,
        }
    }

    /// Create a task completed event
    #[must_use]
    pub fn task_completed(
        task_id: impl Into<String>,
        priority: TaskPriority,
        completed_at: DateTime<FixedOffset>,
    ) -> Self {
        Self::TaskCompleted(TaskCompleted {
            task_id: task_id.into(),
            title: None,
            priority,
            completed_at,
        })
    }

    /// Create a habit completed event
    #[must_use]
    pub fn habit_completed(
        habit_id: impl Into<String>,
        current_streak: u32,
        longest_streak: u32,
        completed_at: DateTime<FixedOffset>,
    ) -> Self {
        Self::HabitCompleted(HabitCompleted {
            habit_id: habit_id.into(),
            title: None,
            current_streak,
            longest_streak,
            completed_at,
        })
    }

    /// Create a goal milestone event
    #[must_use]
    pub fn goal_milestone(
        goal_id: impl Into<String>,
        percent: u8,
        reached_at: DateTime<FixedOffset>,
    ) -> Self {
        Self::GoalMilestone(GoalMilestone {
            goal_id: goal_id.into(),
            title: None,
            percent,
            reached_at,
        })
    }

    /// Create a goal completed event
    #[must_use]
    pub fn goal_completed(goal_id: impl Into<String>, completed_at: DateTime<FixedOffset>) -> Self {
        Self::GoalCompleted(GoalCompleted {
            goal_id: goal_id.into(),
            title: None,
            completed_at,
        })
    }

    /// Create a time entry closed event
    #[must_use]
    pub fn time_entry_closed(
        entry_id: impl Into<String>,
        duration_minutes: u64,
        closed_at: DateTime<FixedOffset>,
    ) -> Self {
        Self::TimeEntryClosed(TimeEntryClosed {
            entry_id: entry_id.into(),
            duration_minutes,
            closed_at,
        })
    }

    /// Create a day closed event
    #[must_use]
    pub const fn day_closed(date: NaiveDate, tasks_due: u32, tasks_done: u32) -> Self {
        Self::DayClosed(DayClosed {
            date,
            tasks_due,
            tasks_done,
        })
    }

    /// Create a daily login event
    #[must_use]
    pub const fn daily_login(date: NaiveDate) -> Self {
        Self::DailyLogin(DailyLogin { date })
    }
}

impl std::fmt::Display for ActivityEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} on {}", self.kind(), self.local_date())
    }
}

fn require_id(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(Error::invalid(format!("{field} must not be empty")))
    } else {
        Ok(())
    }
}
