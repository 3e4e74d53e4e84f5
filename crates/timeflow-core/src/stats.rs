//! Stats accumulator
//!
//! [`UserStats`] is a fold over activity events. Each event kind touches a
//! disjoint set of counters, so replaying an ordered event list from
//! [`UserStats::default`] always reproduces the incrementally maintained
//! value.
//!
//! Day closures only count once per calendar day and only in date order: a
//! `day_closed` for a date on or before the last closed one is ignored, and a
//! gap between closed dates ends the perfect-day run.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::events::ActivityEvent;

/// Aggregate counters the achievement evaluator reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct UserStats {
    pub total_tasks_completed: u64,
    pub total_habits_completed: u64,
    pub total_goals_completed: u64,
    /// Minutes
    pub total_time_tracked: u64,
    /// Streak of the most recently completed habit
    pub current_streak: u32,
    /// Best streak seen on any habit; only ever raised
    pub longest_streak: u32,
    pub early_bird_tasks: u64,
    pub night_owl_tasks: u64,
    pub perfect_days: u64,
    pub consecutive_perfect_days: u32,
    /// Latest date a `day_closed` was counted for
    pub last_closed_on: Option<NaiveDate>,
}

impl UserStats {
    /// Create empty stats
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Next stats after `event`. Events that only earn XP, and day closures
    /// for an already closed date, return `self` unchanged.
    #[must_use]
    pub fn apply(&self, event: &ActivityEvent) -> Self {
        let mut next = *self;
        match event {
            ActivityEvent::TaskCompleted(task) => {
                next.total_tasks_completed = next.total_tasks_completed.saturating_add(1);
                if task.is_early_bird() {
                    next.early_bird_tasks = next.early_bird_tasks.saturating_add(1);
                }
                if task.is_night_owl() {
                    next.night_owl_tasks = next.night_owl_tasks.saturating_add(1);
                }
            }
            ActivityEvent::HabitCompleted(habit) => {
                next.total_habits_completed = next.total_habits_completed.saturating_add(1);
                next.current_streak = habit.current_streak;
                next.longest_streak = next
                    .longest_streak
                    .max(habit.longest_streak)
                    .max(habit.current_streak);
            }
            ActivityEvent::GoalCompleted(_) => {
                next.total_goals_completed = next.total_goals_completed.saturating_add(1);
            }
            ActivityEvent::TimeEntryClosed(entry) => {
                next.total_time_tracked =
                    next.total_time_tracked.saturating_add(entry.duration_minutes);
            }
            ActivityEvent::DayClosed(day) if self.is_closed(day.date) => {}
            ActivityEvent::DayClosed(day) => {
                if day.is_perfect() {
                    let follows = self.last_closed_on.and_then(|last| last.succ_opt())
                        == Some(day.date);
                    next.perfect_days = next.perfect_days.saturating_add(1);
                    next.consecutive_perfect_days = if follows {
                        next.consecutive_perfect_days.saturating_add(1)
                    } else {
                        1
                    };
                } else {
                    next.consecutive_perfect_days = 0;
                }
                next.last_closed_on = Some(day.date);
            }
            ActivityEvent::GoalMilestone(_) | ActivityEvent::DailyLogin(_) => {}
        }
        next
    }

    /// `date` was already closed, or lies before the last closed day.
    #[must_use]
    pub fn is_closed(&self, date: NaiveDate) -> bool {
        self.last_closed_on.is_some_and(|last| date <= last)
    }

    /// Fold `events` in order starting from `self`.
    #[must_use]
    pub fn apply_all<'a>(&self, events: impl IntoIterator<Item = &'a ActivityEvent>) -> Self {
        events
            .into_iter()
            .fold(*self, |stats, event| stats.apply(event))
    }

    /// Derive stats from scratch.
    #[must_use]
    pub fn replay<'a>(events: impl IntoIterator<Item = &'a ActivityEvent>) -> Self {
        Self::default().apply_all(events)
    }

    /// Total tracked time in whole hours.
    #[must_use]
    pub const fn hours_tracked(&self) -> u64 {
        self.total_time_tracked / 60
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, FixedOffset, NaiveDate};

    use super::*;
    use crate::award::TaskPriority;

    fn at(rfc3339: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap_or_default()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap_or_default()
    }

    #[test]
    fn test_time_entry_adds_minutes() {
        let event = ActivityEvent::time_entry_closed("e-1", 90, at("2026-10-19T10:00:00Z"));
        let stats = UserStats::new().apply(&event);
        assert_eq!(stats.total_time_tracked, 90);
        assert_eq!(stats.hours_tracked(), 1);
    }

    #[test]
    fn test_early_task_counts_as_early_bird_only() {
        let event =
            ActivityEvent::task_completed("t-1", TaskPriority::Low, at("2026-10-19T07:30:00+02:00"));
        let stats = UserStats::new().apply(&event);
        assert_eq!(stats.total_tasks_completed, 1);
        assert_eq!(stats.early_bird_tasks, 1);
        assert_eq!(stats.night_owl_tasks, 0);
    }

    #[test]
    fn test_late_task_counts_as_night_owl() {
        let event =
            ActivityEvent::task_completed("t-1", TaskPriority::Low, at("2026-10-19T22:00:00+02:00"));
        let stats = UserStats::new().apply(&event);
        assert_eq!(stats.night_owl_tasks, 1);
        assert_eq!(stats.early_bird_tasks, 0);
    }

    #[test]
    fn test_longest_streak_is_high_water_mark() {
        let t = at("2026-10-19T12:00:00Z");
        let stats = UserStats::replay(&[
            ActivityEvent::habit_completed("run", 12, 12, t),
            ActivityEvent::habit_completed("read", 3, 5, t),
        ]);
        assert_eq!(stats.total_habits_completed, 2);
        assert_eq!(stats.current_streak, 3);
        assert_eq!(stats.longest_streak, 12);
    }

    #[test]
    fn test_perfect_day_run_resets_on_imperfect_day() {
        let stats = UserStats::replay(&[
            ActivityEvent::day_closed(day(1), 3, 3),
            ActivityEvent::day_closed(day(2), 1, 1),
            ActivityEvent::day_closed(day(3), 4, 2),
            ActivityEvent::day_closed(day(4), 2, 2),
        ]);
        assert_eq!(stats.perfect_days, 3);
        assert_eq!(stats.consecutive_perfect_days, 1);
    }

    #[test]
    fn test_day_without_due_tasks_is_perfect() {
        let stats = UserStats::replay(&[
            ActivityEvent::day_closed(day(1), 2, 2),
            ActivityEvent::day_closed(day(2), 0, 0),
            ActivityEvent::day_closed(day(3), 1, 1),
        ]);
        assert_eq!(stats.perfect_days, 3);
        assert_eq!(stats.consecutive_perfect_days, 3);
    }

    #[test]
    fn test_repeated_day_close_counts_once() {
        let close = ActivityEvent::day_closed(day(19), 1, 1);
        let stats = UserStats::replay(std::iter::repeat(&close).take(7));
        assert_eq!(stats.perfect_days, 1);
        assert_eq!(stats.consecutive_perfect_days, 1);
        assert_eq!(stats.last_closed_on, Some(day(19)));
    }

    #[test]
    fn test_earlier_day_close_is_ignored() {
        let stats = UserStats::replay(&[
            ActivityEvent::day_closed(day(5), 1, 1),
            ActivityEvent::day_closed(day(4), 2, 0),
        ]);
        assert_eq!(stats.perfect_days, 1);
        assert_eq!(stats.consecutive_perfect_days, 1);
        assert_eq!(stats.last_closed_on, Some(day(5)));
    }

    #[test]
    fn test_gap_between_closed_days_restarts_run() {
        let stats = UserStats::replay(&[
            ActivityEvent::day_closed(day(1), 1, 1),
            ActivityEvent::day_closed(day(2), 1, 1),
            ActivityEvent::day_closed(day(30), 1, 1),
        ]);
        assert_eq!(stats.perfect_days, 3);
        assert_eq!(stats.consecutive_perfect_days, 1);
    }

    #[test]
    fn test_run_crosses_month_boundary() {
        let stats = UserStats::replay(&[
            ActivityEvent::day_closed(day(31), 1, 1),
            ActivityEvent::day_closed(
                NaiveDate::from_ymd_opt(2026, 11, 1).unwrap_or_default(),
                1,
                1,
            ),
        ]);
        assert_eq!(stats.consecutive_perfect_days, 2);
    }

    #[test]
    fn test_xp_only_events_leave_stats_untouched() {
        let stats = UserStats::replay(&[
            ActivityEvent::daily_login(day(1)),
            ActivityEvent::goal_milestone("g", 50, at("2026-10-01T12:00:00Z")),
        ]);
        assert_eq!(stats, UserStats::default());
    }

    #[test]
    fn test_counters_saturate() {
        let full = UserStats {
            total_time_tracked: u64::MAX,
            ..UserStats::default()
        };
        let event = ActivityEvent::time_entry_closed("e", 5, at("2026-10-19T10:00:00Z"));
        assert_eq!(full.apply(&event).total_time_tracked, u64::MAX);
    }
}
