//! XP award table
//!
//! A closed lookup from [`XpSource`] to an XP amount and a display message.
//! The table holds no state; the same source and context always produce the
//! same reward.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{
    error::{Error, Result},
    events::MILESTONE_PERCENT,
};

/// Every reason the system hands out XP.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum XpSource {
    TaskCompletedLow,
    TaskCompletedMedium,
    TaskCompletedHigh,
    HabitStreakMilestone,
    GoalMilestone,
    GoalCompleted,
    TimeTracked,
    DailyLogin,
    AchievementUnlocked,
}

impl XpSource {
    /// Parse a source tag, rejecting anything outside the closed set.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` for unknown tags.
    pub fn parse(tag: &str) -> Result<Self> {
        Self::from_str(tag).map_err(|_| Error::invalid(format!("unknown XP source '{tag}'")))
    }

    /// Task completion source for a priority.
    #[must_use]
    pub const fn for_task(priority: TaskPriority) -> Self {
        match priority {
            TaskPriority::Low => Self::TaskCompletedLow,
            TaskPriority::Medium => Self::TaskCompletedMedium,
            TaskPriority::High => Self::TaskCompletedHigh,
        }
    }
}

/// Task priority as carried on task events.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

/// Context used to scale or label a reward.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardContext {
    /// Title of the task, goal, habit or achievement involved
    pub subject: Option<String>,
    /// Streak length in days, for `habit_streak_milestone`
    pub streak_days: Option<u32>,
    /// Percent reached, for `goal_milestone`
    pub milestone_percent: Option<u8>,
    /// Minutes logged, for `time_tracked`
    pub minutes: Option<u64>,
}

impl AwardContext {
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    #[must_use]
    pub const fn with_streak_days(mut self, days: u32) -> Self {
        self.streak_days = Some(days);
        self
    }

    #[must_use]
    pub const fn with_milestone_percent(mut self, percent: u8) -> Self {
        self.milestone_percent = Some(percent);
        self
    }

    #[must_use]
    pub const fn with_minutes(mut self, minutes: u64) -> Self {
        self.minutes = Some(minutes);
        self
    }
}

/// A single XP grant, produced once per triggering event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpReward {
    pub source: XpSource,
    /// Always greater than zero
    pub amount: u64,
    pub message: String,
}

/// XP amounts per source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AwardTable {
    pub task_low: u64,
    pub task_medium: u64,
    pub task_high: u64,
    /// Multiplied by the streak length
    pub habit_streak_per_day: u64,
    pub goal_milestone: u64,
    pub goal_completed: u64,
    /// Tracked minutes per XP point
    pub minutes_per_xp: u64,
    pub daily_login: u64,
    /// Flat bonus per newly unlocked achievement
    pub achievement_unlocked: u64,
}

impl Default for AwardTable {
    fn default() -> Self {
        Self {
            task_low: 10,
            task_medium: 25,
            task_high: 50,
            habit_streak_per_day: 5,
            goal_milestone: 50,
            goal_completed: 200,
            minutes_per_xp: 10,
            daily_login: 5,
            achievement_unlocked: 100,
        }
    }
}

impl AwardTable {
    /// Check that every amount can produce a positive reward.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` naming the first zero field.
    pub fn validate(&self) -> Result<()> {
        [
            ("task_low", self.task_low),
            ("task_medium", self.task_medium),
            ("task_high", self.task_high),
            ("habit_streak_per_day", self.habit_streak_per_day),
            ("goal_milestone", self.goal_milestone),
            ("goal_completed", self.goal_completed),
            ("minutes_per_xp", self.minutes_per_xp),
            ("daily_login", self.daily_login),
            ("achievement_unlocked", self.achievement_unlocked),
        ]
        .into_iter()
        .find(|(_, amount)| *amount == 0)
        .map_or(Ok(()), |(field, _)| {
            Err(Error::invalid(format!("award amount '{field}' must be greater than zero")))
        })
    }

    /// Look up the reward for `source`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` when a scaled source is missing its
    /// context value, when the context value is zero, or when a goal
    /// milestone percent is 100 or more.
    pub fn award_for(&self, source: XpSource, context: &AwardContext) -> Result<XpReward> {
        let subject = context.subject.as_deref();
        let (amount, message) = match source {
            XpSource::TaskCompletedLow => (self.task_low, task_message(subject)),
            XpSource::TaskCompletedMedium => (self.task_medium, task_message(subject)),
            XpSource::TaskCompletedHigh => (self.task_high, task_message(subject)),
            XpSource::HabitStreakMilestone => {
                let days = required(context.streak_days, source, "streak_days")?;
                let message = subject.map_or_else(
                    || format!("{days}-day streak!"),
                    |habit| format!("{days}-day streak on {habit}!"),
                );
                (self.habit_streak_per_day.saturating_mul(u64::from(days)), message)
            }
            XpSource::GoalMilestone => {
                let percent = required(context.milestone_percent, source, "milestone_percent")?;
                if !MILESTONE_PERCENT.contains(&percent) {
                    return Err(Error::invalid(format!(
                        "{source} milestone_percent must be within 1..=99, got {percent}"
                    )));
                }
                let message = subject.map_or_else(
                    || format!("Goal {percent}% complete"),
                    |goal| format!("{goal} is {percent}% complete"),
                );
                (self.goal_milestone, message)
            }
            XpSource::GoalCompleted => (
                self.goal_completed,
                subject.map_or_else(
                    || "Goal achieved!".to_string(),
                    |goal| format!("Goal achieved: {goal}"),
                ),
            ),
            XpSource::TimeTracked => {
                let minutes = required(context.minutes, source, "minutes")?;
                let amount = (minutes / self.minutes_per_xp.max(1)).max(1);
                (amount, format!("{minutes} minutes of focused time"))
            }
            XpSource::DailyLogin => (self.daily_login, "Welcome back!".to_string()),
            XpSource::AchievementUnlocked => (
                self.achievement_unlocked,
                subject.map_or_else(
                    || "Achievement unlocked!".to_string(),
                    |title| format!("Achievement unlocked: {title}"),
                ),
            ),
        };

        if amount == 0 {
            return Err(Error::invalid(format!("{source} produced no XP")));
        }

        Ok(XpReward {
            source,
            amount,
            message,
        })
    }

    /// Parse `tag` and look up its reward.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` for unknown tags or missing context.
    pub fn award_for_tag(&self, tag: &str, context: &AwardContext) -> Result<XpReward> {
        self.award_for(XpSource::parse(tag)?, context)
    }
}

fn task_message(subject: Option<&str>) -> String {
    subject.map_or_else(
        || "Task completed".to_string(),
        |task| format!("Completed: {task}"),
    )
}

fn required<T>(value: Option<T>, source: XpSource, field: &str) -> Result<T>
where
    T: Copy + PartialEq + Default,
{
    match value {
        Some(v) if v != T::default() => Ok(v),
        Some(_) => Err(Error::invalid(format!("{source} requires a non-zero {field}"))),
        None => Err(Error::invalid(format!("{source} requires {field}"))),
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    fn table() -> AwardTable {
        AwardTable::default()
    }

    #[test]
    fn test_nine_sources() {
        assert_eq!(XpSource::iter().count(), 9);
    }

    #[test]
    fn test_task_amounts_scale_with_priority() {
        let ctx = AwardContext::default().with_subject("Write report");
        let low = table().award_for(XpSource::for_task(TaskPriority::Low), &ctx);
        let high = table().award_for(XpSource::for_task(TaskPriority::High), &ctx);

        assert_eq!(low.as_ref().map(|r| r.amount), Ok(10));
        assert_eq!(high.as_ref().map(|r| r.amount), Ok(50));
        assert_eq!(
            high.map(|r| r.message),
            Ok("Completed: Write report".to_string())
        );
    }

    #[test]
    fn test_streak_scales_with_days() {
        let ctx = AwardContext::default().with_streak_days(7);
        let reward = table().award_for(XpSource::HabitStreakMilestone, &ctx);
        assert_eq!(reward.map(|r| r.amount), Ok(35));
    }

    #[test]
    fn test_time_tracked_rounds_down_with_floor_of_one() {
        let ninety = AwardContext::default().with_minutes(90);
        let five = AwardContext::default().with_minutes(5);
        assert_eq!(
            table().award_for(XpSource::TimeTracked, &ninety).map(|r| r.amount),
            Ok(9)
        );
        assert_eq!(
            table().award_for(XpSource::TimeTracked, &five).map(|r| r.amount),
            Ok(1)
        );
    }

    #[test]
    fn test_scaled_sources_require_context() {
        let empty = AwardContext::default();
        for source in [
            XpSource::HabitStreakMilestone,
            XpSource::GoalMilestone,
            XpSource::TimeTracked,
        ] {
            assert!(matches!(
                table().award_for(source, &empty),
                Err(Error::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_goal_milestone_percent_must_be_intermediate() {
        for percent in [100, 150, u8::MAX] {
            let ctx = AwardContext::default().with_milestone_percent(percent);
            assert!(matches!(
                table().award_for(XpSource::GoalMilestone, &ctx),
                Err(Error::InvalidArgument(_))
            ));
        }
        let ctx = AwardContext::default().with_milestone_percent(99);
        assert!(table().award_for(XpSource::GoalMilestone, &ctx).is_ok());
    }

    #[test]
    fn test_zero_minutes_rejected() {
        let ctx = AwardContext::default().with_minutes(0);
        assert!(table().award_for(XpSource::TimeTracked, &ctx).is_err());
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let result = table().award_for_tag("task_completed_urgent", &AwardContext::default());
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_tag_round_trips_through_display() {
        for source in XpSource::iter() {
            assert_eq!(XpSource::parse(&source.to_string()), Ok(source));
        }
    }

    #[test]
    fn test_every_source_pays_positive_xp() {
        let ctx = AwardContext::default()
            .with_streak_days(3)
            .with_milestone_percent(50)
            .with_minutes(30);
        for source in XpSource::iter() {
            let reward = table().award_for(source, &ctx);
            assert!(reward.is_ok_and(|r| r.amount > 0), "{source} paid nothing");
        }
    }

    #[test]
    fn test_validate_rejects_zero_amount() {
        let broken = AwardTable {
            goal_completed: 0,
            ..AwardTable::default()
        };
        assert!(broken.validate().is_err());
        assert!(table().validate().is_ok());
    }
}
