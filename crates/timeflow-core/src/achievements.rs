//! Achievement catalog and evaluator.
//!
//! The catalog is a static data table: each definition names the
//! [`UserStats`] field it watches and the value that unlocks it. The
//! evaluator makes a single pass over a user's achievement list, in list
//! order, and never relocks anything.
//!
//! # Invariants
//!
//! 1. Catalog ids are unique
//! 2. An unlocked achievement stays unlocked; `unlocked_at` is set once
//! 3. Unlock condition is `progress >= requirement`
//! 4. `newly_unlocked` preserves list order

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use im::Vector;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use tracing::warn;

use crate::stats::UserStats;

// ============================================================================
// CLASSIFICATION
// ============================================================================

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AchievementCategory {
    Tasks,
    Habits,
    Goals,
    Time,
    Streaks,
    Special,
}

/// Cosmetic rarity. Not consulted when unlocking.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AchievementTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

/// The [`UserStats`] quantity an achievement is bound to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StatMetric {
    TasksCompleted,
    HabitsCompleted,
    GoalsCompleted,
    MinutesTracked,
    LongestStreak,
    EarlyBirdTasks,
    NightOwlTasks,
    PerfectDays,
    ConsecutivePerfectDays,
}

impl StatMetric {
    /// Current value of this metric.
    #[must_use]
    pub fn read(self, stats: &UserStats) -> u64 {
        match self {
            Self::TasksCompleted => stats.total_tasks_completed,
            Self::HabitsCompleted => stats.total_habits_completed,
            Self::GoalsCompleted => stats.total_goals_completed,
            Self::MinutesTracked => stats.total_time_tracked,
            Self::LongestStreak => u64::from(stats.longest_streak),
            Self::EarlyBirdTasks => stats.early_bird_tasks,
            Self::NightOwlTasks => stats.night_owl_tasks,
            Self::PerfectDays => stats.perfect_days,
            Self::ConsecutivePerfectDays => u64::from(stats.consecutive_perfect_days),
        }
    }
}

// ============================================================================
// CATALOG
// ============================================================================

/// Static achievement definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AchievementDefinition {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub category: AchievementCategory,
    pub tier: AchievementTier,
    pub metric: StatMetric,
    pub requirement: u64,
}

impl AchievementDefinition {
    const fn new(
        id: &'static str,
        title: &'static str,
        description: &'static str,
        icon: &'static str,
        class: (AchievementCategory, AchievementTier),
        binding: (StatMetric, u64),
    ) -> Self {
        Self {
            id,
            title,
            description,
            icon,
            category: class.0,
            tier: class.1,
            metric: binding.0,
            requirement: binding.1,
        }
    }

    /// Fresh locked instance of this definition.
    #[must_use]
    pub fn instantiate(&self) -> Achievement {
        Achievement {
            id: self.id.to_string(),
            title: self.title.to_string(),
            description: self.description.to_string(),
            icon: self.icon.to_string(),
            category: self.category,
            tier: self.tier,
            requirement: self.requirement,
            metric: self.metric,
            unlocked: false,
            unlocked_at: None,
            progress: None,
        }
    }
}

use AchievementCategory as C;
use AchievementTier as T;
use StatMetric as M;

/// Every achievement, in display and evaluation order.
#[rustfmt::skip]
pub static CATALOG: &[AchievementDefinition] = &[
    // Tasks
    AchievementDefinition::new("first_task", "First Steps", "Complete your first task", "✅", (C::Tasks, T::Bronze), (M::TasksCompleted, 1)),
    AchievementDefinition::new("task_10", "Getting Things Done", "Complete 10 tasks", "📋", (C::Tasks, T::Bronze), (M::TasksCompleted, 10)),
    AchievementDefinition::new("task_50", "Task Master", "Complete 50 tasks", "🎯", (C::Tasks, T::Silver), (M::TasksCompleted, 50)),
    AchievementDefinition::new("task_100", "Centurion", "Complete 100 tasks", "💯", (C::Tasks, T::Gold), (M::TasksCompleted, 100)),
    AchievementDefinition::new("task_500", "Unstoppable", "Complete 500 tasks", "🚀", (C::Tasks, T::Platinum), (M::TasksCompleted, 500)),
    // Habits
    AchievementDefinition::new("first_habit", "Habit Former", "Complete a habit for the first time", "🌱", (C::Habits, T::Bronze), (M::HabitsCompleted, 1)),
    AchievementDefinition::new("habit_50", "Creature of Habit", "Complete habits 50 times", "🌿", (C::Habits, T::Silver), (M::HabitsCompleted, 50)),
    AchievementDefinition::new("habit_250", "Second Nature", "Complete habits 250 times", "🌳", (C::Habits, T::Gold), (M::HabitsCompleted, 250)),
    // Goals
    AchievementDefinition::new("first_goal", "Goal Getter", "Complete your first goal", "🏁", (C::Goals, T::Bronze), (M::GoalsCompleted, 1)),
    AchievementDefinition::new("goal_5", "Visionary", "Complete 5 goals", "🔭", (C::Goals, T::Silver), (M::GoalsCompleted, 5)),
    AchievementDefinition::new("goal_25", "Dream Achiever", "Complete 25 goals", "🏆", (C::Goals, T::Gold), (M::GoalsCompleted, 25)),
    // Time
    AchievementDefinition::new("time_1h", "Clocked In", "Track one hour of time", "⏱️", (C::Time, T::Bronze), (M::MinutesTracked, 60)),
    AchievementDefinition::new("time_10h", "Deep Worker", "Track 10 hours of time", "⏳", (C::Time, T::Silver), (M::MinutesTracked, 600)),
    AchievementDefinition::new("time_100h", "Time Lord", "Track 100 hours of time", "🕰️", (C::Time, T::Gold), (M::MinutesTracked, 6_000)),
    // Streaks
    AchievementDefinition::new("streak_7", "Week Warrior", "Reach a 7-day habit streak", "🔥", (C::Streaks, T::Bronze), (M::LongestStreak, 7)),
    AchievementDefinition::new("streak_30", "Monthly Master", "Reach a 30-day habit streak", "📅", (C::Streaks, T::Silver), (M::LongestStreak, 30)),
    AchievementDefinition::new("streak_100", "Streak Legend", "Reach a 100-day habit streak", "⚡", (C::Streaks, T::Platinum), (M::LongestStreak, 100)),
    // Special
    AchievementDefinition::new("early_bird", "Early Bird", "Complete 10 tasks before 9 AM", "🌅", (C::Special, T::Silver), (M::EarlyBirdTasks, 10)),
    AchievementDefinition::new("night_owl", "Night Owl", "Complete 10 tasks after 10 PM", "🦉", (C::Special, T::Silver), (M::NightOwlTasks, 10)),
    AchievementDefinition::new("perfect_day", "Perfect Day", "Finish every task due in a day", "⭐", (C::Special, T::Bronze), (M::PerfectDays, 1)),
    AchievementDefinition::new("perfect_week", "Flawless Week", "Have 7 perfect days in a row", "🌟", (C::Special, T::Gold), (M::ConsecutivePerfectDays, 7)),
];

/// Look up a definition by id.
#[must_use]
pub fn definition(id: &str) -> Option<&'static AchievementDefinition> {
    CATALOG.iter().find(|def| def.id == id)
}

/// Locked instances of the whole catalog, in catalog order.
#[must_use]
pub fn catalog() -> Vector<Achievement> {
    CATALOG.iter().map(AchievementDefinition::instantiate).collect()
}

// ============================================================================
// ACHIEVEMENT INSTANCE
// ============================================================================

/// Per-user achievement state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub category: AchievementCategory,
    pub tier: AchievementTier,
    pub requirement: u64,
    pub metric: StatMetric,
    pub unlocked: bool,
    #[serde(default)]
    pub unlocked_at: Option<DateTime<Utc>>,
    /// Last observed metric value. Frozen once unlocked.
    #[serde(default)]
    pub progress: Option<u64>,
}

impl Achievement {
    /// Progress towards the requirement in `[0, 100]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress_percent(&self) -> f64 {
        if self.unlocked || self.requirement == 0 {
            return 100.0;
        }
        let progress = self.progress.unwrap_or(0).min(self.requirement);
        progress as f64 / self.requirement as f64 * 100.0
    }
}

// ============================================================================
// EVALUATOR
// ============================================================================

/// Output of one evaluation pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Evaluation {
    /// Every achievement, in input order
    pub updated: Vector<Achievement>,
    /// Achievements that unlocked during this pass, in input order
    pub newly_unlocked: Vector<Achievement>,
}

/// Evaluate `achievements` against `stats`.
///
/// Locked achievements get fresh progress and unlock when it meets the
/// requirement. Unlocked achievements pass through untouched.
#[must_use]
pub fn evaluate(
    stats: &UserStats,
    achievements: &Vector<Achievement>,
    now: DateTime<Utc>,
) -> Evaluation {
    achievements
        .iter()
        .fold(Evaluation::default(), |mut acc, achievement| {
            if achievement.unlocked {
                acc.updated.push_back(achievement.clone());
                return acc;
            }

            let progress = achievement.metric.read(stats);
            let unlocked = progress >= achievement.requirement;
            let next = Achievement {
                progress: Some(progress),
                unlocked,
                unlocked_at: unlocked.then_some(now),
                ..achievement.clone()
            };

            if unlocked {
                acc.newly_unlocked.push_back(next.clone());
            }
            acc.updated.push_back(next);
            acc
        })
}

/// Align a persisted achievement list with the current catalog.
///
/// Unlock state is carried over for known ids and definition fields are
/// refreshed from the catalog. Catalog entries missing from `stored` are
/// added locked. Stored ids the catalog no longer knows are dropped.
#[must_use]
pub fn reconcile(stored: &Vector<Achievement>) -> Vector<Achievement> {
    stored
        .iter()
        .map(|a| a.id.as_str())
        .duplicates()
        .for_each(|id| warn!(achievement_id = id, "duplicate stored achievement, keeping first"));

    stored
        .iter()
        .filter(|a| definition(&a.id).is_none())
        .for_each(|a| warn!(achievement_id = %a.id, "stored achievement not in catalog, dropping"));

    let by_id: HashMap<&str, &Achievement> = stored
        .iter()
        .rev()
        .map(|a| (a.id.as_str(), a))
        .collect();

    CATALOG
        .iter()
        .map(|def| {
            let fresh = def.instantiate();
            by_id.get(def.id).map_or(fresh.clone(), |prior| Achievement {
                unlocked: prior.unlocked,
                unlocked_at: prior.unlocked_at,
                progress: prior.progress,
                ..fresh
            })
        })
        .collect()
}
