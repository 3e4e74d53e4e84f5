//! `UserGamification` aggregate root.
//!
//! One per user. Holds cumulative XP, the cached level, the achievement
//! list and the activity stats. State changes go through [`UserGamification::apply`],
//! which returns a new snapshot and leaves the receiver untouched.
//!
//! # Invariants
//!
//! 1. XP never decreases
//! 2. `level` always equals the curve's level for `xp`
//! 3. Achievements follow catalog order and never relock
//! 4. `updated_at >= created_at`
//! 5. `revision` increases by one per applied event

use chrono::{DateTime, NaiveDate, Utc};
use im::Vector;
use serde::{Deserialize, Serialize};
use tap::Pipe;
use tracing::{debug, info};

use crate::{
    achievements::{self, Achievement},
    award::{AwardContext, XpReward, XpSource},
    config::ScoringConfig,
    error::{Error, Result},
    events::ActivityEvent,
    level::{LevelCurve, LevelInfo},
    stats::UserStats,
};

// ============================================================================
// IDENTIFIER
// ============================================================================

/// Owning user's id. Issued by the auth provider; never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and wrap a user id.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` for blank ids.
    pub fn parse(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(Error::invalid("user id must not be empty"));
        }
        Ok(Self(id))
    }

    /// Get the ID as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// AGGREGATE ROOT
// ============================================================================

/// Per-user gamification state, persisted verbatim by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGamification {
    pub user_id: UserId,
    pub xp: u64,
    /// Cached; recomputed from `xp`
    pub level: u32,
    pub achievements: Vector<Achievement>,
    pub stats: UserStats,
    /// Bumped on every applied event
    #[serde(default)]
    pub revision: u64,
    /// Last calendar day that paid a login reward
    #[serde(default)]
    pub last_login_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of applying one or more events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub snapshot: UserGamification,
    /// Rewards in the order they were earned, unlock bonuses last per event
    pub rewards: Vector<XpReward>,
    pub newly_unlocked: Vector<Achievement>,
    pub leveled_up: bool,
}

impl Applied {
    /// Total XP earned across `rewards`.
    #[must_use]
    pub fn xp_gained(&self) -> u64 {
        self.rewards
            .iter()
            .fold(0_u64, |sum, reward| sum.saturating_add(reward.amount))
    }
}

impl UserGamification {
    /// Fresh profile: no XP, level 1, every achievement locked.
    #[must_use]
    pub fn new(user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            xp: 0,
            level: 1,
            achievements: achievements::catalog(),
            stats: UserStats::default(),
            revision: 0,
            last_login_on: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Normalize a snapshot read from storage.
    ///
    /// The cached level is recomputed from XP with `curve` and the
    /// achievement list is aligned with the current catalog.
    ///
    /// # Errors
    ///
    /// Returns `Error::NonMonotonicTimestamps` if `updated_at < created_at`.
    pub fn reconstruct(snapshot: Self, curve: &LevelCurve) -> Result<Self> {
        if snapshot.updated_at < snapshot.created_at {
            return Err(Error::NonMonotonicTimestamps {
                created_at: snapshot.created_at,
                updated_at: snapshot.updated_at,
            });
        }

        let level = curve.level_for_xp(snapshot.xp);
        if level != snapshot.level {
            debug!(
                user_id = %snapshot.user_id,
                stored = snapshot.level,
                computed = level,
                "recomputed cached level"
            );
        }

        Ok(Self {
            level,
            achievements: achievements::reconcile(&snapshot.achievements),
            ..snapshot
        })
    }

    /// Parse a JSON snapshot and normalize it.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` for malformed JSON (including
    /// negative XP) and any error from [`Self::reconstruct`].
    pub fn from_json(input: &str, curve: &LevelCurve) -> Result<Self> {
        serde_json::from_str::<Self>(input)
            .map_err(|e| Error::invalid(format!("malformed gamification snapshot: {e}")))?
            .pipe(|snapshot| Self::reconstruct(snapshot, curve))
    }

    /// Level breakdown on `curve`.
    #[must_use]
    pub fn level_info(&self, curve: &LevelCurve) -> LevelInfo {
        curve.level_info(self.xp)
    }

    /// Find an achievement by id.
    ///
    /// # Errors
    ///
    /// Returns `Error::AchievementNotFound` for ids outside the catalog.
    pub fn achievement(&self, id: &str) -> Result<&Achievement> {
        self.achievements
            .iter()
            .find(|a| a.id == id)
            .ok_or_else(|| Error::AchievementNotFound(id.to_string()))
    }

    /// Number of unlocked achievements.
    #[must_use]
    pub fn unlocked_count(&self) -> usize {
        self.achievements.iter().filter(|a| a.unlocked).count()
    }

    /// Guard a read-modify-write against concurrent writers.
    ///
    /// # Errors
    ///
    /// Returns `Error::StaleSnapshot` when `expected` differs from the
    /// snapshot's revision.
    pub const fn check_revision(&self, expected: u64) -> Result<()> {
        if self.revision == expected {
            Ok(())
        } else {
            Err(Error::StaleSnapshot {
                expected,
                actual: self.revision,
            })
        }
    }

    /// XP rewards earned directly by `event`, before achievement bonuses.
    ///
    /// # Errors
    ///
    /// Propagates `Error::InvalidArgument` from the award table.
    pub fn event_rewards(
        &self,
        event: &ActivityEvent,
        config: &ScoringConfig,
    ) -> Result<Vec<XpReward>> {
        let awards = &config.awards;
        let reward = match event {
            ActivityEvent::TaskCompleted(task) => {
                let context = AwardContext {
                    subject: task.title.clone(),
                    ..AwardContext::default()
                };
                Some(awards.award_for(XpSource::for_task(task.priority), &context)?)
            }
            ActivityEvent::HabitCompleted(habit)
                if config.is_streak_milestone(habit.current_streak) =>
            {
                let context = AwardContext {
                    subject: habit.title.clone(),
                    ..AwardContext::default()
                }
                .with_streak_days(habit.current_streak);
                Some(awards.award_for(XpSource::HabitStreakMilestone, &context)?)
            }
            ActivityEvent::GoalMilestone(goal) => {
                let context = AwardContext {
                    subject: goal.title.clone(),
                    ..AwardContext::default()
                }
                .with_milestone_percent(goal.percent);
                Some(awards.award_for(XpSource::GoalMilestone, &context)?)
            }
            ActivityEvent::GoalCompleted(goal) => {
                let context = AwardContext {
                    subject: goal.title.clone(),
                    ..AwardContext::default()
                };
                Some(awards.award_for(XpSource::GoalCompleted, &context)?)
            }
            ActivityEvent::TimeEntryClosed(entry) => {
                let context = AwardContext::default().with_minutes(entry.duration_minutes);
                Some(awards.award_for(XpSource::TimeTracked, &context)?)
            }
            ActivityEvent::DailyLogin(login) if self.is_new_login_day(login.date) => {
                Some(awards.award_for(XpSource::DailyLogin, &AwardContext::default())?)
            }
            ActivityEvent::HabitCompleted(_)
            | ActivityEvent::DailyLogin(_)
            | ActivityEvent::DayClosed(_) => None,
        };
        Ok(reward.into_iter().collect())
    }

    fn is_new_login_day(&self, date: NaiveDate) -> bool {
        self.last_login_on.map_or(true, |last| date > last)
    }

    /// Apply one activity event.
    ///
    /// Steps, in order: validate the event, fold it into the stats, award
    /// the event's own XP, evaluate achievements, award one unlock bonus per
    /// newly unlocked achievement, then recompute the level.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` for events failing validation.
    pub fn apply(
        &self,
        event: &ActivityEvent,
        config: &ScoringConfig,
        now: DateTime<Utc>,
    ) -> Result<Applied> {
        event.validate()?;

        let stats = self.stats.apply(event);
        let mut rewards: Vector<XpReward> = self.event_rewards(event, config)?.into_iter().collect();

        let evaluation = achievements::evaluate(&stats, &self.achievements, now);
        for achievement in &evaluation.newly_unlocked {
            let context = AwardContext::default().with_subject(achievement.title.clone());
            rewards.push_back(
                config
                    .awards
                    .award_for(XpSource::AchievementUnlocked, &context)?,
            );
            info!(
                user_id = %self.user_id,
                achievement_id = %achievement.id,
                "achievement unlocked"
            );
        }

        let gained = rewards
            .iter()
            .fold(0_u64, |sum, reward| sum.saturating_add(reward.amount));
        let xp = self.xp.saturating_add(gained);
        let level = config.level.level_for_xp(xp);
        let leveled_up = level > self.level;
        if leveled_up {
            info!(user_id = %self.user_id, from = self.level, to = level, "level up");
        }

        let last_login_on = match event {
            ActivityEvent::DailyLogin(login) if self.is_new_login_day(login.date) => {
                Some(login.date)
            }
            _ => self.last_login_on,
        };

        debug!(
            user_id = %self.user_id,
            event = %event,
            xp_gained = gained,
            revision = self.revision.saturating_add(1),
            "applied activity event"
        );

        let snapshot = Self {
            xp,
            level,
            achievements: evaluation.updated,
            stats,
            revision: self.revision.saturating_add(1),
            last_login_on,
            updated_at: now.max(self.updated_at),
            ..self.clone()
        };

        Ok(Applied {
            snapshot,
            rewards,
            newly_unlocked: evaluation.newly_unlocked,
            leveled_up,
        })
    }

    /// Apply `events` in order, collecting every reward and unlock.
    ///
    /// # Errors
    ///
    /// Stops at the first invalid event; nothing is applied in that case.
    pub fn apply_all<'a>(
        &self,
        events: impl IntoIterator<Item = &'a ActivityEvent>,
        config: &ScoringConfig,
        now: DateTime<Utc>,
    ) -> Result<Applied> {
        let start = Applied {
            snapshot: self.clone(),
            rewards: Vector::new(),
            newly_unlocked: Vector::new(),
            leveled_up: false,
        };

        events.into_iter().try_fold(start, |acc, event| {
            let step = acc.snapshot.apply(event, config, now)?;
            Ok(Applied {
                snapshot: step.snapshot,
                rewards: acc.rewards + step.rewards,
                newly_unlocked: acc.newly_unlocked + step.newly_unlocked,
                leveled_up: acc.leveled_up || step.leveled_up,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, FixedOffset};

    use super::*;
    use crate::award::TaskPriority;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_790_000_000, 0).unwrap_or_default()
    }

    fn at(rfc3339: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap_or_default()
    }

    fn profile() -> UserGamification {
        UserGamification::new(UserId("user-1".to_string()), now())
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap_or_default()
    }

    #[test]
    fn test_blank_user_id_rejected() {
        assert!(UserId::parse("  ").is_err());
    }

    #[test]
    fn test_new_profile_starts_locked_at_level_one() {
        let p = profile();
        assert_eq!(p.xp, 0);
        assert_eq!(p.level, 1);
        assert_eq!(p.achievements.len(), achievements::CATALOG.len());
        assert_eq!(p.unlocked_count(), 0);
    }

    #[test]
    fn test_first_task_awards_task_and_unlock_bonus() -> Result<()> {
        let event =
            ActivityEvent::task_completed("t-1", TaskPriority::High, at("2026-10-19T14:00:00Z"));
        let applied = profile().apply(&event, &ScoringConfig::default(), now())?;

        let sources: Vec<XpSource> = applied.rewards.iter().map(|r| r.source).collect();
        assert_eq!(
            sources,
            vec![XpSource::TaskCompletedHigh, XpSource::AchievementUnlocked]
        );
        assert_eq!(applied.xp_gained(), 150);
        assert_eq!(applied.snapshot.xp, 150);
        assert_eq!(applied.snapshot.level, 2);
        assert!(applied.leveled_up);
        assert_eq!(applied.snapshot.revision, 1);
        assert!(applied.snapshot.achievement("first_task")?.unlocked);
        Ok(())
    }

    #[test]
    fn test_apply_does_not_mutate_receiver() -> Result<()> {
        let before = profile();
        let event = ActivityEvent::goal_completed("g-1", at("2026-10-19T14:00:00Z"));
        let _ = before.apply(&event, &ScoringConfig::default(), now())?;
        assert_eq!(before, profile());
        Ok(())
    }

    #[test]
    fn test_habit_pays_only_on_streak_milestone() -> Result<()> {
        let config = ScoringConfig::default();
        let t = at("2026-10-19T08:00:00Z");
        let plain = ActivityEvent::habit_completed("h", 2, 2, t);
        let milestone = ActivityEvent::habit_completed("h", 7, 7, t);

        assert!(profile().event_rewards(&plain, &config)?.is_empty());
        let rewards = profile().event_rewards(&milestone, &config)?;
        assert_eq!(rewards.first().map(|r| r.amount), Some(35));
        Ok(())
    }

    #[test]
    fn test_daily_login_pays_once_per_day() -> Result<()> {
        let config = ScoringConfig::default();
        let applied = profile().apply_all(
            &[
                ActivityEvent::daily_login(day(19)),
                ActivityEvent::daily_login(day(19)),
                ActivityEvent::daily_login(day(18)),
                ActivityEvent::daily_login(day(20)),
            ],
            &config,
            now(),
        )?;
        assert_eq!(applied.rewards.len(), 2);
        assert_eq!(applied.snapshot.last_login_on, Some(day(20)));
        assert_eq!(applied.snapshot.xp, 10);
        Ok(())
    }

    #[test]
    fn test_invalid_event_rejected_before_scoring() {
        let event = ActivityEvent::time_entry_closed("e-1", 0, at("2026-10-19T14:00:00Z"));
        let result = profile().apply(&event, &ScoringConfig::default(), now());
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_unknown_achievement_is_not_found() {
        let result = profile().achievement("retired_badge").map(|a| a.id.clone());
        assert_eq!(
            result,
            Err(Error::AchievementNotFound("retired_badge".to_string()))
        );
    }

    #[test]
    fn test_check_revision() {
        let p = profile();
        assert!(p.check_revision(0).is_ok());
        assert_eq!(
            p.check_revision(3),
            Err(Error::StaleSnapshot {
                expected: 3,
                actual: 0
            })
        );
    }

    #[test]
    fn test_reconstruct_recomputes_level() -> Result<()> {
        let stale = UserGamification {
            xp: 450,
            level: 7,
            ..profile()
        };
        let fixed = UserGamification::reconstruct(stale, &LevelCurve::default())?;
        assert_eq!(fixed.level, 3);
        Ok(())
    }

    #[test]
    fn test_reconstruct_rejects_backwards_timestamps() {
        let broken = UserGamification {
            updated_at: now() - chrono::Duration::seconds(1),
            ..profile()
        };
        assert!(matches!(
            UserGamification::reconstruct(broken, &LevelCurve::default()),
            Err(Error::NonMonotonicTimestamps { .. })
        ));
    }

    #[test]
    fn test_json_snapshot_round_trip() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let event = ActivityEvent::goal_completed("g-1", at("2026-10-19T14:00:00Z"));
        let snapshot = profile()
            .apply(&event, &ScoringConfig::default(), now())?
            .snapshot;
        let json = serde_json::to_string(&snapshot)?;
        let restored = UserGamification::from_json(&json, &LevelCurve::default())?;
        assert_eq!(restored, snapshot);
        Ok(())
    }

    #[test]
    fn test_negative_xp_in_snapshot_rejected() -> std::result::Result<(), Box<dyn std::error::Error>>
    {
        let mut value = serde_json::to_value(profile())?;
        value["xp"] = serde_json::json!(-5);
        let result = UserGamification::from_json(&value.to_string(), &LevelCurve::default());
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
        Ok(())
    }
}
