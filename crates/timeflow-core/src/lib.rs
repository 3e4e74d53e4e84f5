//! timeflow-core - Gamification scoring for TimeFlow
//!
//! This crate turns user activity into experience points, levels and
//! unlocked achievements. Everything here is a pure function over owned
//! snapshots; persistence and presentation belong to the caller.
//!
//! - [`level`]: cumulative XP to level and in-level progress
//! - [`award`]: XP award table keyed by [`XpSource`]
//! - [`events`]: typed activity events validated at the boundary
//! - [`stats`]: the [`UserStats`] fold over activity events
//! - [`achievements`]: static catalog and the unlock evaluator
//! - [`gamification`]: the per-user [`UserGamification`] aggregate
//! - [`config`]: tunable [`ScoringConfig`] loaded from TOML
//!
//! # Example
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use chrono::Utc;
//! use timeflow_core::{ActivityEvent, ScoringConfig, UserGamification, UserId};
//!
//! let now = Utc::now();
//! let profile = UserGamification::new(UserId::parse("user-1")?, now);
//! let event = ActivityEvent::parse_json(
//!     r#"{"kind":"task_completed","task_id":"t-1","priority":"high","completed_at":"2026-10-19T07:30:00+02:00"}"#,
//! )?;
//!
//! let applied = profile.apply(&event, &ScoringConfig::default(), now)?;
//! assert_eq!(applied.snapshot.stats.total_tasks_completed, 1);
//! assert_eq!(applied.newly_unlocked.len(), 1);
//! # Ok(())
//! # }
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod achievements;
pub mod award;
pub mod config;
pub mod error;
pub mod events;
pub mod gamification;
pub mod level;
pub mod stats;

pub use achievements::{
    Achievement, AchievementCategory, AchievementDefinition, AchievementTier, Evaluation,
    StatMetric, CATALOG,
};
pub use award::{AwardContext, AwardTable, TaskPriority, XpReward, XpSource};
pub use config::ScoringConfig;
pub use error::{Error, Result};
pub use events::ActivityEvent;
pub use gamification::{Applied, UserGamification, UserId};
pub use level::{LevelCurve, LevelInfo};
pub use stats::UserStats;
