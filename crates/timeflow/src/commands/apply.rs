//! Apply command implementation

use std::{fmt::Write as _, path::PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use timeflow_core::{AchievementTier, LevelInfo, ScoringConfig, XpReward};
use tracing::info;

use super::Report;
use crate::{store, Result};

/// Apply command options
#[derive(Debug, Clone)]
pub struct ApplyOptions {
    pub snapshot: PathBuf,
    pub events: PathBuf,
    pub write: bool,
    pub expect_revision: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct UnlockedSummary {
    pub id: String,
    pub title: String,
    pub icon: String,
    pub tier: AchievementTier,
}

#[derive(Debug, Serialize)]
pub struct ApplyReport {
    pub user_id: String,
    pub events_applied: usize,
    pub revision_before: u64,
    pub revision: u64,
    pub xp_gained: u64,
    pub xp: u64,
    pub level: LevelInfo,
    pub title: &'static str,
    pub leveled_up: bool,
    pub rewards: Vec<XpReward>,
    pub unlocked: Vec<UnlockedSummary>,
    pub written: bool,
}

impl Report for ApplyReport {
    fn to_text(&self) -> String {
        let mut out = format!(
            "{}: applied {} events (revision {} -> {})\n",
            self.user_id, self.events_applied, self.revision_before, self.revision
        );
        for reward in &self.rewards {
            let _ = writeln!(out, "  +{:<4} {}", reward.amount, reward.message);
        }
        if !self.unlocked.is_empty() {
            out.push_str("Unlocked:\n");
            for achievement in &self.unlocked {
                let _ = writeln!(
                    out,
                    "  {} {} ({})",
                    achievement.icon, achievement.title, achievement.tier
                );
            }
        }
        let _ = writeln!(
            out,
            "Level {} ({}) - {} XP, {:.0}% to level {}{}",
            self.level.current_level,
            self.title,
            self.xp,
            self.level.progress_percent,
            self.level.current_level.saturating_add(1),
            if self.leveled_up { " [level up]" } else { "" }
        );
        out.push_str(if self.written {
            "Snapshot written"
        } else {
            "Dry run; pass --write to save"
        });
        out
    }
}

/// Run the apply command
///
/// # Errors
///
/// Returns an error if:
/// - The snapshot or event file cannot be read or parsed
/// - `expect_revision` does not match the stored revision
/// - Any event is invalid (nothing is written in that case)
/// - The updated snapshot cannot be written
pub fn run(
    options: &ApplyOptions,
    config: &ScoringConfig,
    now: DateTime<Utc>,
) -> Result<ApplyReport> {
    let current = store::read_snapshot(&options.snapshot, &config.level)?;
    if let Some(expected) = options.expect_revision {
        current.check_revision(expected)?;
    }

    let events = store::read_events(&options.events)?;
    let applied = current.apply_all(&events, config, now)?;

    if options.write {
        store::write_snapshot(&options.snapshot, &applied.snapshot)?;
        info!(
            path = %options.snapshot.display(),
            revision = applied.snapshot.revision,
            "saved snapshot"
        );
    }

    let level = applied.snapshot.level_info(&config.level);
    Ok(ApplyReport {
        user_id: applied.snapshot.user_id.to_string(),
        events_applied: events.len(),
        revision_before: current.revision,
        revision: applied.snapshot.revision,
        xp_gained: applied.xp_gained(),
        xp: applied.snapshot.xp,
        level,
        title: level.title(),
        leveled_up: applied.leveled_up,
        rewards: applied.rewards.iter().cloned().collect(),
        unlocked: applied
            .newly_unlocked
            .iter()
            .map(|a| UnlockedSummary {
                id: a.id.clone(),
                title: a.title.clone(),
                icon: a.icon.clone(),
                tier: a.tier,
            })
            .collect(),
        written: options.write,
    })
}
