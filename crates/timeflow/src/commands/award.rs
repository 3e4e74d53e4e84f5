//! Award command implementation

use serde::Serialize;
use timeflow_core::{AwardContext, AwardTable, XpReward};

use super::Report;
use crate::Result;

/// Award command options
#[derive(Debug, Clone, Default)]
pub struct AwardOptions {
    pub source: String,
    pub minutes: Option<u64>,
    pub streak: Option<u32>,
    pub percent: Option<u8>,
    pub title: Option<String>,
}

impl AwardOptions {
    fn context(&self) -> AwardContext {
        let context = self
            .title
            .clone()
            .map_or_else(AwardContext::default, |t| AwardContext::default().with_subject(t));
        let context = match self.minutes {
            Some(m) => context.with_minutes(m),
            None => context,
        };
        let context = match self.streak {
            Some(d) => context.with_streak_days(d),
            None => context,
        };
        match self.percent {
            Some(p) => context.with_milestone_percent(p),
            None => context,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AwardReport {
    #[serde(flatten)]
    pub reward: XpReward,
}

impl Report for AwardReport {
    fn to_text(&self) -> String {
        format!("+{} XP  {}", self.reward.amount, self.reward.message)
    }
}

/// Run the award command
///
/// # Errors
///
/// Returns an error if the source tag is unknown or a scaled source is
/// missing its streak, percent or minutes value.
pub fn run(options: &AwardOptions, table: &AwardTable) -> Result<AwardReport> {
    let reward = table.award_for_tag(&options.source, &options.context())?;
    Ok(AwardReport { reward })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_award_uses_minutes() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let options = AwardOptions {
            source: "time_tracked".to_string(),
            minutes: Some(90),
            ..AwardOptions::default()
        };
        let report = run(&options, &AwardTable::default())?;
        assert_eq!(report.reward.amount, 9);
        Ok(())
    }

    #[test]
    fn test_unknown_source_rejected() {
        let options = AwardOptions {
            source: "coffee_break".to_string(),
            ..AwardOptions::default()
        };
        assert!(run(&options, &AwardTable::default()).is_err());
    }
}
