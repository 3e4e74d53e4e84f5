//! Stats command implementation

use std::path::Path;

use serde::Serialize;
use timeflow_core::UserStats;

use super::Report;
use crate::{store, Result};

#[derive(Debug, Serialize)]
pub struct StatsReport {
    pub events: usize,
    pub stats: UserStats,
}

impl Report for StatsReport {
    fn to_text(&self) -> String {
        let s = &self.stats;
        format!(
            "Replayed {} events\n\
             Tasks completed:      {}\n\
             Habits completed:     {}\n\
             Goals completed:      {}\n\
             Time tracked:         {} min ({} h)\n\
             Streak:               {} (longest {})\n\
             Early bird tasks:     {}\n\
             Night owl tasks:      {}\n\
             Perfect days:         {} ({} in a row)",
            self.events,
            s.total_tasks_completed,
            s.total_habits_completed,
            s.total_goals_completed,
            s.total_time_tracked,
            s.hours_tracked(),
            s.current_streak,
            s.longest_streak,
            s.early_bird_tasks,
            s.night_owl_tasks,
            s.perfect_days,
            s.consecutive_perfect_days
        )
    }
}

/// Run the stats command
///
/// # Errors
///
/// Returns an error if the event file cannot be read or any line is not a
/// valid event.
pub fn run(events: &Path) -> Result<StatsReport> {
    let events = store::read_events(events)?;

    Ok(StatsReport {
        events: events.len(),
        stats: UserStats::replay(&events),
    })
}
