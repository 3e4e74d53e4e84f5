//! Level command implementation

use serde::Serialize;
use timeflow_core::{LevelCurve, LevelInfo};

use super::Report;
use crate::Result;

#[derive(Debug, Serialize)]
pub struct LevelReport {
    pub xp: i64,
    #[serde(flatten)]
    pub info: LevelInfo,
    pub title: &'static str,
}

impl Report for LevelReport {
    fn to_text(&self) -> String {
        format!(
            "Level {} ({})\n  {} XP, next level at {} ({} to go, {:.1}%)",
            self.info.current_level,
            self.title,
            self.xp,
            self.info.next_level_xp,
            self.info.xp_to_next_level,
            self.info.progress_percent
        )
    }
}

/// Run the level command
///
/// # Errors
///
/// Returns an error if `xp` is negative.
pub fn run(xp: i64, curve: &LevelCurve) -> Result<LevelReport> {
    let info = curve.level_info_signed(xp)?;
    Ok(LevelReport {
        xp,
        info,
        title: info.title(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_report_for_threshold() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let report = run(100, &LevelCurve::default())?;
        assert_eq!(report.info.current_level, 2);
        assert_eq!(report.title, "Novice");
        assert!(report.to_text().starts_with("Level 2 (Novice)"));
        Ok(())
    }

    #[test]
    fn test_negative_xp_rejected() {
        assert!(run(-1, &LevelCurve::default()).is_err());
    }
}
