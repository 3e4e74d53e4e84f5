//! Scoring configuration
//!
//! Every knob has a built-in default, so an empty TOML document is a valid
//! configuration. Values are validated once after loading.
//!
//! ```toml
//! streak_milestones = [3, 7, 14, 30]
//!
//! [level]
//! xp_per_level_base = 100
//!
//! [awards]
//! task_high = 60
//! achievement_unlocked = 150
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    award::AwardTable,
    error::{Error, Result},
    level::LevelCurve,
};

/// Habit streak lengths that earn a streak milestone reward.
pub const DEFAULT_STREAK_MILESTONES: [u32; 8] = [3, 7, 14, 30, 60, 100, 180, 365];

/// Tunable scoring parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub level: LevelCurve,
    pub awards: AwardTable,
    /// Strictly increasing, non-zero
    pub streak_milestones: Vec<u32>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            level: LevelCurve::default(),
            awards: AwardTable::default(),
            streak_milestones: DEFAULT_STREAK_MILESTONES.to_vec(),
        }
    }
}

impl ScoringConfig {
    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the TOML is malformed or fails validation.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::Config(format!("invalid scoring config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the file cannot be read, is a directory,
    /// or fails [`Self::from_toml_str`].
    pub fn load_toml_file(path: &Path) -> Result<Self> {
        if path.is_dir() {
            return Err(Error::Config(format!(
                "config path is a directory, not a file: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read config file {}: {e}", path.display()))
        })?;

        Self::from_toml_str(&content).map_err(|e| match e {
            Error::Config(message) => Error::Config(format!("{}: {message}", path.display())),
            other => other,
        })
    }

    /// Check every section.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        self.level
            .validate()
            .and_then(|()| self.awards.validate())
            .map_err(|e| Error::Config(e.to_string()))?;

        if self.streak_milestones.first() == Some(&0) {
            return Err(Error::Config("streak milestones must be non-zero".to_string()));
        }
        if self.streak_milestones.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::Config(
                "streak milestones must be strictly increasing".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether a habit streak of `days` earns a milestone reward.
    #[must_use]
    pub fn is_streak_milestone(&self, days: u32) -> bool {
        self.streak_milestones.binary_search(&days).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(ScoringConfig::from_toml_str(""), Ok(ScoringConfig::default()));
    }

    #[test]
    fn test_partial_override_keeps_other_defaults() {
        let config = ScoringConfig::from_toml_str("[awards]\ntask_high = 60\n");
        let awards = config.map(|c| c.awards);
        assert_eq!(awards.map(|a| (a.task_high, a.task_low)), Ok((60, 10)));
    }

    #[test]
    fn test_zero_base_rejected() {
        let result = ScoringConfig::from_toml_str("[level]\nxp_per_level_base = 0\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_unsorted_milestones_rejected() {
        let result = ScoringConfig::from_toml_str("streak_milestones = [7, 3]\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_zero_milestone_rejected() {
        let result = ScoringConfig::from_toml_str("streak_milestones = [0, 3]\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let result = ScoringConfig::from_toml_str("[awards\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_streak_milestones() {
        let config = ScoringConfig::default();
        assert!(config.is_streak_milestone(7));
        assert!(!config.is_streak_milestone(8));
    }

    #[test]
    fn test_load_from_file() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "[level]\nxp_per_level_base = 250")?;

        let config = ScoringConfig::load_toml_file(file.path())?;
        assert_eq!(config.level.xp_per_level_base, 250);
        Ok(())
    }

    #[test]
    fn test_invalid_file_names_path_once() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "[level]\nxp_per_level_base = 0")?;

        let message = ScoringConfig::load_toml_file(file.path())
            .err()
            .map(|e| e.to_string())
            .unwrap_or_default();
        assert_eq!(message.matches("Config error").count(), 1);
        assert!(message.contains(&file.path().display().to_string()));
        Ok(())
    }

    #[test]
    fn test_directory_path_rejected() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let result = ScoringConfig::load_toml_file(dir.path());
        assert!(matches!(result, Err(Error::Config(_))));
        Ok(())
    }
}
