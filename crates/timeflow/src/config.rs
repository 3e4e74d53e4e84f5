//! Scoring configuration lookup.
//!
//! First match wins:
//! 1. `--config <path>`
//! 2. `TIMEFLOW_CONFIG` environment variable
//! 3. Global config: `<config dir>/timeflow/config.toml`
//! 4. Built-in defaults

use std::path::{Path, PathBuf};

use timeflow_core::ScoringConfig;
use tracing::debug;

use crate::error::Result;

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "TIMEFLOW_CONFIG";

/// Path to the global config file, if the platform has a config dir.
pub fn global_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "timeflow")
        .map(|proj_dirs| proj_dirs.config_dir().join("config.toml"))
}

/// Resolve and load the scoring configuration.
///
/// An explicitly named file must exist; the global file is optional.
///
/// # Errors
///
/// Returns `Error::Scoring` if the chosen file is unreadable or invalid.
pub fn load_config(explicit: Option<&Path>) -> Result<ScoringConfig> {
    let from_env = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);

    if let Some(path) = explicit.map(Path::to_path_buf).or(from_env) {
        debug!(path = %path.display(), "loading scoring config");
        return Ok(ScoringConfig::load_toml_file(&path)?);
    }

    match global_config_path().filter(|p| p.is_file()) {
        Some(path) => {
            debug!(path = %path.display(), "loading global scoring config");
            Ok(ScoringConfig::load_toml_file(&path)?)
        }
        None => {
            debug!("using built-in scoring config");
            Ok(ScoringConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_file_is_loaded() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("scoring.toml");
        std::fs::write(&path, "[awards]\ndaily_login = 9\n")?;

        let config = load_config(Some(&path))?;
        assert_eq!(config.awards.daily_login, 9);
        Ok(())
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        assert!(load_config(Some(Path::new("/nonexistent/timeflow.toml"))).is_err());
    }
}
