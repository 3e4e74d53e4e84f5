//! Init command implementation

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use timeflow_core::{UserGamification, UserId};

use super::Report;
use crate::{store, Result};

/// Init command options
#[derive(Debug, Clone)]
pub struct InitOptions {
    pub user: String,
    pub out: PathBuf,
    pub force: bool,
}

#[derive(Debug, Serialize)]
pub struct InitReport {
    pub user_id: String,
    pub path: PathBuf,
    pub achievements: usize,
}

impl Report for InitReport {
    fn to_text(&self) -> String {
        format!(
            "Created snapshot for '{}' at {} ({} achievements to unlock)",
            self.user_id,
            self.path.display(),
            self.achievements
        )
    }
}

/// Run the init command
///
/// # Errors
///
/// Returns an error if:
/// - The user id is blank
/// - A snapshot already exists and `force` is not set
/// - The snapshot cannot be written
pub fn run(options: &InitOptions, now: DateTime<Utc>) -> Result<InitReport> {
    let user_id = UserId::parse(options.user.as_str())?;
    let snapshot = UserGamification::new(user_id, now);
    store::create_snapshot(&options.out, &snapshot, options.force)?;

    Ok(InitReport {
        user_id: snapshot.user_id.to_string(),
        path: options.out.clone(),
        achievements: snapshot.achievements.len(),
    })
}
