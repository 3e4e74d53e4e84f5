//! File-backed snapshot storage.
//!
//! Snapshots are pretty-printed JSON documents. Writes go through a
//! temporary file in the target directory and are renamed into place, so a
//! crash never leaves a half-written snapshot behind.

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use timeflow_core::{ActivityEvent, LevelCurve, UserGamification};
use tracing::debug;

use crate::error::{Error, Result};

/// Read and normalize a snapshot.
///
/// # Errors
///
/// Returns `Error::Read` if the file cannot be read and `Error::Scoring`
/// if its content is not a valid snapshot.
pub fn read_snapshot(path: &Path, curve: &LevelCurve) -> Result<UserGamification> {
    let content = read(path)?;
    let snapshot = UserGamification::from_json(&content, curve)?;
    debug!(
        path = %path.display(),
        user_id = %snapshot.user_id,
        revision = snapshot.revision,
        "loaded snapshot"
    );
    Ok(snapshot)
}

/// Atomically replace the snapshot at `path`.
///
/// # Errors
///
/// Returns `Error::Write` on I/O failure.
pub fn write_snapshot(path: &Path, snapshot: &UserGamification) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot)?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

    let write_err = |source: std::io::Error| Error::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut file = tempfile::NamedTempFile::new_in(&dir).map_err(write_err)?;
    file.write_all(json.as_bytes()).map_err(write_err)?;
    file.write_all(b"\n").map_err(write_err)?;
    file.persist(path).map_err(|e| write_err(e.error))?;

    debug!(path = %path.display(), revision = snapshot.revision, "wrote snapshot");
    Ok(())
}

/// Write a snapshot only if nothing exists at `path` yet.
///
/// # Errors
///
/// Returns `Error::AlreadyExists` when `path` exists and `force` is false.
pub fn create_snapshot(path: &Path, snapshot: &UserGamification, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(Error::AlreadyExists(path.to_path_buf()));
    }
    write_snapshot(path, snapshot)
}

/// Read a JSON Lines event file.
///
/// # Errors
///
/// Returns `Error::Read` if the file cannot be read and `Error::Scoring`
/// naming the first malformed line.
pub fn read_events(path: &Path) -> Result<Vec<ActivityEvent>> {
    let content = read(path)?;
    let events = ActivityEvent::parse_json_lines(&content)?;
    debug!(path = %path.display(), count = events.len(), "loaded events");
    Ok(events)
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use timeflow_core::UserId;

    use super::*;

    fn profile() -> std::result::Result<UserGamification, Box<dyn std::error::Error>> {
        Ok(UserGamification::new(UserId::parse("store-test")?, Utc::now()))
    }

    #[test]
    fn test_snapshot_round_trip() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("profile.json");
        let snapshot = profile()?;

        write_snapshot(&path, &snapshot)?;
        let loaded = read_snapshot(&path, &LevelCurve::default())?;
        assert_eq!(loaded, snapshot);
        Ok(())
    }

    #[test]
    fn test_create_refuses_overwrite() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("profile.json");
        let snapshot = profile()?;

        create_snapshot(&path, &snapshot, false)?;
        assert!(matches!(
            create_snapshot(&path, &snapshot, false),
            Err(Error::AlreadyExists(_))
        ));
        create_snapshot(&path, &snapshot, true)?;
        Ok(())
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let result = read_events(Path::new("/nonexistent/timeflow/events.jsonl"));
        assert!(matches!(result, Err(Error::Read { .. })));
    }

    #[test]
    fn test_malformed_events_are_scoring_errors() -> std::result::Result<(), Box<dyn std::error::Error>>
    {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("events.jsonl");
        std::fs::write(&path, "{\"kind\":\"task_completed\"}\n")?;
        assert!(matches!(read_events(&path), Err(Error::Scoring(_))));
        Ok(())
    }
}
