//! Commands module for the timeflow CLI
//!
//! Each command takes typed options, does its work through `timeflow-core`,
//! and returns a report that renders as text or JSON.

pub mod apply;
pub mod award;
pub mod catalog;
pub mod init;
pub mod level;
pub mod stats;

use serde::Serialize;

/// Command output.
pub trait Report: Serialize {
    /// Human-readable rendering.
    fn to_text(&self) -> String;
}

/// Render `report` as pretty JSON or plain text.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render(report: &impl Report, json: bool) -> crate::Result<String> {
    if json {
        Ok(serde_json::to_string_pretty(report)?)
    } else {
        Ok(report.to_text())
    }
}
