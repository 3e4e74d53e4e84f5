//! Catalog command implementation

use std::{fmt::Write as _, str::FromStr};

use itertools::Itertools;
use serde::Serialize;
use timeflow_core::{AchievementCategory, AchievementDefinition, Error as CoreError, CATALOG};

use super::Report;
use crate::Result;

#[derive(Debug, Serialize)]
pub struct CatalogReport {
    pub achievements: Vec<&'static AchievementDefinition>,
}

impl Report for CatalogReport {
    fn to_text(&self) -> String {
        let mut out = String::new();
        for (category, group) in &self.achievements.iter().chunk_by(|d| d.category) {
            let _ = writeln!(out, "[{category}]");
            for def in group {
                let _ = writeln!(
                    out,
                    "  {} {:<16} {:<9} {}",
                    def.icon, def.title, def.tier, def.description
                );
            }
        }
        out.trim_end().to_string()
    }
}

/// Run the catalog command
///
/// # Errors
///
/// Returns an error if `category` is not a known category name.
pub fn run(category: Option<&str>) -> Result<CatalogReport> {
    let filter = category
        .map(|name| {
            AchievementCategory::from_str(name)
                .map_err(|_| CoreError::invalid(format!("unknown achievement category '{name}'")))
        })
        .transpose()?;

    Ok(CatalogReport {
        achievements: CATALOG
            .iter()
            .filter(|def| filter.map_or(true, |c| def.category == c))
            .collect(),
    })
}
