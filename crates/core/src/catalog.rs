//! Course catalog rules.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Version assigned to a catalog entry created without one.
pub const DEFAULT_CATALOG_VERSION: &str = "1.0";

/// Publication status of a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogStatus {
    Active,
    Draft,
    Archived,
}

impl CatalogStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Draft => "draft",
            Self::Archived => "archived",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "active" => Ok(Self::Active),
            "draft" => Ok(Self::Draft),
            "archived" => Ok(Self::Archived),
            other => Err(CoreError::Validation(format!(
                "Invalid catalog status '{other}'. Must be one of: active, draft, archived"
            ))),
        }
    }
}

/// Check an optional status column value.
pub fn validate_status(status: Option<&str>) -> Result<(), CoreError> {
    if let Some(s) = status {
        CatalogStatus::parse(s)?;
    }
    Ok(())
}

/// Trim tags, drop blanks and case-insensitive duplicates, keep first spelling.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(tags.len());
    let mut out = Vec::with_capacity(tags.len());
    for tag in tags {
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            continue;
        }
        let folded = trimmed.to_lowercase();
        if seen.contains(&folded) {
            continue;
        }
        seen.push(folded);
        out.push(trimmed.to_string());
    }
    out
}

/// Courses may only be scheduled from catalog entries that are not archived.
pub fn ensure_schedulable(status: &str) -> Result<(), CoreError> {
    if CatalogStatus::parse(status)? == CatalogStatus::Archived {
        return Err(CoreError::Conflict(
            "Cannot schedule a course from an archived catalog entry".into(),
        ));
    }
    Ok(())
}
