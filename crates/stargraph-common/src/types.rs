//! Common types used across the stargraph application

use crate::error::{Result, StarGraphError};
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

/// Timestamp type used throughout the application
pub type Timestamp = DateTime<Utc>;

/// A repository reference in `owner/name` form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoTarget {
    /// Account or organization that owns the repository
    pub owner: String,
    /// Repository name without the owner prefix
    pub name: String,
}

impl RepoTarget {
    /// Create a target from its two components
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// The `owner/name` form used by the GitHub API and in chart titles
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepoTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoTarget {
    type Err = StarGraphError;

    fn from_str(s: &str) -> Result<Self> {
        let (owner, name) = s.split_once('/').ok_or_else(|| {
            StarGraphError::validation_field(format!("Expected owner/name, got '{}'", s), "repo")
        })?;
        crate::ensure!(
            !owner.is_empty() && !name.is_empty() && !name.contains('/'),
            "Expected owner/name, got '{}'",
            s
        );
        Ok(Self::new(owner, name))
    }
}
