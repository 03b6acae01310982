//! Utility functions used across the stargraph application

use crate::Timestamp;
use chrono::Utc;

/// Get the current timestamp
pub fn now() -> Timestamp {
    Utc::now()
}

/// Format a timestamp for display
pub fn format_timestamp(timestamp: &Timestamp) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// File name for a repository's chart image
///
/// Lowercases the repository name and replaces anything outside
/// `[a-z0-9._-]` so the result is safe on common filesystems.
pub fn chart_file_name(repo_name: &str) -> String {
    let safe: String = repo_name
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '.' | '_' | '-' => c,
            _ => '_',
        })
        .collect();
    format!("{}_star_chart.png", safe)
}
