//! # StarGraph Common
//!
//! Shared foundation for the stargraph workspace.
//!
//! This crate provides the error type, logging setup, the GitHub API
//! client, and the small set of types and helpers every other crate
//! leans on.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod github;
pub mod logging;
pub mod macros;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use error::{Result, StarGraphError};
pub use github::{ClientMetrics, GithubClient, GithubConfig, Repo, Stargazer};
pub use logging::{init_default_logging, init_logging, LoggingConfig};
pub use types::{RepoTarget, Timestamp};
