//! # StarGraph CLI
//!
//! Command line application for stargraph.
//!
//! Fetches star histories from the GitHub API, aggregates them into
//! cumulative series, renders PNG charts and writes a Markdown summary.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod summary;

pub use app::*;
