//! # StarGraph Charts
//!
//! Star history aggregation and chart rendering for stargraph.
//!
//! This crate turns a repository's star timestamps into a cumulative series
//! bucketed at an adaptive calendar granularity, then renders the series to
//! PNG files using plotters.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod renderer;
pub mod series;
pub mod types;

pub use renderer::*;
pub use series::*;
pub use types::*;
