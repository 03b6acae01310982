//! # StarGraph Config
//!
//! Type-safe configuration loading and validation for stargraph.
//!
//! This crate provides YAML configuration files with environment variable
//! overrides, validating every setting before the application starts.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod loader;
pub mod settings;
pub mod validation;

pub use loader::*;
pub use settings::*;
