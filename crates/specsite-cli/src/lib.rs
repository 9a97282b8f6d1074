//! specsite CLI library
//!
//! Argument parsing, configuration merging and the build command behind the
//! `specsite` binary.

pub mod cli;
pub mod commands;
pub mod error;

pub use cli::{Cli, Settings};
pub use error::CliError;
