//! Configuration types for specsite.
//!
//! This crate provides the configuration read from an optional
//! `specsite.yaml` in the project root, plus `.env` handling.

pub mod env;
pub mod loader;
pub mod types;

pub use env::*;
pub use loader::*;
pub use types::*;
