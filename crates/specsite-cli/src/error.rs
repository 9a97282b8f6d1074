//! CLI error handling.

use std::process::ExitCode;

use specsite_build::{report_error, BuildError, FULL_BUILD};
use specsite_common_config::ConfigError;
use specsite_server::ServerError;
use thiserror::Error;

/// Errors that end the process.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Server(#[from] ServerError),
}

impl CliError {
    /// Label the error is logged under.
    pub fn context(&self) -> &'static str {
        match self {
            Self::Config(_) => "Configuration",
            Self::Build(BuildError::Watch { .. }) => "Watch",
            Self::Build(_) => FULL_BUILD,
            Self::Server(_) => "Dev server",
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        let code = match self {
            Self::Config(_) => 2,
            Self::Build(_) | Self::Server(_) => 1,
        };
        ExitCode::from(code)
    }

    /// Log the error with its context.
    pub fn report(self) {
        let context = self.context();
        match self {
            Self::Config(e) => report_error(context, e),
            Self::Build(e) => report_error(context, e),
            Self::Server(e) => report_error(context, e),
        }
    }
}
