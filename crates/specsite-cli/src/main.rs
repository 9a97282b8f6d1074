//! specsite - versioned Markdown specs to a static site
//!
//! Main entry point for the `specsite` binary.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use specsite_cli::commands::build;
use specsite_cli::{Cli, CliError};
use specsite_common_config::Environment;
use specsite_common_log::LogConfig;

fn main() -> ExitCode {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let _env = Environment::init(&cwd);

    let cli = Cli::parse();

    let mut log_config = LogConfig::from_env();
    if let Some(level) = cli.log_level() {
        log_config = log_config.with_level(level);
    }
    if let Err(e) = specsite_common_log::init(log_config) {
        eprintln!("{e}");
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("failed to start async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let code = e.exit_code();
            e.report();
            code
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let settings = cli.settings()?;
    build::run(settings).await
}
