//! Build command implementation.

use std::sync::Arc;

use specsite_build::{
    report_error, BuildContext, IndexGenerator, MarkdownEngine, SiteBuilder,
    SpecDirectoryWatcher, WatchController, FULL_BUILD,
};
use specsite_common_log::spans::Timer;
use specsite_server::{shutdown_signal, DevServer, ServerConfig};
use tracing::{info, warn};

use crate::cli::Settings;
use crate::error::CliError;

/// Wire the default engine and index generator to the resolved paths.
pub fn site_builder(settings: &Settings) -> Result<SiteBuilder, CliError> {
    let engine = Arc::new(MarkdownEngine::new()?);
    let index = IndexGenerator::new(settings.title.clone())?;

    Ok(SiteBuilder::new(settings.paths.clone(), engine, index))
}

/// Run the full build, then, in watch mode, keep rebuilding and serving
/// until a shutdown signal arrives.
pub async fn run(settings: Settings) -> Result<(), CliError> {
    let builder = Arc::new(site_builder(&settings)?);

    let timer = Timer::start("full build");
    let context = match builder.full_build().await {
        Ok(full) => {
            timer.finish();
            match full.metadata_error {
                Some(e) if settings.watch => report_error(FULL_BUILD, e),
                Some(e) => return Err(e.into()),
                None if full.report.is_success() => {
                    info!("Built {} specs", full.report.built.len());
                }
                None => warn!(
                    "Built {} specs, {} failed",
                    full.report.built.len(),
                    full.report.failed.len()
                ),
            }
            full.context
        }
        Err(e) if settings.watch => {
            report_error(FULL_BUILD, e);
            BuildContext::default()
        }
        Err(e) => return Err(e.into()),
    };

    if !settings.watch {
        return Ok(());
    }

    watch(builder, context, &settings).await
}

async fn watch(
    builder: Arc<SiteBuilder>,
    context: BuildContext,
    settings: &Settings,
) -> Result<(), CliError> {
    let paths = builder.paths().clone();
    let watcher = SpecDirectoryWatcher::new(paths.spec_dir.clone(), paths.metadata_path.clone())?;
    let controller = WatchController::new(builder, context);
    let server = DevServer::new(ServerConfig::new(&paths.output_dir).with_port(settings.port));

    info!("Watching {} for changes", paths.display_relative(&paths.spec_dir));

    tokio::select! {
        _ = controller.run(watcher) => {
            warn!("file watcher stopped");
            Ok(())
        }
        result = server.run(shutdown_signal()) => result.map_err(CliError::from),
    }
}
