//! Incremental rebuilds driven by build events.

use std::path::Path;
use std::sync::Arc;

use specsite_common_log::spans;
use tokio::task::JoinSet;
use tracing::{debug, info, Instrument};

use crate::context::BuildContext;
use crate::report::report_error;
use crate::site::SiteBuilder;
use crate::watcher::{BuildEvent, EventSource};

/// Applies build events to the site one at a time.
///
/// Discovery and metadata reloads finish before the next event is read.
/// Renders run in the background; each one captures the metadata that was
/// current when it was dispatched.
pub struct WatchController {
    builder: Arc<SiteBuilder>,
    context: BuildContext,
    renders: JoinSet<()>,
}

impl WatchController {
    pub fn new(builder: Arc<SiteBuilder>, context: BuildContext) -> Self {
        Self {
            builder,
            context,
            renders: JoinSet::new(),
        }
    }

    pub fn context(&self) -> &BuildContext {
        &self.context
    }

    /// Consume `source` until it ends, then wait for outstanding renders and
    /// hand back the final context.
    pub async fn run<S: EventSource>(mut self, mut source: S) -> BuildContext {
        loop {
            tokio::select! {
                event = source.next_event() => match event {
                    Some(event) => self.handle(event).await,
                    None => break,
                },
                Some(joined) = self.renders.join_next(), if !self.renders.is_empty() => {
                    if let Err(e) = joined {
                        report_error("render task", e);
                    }
                }
            }
        }

        while let Some(joined) = self.renders.join_next().await {
            if let Err(e) = joined {
                report_error("render task", e);
            }
        }

        self.context
    }

    /// React to one event.
    pub async fn handle(&mut self, event: BuildEvent) {
        let relative = self.builder.paths().display_relative(event.path());
        info!("Change detected: {} @ {}", relative, event.kind());

        let label = format!("{}:{}", relative, event.kind());
        let span = spans::watch_span(event.kind(), &relative);

        async {
            match &event {
                BuildEvent::SpecAdded(path) => {
                    self.refresh(&label).await;
                    self.spawn_render(path, label.clone());
                }
                BuildEvent::SpecRemoved(_) => self.refresh(&label).await,
                BuildEvent::SpecChanged(path) => self.spawn_render(path, label.clone()),
                BuildEvent::MetadataChanged(_) => self.reload_metadata(&label).await,
            }
        }
        .instrument(span)
        .await
    }

    async fn refresh(&mut self, label: &str) {
        info!("Refreshing specs");
        match self.builder.refresh_specs().await {
            Ok(specs) => self.context.specs = specs,
            Err(e) => report_error(label, e),
        }
    }

    fn spawn_render(&mut self, source: &Path, label: String) {
        let builder = Arc::clone(&self.builder);
        let metadata = Arc::clone(&self.context.metadata);
        let source = source.to_path_buf();

        self.renders.spawn(
            async move {
                if let Err(e) = builder.build_spec(&source, &metadata).await {
                    report_error(&label, e);
                }
            }
            .in_current_span(),
        );
    }

    /// Swap in freshly loaded metadata and re-render everything with it. On a
    /// load failure the previous metadata stays in place.
    async fn reload_metadata(&mut self, label: &str) {
        let metadata = match self.builder.load_metadata().await {
            Ok(metadata) => Arc::new(metadata),
            Err(e) => {
                report_error(label, e);
                return;
            }
        };
        self.context.metadata = Arc::clone(&metadata);

        let builder = Arc::clone(&self.builder);
        let specs = self.context.specs.clone();
        let label = label.to_string();
        debug!(specs = specs.len(), "re-rendering with new metadata");

        self.renders.spawn(
            async move {
                builder.build_all(&specs, &metadata, &label).await;
            }
            .in_current_span(),
        );
    }
}
