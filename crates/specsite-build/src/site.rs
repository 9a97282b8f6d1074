//! Rendering specs and the index into the output directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::join_all;
use specsite_common_config::SitePaths;
use specsite_common_log::spans;
use tracing::{info, Instrument};

use crate::context::BuildContext;
use crate::discovery::{discover_specs, SpecDescriptor};
use crate::error::{BuildError, BuildResult};
use crate::fs::{ensure_dir, write_atomic};
use crate::index::{IndexGenerator, INDEX_FILE_NAME};
use crate::metadata::Metadata;
use crate::render::RenderEngine;
use crate::report::{report_error, FULL_BUILD};

/// Outcome of rendering a batch of specs.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Output files written.
    pub built: Vec<PathBuf>,
    /// Sources whose render or write failed. Each failure has been logged.
    pub failed: Vec<PathBuf>,
}

impl BuildReport {
    /// Whether every spec in the batch was written.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Result of the startup build.
#[derive(Debug)]
pub struct FullBuild {
    /// Metadata and descriptors the build ran with. The spec list is filled
    /// in even when the metadata could not be loaded.
    pub context: BuildContext,
    /// Per-spec outcome. Empty when the metadata failed to load.
    pub report: BuildReport,
    /// Why the metadata could not be loaded, if it could not.
    pub metadata_error: Option<BuildError>,
}

/// Owns the output layout and the rendering capabilities.
pub struct SiteBuilder {
    paths: SitePaths,
    engine: Arc<dyn RenderEngine>,
    index: IndexGenerator,
}

impl SiteBuilder {
    pub fn new(paths: SitePaths, engine: Arc<dyn RenderEngine>, index: IndexGenerator) -> Self {
        Self {
            paths,
            engine,
            index,
        }
    }

    pub fn paths(&self) -> &SitePaths {
        &self.paths
    }

    /// Create the output directory if it is missing.
    pub async fn prepare_output(&self) -> BuildResult<()> {
        ensure_dir(&self.paths.output_dir).await
    }

    /// Read the metadata file.
    pub async fn load_metadata(&self) -> BuildResult<Metadata> {
        Metadata::load(&self.paths.metadata_path).await
    }

    /// Rediscover specs and rewrite the index so the two never disagree.
    pub async fn refresh_specs(&self) -> BuildResult<Vec<SpecDescriptor>> {
        let specs = discover_specs(&self.paths.spec_dir).await?;
        let html = self.index.generate(&specs)?;

        let index_path = self.paths.output_dir.join(INDEX_FILE_NAME);
        write_atomic(&index_path, html.as_bytes()).await?;
        info!("Built {}", self.paths.display_relative(&index_path));

        Ok(specs)
    }

    /// Where the HTML for `source` is written.
    pub fn output_path(&self, source: &Path) -> PathBuf {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.paths.output_dir.join(format!("{stem}.html"))
    }

    /// Render one spec and write it, overwriting any previous output.
    pub async fn build_spec(&self, source: &Path, metadata: &Metadata) -> BuildResult<PathBuf> {
        let span = spans::render_span(&self.paths.display_relative(source));

        async {
            let html = self.engine.render(source, metadata).await?;

            let output_path = self.output_path(source);
            write_atomic(&output_path, html.as_bytes()).await?;
            info!(
                "Built {} -> {}",
                self.paths.display_relative(source),
                self.paths.display_relative(&output_path)
            );

            Ok(output_path)
        }
        .instrument(span)
        .await
    }

    /// Render every spec concurrently. A failure is logged under `trigger`
    /// and never stops the rest of the batch.
    pub async fn build_all(
        &self,
        specs: &[SpecDescriptor],
        metadata: &Metadata,
        trigger: &str,
    ) -> BuildReport {
        let results = join_all(specs.iter().map(|spec| async move {
            (spec, self.build_spec(&spec.path, metadata).await)
        }))
        .instrument(spans::build_span(specs.len()))
        .await;

        let mut report = BuildReport::default();
        for (spec, result) in results {
            match result {
                Ok(output) => report.built.push(output),
                Err(e) => {
                    let context =
                        format!("{trigger} ({})", self.paths.display_relative(&spec.path));
                    report_error(&context, e);
                    report.failed.push(spec.path.clone());
                }
            }
        }

        report
    }

    /// Startup pass: output directory, then metadata alongside discovery
    /// plus index, then every spec.
    ///
    /// A metadata failure does not stop discovery or the index. It is handed
    /// back in [`FullBuild::metadata_error`] with no spec rendered, so a
    /// later metadata fix can re-render the discovered specs.
    pub async fn full_build(&self) -> BuildResult<FullBuild> {
        self.prepare_output().await?;
        let (metadata, specs) = tokio::join!(self.load_metadata(), self.refresh_specs());
        let specs = specs?;

        match metadata {
            Ok(metadata) => {
                let report = self.build_all(&specs, &metadata, FULL_BUILD).await;
                Ok(FullBuild {
                    context: BuildContext::new(metadata, specs),
                    report,
                    metadata_error: None,
                })
            }
            Err(e) => Ok(FullBuild {
                context: BuildContext::new(Metadata::default(), specs),
                report: BuildReport::default(),
                metadata_error: Some(e),
            }),
        }
    }
}
