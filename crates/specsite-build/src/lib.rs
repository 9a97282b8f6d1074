//! Spec site build pipeline.
//!
//! This crate turns a directory of versioned Markdown specs into a static
//! site: one HTML page per spec plus an `index.html` listing the versions
//! newest first. In watch mode the [`WatchController`] applies file-system
//! events incrementally instead of rebuilding from scratch.

pub mod context;
pub mod controller;
pub mod discovery;
pub mod error;
pub mod fs;
pub mod index;
pub mod metadata;
pub mod render;
pub mod report;
pub mod site;
pub mod watcher;

pub use context::BuildContext;
pub use controller::WatchController;
pub use discovery::{discover_specs, parse_version, SpecDescriptor};
pub use error::{BuildError, BuildResult};
pub use index::{IndexGenerator, INDEX_FILE_NAME};
pub use metadata::Metadata;
pub use render::{MarkdownEngine, RenderEngine, RenderError, SourceLocation};
pub use report::{format_error, report_error, FULL_BUILD};
pub use site::{BuildReport, FullBuild, SiteBuilder};
pub use watcher::{classify_event, BuildEvent, EventSource, SpecDirectoryWatcher};
