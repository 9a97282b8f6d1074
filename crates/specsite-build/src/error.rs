//! Build errors.

use std::io;
use std::path::PathBuf;

use crate::render::{RenderError, SourceLocation};

/// Errors raised while loading metadata, discovering specs, rendering or
/// writing output.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("failed to read metadata file {}", path.display())]
    MetadataRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid JSON in metadata file {}", path.display())]
    MetadataParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to list spec directory {}", path.display())]
    ListDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create output directory {}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to watch {}", path.display())]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    #[error("failed to render index page")]
    Index(#[from] handlebars::RenderError),

    #[error("invalid built-in template")]
    Template(#[from] Box<handlebars::TemplateError>),
}

impl BuildError {
    /// Source position reported by the rendering engine, if any.
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            Self::Render(e) => e.location(),
            _ => None,
        }
    }
}

/// Result alias used across the crate.
pub type BuildResult<T> = Result<T, BuildError>;
