use std::path::Path;
use std::sync::Arc;

use crate::discovery::SpecDescriptor;
use crate::metadata::Metadata;

/// State a rebuild needs: the current metadata and the last discovery result.
///
/// Metadata is shared behind an `Arc`; replacing it does not affect renders
/// that already hold the previous snapshot.
#[derive(Debug, Clone, Default)]
pub struct BuildContext {
    pub metadata: Arc<Metadata>,
    pub specs: Vec<SpecDescriptor>,
}

impl BuildContext {
    pub fn new(metadata: Metadata, specs: Vec<SpecDescriptor>) -> Self {
        Self {
            metadata: Arc::new(metadata),
            specs,
        }
    }

    /// Paths of the currently known specs, newest first.
    pub fn spec_paths(&self) -> impl Iterator<Item = &Path> {
        self.specs.iter().map(|spec| spec.path.as_path())
    }

    /// Whether `path` belongs to a discovered spec.
    pub fn contains(&self, path: &Path) -> bool {
        self.spec_paths().any(|p| p == path)
    }
}
