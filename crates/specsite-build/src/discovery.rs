use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{BuildError, BuildResult};

/// Extension of spec source files.
pub const SPEC_EXTENSION: &str = "md";

/// One versioned spec source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecDescriptor {
    /// Number following the first `v` in the file name.
    pub version: u64,
    /// Path to the Markdown source.
    pub path: PathBuf,
    /// File name without the `.md` extension.
    pub basename: String,
}

impl SpecDescriptor {
    /// Build a descriptor for `path`, or `None` when it is not a Markdown
    /// file or has no version token.
    pub fn from_path(path: &Path) -> Option<Self> {
        if !is_spec_source(path) {
            return None;
        }

        let file_name = path.file_name()?.to_str()?;
        let version = parse_version(file_name)?;
        let basename = path.file_stem()?.to_str()?.to_string();

        Some(Self {
            version,
            path: path.to_path_buf(),
            basename,
        })
    }

    /// Name of the rendered HTML file.
    pub fn output_file_name(&self) -> String {
        format!("{}.html", self.basename)
    }
}

/// Whether `path` has the spec source extension.
pub fn is_spec_source(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(SPEC_EXTENSION)
}

fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"v(\d+)").expect("valid version pattern"))
}

/// Extract the first run of digits following a literal `v`.
///
/// Returns `None` when there is no such run, or when it does not fit in a
/// `u64`.
pub fn parse_version(file_name: &str) -> Option<u64> {
    let digits = version_pattern().captures(file_name)?.get(1)?.as_str();

    match digits.parse() {
        Ok(version) => Some(version),
        Err(_) => {
            warn!(file = %file_name, "version number out of range, skipping");
            None
        }
    }
}

/// Order descriptors newest first. Equal versions fall back to basename so
/// the order never depends on directory listing order.
pub fn sort_newest_first(specs: &mut [SpecDescriptor]) {
    specs.sort_by(|a, b| {
        b.version
            .cmp(&a.version)
            .then_with(|| a.basename.cmp(&b.basename))
    });
}

/// Scan `spec_dir` (non-recursively) for versioned Markdown files.
pub async fn discover_specs(spec_dir: &Path) -> BuildResult<Vec<SpecDescriptor>> {
    let list_err = |source| BuildError::ListDir {
        path: spec_dir.to_path_buf(),
        source,
    };

    let mut specs = Vec::new();
    let mut entries = fs::read_dir(spec_dir).await.map_err(list_err)?;

    while let Some(entry) = entries.next_entry().await.map_err(list_err)? {
        let path = entry.path();
        if !is_spec_source(&path) {
            continue;
        }

        // Follows symlinks; a dangling link is treated like a missing file.
        let is_file = fs::metadata(&path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if !is_file {
            continue;
        }

        match SpecDescriptor::from_path(&path) {
            Some(spec) => specs.push(spec),
            None => debug!(path = %path.display(), "no version token, skipping"),
        }
    }

    sort_newest_first(&mut specs);
    Ok(specs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), format!("# {name}\n")).await.unwrap();
    }

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("a-v2.md"), Some(2));
        assert_eq!(parse_version("spec-v10.md"), Some(10));
        assert_eq!(parse_version("overview-v3-draft.md"), Some(3));
        assert_eq!(parse_version("v7.md"), Some(7));
        assert_eq!(parse_version("v1-then-v9.md"), Some(1));
        assert_eq!(parse_version("notes.md"), None);
        assert_eq!(parse_version("V2.md"), None);
        assert_eq!(parse_version("v99999999999999999999999.md"), None);
    }

    #[test]
    fn test_descriptor_from_path() {
        let spec = SpecDescriptor::from_path(Path::new("/specs/a-v2.md")).unwrap();
        assert_eq!(spec.version, 2);
        assert_eq!(spec.basename, "a-v2");
        assert_eq!(spec.output_file_name(), "a-v2.html");

        assert!(SpecDescriptor::from_path(Path::new("/specs/notes.md")).is_none());
        assert!(SpecDescriptor::from_path(Path::new("/specs/a-v2.txt")).is_none());
    }

    #[test]
    fn test_sort_breaks_ties_by_basename() {
        let mut specs: Vec<_> = ["b-v1.md", "a-v1.md", "c-v3.md"]
            .iter()
            .filter_map(|name| SpecDescriptor::from_path(Path::new(name)))
            .collect();

        sort_newest_first(&mut specs);

        let names: Vec<_> = specs.iter().map(|s| s.basename.as_str()).collect();
        assert_eq!(names, ["c-v3", "a-v1", "b-v1"]);
    }

    #[tokio::test]
    async fn test_discover_excludes_unversioned_files() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "a-v2.md").await;
        touch(temp.path(), "a-v1.md").await;
        touch(temp.path(), "notes.md").await;

        let specs = discover_specs(temp.path()).await.unwrap();

        let versions: Vec<_> = specs.iter().map(|s| s.version).collect();
        assert_eq!(versions, [2, 1]);
        assert_eq!(specs[0].path, temp.path().join("a-v2.md"));
        assert!(specs.iter().all(|s| s.basename != "notes"));
    }

    #[tokio::test]
    async fn test_discover_ignores_other_extensions_and_directories() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "a-v1.md").await;
        touch(temp.path(), "a-v2.txt").await;
        touch(temp.path(), "metadata.json").await;
        fs::create_dir(temp.path().join("old-v9.md")).await.unwrap();

        let specs = discover_specs(temp.path()).await.unwrap();

        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].basename, "a-v1");
    }

    #[tokio::test]
    async fn test_discover_orders_numerically() {
        let temp = TempDir::new().unwrap();
        for name in ["spec-v2.md", "spec-v10.md", "spec-v1.md"] {
            touch(temp.path(), name).await;
        }

        let specs = discover_specs(temp.path()).await.unwrap();

        let versions: Vec<_> = specs.iter().map(|s| s.version).collect();
        assert_eq!(versions, [10, 2, 1]);
    }

    #[tokio::test]
    async fn test_discover_missing_directory() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("spec");

        let err = discover_specs(&missing).await.unwrap_err();
        match err {
            BuildError::ListDir { path, .. } => assert_eq!(path, missing),
            other => panic!("Expected ListDir, got {other:?}"),
        }
    }
}
