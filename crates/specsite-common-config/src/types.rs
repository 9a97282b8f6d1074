//! Configuration types.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration, as read from `specsite.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Directory holding the versioned Markdown sources.
    pub spec_dir: PathBuf,
    /// Directory receiving the rendered HTML.
    pub output_dir: PathBuf,
    /// Metadata JSON file. Relative paths resolve against `spec_dir`.
    pub metadata_file: PathBuf,
    /// Site title shown on the generated index page.
    pub title: String,
    /// Dev server settings.
    pub server: ServerSettings,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            spec_dir: PathBuf::from("spec"),
            output_dir: PathBuf::from("build"),
            metadata_file: PathBuf::from("metadata.json"),
            title: "Specification".to_string(),
            server: ServerSettings::default(),
        }
    }
}

/// Dev server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Port on localhost.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

/// Absolute locations derived from a [`SiteConfig`] and a project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitePaths {
    /// Project root everything else is relative to.
    pub root: PathBuf,
    /// Spec source directory.
    pub spec_dir: PathBuf,
    /// Output directory.
    pub output_dir: PathBuf,
    /// Metadata JSON file.
    pub metadata_path: PathBuf,
}

impl SiteConfig {
    /// Resolve configured paths against `root`.
    pub fn resolve(&self, root: &Path) -> SitePaths {
        let spec_dir = join_relative(root, &self.spec_dir);
        let output_dir = join_relative(root, &self.output_dir);
        let metadata_path = join_relative(&spec_dir, &self.metadata_file);

        SitePaths {
            root: root.to_path_buf(),
            spec_dir,
            output_dir,
            metadata_path,
        }
    }
}

fn join_relative(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

impl SitePaths {
    /// Render `path` relative to the project root for log lines.
    pub fn display_relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .display()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_paths() {
        let config = SiteConfig::default();
        let paths = config.resolve(Path::new("/project"));

        assert_eq!(paths.spec_dir, PathBuf::from("/project/spec"));
        assert_eq!(paths.output_dir, PathBuf::from("/project/build"));
        assert_eq!(
            paths.metadata_path,
            PathBuf::from("/project/spec/metadata.json")
        );
    }

    #[test]
    fn test_resolve_keeps_absolute_paths() {
        let config = SiteConfig {
            output_dir: PathBuf::from("/srv/site"),
            metadata_file: PathBuf::from("/etc/specsite/meta.json"),
            ..SiteConfig::default()
        };
        let paths = config.resolve(Path::new("/project"));

        assert_eq!(paths.output_dir, PathBuf::from("/srv/site"));
        assert_eq!(paths.metadata_path, PathBuf::from("/etc/specsite/meta.json"));
    }

    #[test]
    fn test_display_relative() {
        let paths = SiteConfig::default().resolve(Path::new("/project"));
        assert_eq!(
            paths.display_relative(Path::new("/project/spec/a-v1.md")),
            "spec/a-v1.md"
        );
        assert_eq!(paths.display_relative(Path::new("/elsewhere/x.md")), "/elsewhere/x.md");
    }
}
