//! Output file helpers.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::{BuildError, BuildResult};

/// Ensure a directory exists.
pub async fn ensure_dir(path: &Path) -> BuildResult<()> {
    fs::create_dir_all(path)
        .await
        .map_err(|source| BuildError::CreateDir {
            path: path.to_path_buf(),
            source,
        })
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut temp_path = path.to_path_buf();
    match path.file_name() {
        Some(name) => temp_path.set_file_name(format!(".{}.tmp", name.to_string_lossy())),
        None => temp_path.push(".tmp"),
    }
    temp_path
}

/// Write to a file atomically (write to temp, then rename), creating the
/// parent directory when it is missing.
pub async fn write_atomic(path: &Path, contents: &[u8]) -> BuildResult<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent).await?;
    }

    let write_err = |source| BuildError::Write {
        path: path.to_path_buf(),
        source,
    };

    let temp_path = temp_path_for(path);
    fs::write(&temp_path, contents).await.map_err(write_err)?;

    if let Err(e) = fs::rename(&temp_path, path).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(write_err(e));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_atomic_creates_parent() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("build").join("a-v1.html");

        write_atomic(&target, b"<html></html>").await.unwrap();

        assert_eq!(fs::read_to_string(&target).await.unwrap(), "<html></html>");
        assert!(!temp_path_for(&target).exists());
    }

    #[tokio::test]
    async fn test_write_atomic_overwrites() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("index.html");

        write_atomic(&target, b"old").await.unwrap();
        write_atomic(&target, b"new").await.unwrap();

        assert_eq!(fs::read_to_string(&target).await.unwrap(), "new");
    }

    #[tokio::test]
    async fn test_write_into_file_parent_fails() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("build");
        fs::write(&blocker, "not a directory").await.unwrap();

        let err = write_atomic(&blocker.join("a-v1.html"), b"x").await.unwrap_err();
        assert!(matches!(err, BuildError::CreateDir { .. }));
    }

    #[test]
    fn test_temp_path_is_hidden_sibling() {
        let temp = temp_path_for(Path::new("/out/a-v1.html"));
        assert_eq!(temp, PathBuf::from("/out/.a-v1.html.tmp"));
    }
}
