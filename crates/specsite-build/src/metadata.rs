//! Site metadata shared by every render.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::fs;

use crate::error::{BuildError, BuildResult};

/// Opaque JSON options loaded from the metadata file and handed unmodified to
/// the rendering engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(Value);

impl Default for Metadata {
    fn default() -> Self {
        Self(Value::Object(Map::new()))
    }
}

impl From<Value> for Metadata {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl Metadata {
    /// Read and parse the metadata file at `path`.
    pub async fn load(path: &Path) -> BuildResult<Self> {
        let contents = fs::read(path)
            .await
            .map_err(|source| BuildError::MetadataRead {
                path: path.to_path_buf(),
                source,
            })?;

        let value = serde_json::from_slice(&contents).map_err(|source| {
            BuildError::MetadataParse {
                path: path.to_path_buf(),
                source,
            }
        })?;

        Ok(Self(value))
    }

    /// The raw JSON value.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Look up a top-level string option. Non-object metadata has no keys.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_metadata() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("metadata.json");
        fs::write(&path, r#"{"title": "Multipart", "biblio": {"a": 1}}"#)
            .await
            .unwrap();

        let metadata = Metadata::load(&path).await.unwrap();

        assert_eq!(metadata.get_str("title"), Some("Multipart"));
        assert_eq!(metadata.as_value()["biblio"]["a"], json!(1));
        assert_eq!(metadata.get_str("biblio"), None);
    }

    #[tokio::test]
    async fn test_missing_file_is_read_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("metadata.json");

        let err = Metadata::load(&path).await.unwrap_err();
        assert!(matches!(err, BuildError::MetadataRead { .. }));
    }

    #[tokio::test]
    async fn test_invalid_json_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("metadata.json");
        fs::write(&path, "{ \"title\": ").await.unwrap();

        let err = Metadata::load(&path).await.unwrap_err();
        match err {
            BuildError::MetadataParse { path: p, .. } => assert_eq!(p, path),
            other => panic!("Expected MetadataParse, got {other:?}"),
        }
    }

    #[test]
    fn test_default_is_empty_object() {
        let metadata = Metadata::default();
        assert_eq!(metadata.as_value(), &json!({}));
        assert_eq!(metadata.get_str("title"), None);
    }

    #[test]
    fn test_non_object_metadata_has_no_keys() {
        let metadata = Metadata::from(json!(["not", "an", "object"]));
        assert_eq!(metadata.get_str("title"), None);
    }
}
