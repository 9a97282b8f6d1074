//! Configuration file loading and parsing.

use crate::types::SiteConfig;
use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the optional config file in the project root.
pub const CONFIG_FILE_NAME: &str = "specsite.yaml";

/// Config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read config: {source}")]
    ReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("invalid YAML at line {}: {message}", line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    ParseError { line: Option<usize>, message: String },

    #[error("validation error: {message}")]
    ValidationError { message: String },

    #[error("environment variable not found: {var}")]
    EnvVarNotFound { var: String },
}

/// Configuration loader.
pub struct ConfigLoader {
    base_path: PathBuf,
}

impl ConfigLoader {
    /// Create a loader for the given project directory.
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        Self {
            base_path: project_dir.as_ref().to_path_buf(),
        }
    }

    /// Load `specsite.yaml` from the project directory, or defaults when the
    /// file does not exist.
    pub fn load(&self) -> Result<SiteConfig, ConfigError> {
        let config_path = self.base_path.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            let config = SiteConfig::default();
            self.validate(&config)?;
            return Ok(config);
        }

        self.load_from(&config_path)
    }

    /// Load an explicitly named config file. A missing file is an error.
    pub fn load_from(&self, config_path: &Path) -> Result<SiteConfig, ConfigError> {
        if !config_path.exists() {
            return Err(ConfigError::NotFound {
                path: config_path.to_path_buf(),
            });
        }

        let contents = std::fs::read_to_string(config_path)?;
        let expanded = self.expand_env_vars(&contents)?;

        // An empty file deserializes to unit, not to a mapping.
        if expanded.trim().is_empty() {
            return Ok(SiteConfig::default());
        }

        let config: SiteConfig =
            serde_yaml::from_str(&expanded).map_err(|e| ConfigError::ParseError {
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?;

        self.validate(&config)?;
        Ok(config)
    }

    /// Expand environment variables in the form `${VAR}` or `${VAR:-default}`.
    fn expand_env_vars(&self, content: &str) -> Result<String, ConfigError> {
        let re = Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}").expect("valid env var pattern");
        let mut result = content.to_string();

        for cap in re.captures_iter(content) {
            let full_match = &cap[0];
            let var_name = &cap[1];
            let default = cap.get(2).map(|m| m.as_str());

            let value = match std::env::var(var_name) {
                Ok(v) => v,
                Err(_) => match default {
                    Some(d) => d.to_string(),
                    None => {
                        return Err(ConfigError::EnvVarNotFound {
                            var: var_name.to_string(),
                        })
                    }
                },
            };

            result = result.replace(full_match, &value);
        }

        Ok(result)
    }

    /// Validate configuration values.
    pub fn validate(&self, config: &SiteConfig) -> Result<(), ConfigError> {
        if config.title.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "title must not be empty".to_string(),
            });
        }

        if config.server.port == 0 {
            return Err(ConfigError::ValidationError {
                message: "server.port must be greater than 0".to_string(),
            });
        }

        if config.metadata_file.extension().and_then(|e| e.to_str()) != Some("json") {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "metadata_file must be a .json file, got {}",
                    config.metadata_file.display()
                ),
            });
        }

        if config.spec_dir == config.output_dir {
            return Err(ConfigError::ValidationError {
                message: "output_dir must differ from spec_dir".to_string(),
            });
        }

        Ok(())
    }
}
