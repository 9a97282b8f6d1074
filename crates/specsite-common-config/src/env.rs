//! Environment variable handling.

use std::path::Path;

/// Environment variable names.
pub mod vars {
    pub const SPECSITE_CONFIG: &str = "SPECSITE_CONFIG";
    pub const SPECSITE_ROOT: &str = "SPECSITE_ROOT";
    pub const SPECSITE_PORT: &str = "SPECSITE_PORT";
    pub const RUST_LOG: &str = "RUST_LOG";
}

/// Environment configuration.
pub struct Environment {
    _guard: (),
}

impl Environment {
    /// Load `.env` then `.env.local` from `dir`; later files override earlier
    /// ones. Missing files are skipped.
    pub fn init(dir: &Path) -> Self {
        let _ = dotenvy::from_path(dir.join(".env"));
        let _ = dotenvy::from_path_override(dir.join(".env.local"));

        Self { _guard: () }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::tempdir;

    #[test]
    fn test_init_loads_dotenv_files() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(".env"),
            "SPECSITE_TEST_DOTENV=base\nSPECSITE_TEST_DOTENV_ONLY=yes\n",
        )
        .unwrap();
        std::fs::write(dir.path().join(".env.local"), "SPECSITE_TEST_DOTENV=local\n").unwrap();

        Environment::init(dir.path());

        assert_eq!(env::var("SPECSITE_TEST_DOTENV").as_deref(), Ok("local"));
        assert_eq!(env::var("SPECSITE_TEST_DOTENV_ONLY").as_deref(), Ok("yes"));

        env::remove_var("SPECSITE_TEST_DOTENV");
        env::remove_var("SPECSITE_TEST_DOTENV_ONLY");
    }

    #[test]
    fn test_missing_dotenv_files_are_skipped() {
        let dir = tempdir().unwrap();
        Environment::init(dir.path());
        assert!(env::var("SPECSITE_TEST_NEVER_SET").is_err());
    }
}
