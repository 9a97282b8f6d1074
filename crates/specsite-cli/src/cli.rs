//! CLI argument definitions using clap derive macros.

use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, ValueHint};
use specsite_common_config::{vars, ConfigLoader, SiteConfig, SitePaths};
use specsite_common_log::LogLevel;

use crate::error::CliError;

/// Build a versioned Markdown specification into a static HTML site.
///
/// Every `*v<N>*.md` file in the spec directory becomes `<name>.html` in the
/// output directory, plus an `index.html` listing the versions newest first.
#[derive(Debug, Parser)]
#[command(name = "specsite", author, version, about, long_about = None)]
pub struct Cli {
    /// Keep running: rebuild on changes and serve the output directory
    #[arg(short, long)]
    pub watch: bool,

    /// Project root that relative paths resolve against
    #[arg(long, env = vars::SPECSITE_ROOT, value_hint = ValueHint::DirPath)]
    pub root: Option<PathBuf>,

    /// Directory holding the Markdown sources
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub spec_dir: Option<PathBuf>,

    /// Directory the site is written to
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub out_dir: Option<PathBuf>,

    /// Metadata JSON file, relative to the spec directory
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub metadata: Option<PathBuf>,

    /// Dev server port
    #[arg(long, env = vars::SPECSITE_PORT)]
    pub port: Option<u16>,

    /// Path to configuration file
    #[arg(long, env = vars::SPECSITE_CONFIG, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Everything a build needs once config file and flags are merged.
#[derive(Debug, Clone)]
pub struct Settings {
    pub paths: SitePaths,
    pub title: String,
    pub port: u16,
    pub watch: bool,
}

impl Cli {
    /// Log level requested on the command line, if any.
    pub fn log_level(&self) -> Option<LogLevel> {
        if self.verbose > 0 || self.quiet {
            Some(LogLevel::from_verbosity(self.verbose, self.quiet))
        } else {
            None
        }
    }

    /// Absolute project root: `--root` resolved against the working
    /// directory, else the working directory itself.
    pub fn root(&self) -> PathBuf {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        match &self.root {
            Some(root) => cwd.join(root),
            None => cwd,
        }
    }

    /// Load the config file and apply command-line overrides.
    pub fn load_config(&self, root: &Path) -> Result<SiteConfig, CliError> {
        let loader = ConfigLoader::new(root);

        let mut config = match &self.config {
            Some(path) if path.is_absolute() => loader.load_from(path)?,
            Some(path) => loader.load_from(&root.join(path))?,
            None => loader.load()?,
        };

        if let Some(spec_dir) = &self.spec_dir {
            config.spec_dir = spec_dir.clone();
        }
        if let Some(out_dir) = &self.out_dir {
            config.output_dir = out_dir.clone();
        }
        if let Some(metadata) = &self.metadata {
            config.metadata_file = metadata.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }

        loader.validate(&config)?;
        Ok(config)
    }

    /// Resolve the final settings for this invocation.
    pub fn settings(&self) -> Result<Settings, CliError> {
        let root = self.root();
        let config = self.load_config(&root)?;

        Ok(Settings {
            paths: config.resolve(&root),
            title: config.title,
            port: config.server.port,
            watch: self.watch,
        })
    }
}
