use std::path::{Path, PathBuf};

use async_trait::async_trait;
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::warn;

use crate::discovery::is_spec_source;
use crate::error::{BuildError, BuildResult};

/// A change the watch controller reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildEvent {
    /// A Markdown file appeared.
    SpecAdded(PathBuf),
    /// A Markdown file's contents changed.
    SpecChanged(PathBuf),
    /// A Markdown file disappeared.
    SpecRemoved(PathBuf),
    /// The metadata file was created, changed or removed.
    MetadataChanged(PathBuf),
}

impl BuildEvent {
    pub fn path(&self) -> &Path {
        match self {
            Self::SpecAdded(p) | Self::SpecChanged(p) | Self::SpecRemoved(p) => p,
            Self::MetadataChanged(p) => p,
        }
    }

    /// Short label used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SpecAdded(_) => "add",
            Self::SpecChanged(_) => "change",
            Self::SpecRemoved(_) => "unlink",
            Self::MetadataChanged(_) => "metadata",
        }
    }
}

/// Anything that yields build events. `None` means no more events will come.
#[async_trait]
pub trait EventSource: Send {
    async fn next_event(&mut self) -> Option<BuildEvent>;
}

#[async_trait]
impl EventSource for mpsc::Receiver<BuildEvent> {
    async fn next_event(&mut self) -> Option<BuildEvent> {
        self.recv().await
    }
}

const CHANNEL_CAPACITY: usize = 100;

/// Watch the spec directory (and the metadata file) for changes
pub struct SpecDirectoryWatcher {
    _watcher: notify::RecommendedWatcher,
    receiver: mpsc::Receiver<BuildEvent>,
}

impl SpecDirectoryWatcher {
    /// Start watching `spec_dir` non-recursively. The directory holding
    /// `metadata_path` is watched as well when it is not `spec_dir`.
    pub fn new(spec_dir: PathBuf, metadata_path: PathBuf) -> BuildResult<Self> {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

        let classify_dir = spec_dir.clone();
        let classify_metadata = metadata_path.clone();
        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) => {
                    for build_event in classify_event(&event, &classify_dir, &classify_metadata) {
                        // Receiver gone means the controller stopped.
                        if tx.blocking_send(build_event).is_err() {
                            return;
                        }
                    }
                }
                Err(e) => warn!(error = %e, "file watcher error"),
            }
        })
        .map_err(|source| BuildError::Watch {
            path: spec_dir.clone(),
            source,
        })?;

        watcher
            .watch(&spec_dir, RecursiveMode::NonRecursive)
            .map_err(|source| BuildError::Watch {
                path: spec_dir.clone(),
                source,
            })?;
        // The metadata file's directory rather than the file itself, so the
        // watch survives the file being absent or replaced by a rename.
        if let Some(dir) = metadata_path.parent().filter(|dir| *dir != spec_dir.as_path()) {
            if let Err(e) = watcher.watch(dir, RecursiveMode::NonRecursive) {
                warn!(
                    path = %dir.display(),
                    error = %e,
                    "metadata directory is not watched"
                );
            }
        }

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
        })
    }
}

#[async_trait]
impl EventSource for SpecDirectoryWatcher {
    async fn next_event(&mut self) -> Option<BuildEvent> {
        self.receiver.recv().await
    }
}

/// Map a raw file-system event onto build events. Events on files that are
/// neither Markdown nor the metadata file are dropped, as are access and
/// permission changes.
pub fn classify_event(event: &Event, spec_dir: &Path, metadata_path: &Path) -> Vec<BuildEvent> {
    let targets = Targets {
        spec_dir,
        metadata_path,
    };
    let mut out = Vec::new();

    match &event.kind {
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) if event.paths.len() == 2 => {
            targets.push_removed(&mut out, &event.paths[0]);
            targets.push_added(&mut out, &event.paths[1]);
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            for path in &event.paths {
                targets.push_removed(&mut out, path);
            }
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            for path in &event.paths {
                targets.push_added(&mut out, path);
            }
        }
        // Backends that cannot tell which side of a rename they saw.
        EventKind::Modify(ModifyKind::Name(_)) => {
            for path in &event.paths {
                if path.exists() {
                    targets.push_added(&mut out, path);
                } else {
                    targets.push_removed(&mut out, path);
                }
            }
        }
        EventKind::Modify(ModifyKind::Metadata(_)) => {}
        EventKind::Create(_) => {
            for path in &event.paths {
                targets.push_added(&mut out, path);
            }
        }
        EventKind::Modify(_) => {
            for path in &event.paths {
                if path == metadata_path {
                    out.push(BuildEvent::MetadataChanged(path.clone()));
                } else if targets.is_spec(path) {
                    out.push(BuildEvent::SpecChanged(path.clone()));
                }
            }
        }
        EventKind::Remove(_) => {
            for path in &event.paths {
                targets.push_removed(&mut out, path);
            }
        }
        EventKind::Access(_) | EventKind::Any | EventKind::Other => {}
    }

    out
}

struct Targets<'a> {
    spec_dir: &'a Path,
    metadata_path: &'a Path,
}

impl Targets<'_> {
    /// Markdown directly inside the spec directory. Markdown next to an
    /// external metadata file is not a spec.
    fn is_spec(&self, path: &Path) -> bool {
        path.parent() == Some(self.spec_dir) && is_spec_source(path)
    }

    fn push_added(&self, out: &mut Vec<BuildEvent>, path: &Path) {
        if path == self.metadata_path {
            out.push(BuildEvent::MetadataChanged(path.to_path_buf()));
        } else if self.is_spec(path) {
            out.push(BuildEvent::SpecAdded(path.to_path_buf()));
        }
    }

    fn push_removed(&self, out: &mut Vec<BuildEvent>, path: &Path) {
        if path == self.metadata_path {
            out.push(BuildEvent::MetadataChanged(path.to_path_buf()));
        } else if self.is_spec(path) {
            out.push(BuildEvent::SpecRemoved(path.to_path_buf()));
        }
    }
}
