//! Finding the currently-active log file and detecting rotation.
//!
//! IRC clients rotate logs on session or day boundaries, so "the" log is
//! whichever file in the directory was modified most recently. The locator
//! tracks the identity of the active file and reports when a newer one
//! appears so the tailer can restart from offset zero.

use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Identity of a log file, used to tell rotation apart from in-place growth.
///
/// On unix two files are the same only if device and inode match, so a file
/// recreated under the same name still counts as a rotation. Elsewhere the
/// path is the best identity available; a same-path replacement is then
/// caught by the tailer's truncation check instead.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FileId {
    path: PathBuf,
    #[cfg(unix)]
    device: u64,
    #[cfg(unix)]
    inode: u64,
}

impl FileId {
    fn new(path: &Path, metadata: &Metadata) -> Self {
        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            Self {
                path: path.to_path_buf(),
                device: metadata.dev(),
                inode: metadata.ino(),
            }
        }
        #[cfg(not(unix))]
        {
            let _ = metadata;
            Self {
                path: path.to_path_buf(),
            }
        }
    }
}

/// The log file currently being tailed. At most one is active at a time.
#[derive(Debug, Clone)]
struct ActiveLog {
    path: PathBuf,
    id: FileId,
}

/// Change of active file reported by a poll cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rotation {
    /// First file located after startup. Tail from its current end: lines
    /// written while the process was down are never retroactively scanned.
    Initial(PathBuf),
    /// A newer file replaced the active one. Tail it from offset zero.
    NewFile(PathBuf),
}

/// Failure to scan the log directory.
///
/// Transient at runtime: the monitor logs it and retries next cycle with the
/// last known active file retained.
#[derive(Debug, thiserror::Error)]
#[error("failed to read log directory {dir}: {source}")]
pub struct LocateError {
    /// The directory that could not be listed.
    pub dir: PathBuf,
    /// The underlying I/O error.
    #[source]
    pub source: std::io::Error,
}

/// Selects the most recently modified file in the log directory and tracks
/// its identity across poll cycles.
#[derive(Debug)]
pub struct LogLocator {
    dir: PathBuf,
    active: Option<ActiveLog>,
}

impl LogLocator {
    /// Create a locator for the given directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            active: None,
        }
    }

    /// Path of the currently active log file, if one has been located.
    pub fn active_path(&self) -> Option<&Path> {
        self.active.as_ref().map(|a| a.path.as_path())
    }

    /// Scan the directory and update the active file.
    ///
    /// Hidden files (e.g. `.DS_Store`) and subdirectories are ignored. An
    /// empty directory at runtime retains the current active file and
    /// reports no change.
    ///
    /// # Errors
    ///
    /// Returns [`LocateError`] if the directory cannot be listed. The active
    /// file is left untouched so the caller can keep tailing it.
    pub fn poll(&mut self) -> Result<Option<Rotation>, LocateError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|source| LocateError {
            dir: self.dir.clone(),
            source,
        })?;

        let mut newest: Option<(PathBuf, Metadata, SystemTime)> = None;
        for entry in entries.flatten() {
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }
            let modified = metadata.modified().unwrap_or(UNIX_EPOCH);
            let path = entry.path();
            // Equal mtimes are broken by path so the winner is stable
            // across polls regardless of read_dir iteration order.
            let newer = newest.as_ref().is_none_or(|(current_path, _, current)| {
                modified > *current || (modified == *current && path > *current_path)
            });
            if newer {
                newest = Some((path, metadata, modified));
            }
        }

        let Some((path, metadata, _)) = newest else {
            return Ok(None);
        };
        let id = FileId::new(&path, &metadata);

        match &self.active {
            Some(active) if active.id == id => Ok(None),
            Some(_) => {
                self.active = Some(ActiveLog {
                    path: path.clone(),
                    id,
                });
                Ok(Some(Rotation::NewFile(path)))
            }
            None => {
                self.active = Some(ActiveLog {
                    path: path.clone(),
                    id,
                });
                Ok(Some(Rotation::Initial(path)))
            }
        }
    }
}
