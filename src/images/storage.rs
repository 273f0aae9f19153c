//! FileStorage - Filesystem operations used by the image lifecycle.

use std::fmt;
use std::path::{Path, PathBuf};

/// Error type for file storage operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileError {
    Rename {
        from: PathBuf,
        to: PathBuf,
        message: String,
    },
    Remove {
        path: PathBuf,
        message: String,
    },
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileError::Rename { from, to, message } => write!(
                f,
                "rename {} -> {} failed: {}",
                from.display(),
                to.display(),
                message
            ),
            FileError::Remove { path, message } => {
                write!(f, "remove {} failed: {}", path.display(), message)
            }
        }
    }
}

impl std::error::Error for FileError {}

/// Abstract file storage for uploaded images.
pub trait FileStorage: Send + Sync {
    /// Move a file. Fails if the source does not exist.
    fn rename(&self, from: &Path, to: &Path) -> Result<(), FileError>;

    /// Delete a file. Fails if it does not exist.
    fn remove(&self, path: &Path) -> Result<(), FileError>;

    /// Whether a file exists at `path`.
    fn exists(&self, path: &Path) -> bool;
}

/// File storage on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileStorage;

impl LocalFileStorage {
    pub fn new() -> Self {
        Self
    }
}

impl FileStorage for LocalFileStorage {
    fn rename(&self, from: &Path, to: &Path) -> Result<(), FileError> {
        std::fs::rename(from, to).map_err(|e| FileError::Rename {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn remove(&self, path: &Path) -> Result<(), FileError> {
        std::fs::remove_file(path).map_err(|e| FileError::Remove {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}
