//! Image lifecycle - the uploaded file behind `Item::image`.
//!
//! An item owns at most one stored image. Planning is pure: the
//! [`ImageManager`] turns "what was uploaded / what was asked for" into an
//! [`ImagePlan`] (the new `image` value plus the file operations needed).
//! [`prepare`] then applies the plan around the document write so that a
//! failed write leaves the filesystem as it was.

mod executor;
mod storage;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use executor::{prepare, ImageOutcome, PreparedFiles, TRASH_SUFFIX};
pub use storage::{FileError, FileStorage, LocalFileStorage};

/// One uploaded file as handed over by the upload intake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upload {
    /// Where the intake wrote the bytes.
    pub temporary_path: PathBuf,
    /// File name component of `temporary_path`.
    pub temporary_name: String,
    /// Name of the file on the client.
    pub original_filename: String,
}

impl Upload {
    pub fn new(temporary_path: impl Into<PathBuf>, original_filename: impl Into<String>) -> Self {
        let temporary_path = temporary_path.into();
        let temporary_name = temporary_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            temporary_path,
            temporary_name,
            original_filename: original_filename.into(),
        }
    }

    /// Extension of the original filename: the text after the final `.` of
    /// its last path component. Anything but ASCII letters and digits is
    /// not an extension.
    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.original_filename)
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
    }

    /// Filename the upload is stored under: the temporary name with the
    /// original extension appended unless it already ends with it.
    pub fn stored_name(&self) -> String {
        match self.extension() {
            Some(ext) if !self.temporary_name.ends_with(&format!(".{}", ext)) => {
                format!("{}.{}", self.temporary_name, ext)
            }
            _ => self.temporary_name.clone(),
        }
    }
}

/// A filesystem step scheduled by a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum FileOp {
    Rename { from: PathBuf, to: PathBuf },
    Remove { path: PathBuf },
}

/// What happens to `Item::image`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ImageChange {
    Keep,
    Set(String),
    Clear,
}

impl ImageChange {
    /// The image value after applying this change to `current`.
    pub fn apply(&self, current: Option<String>) -> Option<String> {
        match self {
            ImageChange::Keep => current,
            ImageChange::Set(name) => Some(name.clone()),
            ImageChange::Clear => None,
        }
    }
}

/// The new image value and the file operations that realize it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImagePlan {
    pub image: ImageChange,
    pub ops: Vec<FileOp>,
}

impl ImagePlan {
    pub fn none() -> Self {
        Self {
            image: ImageChange::Keep,
            ops: Vec::new(),
        }
    }

    pub fn renames(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, FileOp::Rename { .. }))
            .count()
    }

    pub fn removals(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, FileOp::Remove { .. }))
            .count()
    }
}

/// Plans image file operations for items stored under one directory.
#[derive(Debug, Clone)]
pub struct ImageManager {
    image_dir: PathBuf,
}

impl ImageManager {
    pub fn new(image_dir: impl Into<PathBuf>) -> Self {
        Self {
            image_dir: image_dir.into(),
        }
    }

    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }

    /// Absolute path of a stored image.
    pub fn path_of(&self, filename: &str) -> PathBuf {
        self.image_dir.join(filename)
    }

    fn store_upload(&self, upload: &Upload, ops: &mut Vec<FileOp>) -> String {
        let stored = upload.stored_name();
        let target = self.path_of(&stored);
        if target != upload.temporary_path {
            ops.push(FileOp::Rename {
                from: upload.temporary_path.clone(),
                to: target,
            });
        }
        stored
    }

    /// Image handling on item creation.
    pub fn plan_attach(&self, upload: Option<&Upload>) -> ImagePlan {
        match upload {
            Some(upload) => {
                let mut ops = Vec::new();
                let stored = self.store_upload(upload, &mut ops);
                ImagePlan {
                    image: ImageChange::Set(stored),
                    ops,
                }
            }
            None => ImagePlan::none(),
        }
    }

    /// Image handling on item update.
    ///
    /// A new upload wins over `delete_requested`; the old file is removed
    /// either way when one existed.
    pub fn plan_replace(
        &self,
        current: Option<&str>,
        upload: Option<&Upload>,
        delete_requested: bool,
    ) -> ImagePlan {
        match (upload, delete_requested) {
            (Some(upload), _) => {
                let mut ops = Vec::new();
                let stored = self.store_upload(upload, &mut ops);
                if let Some(old) = current.filter(|old| *old != stored) {
                    ops.push(FileOp::Remove {
                        path: self.path_of(old),
                    });
                }
                ImagePlan {
                    image: ImageChange::Set(stored),
                    ops,
                }
            }
            (None, true) => ImagePlan {
                image: ImageChange::Clear,
                ops: current
                    .map(|old| FileOp::Remove {
                        path: self.path_of(old),
                    })
                    .into_iter()
                    .collect(),
            },
            (None, false) => ImagePlan::none(),
        }
    }

    /// Image handling once an item delete has been allowed.
    pub fn plan_remove(&self, current: Option<&str>) -> ImagePlan {
        match current {
            Some(old) => ImagePlan {
                image: ImageChange::Clear,
                ops: vec![FileOp::Remove {
                    path: self.path_of(old),
                }],
            },
            None => ImagePlan::none(),
        }
    }
}
