//! Applies an [`ImagePlan`] in two phases around a document write.
//!
//! `prepare` runs before the write: renames are performed and removals are
//! staged by moving the file aside. If the write fails the caller calls
//! `rollback` (or drops the handle) and every step is undone. If the write
//! succeeds `commit` unlinks the staged files; a failure at that point can
//! no longer undo the write, so it is logged and reported as a leftover.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::storage::{FileError, FileStorage};
use super::{FileOp, ImagePlan};

/// Appended to a file name while its removal is pending.
pub const TRASH_SUFFIX: &str = ".trash";

enum Applied {
    Renamed { from: PathBuf, to: PathBuf },
    Staged { original: PathBuf, staged: PathBuf },
}

/// File changes applied ahead of a document write, awaiting its outcome.
pub struct PreparedFiles<'a, F: FileStorage> {
    storage: &'a F,
    applied: Vec<Applied>,
}

/// What `commit` did with staged removals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImageOutcome {
    /// Files that are gone for good.
    pub removed: Vec<PathBuf>,
    /// Staged files that could not be unlinked and are now orphaned.
    pub leftovers: Vec<PathBuf>,
}

fn trash_path(path: &Path) -> PathBuf {
    let mut staged = OsString::from(path.as_os_str());
    staged.push(TRASH_SUFFIX);
    PathBuf::from(staged)
}

/// Run the pre-write phase of `plan`.
///
/// On error every step already taken is undone before returning.
pub fn prepare<'a, F: FileStorage>(
    storage: &'a F,
    plan: &ImagePlan,
) -> Result<PreparedFiles<'a, F>, FileError> {
    let mut prepared = PreparedFiles {
        storage,
        applied: Vec::with_capacity(plan.ops.len()),
    };

    for op in &plan.ops {
        let step = match op {
            FileOp::Rename { from, to } => storage.rename(from, to).map(|()| Applied::Renamed {
                from: from.clone(),
                to: to.clone(),
            }),
            FileOp::Remove { path } => {
                if !storage.exists(path) {
                    tracing::warn!(path = %path.display(), "image scheduled for removal is already gone");
                    continue;
                }
                let staged = trash_path(path);
                storage.rename(path, &staged).map(|()| Applied::Staged {
                    original: path.clone(),
                    staged,
                })
            }
        };

        match step {
            Ok(applied) => prepared.applied.push(applied),
            Err(err) => {
                tracing::warn!(error = %err, "image preparation failed, undoing");
                prepared.rollback();
                return Err(err);
            }
        }
    }

    Ok(prepared)
}

impl<'a, F: FileStorage> PreparedFiles<'a, F> {
    /// Number of steps that would be undone by `rollback`.
    pub fn pending(&self) -> usize {
        self.applied.len()
    }

    /// The document write succeeded: unlink staged files.
    pub fn commit(mut self) -> ImageOutcome {
        let mut outcome = ImageOutcome::default();
        for applied in self.applied.drain(..) {
            if let Applied::Staged { original, staged } = applied {
                match self.storage.remove(&staged) {
                    Ok(()) => outcome.removed.push(original),
                    Err(err) => {
                        tracing::warn!(error = %err, "staged image could not be removed");
                        outcome.leftovers.push(staged);
                    }
                }
            }
        }
        outcome
    }

    /// The document write failed: undo every applied step, newest first.
    pub fn rollback(mut self) {
        self.undo();
    }

    fn undo(&mut self) {
        while let Some(applied) = self.applied.pop() {
            let (from, to) = match &applied {
                Applied::Renamed { from, to } => (to, from),
                Applied::Staged { original, staged } => (staged, original),
            };
            if let Err(err) = self.storage.rename(from, to) {
                tracing::error!(error = %err, "could not undo image change");
            }
        }
    }
}

impl<F: FileStorage> Drop for PreparedFiles<'_, F> {
    fn drop(&mut self) {
        self.undo();
    }
}
