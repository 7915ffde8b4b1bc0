//! Cleanup of partially written exports.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use stepcast_common::error::StepcastResult;

/// Records every file and directory an export creates and removes them
/// again on drop unless [`ArtifactGuard::commit`] was called.
///
/// Files that already existed are moved aside before being overwritten and
/// put back on rollback, so a failed export leaves an earlier one intact.
#[derive(Debug, Default)]
pub(crate) struct ArtifactGuard {
    files: Vec<PathBuf>,
    /// `(backup, original)` pairs.
    backups: Vec<(PathBuf, PathBuf)>,
    dirs: Vec<PathBuf>,
    committed: bool,
}

impl ArtifactGuard {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Create `dir` and any missing ancestors, tracking the ones created here.
    pub(crate) fn create_dir_all(&mut self, dir: &Path) -> StepcastResult<()> {
        let missing: Vec<PathBuf> = dir
            .ancestors()
            .filter(|p| !p.as_os_str().is_empty())
            .take_while(|p| !p.exists())
            .map(Path::to_path_buf)
            .collect();

        for path in missing.into_iter().rev() {
            fs::create_dir(&path)?;
            self.dirs.push(path);
        }
        Ok(())
    }

    /// Write `bytes` to `path`, tracking the file.
    pub(crate) fn write(&mut self, path: &Path, bytes: &[u8]) -> StepcastResult<()> {
        if path.is_file() {
            let backup = backup_path(path)?;
            fs::rename(path, &backup)?;
            self.backups.push((backup, path.to_path_buf()));
        }
        self.files.push(path.to_path_buf());
        fs::write(path, bytes)?;
        Ok(())
    }

    /// Keep everything written so far.
    pub(crate) fn commit(mut self) {
        self.committed = true;
    }

    fn discard_backups(&self) {
        for (backup, _) in &self.backups {
            if let Err(e) = fs::remove_file(backup) {
                tracing::warn!(path = %backup.display(), error = %e, "Failed to remove export backup");
            }
        }
    }

    fn roll_back(&self) {
        for file in self.files.iter().rev() {
            match fs::remove_file(file) {
                Ok(()) => tracing::debug!(path = %file.display(), "Removed partial export file"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(path = %file.display(), error = %e, "Failed to remove partial export file")
                }
            }
        }

        for (backup, original) in self.backups.iter().rev() {
            match fs::rename(backup, original) {
                Ok(()) => tracing::debug!(path = %original.display(), "Restored previous export file"),
                Err(e) => {
                    tracing::warn!(path = %original.display(), error = %e, "Failed to restore previous export file")
                }
            }
        }

        // Only empty directories are removed; anything else was not ours.
        for dir in self.dirs.iter().rev() {
            if fs::remove_dir(dir).is_ok() {
                tracing::debug!(path = %dir.display(), "Removed export directory");
            }
        }
    }
}

impl Drop for ArtifactGuard {
    fn drop(&mut self) {
        if self.committed {
            self.discard_backups();
        } else {
            self.roll_back();
        }
    }
}

/// Hidden sibling that holds the previous contents of `path`.
fn backup_path(path: &Path) -> StepcastResult<PathBuf> {
    let name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not a file path", path.display()),
        )
    })?;
    let mut backup = OsString::from(".");
    backup.push(name);
    backup.push(".bak");
    Ok(path.with_file_name(backup))
}
