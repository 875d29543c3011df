use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

/// Failure of a single filesystem primitive, tagged with what was attempted.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("'{}' not found", .0.display())]
    NotFound(PathBuf),
    #[error("failed to {action} '{}': {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FsError {
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

/// Moves `from` to `to`, falling back to copy + delete when a plain rename
/// cannot cross filesystems.
pub fn move_path(from: &Path, to: &Path) -> Result<(), FsError> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::CrossesDevices => {
            log::debug!(
                "rename {} -> {} crosses devices, copying instead",
                from.display(),
                to.display()
            );
            copy_recursive(from, to)?;
            remove_path(from)
        }
        Err(err) => Err(FsError::io("move", from, err)),
    }
}

/// Copies a file, symlink or whole directory tree. Existing directories at
/// the destination are merged into; existing files are overwritten.
pub fn copy_recursive(from: &Path, to: &Path) -> Result<(), FsError> {
    let meta = fs::symlink_metadata(from).map_err(|err| FsError::io("inspect", from, err))?;
    if !meta.is_dir() {
        return copy_entry(from, to, &meta);
    }

    for entry in WalkDir::new(from).follow_links(false) {
        let entry = entry.map_err(|err| {
            let path = err.path().unwrap_or(from).to_path_buf();
            FsError::io("walk", path, err.into())
        })?;
        let relative = entry.path().strip_prefix(from).unwrap_or(entry.path());
        let destination = to.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&destination)
                .map_err(|err| FsError::io("create directory", &destination, err))?;
        } else {
            let meta = entry
                .path()
                .symlink_metadata()
                .map_err(|err| FsError::io("inspect", entry.path(), err))?;
            copy_entry(entry.path(), &destination, &meta)?;
        }
    }
    Ok(())
}

fn copy_entry(from: &Path, to: &Path, meta: &fs::Metadata) -> Result<(), FsError> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(|err| FsError::io("create directory", parent, err))?;
    }

    #[cfg(unix)]
    {
        if meta.file_type().is_symlink() {
            let target =
                fs::read_link(from).map_err(|err| FsError::io("read link", from, err))?;
            if to.symlink_metadata().is_ok() {
                remove_path(to)?;
            }
            return std::os::unix::fs::symlink(&target, to)
                .map_err(|err| FsError::io("create link", to, err));
        }
    }

    #[cfg(not(unix))]
    let _ = meta;

    fs::copy(from, to)
        .map(|_| ())
        .map_err(|err| FsError::io("copy", from, err))
}

/// Deletes a file, symlink or directory tree. Symlinks are removed, never
/// followed.
pub fn remove_path(path: &Path) -> Result<(), FsError> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(FsError::NotFound(path.to_path_buf()));
        }
        Err(err) => return Err(FsError::io("inspect", path, err)),
    };

    if meta.is_dir() {
        fs::remove_dir_all(path).map_err(|err| FsError::io("remove", path, err))
    } else {
        fs::remove_file(path).map_err(|err| FsError::io("remove", path, err))
    }
}
