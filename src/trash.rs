use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::fs::{FsError, move_path};

const TRASH_STAMP_FORMAT: &str = "%Y%m%d%H%M%S%6f";

/// Holding area for removed entries so that `rm` stays reversible.
#[derive(Debug, Clone)]
pub struct TrashStore {
    root: PathBuf,
}

impl TrashStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Moves `path` under the trash root as `<name>.<stamp>_<pid>` and
    /// returns where it landed.
    pub fn move_to_trash(&self, path: &Path) -> Result<PathBuf, FsError> {
        fs::create_dir_all(&self.root)
            .map_err(|err| FsError::io("create trash directory", &self.root, err))?;

        let trash_path = self.unique_entry(path);
        move_path(path, &trash_path)?;
        log::debug!("moved {} to trash {}", path.display(), trash_path.display());
        Ok(trash_path)
    }

    /// Puts a trashed entry back at `original`.
    pub fn restore(trash_path: &Path, original: &Path) -> Result<(), FsError> {
        if trash_path.symlink_metadata().is_err() {
            return Err(FsError::NotFound(trash_path.to_path_buf()));
        }
        if let Some(parent) = original.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| FsError::io("create directory", parent, err))?;
        }
        move_path(trash_path, original)
    }

    /// Current trash entries, sorted by name. A missing root means an empty
    /// trash.
    pub fn entries(&self) -> Result<Vec<PathBuf>, FsError> {
        let reader = match fs::read_dir(&self.root) {
            Ok(reader) => reader,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(FsError::io("read trash directory", &self.root, err)),
        };

        let mut entries = reader
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| FsError::io("read trash directory", &self.root, err))?;
        entries.sort();
        Ok(entries)
    }

    fn unique_entry(&self, path: &Path) -> PathBuf {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "item".to_string());
        let stamp = Local::now().format(TRASH_STAMP_FORMAT);
        let base = format!("{name}.{stamp}_{}", std::process::id());

        let mut candidate = self.root.join(&base);
        let mut counter = 1;
        while candidate.symlink_metadata().is_ok() {
            candidate = self.root.join(format!("{base}-{counter}"));
            counter += 1;
        }
        candidate
    }
}
