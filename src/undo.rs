use std::fs;
use std::path::PathBuf;

use thiserror::Error;

use crate::fs::{FsError, move_path, remove_path};
use crate::trash::TrashStore;

/// A reversible record of something cp, mv or rm did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoAction {
    Copy { target: PathBuf },
    Move { source: PathBuf, destination: PathBuf },
    Remove { original: PathBuf, trash: PathBuf },
}

impl UndoAction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Copy { .. } => "cp",
            Self::Move { .. } => "mv",
            Self::Remove { .. } => "rm",
        }
    }

    fn revert(&self) -> Result<String, UndoError> {
        match self {
            Self::Copy { target } => {
                if target.symlink_metadata().is_err() {
                    return Err(UndoError::MissingCopy(target.clone()));
                }
                remove_path(target)?;
                log::debug!("undo copy removed {}", target.display());
                Ok(format!("Undo: removed '{}'", target.display()))
            }
            Self::Move {
                source,
                destination,
            } => {
                if destination.symlink_metadata().is_err() {
                    return Err(UndoError::MissingMove(destination.clone()));
                }
                if source.symlink_metadata().is_ok() {
                    return Err(UndoError::Occupied(source.clone()));
                }
                if let Some(parent) = source.parent() {
                    fs::create_dir_all(parent)
                        .map_err(|err| FsError::io("create directory", parent, err))?;
                }
                move_path(destination, source)?;
                log::debug!(
                    "undo move restored {} from {}",
                    source.display(),
                    destination.display()
                );
                Ok(format!("Undo: moved back to '{}'", source.display()))
            }
            Self::Remove { original, trash } => {
                if trash.symlink_metadata().is_err() {
                    return Err(UndoError::MissingTrash(trash.clone()));
                }
                if original.symlink_metadata().is_ok() {
                    return Err(UndoError::Occupied(original.clone()));
                }
                TrashStore::restore(trash, original)?;
                log::debug!(
                    "undo remove restored {} from {}",
                    original.display(),
                    trash.display()
                );
                Ok(format!("Undo: restored '{}'", original.display()))
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum UndoError {
    #[error("nothing to undo")]
    Empty,
    #[error("copied target '{}' no longer exists", .0.display())]
    MissingCopy(PathBuf),
    #[error("moved target '{}' not found", .0.display())]
    MissingMove(PathBuf),
    #[error("trash entry '{}' missing", .0.display())]
    MissingTrash(PathBuf),
    #[error("'{}' already exists, not overwriting it", .0.display())]
    Occupied(PathBuf),
    #[error(transparent)]
    Fs(#[from] FsError),
}

/// Session-lifetime stack of reversible actions.
#[derive(Debug, Default)]
pub struct UndoLedger {
    actions: Vec<UndoAction>,
}

impl UndoLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, action: UndoAction) {
        self.actions.push(action);
    }

    pub fn pop(&mut self) -> Option<UndoAction> {
        self.actions.pop()
    }

    pub fn last(&self) -> Option<&UndoAction> {
        self.actions.last()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Reverses the most recent action. A failed reversal puts the action
    /// back on top so it can be retried.
    pub fn undo_last(&mut self) -> Result<String, UndoError> {
        let action = self.pop().ok_or(UndoError::Empty)?;
        match action.revert() {
            Ok(message) => Ok(message),
            Err(err) => {
                log::debug!("undo of {} failed, keeping it: {err}", action.label());
                self.push(action);
                Err(err)
            }
        }
    }
}
