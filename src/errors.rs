use std::io;

use thiserror::Error;

use crate::archive::ArchiveError;
use crate::fs::FsError;
use crate::history::HistoryError;
use crate::undo::UndoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Usage,
    NotFound,
    TypeMismatch,
    UnsafePath,
    PermissionDenied,
    UndoFailure,
    Io,
}

/// Everything a built-in can report back to the user. The display text is
/// the message shown in the error box and written to the log.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    TypeMismatch(String),
    #[error("{0}")]
    PermissionDenied(String),
    #[error("{command}: command not found")]
    UnknownCommand { command: String },
    #[error("{command}: {source}")]
    Archive {
        command: &'static str,
        #[source]
        source: ArchiveError,
    },
    #[error("undo: {0}")]
    Undo(#[from] UndoError),
    #[error("{command}: {source}")]
    Fs {
        command: &'static str,
        #[source]
        source: FsError,
    },
    #[error("history: {0}")]
    History(#[from] HistoryError),
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl ShellError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self::TypeMismatch(message.into())
    }

    pub fn fs(command: &'static str, source: FsError) -> Self {
        Self::Fs { command, source }
    }

    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Usage(_) | Self::UnknownCommand { .. } => ErrorKind::Usage,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::TypeMismatch(_) => ErrorKind::TypeMismatch,
            Self::PermissionDenied(_) => ErrorKind::PermissionDenied,
            Self::Archive { source, .. } if source.is_unsafe_path() => ErrorKind::UnsafePath,
            Self::Archive { .. } => ErrorKind::Io,
            Self::Undo(_) => ErrorKind::UndoFailure,
            Self::Fs {
                source: FsError::NotFound(_),
                ..
            } => ErrorKind::NotFound,
            Self::Fs { .. } | Self::History(_) | Self::Io { .. } => ErrorKind::Io,
        }
    }
}
