//! Zip and tar.gz creation and extraction.
//!
//! Both formats share one member model ([`MemberPath`]) so that path
//! validation, common-root detection and collision renaming behave the same
//! way regardless of the container.

mod build;
mod extract;
mod member;

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub use build::build;
pub use extract::{Extraction, extract};
pub use member::{MemberKind, MemberPath};

const KNOWN_EXTENSIONS: [&str; 4] = [".tar.gz", ".tgz", ".tar", ".zip"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    TarGz,
}

impl ArchiveFormat {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::TarGz => "tar.gz",
        }
    }
}

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("unsafe absolute path '{0}'")]
    AbsolutePath(String),
    #[error("unsafe relative path '{0}'")]
    ParentTraversal(String),
    #[error("unsafe link target '{target}' for '{member}'")]
    LinkEscape { member: String, target: String },
    #[error("failed to {action} '{}': {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),
}

impl ArchiveError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// True when the archive was rejected for trying to escape its target.
    pub fn is_unsafe_path(&self) -> bool {
        matches!(
            self,
            Self::AbsolutePath(_) | Self::ParentTraversal(_) | Self::LinkEscape { .. }
        )
    }
}

/// Directory names that are never archived nor extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exclusions {
    segments: Vec<String>,
}

impl Exclusions {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn matches<'a, I>(&self, parts: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        parts
            .into_iter()
            .any(|part| self.segments.iter().any(|s| s == part))
    }

    pub fn matches_path(&self, relative: &Path) -> bool {
        self.matches(
            relative
                .components()
                .filter_map(|c| c.as_os_str().to_str()),
        )
    }
}

impl Default for Exclusions {
    fn default() -> Self {
        Self::new([".git"])
    }
}

/// Directory name derived from the archive file name, e.g. `bundle` for
/// `bundle.tar.gz`.
pub fn preferred_root_name(archive: &Path) -> String {
    let name = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let lower = name.to_ascii_lowercase();

    for ext in KNOWN_EXTENSIONS {
        if lower.ends_with(ext) && lower.len() > ext.len() {
            return name[..name.len() - ext.len()].to_string();
        }
    }

    archive
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "archive".to_string())
}

/// First of `base`, `base-1`, `base-2`, ... that does not exist in `dir`.
pub fn unique_dir_name(dir: &Path, base: &str) -> String {
    if dir.join(base).symlink_metadata().is_err() {
        return base.to_string();
    }
    let mut index = 1;
    loop {
        let candidate = format!("{base}-{index}");
        if dir.join(&candidate).symlink_metadata().is_err() {
            return candidate;
        }
        index += 1;
    }
}
