use std::path::PathBuf;

use super::{ArchiveError, Exclusions};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberKind {
    File,
    Directory,
    Symlink(String),
    /// Hard links, devices, fifos: listed but never written.
    Unsupported,
}

/// Validated, relative location of an archive member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberPath {
    raw: String,
    segments: Vec<String>,
    kind: MemberKind,
}

impl MemberPath {
    /// Parses a raw member name. `Ok(None)` means the member is skipped
    /// (excluded directory or no path segments at all); unsafe names are
    /// errors.
    pub fn parse(
        raw: &str,
        kind: MemberKind,
        exclusions: &Exclusions,
    ) -> Result<Option<Self>, ArchiveError> {
        if exclusions.matches(raw.split(['/', '\\'])) {
            return Ok(None);
        }
        if is_absolute(raw) {
            return Err(ArchiveError::AbsolutePath(raw.to_string()));
        }

        let mut segments = Vec::new();
        for part in raw.split(['/', '\\']) {
            match part {
                "" | "." => {}
                ".." => return Err(ArchiveError::ParentTraversal(raw.to_string())),
                other => segments.push(other.to_string()),
            }
        }
        if segments.is_empty() {
            return Ok(None);
        }

        let member = Self {
            raw: raw.to_string(),
            segments,
            kind,
        };
        member.check_link()?;
        Ok(Some(member))
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> &MemberKind {
        &self.kind
    }

    pub fn top_level(&self) -> &str {
        &self.segments[0]
    }

    /// True when the first segment is a directory in the extracted tree.
    pub fn has_directory_root(&self) -> bool {
        self.segments.len() > 1 || self.kind == MemberKind::Directory
    }

    /// Relative path with the leading segment replaced by `root`.
    pub fn rerooted(&self, root: &str) -> PathBuf {
        let mut path = PathBuf::from(root);
        for segment in &self.segments[1..] {
            path.push(segment);
        }
        path
    }

    pub fn relative(&self) -> PathBuf {
        self.segments.iter().collect()
    }

    /// Symlink targets may point anywhere inside the extraction target but
    /// must not climb above it.
    fn check_link(&self) -> Result<(), ArchiveError> {
        let MemberKind::Symlink(target) = &self.kind else {
            return Ok(());
        };
        let escape = || ArchiveError::LinkEscape {
            member: self.raw.clone(),
            target: target.clone(),
        };
        if is_absolute(target) {
            return Err(escape());
        }

        let mut depth = self.segments.len() - 1;
        for part in target.split(['/', '\\']) {
            match part {
                "" | "." => {}
                ".." => depth = depth.checked_sub(1).ok_or_else(escape)?,
                _ => depth += 1,
            }
        }
        Ok(())
    }
}

/// The single top-level directory shared by every member, if there is one.
pub(crate) fn common_root(members: &[MemberPath]) -> Option<&str> {
    let first = members.first()?.top_level();
    if members.iter().any(|m| m.top_level() != first) {
        return None;
    }
    members
        .iter()
        .any(MemberPath::has_directory_root)
        .then_some(first)
}

fn is_absolute(raw: &str) -> bool {
    if raw.starts_with('/') || raw.starts_with('\\') {
        return true;
    }
    let bytes = raw.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}
