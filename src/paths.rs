use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use directories::BaseDirs;

use crate::constants::HOME_MARKER;

/// Turns user-typed paths into absolute, canonical ones relative to the
/// session's working directory.
#[derive(Debug, Clone)]
pub struct PathResolver {
    home: PathBuf,
}

impl PathResolver {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self {
            home: canonicalize_lenient(&home.into()),
        }
    }

    pub fn from_env() -> Result<Self> {
        let base = BaseDirs::new().context("failed to determine home directory")?;
        Ok(Self::new(base.home_dir()))
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Resolves `raw` against `cwd`. Never fails: components that do not
    /// exist yet are applied lexically on top of the deepest existing
    /// ancestor.
    pub fn resolve(&self, raw: &str, cwd: &Path) -> PathBuf {
        let candidate = match self.expand_home(raw) {
            Some(expanded) => expanded,
            None => {
                let path = Path::new(raw);
                if path.is_absolute() {
                    path.to_path_buf()
                } else {
                    cwd.join(path)
                }
            }
        };
        canonicalize_lenient(&candidate)
    }

    /// Expands `~` and `~/rest`. `~name` is left alone.
    pub fn expand_home(&self, raw: &str) -> Option<PathBuf> {
        if raw == HOME_MARKER {
            return Some(self.home.clone());
        }
        raw.strip_prefix("~/").map(|rest| self.home.join(rest))
    }
}

fn canonicalize_lenient(path: &Path) -> PathBuf {
    let components: Vec<Component<'_>> = path.components().collect();

    for split in (1..=components.len()).rev() {
        let prefix: PathBuf = components[..split].iter().collect();
        if let Ok(mut base) = prefix.canonicalize() {
            push_lexically(&mut base, &components[split..]);
            return base;
        }
    }

    let mut normalized = PathBuf::new();
    push_lexically(&mut normalized, &components);
    normalized
}

fn push_lexically(base: &mut PathBuf, components: &[Component<'_>]) {
    for component in components {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                base.pop();
            }
            other => base.push(other.as_os_str()),
        }
    }
}
