use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::archive::Exclusions;
use crate::config::Config;
use crate::history::HistoryLog;
use crate::paths::PathResolver;
use crate::trash::TrashStore;
use crate::undo::{UndoAction, UndoLedger};

/// Asks the user to approve a destructive step.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

/// Prompts on stdout and waits for a line on stdin; only `y` approves.
#[derive(Debug, Default)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        print!("{prompt}");
        io::stdout().flush().ok();
        let mut input = String::new();
        if io::stdin().lock().read_line(&mut input).is_err() {
            return false;
        }
        input.trim().eq_ignore_ascii_case("y")
    }
}

/// Always gives the same answer. Used by tests and non-interactive runs.
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl Confirm for FixedAnswer {
    fn confirm(&mut self, prompt: &str) -> bool {
        log::debug!("auto-answering '{}' with {}", prompt.trim(), self.0);
        self.0
    }
}

/// Everything a built-in may read or change while running.
pub struct Session {
    pub cwd: PathBuf,
    resolver: PathResolver,
    ledger: UndoLedger,
    trash: TrashStore,
    history: HistoryLog,
    exclusions: Exclusions,
    history_limit: usize,
    confirm: Box<dyn Confirm>,
}

impl Session {
    /// Builds a session rooted at `home`. Configured storage paths go
    /// through the same `~` expansion as user input.
    pub fn new(config: &Config, home: impl Into<PathBuf>, confirm: Box<dyn Confirm>) -> Self {
        let resolver = PathResolver::new(home);
        let home = resolver.home().to_path_buf();
        let trash = TrashStore::new(resolver.resolve(&config.storage.trash_dir, &home));
        let history = HistoryLog::new(resolver.resolve(&config.storage.history_file, &home));

        Self {
            cwd: home,
            resolver,
            ledger: UndoLedger::new(),
            trash,
            history,
            exclusions: Exclusions::new(config.archive.excluded_dirs.iter().cloned()),
            history_limit: config.history.default_limit.max(1),
            confirm,
        }
    }

    pub fn resolve(&self, raw: &str) -> PathBuf {
        self.resolver.resolve(raw, &self.cwd)
    }

    pub fn home(&self) -> &Path {
        self.resolver.home()
    }

    pub fn ledger(&self) -> &UndoLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut UndoLedger {
        &mut self.ledger
    }

    pub fn record(&mut self, action: UndoAction) {
        log::debug!("recorded {} for undo", action.label());
        self.ledger.push(action);
    }

    pub fn trash(&self) -> &TrashStore {
        &self.trash
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn exclusions(&self) -> &Exclusions {
        &self.exclusions
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    pub fn confirm(&mut self, prompt: &str) -> bool {
        self.confirm.confirm(prompt)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::Path;

    use super::{FixedAnswer, Session};
    use crate::config::Config;

    /// A session whose home, trash and history all live under `root`.
    pub fn session_in(root: &Path, answer: bool) -> Session {
        let mut config = Config::default();
        config.storage.trash_dir = root.join(".trash").to_string_lossy().into_owned();
        config.storage.history_file = root.join("history.log").to_string_lossy().into_owned();
        let home = root.join("home");
        std::fs::create_dir_all(&home).unwrap();
        let home = home.canonicalize().unwrap();
        Session::new(&config, home, Box::new(FixedAnswer(answer)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn storage_paths_expand_home() {
        let tmp = TempDir::new().unwrap();
        let home = tmp.path().canonicalize().unwrap();
        let session = Session::new(&Config::default(), &home, Box::new(FixedAnswer(true)));

        assert_eq!(session.cwd, home);
        assert_eq!(session.trash().root(), home.join(".minishell/trash"));
        assert_eq!(session.history().path(), home.join(".minishell/history.log"));
        assert_eq!(session.history_limit(), 10);
        assert_eq!(session.exclusions(), &Exclusions::default());
    }

    #[test]
    fn fixed_answer_is_returned_verbatim() {
        let mut yes = FixedAnswer(true);
        let mut no = FixedAnswer(false);
        assert!(yes.confirm("Remove? "));
        assert!(!no.confirm("Remove? "));
    }
}
