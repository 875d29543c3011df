use std::fs;

use super::{exists, final_destination};
use crate::dispatch::{CommandOutput, ShellCommand};
use crate::errors::ShellError;
use crate::fs::move_path;
use crate::state::Session;
use crate::undo::UndoAction;

pub struct MoveCommand;

impl ShellCommand for MoveCommand {
    fn name(&self) -> &'static str {
        "mv"
    }

    fn usage(&self) -> &'static str {
        "mv <source> <destination>"
    }

    fn summary(&self) -> &'static str {
        "move or rename a file or directory"
    }

    fn execute(&self, args: &[String], session: &mut Session) -> Result<CommandOutput, ShellError> {
        let [source, destination] = args else {
            return Err(ShellError::usage(format!("Usage: {}", self.usage())));
        };

        let source = session.resolve(source);
        if !exists(&source) {
            return Err(ShellError::not_found(format!(
                "mv: source '{}' not found",
                source.display()
            )));
        }
        let destination = final_destination(&source, &session.resolve(destination));
        if source == destination {
            return Err(ShellError::usage("mv: source and destination are the same"));
        }
        if source.is_dir() && destination.starts_with(&source) {
            return Err(ShellError::usage(format!(
                "mv: cannot move '{}' into itself",
                source.display()
            )));
        }
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(|err| {
                ShellError::io(format!("mv: cannot create '{}'", parent.display()), err)
            })?;
        }

        move_path(&source, &destination).map_err(|err| {
            log::error!("mv failed: {err}");
            ShellError::fs("mv", err)
        })?;

        session.record(UndoAction::Move {
            source: source.clone(),
            destination: destination.clone(),
        });
        log::debug!("mv {} -> {}", source.display(), destination.display());

        Ok(CommandOutput::Text(format!(
            "Moved '{}' -> '{}'",
            source.display(),
            destination.display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::state::test_support::session_in;
    use tempfile::TempDir;

    fn run(args: &[&str], session: &mut Session) -> Result<CommandOutput, ShellError> {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        MoveCommand.execute(&args, session)
    }

    #[test]
    fn renames_and_records_both_ends() {
        let tmp = TempDir::new().unwrap();
        let mut session = session_in(tmp.path(), true);
        let home = session.cwd.clone();
        fs::write(home.join("draft.txt"), "v1").unwrap();

        run(&["draft.txt", "final.txt"], &mut session).unwrap();

        assert!(!home.join("draft.txt").exists());
        assert_eq!(fs::read_to_string(home.join("final.txt")).unwrap(), "v1");
        assert_eq!(
            session.ledger().last(),
            Some(&UndoAction::Move {
                source: home.join("draft.txt"),
                destination: home.join("final.txt"),
            })
        );
    }

    #[test]
    fn moves_into_directory() {
        let tmp = TempDir::new().unwrap();
        let mut session = session_in(tmp.path(), true);
        let home = session.cwd.clone();
        fs::write(home.join("a.txt"), "a").unwrap();
        fs::create_dir(home.join("box")).unwrap();

        run(&["a.txt", "box"], &mut session).unwrap();

        assert!(home.join("box/a.txt").is_file());
    }

    #[test]
    fn same_path_and_missing_source_are_rejected() {
        let tmp = TempDir::new().unwrap();
        let mut session = session_in(tmp.path(), true);
        fs::write(session.cwd.join("a.txt"), "a").unwrap();

        let err = run(&["a.txt", "./a.txt"], &mut session).unwrap_err();
        assert_eq!(err.to_string(), "mv: source and destination are the same");

        let err = run(&["ghost", "b"], &mut session).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(session.ledger().is_empty());
    }
}
