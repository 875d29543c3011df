use std::fs;

use super::{exists, final_destination, split_flags};
use crate::dispatch::{CommandOutput, ShellCommand};
use crate::errors::ShellError;
use crate::fs::copy_recursive;
use crate::state::Session;
use crate::undo::UndoAction;

pub struct CopyCommand;

impl ShellCommand for CopyCommand {
    fn name(&self) -> &'static str {
        "cp"
    }

    fn usage(&self) -> &'static str {
        "cp [-r] <source> <destination>"
    }

    fn summary(&self) -> &'static str {
        "copy a file or directory"
    }

    fn execute(&self, args: &[String], session: &mut Session) -> Result<CommandOutput, ShellError> {
        let (flags, positional) = split_flags("cp", args, &["-r"])?;
        let recursive = !flags.is_empty();
        let [source, destination] = positional[..] else {
            return Err(ShellError::usage(format!("Usage: {}", self.usage())));
        };

        let source = session.resolve(source);
        let destination = session.resolve(destination);
        if !exists(&source) {
            return Err(ShellError::not_found(format!(
                "cp: source '{}' not found",
                source.display()
            )));
        }
        let is_dir = source.is_dir();
        if is_dir && !recursive {
            return Err(ShellError::type_mismatch("cp: -r required to copy directories"));
        }

        let destination = final_destination(&source, &destination);
        if is_dir && destination.starts_with(&source) {
            return Err(ShellError::usage(format!(
                "cp: cannot copy '{}' into itself",
                source.display()
            )));
        }
        // undo of a copy deletes the whole target
        if is_dir && exists(&destination) {
            return Err(ShellError::usage(format!(
                "cp: destination '{}' already exists",
                destination.display()
            )));
        }
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(|err| {
                ShellError::io(format!("cp: cannot create '{}'", parent.display()), err)
            })?;
        }

        copy_recursive(&source, &destination).map_err(|err| {
            log::error!("cp failed: {err}");
            ShellError::fs("cp", err)
        })?;

        session.record(UndoAction::Copy {
            target: destination.clone(),
        });
        log::debug!("cp {} -> {}", source.display(), destination.display());

        let kind = if is_dir { "directory" } else { "file" };
        Ok(CommandOutput::Text(format!(
            "Copied {kind} '{}' -> '{}'",
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
        CopyCommand.execute(&args, session)
    }

    #[test]
    fn copies_into_existing_directory_and_records_undo() {
        let tmp = TempDir::new().unwrap();
        let mut session = session_in(tmp.path(), true);
        let home = session.cwd.clone();
        fs::write(home.join("a.txt"), "alpha").unwrap();
        fs::create_dir(home.join("backup")).unwrap();

        let out = run(&["a.txt", "backup"], &mut session).unwrap();

        let copied = home.join("backup/a.txt");
        assert_eq!(fs::read_to_string(&copied).unwrap(), "alpha");
        assert_eq!(
            out,
            CommandOutput::Text(format!(
                "Copied file '{}' -> '{}'",
                home.join("a.txt").display(),
                copied.display()
            ))
        );
        assert_eq!(
            session.ledger().last(),
            Some(&UndoAction::Copy { target: copied })
        );
    }

    #[test]
    fn directories_need_recursive_flag() {
        let tmp = TempDir::new().unwrap();
        let mut session = session_in(tmp.path(), true);
        let home = session.cwd.clone();
        fs::create_dir_all(home.join("src/nested")).unwrap();
        fs::write(home.join("src/nested/f.txt"), "deep").unwrap();

        let err = run(&["src", "dst"], &mut session).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert!(session.ledger().is_empty());

        run(&["-r", "src", "dst"], &mut session).unwrap();
        assert_eq!(
            fs::read_to_string(home.join("dst/nested/f.txt")).unwrap(),
            "deep"
        );
        assert_eq!(session.ledger().len(), 1);
    }

    #[test]
    fn failures_leave_the_ledger_alone() {
        let tmp = TempDir::new().unwrap();
        let mut session = session_in(tmp.path(), true);

        let err = run(&["ghost.txt", "copy.txt"], &mut session).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = run(&["only-one"], &mut session).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);

        assert!(session.ledger().is_empty());
    }

    #[test]
    fn refuses_to_merge_into_existing_directory() {
        let tmp = TempDir::new().unwrap();
        let mut session = session_in(tmp.path(), true);
        let home = session.cwd.clone();
        fs::create_dir_all(home.join("src")).unwrap();
        fs::write(home.join("src/new.txt"), "copied").unwrap();
        fs::create_dir_all(home.join("dst/src")).unwrap();
        fs::write(home.join("dst/src/mine.txt"), "keep me").unwrap();

        let err = run(&["-r", "src", "dst"], &mut session).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Usage);
        assert_eq!(
            err.to_string(),
            format!("cp: destination '{}' already exists", home.join("dst/src").display())
        );
        assert!(!home.join("dst/src/new.txt").exists());
        assert_eq!(
            fs::read_to_string(home.join("dst/src/mine.txt")).unwrap(),
            "keep me"
        );
        assert!(session.ledger().is_empty());
    }
}
