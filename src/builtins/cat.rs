use std::fs;

use super::exists;
use crate::dispatch::{CommandOutput, ShellCommand};
use crate::errors::ShellError;
use crate::state::Session;

pub struct CatCommand;

impl ShellCommand for CatCommand {
    fn name(&self) -> &'static str {
        "cat"
    }

    fn usage(&self) -> &'static str {
        "cat <file>"
    }

    fn summary(&self) -> &'static str {
        "print a file"
    }

    fn execute(&self, args: &[String], session: &mut Session) -> Result<CommandOutput, ShellError> {
        let [raw] = args else {
            return Err(ShellError::usage(format!("Usage: {}", self.usage())));
        };
        let path = session.resolve(raw);

        if !exists(&path) {
            return Err(ShellError::not_found(format!(
                "cat: '{}' not found",
                path.display()
            )));
        }
        if path.is_dir() {
            return Err(ShellError::type_mismatch("cat: target must be a file"));
        }

        let bytes = fs::read(&path)
            .map_err(|err| ShellError::io(format!("cat: cannot read '{}'", path.display()), err))?;
        log::debug!("cat read {}", path.display());
        Ok(CommandOutput::Text(String::from_utf8_lossy(&bytes).into_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::state::test_support::session_in;
    use tempfile::TempDir;

    #[test]
    fn prints_contents_and_tolerates_invalid_utf8() {
        let tmp = TempDir::new().unwrap();
        let mut session = session_in(tmp.path(), true);
        let home = session.cwd.clone();
        fs::write(home.join("notes.txt"), "line one\nline two\n").unwrap();
        fs::write(home.join("mixed.bin"), b"ok \xff end").unwrap();

        let out = CatCommand
            .execute(&["notes.txt".to_string()], &mut session)
            .unwrap();
        assert_eq!(out, CommandOutput::text("line one\nline two\n"));

        let CommandOutput::Text(text) = CatCommand
            .execute(&["mixed.bin".to_string()], &mut session)
            .unwrap()
        else {
            panic!("expected text");
        };
        assert!(text.starts_with("ok ") && text.ends_with(" end"));
    }

    #[test]
    fn rejects_directories_and_missing_files() {
        let tmp = TempDir::new().unwrap();
        let mut session = session_in(tmp.path(), true);
        fs::create_dir(session.cwd.join("folder")).unwrap();

        let err = CatCommand
            .execute(&["folder".to_string()], &mut session)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);

        let err = CatCommand
            .execute(&["ghost.txt".to_string()], &mut session)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = CatCommand.execute(&[], &mut session).unwrap_err();
        assert_eq!(err.to_string(), "Usage: cat <file>");
    }
}
