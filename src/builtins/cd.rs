use crate::dispatch::{CommandOutput, ShellCommand};
use crate::errors::ShellError;
use crate::state::Session;

pub struct CdCommand;

impl ShellCommand for CdCommand {
    fn name(&self) -> &'static str {
        "cd"
    }

    fn usage(&self) -> &'static str {
        "cd [path]"
    }

    fn summary(&self) -> &'static str {
        "change the current directory"
    }

    fn execute(&self, args: &[String], session: &mut Session) -> Result<CommandOutput, ShellError> {
        let target = match args {
            [] => session.home().to_path_buf(),
            [path] => session.resolve(path),
            _ => return Err(ShellError::usage(format!("Usage: {}", self.usage()))),
        };

        if !target.exists() {
            return Err(ShellError::not_found(format!(
                "cd: {}: No such file or directory",
                target.display()
            )));
        }
        if !target.is_dir() {
            return Err(ShellError::type_mismatch(format!(
                "cd: {}: Not a directory",
                target.display()
            )));
        }

        log::debug!("Changed cwd to {}", target.display());
        session.cwd = target;
        Ok(CommandOutput::None)
    }
}
