use crate::dispatch::{CommandOutput, ShellCommand};
use crate::errors::ShellError;
use crate::state::Session;

pub struct PwdCommand;

impl ShellCommand for PwdCommand {
    fn name(&self) -> &'static str {
        "pwd"
    }

    fn usage(&self) -> &'static str {
        "pwd"
    }

    fn summary(&self) -> &'static str {
        "print the current directory"
    }

    fn execute(&self, _args: &[String], session: &mut Session) -> Result<CommandOutput, ShellError> {
        Ok(CommandOutput::Text(session.cwd.display().to_string()))
    }
}
