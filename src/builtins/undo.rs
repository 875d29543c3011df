use crate::dispatch::{CommandOutput, ShellCommand};
use crate::errors::ShellError;
use crate::state::Session;

pub struct UndoCommand;

impl ShellCommand for UndoCommand {
    fn name(&self) -> &'static str {
        "undo"
    }

    fn usage(&self) -> &'static str {
        "undo"
    }

    fn summary(&self) -> &'static str {
        "revert the last cp, mv or rm"
    }

    fn execute(&self, args: &[String], session: &mut Session) -> Result<CommandOutput, ShellError> {
        if !args.is_empty() {
            return Err(ShellError::usage("undo: this command does not accept arguments"));
        }
        if let Some(action) = session.ledger().last() {
            log::debug!(
                "undoing {} ({} recorded)",
                action.label(),
                session.ledger().len()
            );
        }
        let message = session.ledger_mut().undo_last()?;
        Ok(CommandOutput::Text(message))
    }
}
