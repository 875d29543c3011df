use crate::dispatch::{CommandOutput, ShellCommand};
use crate::errors::ShellError;
use crate::state::Session;

pub struct HelpCommand {
    entries: Vec<(String, &'static str)>,
}

impl HelpCommand {
    pub const NAME: &'static str = "help";

    /// `entries` are `(name, summary)` pairs, already sorted by name.
    pub fn new(entries: Vec<(String, &'static str)>) -> Self {
        Self { entries }
    }
}

impl ShellCommand for HelpCommand {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn usage(&self) -> &'static str {
        "help"
    }

    fn summary(&self) -> &'static str {
        "list the available commands"
    }

    fn execute(&self, _args: &[String], _session: &mut Session) -> Result<CommandOutput, ShellError> {
        let names: Vec<&str> = self.entries.iter().map(|(name, _)| name.as_str()).collect();
        let width = names.iter().map(|n| n.len()).max().unwrap_or(0);

        let mut text = format!("Available commands: {}\n", names.join(", "));
        for (name, summary) in &self.entries {
            let summary = if name == Self::NAME {
                self.summary()
            } else {
                *summary
            };
            text.push_str(&format!("\n  {name:<width$}  {summary}"));
        }
        Ok(CommandOutput::Text(text))
    }
}

pub struct ExitCommand;

impl ShellCommand for ExitCommand {
    fn name(&self) -> &'static str {
        "exit"
    }

    fn usage(&self) -> &'static str {
        "exit"
    }

    fn summary(&self) -> &'static str {
        "leave the shell"
    }

    fn execute(&self, _args: &[String], _session: &mut Session) -> Result<CommandOutput, ShellError> {
        log::info!("Shell terminated via exit command");
        Ok(CommandOutput::Exit)
    }
}
