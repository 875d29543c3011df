use std::collections::BTreeMap;

use crate::builtins;
use crate::errors::ShellError;
use crate::state::Session;

/// What a built-in hands back to the shell driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    Text(String),
    None,
    Exit,
}

impl CommandOutput {
    pub fn text(message: impl Into<String>) -> Self {
        Self::Text(message.into())
    }
}

pub trait ShellCommand {
    fn name(&self) -> &'static str;

    fn usage(&self) -> &'static str;

    fn summary(&self) -> &'static str;

    fn execute(&self, args: &[String], session: &mut Session) -> Result<CommandOutput, ShellError>;
}

/// Name to handler table. `help` is kept in sync with whatever is
/// registered.
pub struct CommandRegistry {
    commands: BTreeMap<String, Box<dyn ShellCommand>>,
    with_help: bool,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: BTreeMap::new(),
            with_help: false,
        }
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for command in builtins::all() {
            registry.register(command);
        }
        registry.with_help = true;
        registry.refresh_help();
        registry
    }

    /// Adds a handler, replacing any handler registered under the same name.
    pub fn register(&mut self, command: Box<dyn ShellCommand>) {
        let name = command.name().to_string();
        if self.commands.insert(name.clone(), command).is_some() {
            log::debug!("replaced handler for '{name}'");
        }
        self.refresh_help();
    }

    /// Registered names in alphabetical order.
    pub fn names(&self) -> Vec<String> {
        self.commands.keys().cloned().collect()
    }

    pub fn get(&self, name: &str) -> Option<&dyn ShellCommand> {
        self.commands.get(name).map(|c| c.as_ref())
    }

    pub fn execute_line(
        &self,
        line: &str,
        session: &mut Session,
    ) -> Result<CommandOutput, ShellError> {
        let parts = shell_words::split(line)
            .map_err(|err| ShellError::usage(format!("parse error: {err}")))?;
        let Some((command, args)) = parts.split_first() else {
            return Ok(CommandOutput::None);
        };

        let handler = self
            .commands
            .get(command)
            .ok_or_else(|| ShellError::UnknownCommand {
                command: command.clone(),
            })?;
        handler.execute(args, session)
    }

    fn refresh_help(&mut self) {
        if !self.with_help {
            return;
        }
        let mut names = self.names();
        if !names.iter().any(|n| n == builtins::HelpCommand::NAME) {
            names.push(builtins::HelpCommand::NAME.to_string());
            names.sort();
        }
        let entries = names
            .into_iter()
            .map(|name| {
                let summary = self.get(&name).map(|c| c.summary()).unwrap_or("");
                (name, summary)
            })
            .collect();
        self.commands.insert(
            builtins::HelpCommand::NAME.to_string(),
            Box::new(builtins::HelpCommand::new(entries)),
        );
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
