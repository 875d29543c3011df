use crate::dispatch::{CommandOutput, CommandRegistry};
use crate::state::Session;

/// What the front end should show after one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Output(String),
    Silent,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue(Reply),
    Exit,
}

pub struct Shell {
    registry: CommandRegistry,
    session: Session,
}

impl Shell {
    pub fn new(registry: CommandRegistry, session: Session) -> Self {
        Self { registry, session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Records, logs and runs one input line.
    pub fn handle_line(&mut self, line: &str) -> Flow {
        let line = line.trim();
        if line.is_empty() {
            return Flow::Continue(Reply::Silent);
        }

        if let Err(err) = self.session.history().append(line) {
            log::error!("ERROR: {err}");
        }
        log::info!("{line}");

        match self.registry.execute_line(line, &mut self.session) {
            Ok(CommandOutput::Text(text)) if text.is_empty() => Flow::Continue(Reply::Silent),
            Ok(CommandOutput::Text(text)) => Flow::Continue(Reply::Output(text)),
            Ok(CommandOutput::None) => Flow::Continue(Reply::Silent),
            Ok(CommandOutput::Exit) => Flow::Exit,
            Err(err) => {
                let message = err.to_string();
                log::debug!("{:?} failure for '{line}'", err.kind());
                log::error!("ERROR: {message}");
                Flow::Continue(Reply::Failed(message))
            }
        }
    }
}
