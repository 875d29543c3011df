use crate::dispatch::{CommandOutput, ShellCommand};
use crate::errors::ShellError;
use crate::state::Session;

pub struct HistoryCommand;

impl ShellCommand for HistoryCommand {
    fn name(&self) -> &'static str {
        "history"
    }

    fn usage(&self) -> &'static str {
        "history [N]"
    }

    fn summary(&self) -> &'static str {
        "show the last N commands"
    }

    fn execute(&self, args: &[String], session: &mut Session) -> Result<CommandOutput, ShellError> {
        let limit = match args {
            [] => session.history_limit(),
            [raw] => parse_limit(raw)?,
            _ => return Err(ShellError::usage(format!("Usage: {}", self.usage()))),
        };

        let entries = session.history().tail(limit)?;
        if entries.is_empty() {
            return Ok(CommandOutput::text("History is empty"));
        }

        let lines: Vec<String> = entries
            .iter()
            .map(|entry| format!("{}: {}", entry.index, entry.command))
            .collect();
        Ok(CommandOutput::Text(lines.join("\n")))
    }
}

fn parse_limit(raw: &str) -> Result<usize, ShellError> {
    let limit: i64 = raw
        .parse()
        .map_err(|_| ShellError::usage("history: argument must be an integer"))?;
    if limit <= 0 {
        return Err(ShellError::usage("history: argument must be positive"));
    }
    Ok(usize::try_from(limit).unwrap_or(usize::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::session_in;
    use tempfile::TempDir;

    fn run(args: &[&str], session: &mut Session) -> Result<CommandOutput, ShellError> {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        HistoryCommand.execute(&args, session)
    }

    #[test]
    fn shows_tail_with_absolute_numbers() {
        let tmp = TempDir::new().unwrap();
        let mut session = session_in(tmp.path(), true);
        assert_eq!(
            run(&[], &mut session).unwrap(),
            CommandOutput::text("History is empty")
        );

        for line in ["pwd", "ls", "cd docs"] {
            session.history().append(line).unwrap();
        }

        assert_eq!(
            run(&["2"], &mut session).unwrap(),
            CommandOutput::text("2: ls\n3: cd docs")
        );
        assert_eq!(
            run(&[], &mut session).unwrap(),
            CommandOutput::text("1: pwd\n2: ls\n3: cd docs")
        );
    }

    #[test]
    fn limit_must_be_a_positive_integer() {
        let tmp = TempDir::new().unwrap();
        let mut session = session_in(tmp.path(), true);

        let err = run(&["ten"], &mut session).unwrap_err();
        assert_eq!(err.to_string(), "history: argument must be an integer");

        let err = run(&["0"], &mut session).unwrap_err();
        assert_eq!(err.to_string(), "history: argument must be positive");

        let err = run(&["-3"], &mut session).unwrap_err();
        assert_eq!(err.to_string(), "history: argument must be positive");
    }
}
