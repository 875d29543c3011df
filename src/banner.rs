use crossterm::style::Stylize;
use crossterm::terminal;

use crate::version::VERSION;

const TITLE: &str = " MINI SHELL ";
const WELCOME: &str = "Type 'help' for the command list. Use 'exit' or Ctrl-D to quit.";

/// Title box centred on the terminal width.
pub fn banner_lines(columns: usize) -> Vec<String> {
    let border = format!("+{}+", "-".repeat(TITLE.len()));
    let width = columns.max(border.len());
    vec![
        format!("{border:^width$}"),
        format!("{TITLE:^width$}"),
        format!("{border:^width$}"),
        format!("{WELCOME:^width$}"),
    ]
}

pub fn print_banner() {
    let columns = terminal::size().map(|(cols, _)| cols as usize).unwrap_or(80);
    let lines = banner_lines(columns);
    let last = lines.len() - 1;
    for (idx, line) in lines.iter().enumerate() {
        if idx == last {
            println!("{}", line.as_str().white());
        } else {
            println!("{}", line.as_str().magenta().bold());
        }
    }
    log::debug!("minishell {VERSION} banner shown at width {columns}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_never_narrower_than_its_frame() {
        let lines = banner_lines(4);
        assert_eq!(lines[0], "+------------+");
        assert_eq!(lines[1], "  MINI SHELL  ");

        let wide = banner_lines(40);
        assert_eq!(wide[0].len(), 40);
        assert_eq!(wide[1].trim(), "MINI SHELL");
    }
}
