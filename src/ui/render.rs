use std::path::Path;

use crossterm::style::Stylize;

/// Frames `message` in a `+---+` box, padding every line to the widest one.
pub fn boxed_text(message: &str) -> String {
    let lines: Vec<&str> = if message.is_empty() {
        vec![""]
    } else {
        message.lines().collect()
    };
    let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let border = format!("+{}+", "-".repeat(width + 2));

    let mut out = vec![border.clone()];
    for line in lines {
        out.push(format!("| {line:<width$} |"));
    }
    out.push(border);
    out.join("\n")
}

/// `~` at home, `/` at the filesystem root, otherwise the last segment.
pub fn prompt_label(cwd: &Path, home: &Path) -> String {
    if cwd == home {
        return "~".to_string();
    }
    cwd.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "/".to_string())
}

pub fn prompt(cwd: &Path, home: &Path) -> String {
    format!(
        "{}{}",
        prompt_label(cwd, home).cyan().bold(),
        " $ ".white().bold()
    )
}

pub fn print_output(message: &str) {
    println!("{}", message.green());
}

pub fn print_error(message: &str) {
    println!("{}", boxed_text(message).red());
}

pub fn print_warning(message: &str) {
    println!("{}", message.yellow());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_pads_to_the_longest_line() {
        assert_eq!(
            boxed_text("cd: x: Not a directory"),
            "+------------------------+\n| cd: x: Not a directory |\n+------------------------+"
        );
        assert_eq!(boxed_text("ab\nc"), "+----+\n| ab |\n| c  |\n+----+");
        assert_eq!(boxed_text(""), "+--+\n|  |\n+--+");
    }

    #[test]
    fn prompt_label_uses_last_segment() {
        let home = Path::new("/home/user");
        assert_eq!(prompt_label(home, home), "~");
        assert_eq!(prompt_label(Path::new("/home/user/projects"), home), "projects");
        assert_eq!(prompt_label(Path::new("/"), home), "/");
    }
}
