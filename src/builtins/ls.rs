use std::fs::{self, Metadata};
use std::path::Path;

use chrono::{DateTime, Local};

use super::{exists, split_flags};
use crate::dispatch::{CommandOutput, ShellCommand};
use crate::errors::ShellError;
use crate::state::Session;

pub struct ListCommand;

impl ShellCommand for ListCommand {
    fn name(&self) -> &'static str {
        "ls"
    }

    fn usage(&self) -> &'static str {
        "ls [-l] [path...]"
    }

    fn summary(&self) -> &'static str {
        "list directory contents"
    }

    fn execute(&self, args: &[String], session: &mut Session) -> Result<CommandOutput, ShellError> {
        let (flags, targets) = split_flags("ls", args, &["-l"])?;
        let long = !flags.is_empty();

        let shown: Vec<(&str, std::path::PathBuf)> = if targets.is_empty() {
            vec![(".", session.cwd.clone())]
        } else {
            targets.iter().map(|raw| (*raw, session.resolve(raw))).collect()
        };
        let multiple = shown.len() > 1;

        let mut sections = Vec::new();
        for (raw, path) in &shown {
            if !exists(path) {
                return Err(ShellError::not_found(format!(
                    "ls: cannot access '{raw}': No such file or directory"
                )));
            }

            if path.is_dir() {
                let listing = list_directory(path, long)?;
                if multiple {
                    let header = if *raw == "." {
                        path.display().to_string()
                    } else {
                        raw.to_string()
                    };
                    if listing.is_empty() {
                        sections.push(format!("{header}:"));
                    } else {
                        sections.push(format!("{header}:\n{listing}"));
                    }
                } else {
                    sections.push(listing);
                }
            } else {
                sections.push(format_entry(path, raw, long)?);
            }
        }

        log::debug!("ls executed with args: {args:?}");
        Ok(CommandOutput::Text(sections.join("\n\n")))
    }
}

fn list_directory(path: &Path, long: bool) -> Result<String, ShellError> {
    let read_dir = fs::read_dir(path).map_err(|err| {
        ShellError::io(format!("ls: cannot open directory '{}'", path.display()), err)
    })?;

    let mut entries: Vec<(String, std::path::PathBuf)> = read_dir
        .filter_map(Result::ok)
        .map(|entry| (entry.file_name().to_string_lossy().into_owned(), entry.path()))
        .filter(|(name, _)| !name.starts_with('.'))
        .collect();
    entries.sort_by_key(|(name, _)| name.to_lowercase());

    let mut lines = Vec::with_capacity(entries.len());
    for (name, entry_path) in &entries {
        lines.push(format_entry(entry_path, name, long)?);
    }
    Ok(lines.join("\n"))
}

fn format_entry(path: &Path, name: &str, long: bool) -> Result<String, ShellError> {
    if !long {
        return Ok(name.to_string());
    }

    let meta = fs::symlink_metadata(path)
        .map_err(|err| ShellError::io(format!("ls: cannot stat '{}'", path.display()), err))?;
    let modified = meta
        .modified()
        .map(|time| DateTime::<Local>::from(time).format("%-d %b %H:%M").to_string())
        .unwrap_or_else(|_| "-".to_string());

    let mut display = name.to_string();
    if meta.file_type().is_symlink() {
        let target = fs::read_link(path)
            .map(|t| t.display().to_string())
            .unwrap_or_else(|_| "?".to_string());
        display = format!("{name} -> {target}");
    }

    Ok(format!(
        "{} {:>8} {} {}",
        mode_string(&meta),
        meta.len(),
        modified,
        display
    ))
}

/// `ls -l` style type and permission column, e.g. `drwxr-xr-x`.
fn mode_string(meta: &Metadata) -> String {
    let file_type = meta.file_type();
    let kind = if file_type.is_symlink() {
        'l'
    } else if file_type.is_dir() {
        'd'
    } else {
        '-'
    };

    let mut text = String::with_capacity(10);
    text.push(kind);
    text.push_str(&permission_bits(meta));
    text
}

#[cfg(unix)]
fn permission_bits(meta: &Metadata) -> String {
    use std::os::unix::fs::PermissionsExt;

    let mode = meta.permissions().mode();
    let mut bits = String::with_capacity(9);
    for shift in [6, 3, 0] {
        let triplet = (mode >> shift) & 0o7;
        bits.push(if triplet & 0o4 != 0 { 'r' } else { '-' });
        bits.push(if triplet & 0o2 != 0 { 'w' } else { '-' });
        bits.push(if triplet & 0o1 != 0 { 'x' } else { '-' });
    }
    bits
}

#[cfg(not(unix))]
fn permission_bits(meta: &Metadata) -> String {
    if meta.permissions().readonly() {
        "r--r--r--".to_string()
    } else {
        "rw-rw-rw-".to_string()
    }
}
