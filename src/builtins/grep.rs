use std::fs;
use std::path::{Path, PathBuf};

use regex::{Regex, RegexBuilder};
use walkdir::WalkDir;

use super::exists;
use crate::dispatch::{CommandOutput, ShellCommand};
use crate::errors::ShellError;
use crate::state::Session;

const USAGE: &str = "Usage: grep [-r] [-i] <pattern> [path]";

pub struct GrepCommand;

#[derive(Debug, Default)]
struct GrepOptions {
    recursive: bool,
    ignore_case: bool,
}

impl ShellCommand for GrepCommand {
    fn name(&self) -> &'static str {
        "grep"
    }

    fn usage(&self) -> &'static str {
        "grep [-r] [-i] <pattern> [path]"
    }

    fn summary(&self) -> &'static str {
        "search files for a regular expression"
    }

    fn execute(&self, args: &[String], session: &mut Session) -> Result<CommandOutput, ShellError> {
        let (options, rest) = parse_options(args)?;
        let (pattern, path_arg) = match rest {
            [pattern] => (pattern, None),
            [pattern, path] => (pattern, Some(path.as_str())),
            _ => return Err(ShellError::usage(USAGE)),
        };

        let target = match path_arg {
            Some(raw) => session.resolve(raw),
            None if options.recursive => session.cwd.clone(),
            None => return Err(ShellError::usage(USAGE)),
        };
        if !exists(&target) {
            return Err(ShellError::not_found(format!(
                "grep: path '{}' not found",
                target.display()
            )));
        }
        let target_is_dir = target.is_dir();
        if target_is_dir && !options.recursive {
            return Err(ShellError::type_mismatch(
                "grep: -r is required when target is a directory",
            ));
        }

        let regex = RegexBuilder::new(pattern)
            .case_insensitive(options.ignore_case)
            .build()
            .map_err(|err| ShellError::usage(format!("grep: invalid pattern: {err}")))?;

        let files = collect_files(&target);
        let show_path = options.recursive || files.len() > 1 || target_is_dir;
        let base_display = path_arg.unwrap_or(".");

        let mut matches = Vec::new();
        for file in &files {
            let label = show_path.then(|| display_path(file, &session.cwd, &target, base_display));
            search_file(file, &regex, label.as_deref(), &mut matches);
        }

        if matches.is_empty() {
            return Ok(CommandOutput::text("no matches found"));
        }
        Ok(CommandOutput::Text(matches.join("\n")))
    }
}

/// Leading flag words; combined forms such as `-ri` are accepted.
fn parse_options(args: &[String]) -> Result<(GrepOptions, &[String]), ShellError> {
    let mut options = GrepOptions::default();
    let mut index = 0;
    while let Some(arg) = args.get(index) {
        let Some(flags) = arg.strip_prefix('-').filter(|f| !f.is_empty()) else {
            break;
        };
        for flag in flags.chars() {
            match flag {
                'r' => options.recursive = true,
                'i' => options.ignore_case = true,
                other => {
                    return Err(ShellError::usage(format!(
                        "grep: unsupported option '-{other}'"
                    )));
                }
            }
        }
        index += 1;
    }
    Ok((options, &args[index..]))
}

fn collect_files(target: &Path) -> Vec<PathBuf> {
    if !target.is_dir() {
        return vec![target.to_path_buf()];
    }
    WalkDir::new(target)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                log::error!("grep: failed to walk {}: {err}", target.display());
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect()
}

fn search_file(file: &Path, regex: &Regex, label: Option<&str>, matches: &mut Vec<String>) {
    let text = match fs::read(file).map(String::from_utf8) {
        Ok(Ok(text)) => text,
        Ok(Err(err)) => {
            log::error!("grep: failed to read {}: {err}", file.display());
            return;
        }
        Err(err) => {
            log::error!("grep: failed to read {}: {err}", file.display());
            return;
        }
    };

    for line in text.lines().filter(|line| regex.is_match(line)) {
        match label {
            Some(label) => matches.push(format!("{label}:{line}")),
            None => matches.push(line.to_string()),
        }
    }
}

/// Path prefix for a match: relative to the argument the user typed when
/// searching a directory, otherwise the argument itself.
fn display_path(file: &Path, cwd: &Path, target: &Path, base_display: &str) -> String {
    if target.is_dir() {
        if let Ok(relative) = file.strip_prefix(target) {
            let relative = to_slash(relative);
            let prefix = base_display.trim_end_matches('/');
            return match prefix {
                "" | "." => format!("./{relative}"),
                _ => format!("{prefix}/{relative}"),
            };
        }
    } else if file == target {
        return base_display.to_string();
    }

    match file.strip_prefix(cwd) {
        Ok(relative) if relative.as_os_str().is_empty() => ".".to_string(),
        Ok(relative) => to_slash(relative),
        Err(_) => file.display().to_string(),
    }
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
