//! Built-in shell commands, one handler per file.

mod archive;
mod cat;
mod cd;
mod cp;
mod grep;
mod history;
mod ls;
mod meta;
mod mv;
mod pwd;
mod rm;
mod undo;

pub use archive::{TarCommand, UntarCommand, UnzipCommand, ZipCommand};
pub use cat::CatCommand;
pub use cd::CdCommand;
pub use cp::CopyCommand;
pub use grep::GrepCommand;
pub use history::HistoryCommand;
pub use ls::ListCommand;
pub use meta::{ExitCommand, HelpCommand};
pub use mv::MoveCommand;
pub use pwd::PwdCommand;
pub use rm::RemoveCommand;
pub use undo::UndoCommand;

use std::path::Path;

use crate::dispatch::ShellCommand;
use crate::errors::ShellError;

/// Every built-in except `help`, which the registry builds from the others.
pub fn all() -> Vec<Box<dyn ShellCommand>> {
    vec![
        Box::new(CdCommand),
        Box::new(PwdCommand),
        Box::new(ListCommand),
        Box::new(CatCommand),
        Box::new(GrepCommand),
        Box::new(CopyCommand),
        Box::new(MoveCommand),
        Box::new(RemoveCommand),
        Box::new(UndoCommand),
        Box::new(HistoryCommand),
        Box::new(ZipCommand),
        Box::new(UnzipCommand),
        Box::new(TarCommand),
        Box::new(UntarCommand),
        Box::new(ExitCommand),
    ]
}

/// Splits `args` into the set of whole-word flags found in `allowed` and the
/// remaining positional arguments. Any other dash-prefixed word is rejected.
pub(crate) fn split_flags<'a>(
    command: &str,
    args: &'a [String],
    allowed: &[&str],
) -> Result<(Vec<&'a str>, Vec<&'a str>), ShellError> {
    let mut flags = Vec::new();
    let mut positional = Vec::new();
    for arg in args {
        if allowed.contains(&arg.as_str()) {
            flags.push(arg.as_str());
        } else if arg.starts_with('-') && arg.len() > 1 {
            return Err(ShellError::usage(format!(
                "{command}: unsupported option '{arg}'"
            )));
        } else {
            positional.push(arg.as_str());
        }
    }
    Ok((flags, positional))
}

/// `dst` itself, or `dst/<name of src>` when `dst` is an existing directory.
pub(crate) fn final_destination(source: &Path, destination: &Path) -> std::path::PathBuf {
    match source.file_name() {
        Some(name) if destination.is_dir() => destination.join(name),
        _ => destination.to_path_buf(),
    }
}

/// Existence check that also sees dangling symlinks.
pub(crate) fn exists(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}
