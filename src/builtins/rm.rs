use std::path::Path;

use super::{exists, split_flags};
use crate::dispatch::{CommandOutput, ShellCommand};
use crate::errors::ShellError;
use crate::state::Session;
use crate::undo::UndoAction;

pub struct RemoveCommand;

impl ShellCommand for RemoveCommand {
    fn name(&self) -> &'static str {
        "rm"
    }

    fn usage(&self) -> &'static str {
        "rm [-r] <path>..."
    }

    fn summary(&self) -> &'static str {
        "move files or directories to the trash"
    }

    fn execute(&self, args: &[String], session: &mut Session) -> Result<CommandOutput, ShellError> {
        if args.is_empty() {
            return Err(ShellError::usage(format!("Usage: {}", self.usage())));
        }
        let (flags, targets) = split_flags("rm", args, &["-r"])?;
        let recursive = !flags.is_empty();
        if targets.is_empty() {
            return Err(ShellError::usage("rm: missing operand"));
        }

        let mut removed = Vec::new();
        for raw in targets {
            let path = session.resolve(raw);
            check_removable(raw, &path, &session.cwd)?;

            if !exists(&path) {
                return Err(ShellError::not_found(format!(
                    "rm: '{}' not found",
                    path.display()
                )));
            }
            let is_dir = path.is_dir();
            if is_dir && !recursive {
                return Err(ShellError::type_mismatch(format!(
                    "rm: cannot remove '{}': is a directory",
                    path.display()
                )));
            }
            if is_dir {
                let prompt = format!("Remove directory '{}' recursively? (y/n): ", path.display());
                if !session.confirm(&prompt) {
                    log::debug!("rm cancelled for directory {}", path.display());
                    continue;
                }
            }

            let trash = session
                .trash()
                .move_to_trash(&path)
                .map_err(|err| ShellError::fs("rm", err))?;
            log::debug!("rm moved {} to trash {}", path.display(), trash.display());

            let label = if trash.is_dir() { "directory" } else { "file" };
            removed.push(format!("Removed {label} '{}'", path.display()));
            session.record(UndoAction::Remove {
                original: path,
                trash,
            });
        }

        if removed.is_empty() {
            return Ok(CommandOutput::text("Deletion cancelled"));
        }
        Ok(CommandOutput::Text(removed.join("\n")))
    }
}

/// Refuses the filesystem root, `..` and anything the session is standing
/// in.
fn check_removable(raw: &str, path: &Path, cwd: &Path) -> Result<(), ShellError> {
    if path.parent().is_none() {
        return Err(ShellError::PermissionDenied(
            "rm: refusing to remove '/'".to_string(),
        ));
    }
    let raw_clean = raw.trim_end_matches('/');
    if matches!(raw_clean, ".." | "/..") || Some(path) == cwd.parent() {
        return Err(ShellError::PermissionDenied(
            "rm: refusing to remove '..'".to_string(),
        ));
    }
    if cwd.starts_with(path) {
        return Err(ShellError::PermissionDenied(format!(
            "rm: refusing to remove '{}': current directory is inside it",
            path.display()
        )));
    }
    Ok(())
}
