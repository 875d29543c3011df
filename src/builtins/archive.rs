use super::exists;
use crate::archive::{self, ArchiveFormat};
use crate::dispatch::{CommandOutput, ShellCommand};
use crate::errors::ShellError;
use crate::state::Session;

pub struct ZipCommand;
pub struct UnzipCommand;
pub struct TarCommand;
pub struct UntarCommand;

impl ShellCommand for ZipCommand {
    fn name(&self) -> &'static str {
        "zip"
    }

    fn usage(&self) -> &'static str {
        "zip <folder> <archive.zip>"
    }

    fn summary(&self) -> &'static str {
        "pack a directory into a zip archive"
    }

    fn execute(&self, args: &[String], session: &mut Session) -> Result<CommandOutput, ShellError> {
        pack(self, ArchiveFormat::Zip, args, session)
    }
}

impl ShellCommand for TarCommand {
    fn name(&self) -> &'static str {
        "tar"
    }

    fn usage(&self) -> &'static str {
        "tar <folder> <archive.tar.gz>"
    }

    fn summary(&self) -> &'static str {
        "pack a directory into a tar.gz archive"
    }

    fn execute(&self, args: &[String], session: &mut Session) -> Result<CommandOutput, ShellError> {
        pack(self, ArchiveFormat::TarGz, args, session)
    }
}

impl ShellCommand for UnzipCommand {
    fn name(&self) -> &'static str {
        "unzip"
    }

    fn usage(&self) -> &'static str {
        "unzip <archive.zip>"
    }

    fn summary(&self) -> &'static str {
        "unpack a zip archive into the current directory"
    }

    fn execute(&self, args: &[String], session: &mut Session) -> Result<CommandOutput, ShellError> {
        unpack(self, ArchiveFormat::Zip, args, session)
    }
}

impl ShellCommand for UntarCommand {
    fn name(&self) -> &'static str {
        "untar"
    }

    fn usage(&self) -> &'static str {
        "untar <archive.tar.gz>"
    }

    fn summary(&self) -> &'static str {
        "unpack a tar.gz archive into the current directory"
    }

    fn execute(&self, args: &[String], session: &mut Session) -> Result<CommandOutput, ShellError> {
        unpack(self, ArchiveFormat::TarGz, args, session)
    }
}

fn pack(
    command: &dyn ShellCommand,
    format: ArchiveFormat,
    args: &[String],
    session: &mut Session,
) -> Result<CommandOutput, ShellError> {
    let name = command.name();
    let [source, target] = args else {
        return Err(ShellError::usage(format!("Usage: {}", command.usage())));
    };

    let source = session.resolve(source);
    let target = session.resolve(target);
    if !exists(&source) {
        return Err(ShellError::not_found(format!(
            "{name}: source '{}' does not exist",
            source.display()
        )));
    }
    if !source.is_dir() {
        return Err(ShellError::type_mismatch(format!(
            "{name}: source must be a directory"
        )));
    }

    archive::build(format, &source, &target, session.exclusions()).map_err(|source| {
        log::error!("{name} error: {source}");
        ShellError::Archive {
            command: name,
            source,
        }
    })?;

    Ok(CommandOutput::Text(format!(
        "Created archive '{}'",
        target.display()
    )))
}

fn unpack(
    command: &dyn ShellCommand,
    format: ArchiveFormat,
    args: &[String],
    session: &mut Session,
) -> Result<CommandOutput, ShellError> {
    let name = command.name();
    let [raw] = args else {
        return Err(ShellError::usage(format!("Usage: {}", command.usage())));
    };

    let archive_path = session.resolve(raw);
    if !exists(&archive_path) {
        return Err(ShellError::not_found(format!(
            "{name}: '{}' not found",
            archive_path.display()
        )));
    }
    if archive_path.is_dir() {
        return Err(ShellError::type_mismatch(format!(
            "{name}: target must be a file"
        )));
    }

    let extraction = archive::extract(format, &archive_path, &session.cwd, session.exclusions())
        .map_err(|source| {
            log::error!("{name} error: {source}");
            ShellError::Archive {
                command: name,
                source,
            }
        })?;

    Ok(CommandOutput::Text(format!(
        "Unpacked '{}' to '{}'",
        archive_path.display(),
        extraction.root.display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::test_support::{write_tar_gz, write_zip, zip_names};
    use crate::errors::ErrorKind;
    use crate::state::test_support::session_in;
    use std::fs;
    use tempfile::TempDir;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn zip_skips_git_metadata() {
        let tmp = TempDir::new().unwrap();
        let mut session = session_in(tmp.path(), true);
        let home = session.cwd.clone();
        fs::create_dir_all(home.join("project/.git")).unwrap();
        fs::write(home.join("project/app.py"), "print('hi')").unwrap();
        fs::write(home.join("project/.git/config"), "[core]").unwrap();

        let out = ZipCommand
            .execute(&args(&["project", "dist/project.zip"]), &mut session)
            .unwrap();

        let archive = home.join("dist/project.zip");
        assert_eq!(
            out,
            CommandOutput::Text(format!("Created archive '{}'", archive.display()))
        );
        let names = zip_names(&archive);
        assert!(names.contains(&"project/app.py".to_string()));
        assert!(names.iter().all(|n| !n.contains(".git")));
    }

    #[test]
    fn untar_renames_when_root_is_taken() {
        let tmp = TempDir::new().unwrap();
        let mut session = session_in(tmp.path(), true);
        let home = session.cwd.clone();
        fs::create_dir(home.join("bundle")).unwrap();
        write_tar_gz(
            &home.join("bundle.tar.gz"),
            &[("bundle/a.txt", "A"), ("bundle/sub/b.txt", "B")],
        );

        let out = UntarCommand
            .execute(&args(&["bundle.tar.gz"]), &mut session)
            .unwrap();

        let root = home.join("bundle-1");
        assert_eq!(
            out,
            CommandOutput::Text(format!(
                "Unpacked '{}' to '{}'",
                home.join("bundle.tar.gz").display(),
                root.display()
            ))
        );
        assert_eq!(fs::read_to_string(root.join("a.txt")).unwrap(), "A");
        assert_eq!(fs::read_to_string(root.join("sub/b.txt")).unwrap(), "B");
        assert_eq!(fs::read_dir(home.join("bundle")).unwrap().count(), 0);
    }

    #[test]
    fn unzip_rejects_traversal_without_writing() {
        let tmp = TempDir::new().unwrap();
        let mut session = session_in(tmp.path(), true);
        let home = session.cwd.clone();
        fs::create_dir(home.join("inbox")).unwrap();
        write_zip(
            &home.join("inbox/evil.zip"),
            &[("safe.txt", "fine"), ("../evil.txt", "gotcha")],
        );
        session.cwd = home.join("inbox");

        let err = UnzipCommand
            .execute(&args(&["evil.zip"]), &mut session)
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UnsafePath);
        assert_eq!(err.to_string(), "unzip: unsafe relative path '../evil.txt'");
        assert!(!home.join("evil.txt").exists());
        assert!(!home.join("inbox/safe.txt").exists());
    }

    #[test]
    fn argument_checks() {
        let tmp = TempDir::new().unwrap();
        let mut session = session_in(tmp.path(), true);
        let home = session.cwd.clone();
        fs::write(home.join("file.txt"), "x").unwrap();
        fs::create_dir(home.join("folder")).unwrap();

        let err = TarCommand
            .execute(&args(&["file.txt", "out.tar.gz"]), &mut session)
            .unwrap_err();
        assert_eq!(err.to_string(), "tar: source must be a directory");

        let err = TarCommand
            .execute(&args(&["missing", "out.tar.gz"]), &mut session)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = UnzipCommand
            .execute(&args(&["folder"]), &mut session)
            .unwrap_err();
        assert_eq!(err.to_string(), "unzip: target must be a file");

        let err = ZipCommand.execute(&args(&["folder"]), &mut session).unwrap_err();
        assert_eq!(err.to_string(), "Usage: zip <folder> <archive.zip>");
    }
}
