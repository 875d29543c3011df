use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use zip::ZipArchive;

use super::member::common_root;
use super::{
    ArchiveError, ArchiveFormat, Exclusions, MemberKind, MemberPath, preferred_root_name,
    unique_dir_name,
};

/// Where an archive ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub root: PathBuf,
    pub written: usize,
}

/// Extracts `archive` into `target_dir`.
///
/// Every member is validated before anything touches the disk, so one unsafe
/// member aborts the whole extraction with nothing written. When the common
/// root directory already exists in `target_dir` the archive is unpacked
/// under a fresh name derived from the archive file name instead.
pub fn extract(
    format: ArchiveFormat,
    archive: &Path,
    target_dir: &Path,
    exclusions: &Exclusions,
) -> Result<Extraction, ArchiveError> {
    let extraction = match format {
        ArchiveFormat::Zip => extract_zip(archive, target_dir, exclusions)?,
        ArchiveFormat::TarGz => extract_tar_gz(archive, target_dir, exclusions)?,
    };
    log::debug!(
        "extracted {} ({} members) from {} to {}",
        format.display_name(),
        extraction.written,
        archive.display(),
        extraction.root.display()
    );
    Ok(extraction)
}

struct Placement {
    target: PathBuf,
    canonical: PathBuf,
    rename: Option<String>,
    root: PathBuf,
}

impl Placement {
    fn plan(members: &[MemberPath], archive: &Path, target: &Path) -> Result<Self, ArchiveError> {
        let canonical = target
            .canonicalize()
            .map_err(|err| ArchiveError::io("resolve", target, err))?;
        let Some(root) = common_root(members) else {
            return Ok(Self {
                target: target.to_path_buf(),
                canonical,
                rename: None,
                root: target.to_path_buf(),
            });
        };

        let existing = target.join(root);
        if existing.symlink_metadata().is_err() {
            return Ok(Self {
                target: target.to_path_buf(),
                canonical,
                rename: None,
                root: existing,
            });
        }

        let fresh = unique_dir_name(target, &preferred_root_name(archive));
        let root = target.join(&fresh);
        fs::create_dir_all(&root)
            .map_err(|err| ArchiveError::io("create directory", &root, err))?;
        log::debug!(
            "'{}' already exists, extracting into {}",
            existing.display(),
            root.display()
        );
        Ok(Self {
            target: target.to_path_buf(),
            canonical,
            rename: Some(fresh),
            root,
        })
    }

    fn destination(&self, member: &MemberPath) -> PathBuf {
        match &self.rename {
            Some(name) => self.target.join(member.rerooted(name)),
            None => self.target.join(member.relative()),
        }
    }

    /// Refuses destinations that pass through a symlink resolving outside
    /// the target. Links written earlier in the same archive can chain into
    /// an escape that no single link target shows.
    fn check_links(&self, member: &MemberPath, destination: &Path) -> Result<(), ArchiveError> {
        let Ok(relative) = destination.strip_prefix(&self.target) else {
            return Ok(());
        };
        let mut current = self.target.clone();
        for component in relative.components() {
            current.push(component);
            let Ok(meta) = current.symlink_metadata() else {
                break;
            };
            if !meta.file_type().is_symlink() {
                continue;
            }
            let inside = current
                .canonicalize()
                .is_ok_and(|resolved| resolved.starts_with(&self.canonical));
            if !inside {
                return Err(ArchiveError::LinkEscape {
                    member: member.raw().to_string(),
                    target: current.display().to_string(),
                });
            }
        }
        Ok(())
    }

    fn write(
        &self,
        member: &MemberPath,
        reader: &mut dyn Read,
        mode: Option<u32>,
    ) -> Result<bool, ArchiveError> {
        let destination = self.destination(member);
        match member.kind() {
            MemberKind::Directory => self.check_links(member, &destination)?,
            _ => {
                if let Some(parent) = destination.parent() {
                    self.check_links(member, parent)?;
                }
            }
        }
        write_member(member, &destination, reader, mode)
    }
}

fn extract_zip(
    archive: &Path,
    target: &Path,
    exclusions: &Exclusions,
) -> Result<Extraction, ArchiveError> {
    let file = File::open(archive).map_err(|err| ArchiveError::io("open", archive, err))?;
    let mut zip = ZipArchive::new(BufReader::new(file))?;

    let mut indices = Vec::with_capacity(zip.len());
    let mut members = Vec::with_capacity(zip.len());
    for index in 0..zip.len() {
        let entry = zip.by_index(index)?;
        let kind = if entry.is_dir() {
            MemberKind::Directory
        } else {
            MemberKind::File
        };
        if let Some(member) = MemberPath::parse(entry.name(), kind, exclusions)? {
            indices.push(index);
            members.push(member);
        }
    }

    let placement = Placement::plan(&members, archive, target)?;
    let mut written = 0;
    for (index, member) in indices.into_iter().zip(&members) {
        let mut entry = zip.by_index(index)?;
        let mode = entry.unix_mode();
        if placement.write(member, &mut entry, mode)? {
            written += 1;
        }
    }

    Ok(Extraction {
        root: placement.root,
        written,
    })
}

type TarReader = tar::Archive<GzDecoder<BufReader<File>>>;

fn open_tar(archive: &Path) -> Result<TarReader, ArchiveError> {
    let file = File::open(archive).map_err(|err| ArchiveError::io("open", archive, err))?;
    Ok(tar::Archive::new(GzDecoder::new(BufReader::new(file))))
}

fn extract_tar_gz(
    archive: &Path,
    target: &Path,
    exclusions: &Exclusions,
) -> Result<Extraction, ArchiveError> {
    // tar is a stream, so validation and extraction are two separate reads
    let mut slots: Vec<Option<MemberPath>> = Vec::new();
    let mut reader = open_tar(archive)?;
    for entry in reader
        .entries()
        .map_err(|err| ArchiveError::io("read", archive, err))?
    {
        let entry = entry.map_err(|err| ArchiveError::io("read", archive, err))?;
        let raw = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
        slots.push(MemberPath::parse(&raw, tar_kind(&entry), exclusions)?);
    }

    let members: Vec<MemberPath> = slots.iter().flatten().cloned().collect();
    let placement = Placement::plan(&members, archive, target)?;

    let mut written = 0;
    let mut reader = open_tar(archive)?;
    let entries = reader
        .entries()
        .map_err(|err| ArchiveError::io("read", archive, err))?;
    for (entry, slot) in entries.zip(&slots) {
        let mut entry = entry.map_err(|err| ArchiveError::io("read", archive, err))?;
        let Some(member) = slot else {
            continue;
        };
        let mode = entry.header().mode().ok();
        if placement.write(member, &mut entry, mode)? {
            written += 1;
        }
    }

    Ok(Extraction {
        root: placement.root,
        written,
    })
}

fn tar_kind<R: Read>(entry: &tar::Entry<'_, R>) -> MemberKind {
    match entry.header().entry_type() {
        tar::EntryType::Directory => MemberKind::Directory,
        tar::EntryType::Regular | tar::EntryType::Continuous | tar::EntryType::GNUSparse => {
            MemberKind::File
        }
        tar::EntryType::Symlink => {
            let target = entry
                .link_name_bytes()
                .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                .unwrap_or_default();
            MemberKind::Symlink(target)
        }
        _ => MemberKind::Unsupported,
    }
}

fn write_member(
    member: &MemberPath,
    destination: &Path,
    reader: &mut dyn Read,
    mode: Option<u32>,
) -> Result<bool, ArchiveError> {
    match member.kind() {
        MemberKind::Directory => {
            fs::create_dir_all(destination)
                .map_err(|err| ArchiveError::io("create directory", destination, err))?;
            Ok(true)
        }
        MemberKind::File => {
            create_parent(destination)?;
            // replace a link of the same name instead of writing through it
            if destination
                .symlink_metadata()
                .is_ok_and(|meta| meta.file_type().is_symlink())
            {
                fs::remove_file(destination)
                    .map_err(|err| ArchiveError::io("replace", destination, err))?;
            }
            let mut out = File::create(destination)
                .map_err(|err| ArchiveError::io("create", destination, err))?;
            io::copy(reader, &mut out)
                .map_err(|err| ArchiveError::io("write", destination, err))?;
            apply_mode(destination, mode)?;
            Ok(true)
        }
        #[cfg(unix)]
        MemberKind::Symlink(target) => write_symlink(target, destination),
        #[cfg(not(unix))]
        MemberKind::Symlink(_) => {
            log::warn!("skipping symlink member '{}' on this platform", member.raw());
            Ok(false)
        }
        MemberKind::Unsupported => {
            log::warn!("skipping unsupported archive member '{}'", member.raw());
            Ok(false)
        }
    }
}

fn create_parent(destination: &Path) -> Result<(), ArchiveError> {
    match destination.parent() {
        Some(parent) => fs::create_dir_all(parent)
            .map_err(|err| ArchiveError::io("create directory", parent, err)),
        None => Ok(()),
    }
}

#[cfg(unix)]
fn write_symlink(target: &str, destination: &Path) -> Result<bool, ArchiveError> {
    create_parent(destination)?;
    if let Ok(meta) = destination.symlink_metadata() {
        if !meta.is_dir() {
            fs::remove_file(destination)
                .map_err(|err| ArchiveError::io("replace", destination, err))?;
        }
    }
    std::os::unix::fs::symlink(target, destination)
        .map_err(|err| ArchiveError::io("create link", destination, err))?;
    Ok(true)
}

#[cfg(unix)]
fn apply_mode(destination: &Path, mode: Option<u32>) -> Result<(), ArchiveError> {
    use std::os::unix::fs::PermissionsExt;

    let Some(mode) = mode.map(|m| m & 0o777).filter(|m| *m != 0) else {
        return Ok(());
    };
    fs::set_permissions(destination, fs::Permissions::from_mode(mode))
        .map_err(|err| ArchiveError::io("set permissions on", destination, err))
}

#[cfg(not(unix))]
fn apply_mode(_destination: &Path, _mode: Option<u32>) -> Result<(), ArchiveError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::test_support::{write_tar_gz, write_tar_gz_with_links, write_zip};
    use tempfile::TempDir;

    fn run_both(members: &[(&str, &str)], archive_stem: &str, tmp: &Path) -> [PathBuf; 2] {
        let zip_path = tmp.join(format!("{archive_stem}.zip"));
        let tar_path = tmp.join(format!("{archive_stem}.tar.gz"));
        write_zip(&zip_path, members);
        write_tar_gz(&tar_path, members);
        [zip_path, tar_path]
    }

    #[test]
    fn extracts_common_root_in_place() {
        for format in [ArchiveFormat::Zip, ArchiveFormat::TarGz] {
            let tmp = TempDir::new().unwrap();
            let [zip_path, tar_path] = run_both(
                &[
                    ("bundle/readme.txt", "hello"),
                    ("bundle/src/main.py", "print('ok')"),
                ],
                "bundle",
                tmp.path(),
            );
            let archive = if format == ArchiveFormat::Zip { zip_path } else { tar_path };
            let target = tmp.path().join("out");
            fs::create_dir(&target).unwrap();

            let result = extract(format, &archive, &target, &Exclusions::default()).unwrap();

            assert_eq!(result.root, target.join("bundle"));
            assert_eq!(
                fs::read_to_string(target.join("bundle/readme.txt")).unwrap(),
                "hello"
            );
            assert_eq!(
                fs::read_to_string(target.join("bundle/src/main.py")).unwrap(),
                "print('ok')"
            );
        }
    }

    #[test]
    fn existing_root_is_never_overwritten() {
        for format in [ArchiveFormat::Zip, ArchiveFormat::TarGz] {
            let tmp = TempDir::new().unwrap();
            let [zip_path, tar_path] = run_both(
                &[("bundle/info.txt", "data"), ("bundle/nested/deep.txt", "deep")],
                "bundle",
                tmp.path(),
            );
            let archive = if format == ArchiveFormat::Zip { zip_path } else { tar_path };
            let target = tmp.path().join("out");
            fs::create_dir_all(target.join("bundle")).unwrap();
            fs::write(target.join("bundle/info.txt"), "mine").unwrap();

            let first = extract(format, &archive, &target, &Exclusions::default()).unwrap();
            assert_eq!(first.root, target.join("bundle-1"));
            assert_eq!(
                fs::read_to_string(target.join("bundle-1/info.txt")).unwrap(),
                "data"
            );
            assert_eq!(
                fs::read_to_string(target.join("bundle-1/nested/deep.txt")).unwrap(),
                "deep"
            );
            assert_eq!(
                fs::read_to_string(target.join("bundle/info.txt")).unwrap(),
                "mine"
            );

            let second = extract(format, &archive, &target, &Exclusions::default()).unwrap();
            assert_eq!(second.root, target.join("bundle-2"));
        }
    }

    #[test]
    fn rename_uses_archive_name_not_root_name() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("release-1.0.tar.gz");
        write_tar_gz(&archive, &[("app/run.sh", "#!/bin/sh")]);
        let target = tmp.path().join("out");
        fs::create_dir_all(target.join("app")).unwrap();

        let result =
            extract(ArchiveFormat::TarGz, &archive, &target, &Exclusions::default()).unwrap();

        assert_eq!(result.root, target.join("release-1.0"));
        assert!(target.join("release-1.0/run.sh").is_file());
    }

    #[test]
    fn unsafe_member_aborts_before_any_write() {
        for (stem, bad) in [("dotdot", "../evil.txt"), ("absolute", "/tmp/evil.txt")] {
            for format in [ArchiveFormat::Zip, ArchiveFormat::TarGz] {
                let tmp = TempDir::new().unwrap();
                let [zip_path, tar_path] = run_both(
                    &[("safe/first.txt", "fine"), (bad, "danger"), ("safe/last.txt", "fine")],
                    stem,
                    tmp.path(),
                );
                let archive = if format == ArchiveFormat::Zip { zip_path } else { tar_path };
                let target = tmp.path().join("out");
                fs::create_dir(&target).unwrap();

                let err =
                    extract(format, &archive, &target, &Exclusions::default()).unwrap_err();

                assert!(err.is_unsafe_path(), "{format:?} {bad}: {err}");
                assert_eq!(fs::read_dir(&target).unwrap().count(), 0);
                assert!(!tmp.path().join("evil.txt").exists());
            }
        }
    }

    #[test]
    fn excluded_members_are_skipped() {
        for format in [ArchiveFormat::Zip, ArchiveFormat::TarGz] {
            let tmp = TempDir::new().unwrap();
            let [zip_path, tar_path] = run_both(
                &[("repo/.git/config", "[core]"), ("repo/file.txt", "data")],
                "repo",
                tmp.path(),
            );
            let archive = if format == ArchiveFormat::Zip { zip_path } else { tar_path };
            let target = tmp.path().join("out");
            fs::create_dir(&target).unwrap();

            extract(format, &archive, &target, &Exclusions::default()).unwrap();

            assert_eq!(fs::read_to_string(target.join("repo/file.txt")).unwrap(), "data");
            assert!(!target.join("repo/.git").exists());
        }
    }

    #[test]
    fn members_without_common_root_land_in_target() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("loose.zip");
        write_zip(&archive, &[("a.txt", "a"), ("docs/b.txt", "b")]);
        let target = tmp.path().join("out");
        fs::create_dir(&target).unwrap();

        let result =
            extract(ArchiveFormat::Zip, &archive, &target, &Exclusions::default()).unwrap();

        assert_eq!(result.root, target);
        assert_eq!(fs::read_to_string(target.join("a.txt")).unwrap(), "a");
        assert_eq!(fs::read_to_string(target.join("docs/b.txt")).unwrap(), "b");
    }

    #[test]
    fn directory_members_create_empty_directories() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("skeleton.tar.gz");
        write_tar_gz(&archive, &[("skeleton/", ""), ("skeleton/empty/", "")]);
        let target = tmp.path().join("out");
        fs::create_dir(&target).unwrap();

        let result =
            extract(ArchiveFormat::TarGz, &archive, &target, &Exclusions::default()).unwrap();

        assert_eq!(result.root, target.join("skeleton"));
        assert!(target.join("skeleton/empty").is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn chained_links_cannot_carry_writes_outside() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("deep/out");
        fs::create_dir_all(&target).unwrap();
        let archive = tmp.path().join("chain.tar.gz");
        write_tar_gz_with_links(
            &archive,
            &[("a/b/l1", ".."), ("a/b/l2", "l1/../../..")],
            &[("a/b/l2/escaped.txt", "gotcha")],
        );

        let err =
            extract(ArchiveFormat::TarGz, &archive, &target, &Exclusions::default()).unwrap_err();

        assert!(matches!(err, ArchiveError::LinkEscape { .. }), "{err}");
        assert!(err.is_unsafe_path());
        assert!(!tmp.path().join("escaped.txt").exists());
        assert!(!tmp.path().join("deep/escaped.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn file_member_replaces_link_of_same_name() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("deep/out");
        fs::create_dir_all(&target).unwrap();
        let archive = tmp.path().join("swap.tar.gz");
        write_tar_gz_with_links(
            &archive,
            &[("a/b/l1", ".."), ("a/b/l2", "l1/../../../victim.txt")],
            &[("a/b/l2", "payload")],
        );

        extract(ArchiveFormat::TarGz, &archive, &target, &Exclusions::default()).unwrap();

        let written = target.join("a/b/l2");
        assert!(!written.symlink_metadata().unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(&written).unwrap(), "payload");
        assert!(!tmp.path().join("victim.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn links_inside_target_are_followed() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("out");
        fs::create_dir_all(&target).unwrap();
        let archive = tmp.path().join("app.tar.gz");
        write_tar_gz_with_links(
            &archive,
            &[("app/current", "releases")],
            &[("app/releases/v1.txt", "one"), ("app/current/v2.txt", "two")],
        );

        extract(ArchiveFormat::TarGz, &archive, &target, &Exclusions::default()).unwrap();

        assert_eq!(
            fs::read_to_string(target.join("app/releases/v2.txt")).unwrap(),
            "two"
        );
    }

    #[test]
    fn corrupt_zip_is_an_archive_error() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("broken.zip");
        fs::write(&archive, "definitely not a zip").unwrap();

        let err = extract(ArchiveFormat::Zip, &archive, tmp.path(), &Exclusions::default())
            .unwrap_err();
        assert!(matches!(err, ArchiveError::Zip(_)));
    }
}
