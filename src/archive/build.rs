use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use walkdir::{DirEntry, WalkDir};
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

use super::{ArchiveError, ArchiveFormat, Exclusions};

struct SourceEntry {
    path: PathBuf,
    name: String,
    is_dir: bool,
    is_symlink: bool,
}

/// Packs `source_dir` into `archive`, prefixing every entry with the source
/// directory's own name and leaving excluded subtrees out.
pub fn build(
    format: ArchiveFormat,
    source_dir: &Path,
    archive: &Path,
    exclusions: &Exclusions,
) -> Result<(), ArchiveError> {
    if let Some(parent) = archive.parent() {
        fs::create_dir_all(parent)
            .map_err(|err| ArchiveError::io("create directory", parent, err))?;
    }

    let entries = collect_entries(source_dir, archive, exclusions)?;
    match format {
        ArchiveFormat::Zip => write_zip(archive, &entries)?,
        ArchiveFormat::TarGz => write_tar_gz(archive, &entries)?,
    }

    log::debug!(
        "created {} {} from {} ({} entries)",
        format.display_name(),
        archive.display(),
        source_dir.display(),
        entries.len()
    );
    Ok(())
}

fn collect_entries(
    source_dir: &Path,
    archive: &Path,
    exclusions: &Exclusions,
) -> Result<Vec<SourceEntry>, ArchiveError> {
    let base = source_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "archive".to_string());
    let is_excluded = |entry: &DirEntry| {
        entry
            .path()
            .strip_prefix(source_dir)
            .map(|relative| exclusions.matches_path(relative))
            .unwrap_or(false)
    };

    let mut entries = Vec::new();
    for entry in WalkDir::new(source_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_excluded(e))
    {
        let entry = entry.map_err(|err| {
            let path = err.path().unwrap_or(source_dir).to_path_buf();
            ArchiveError::io("read", path, err.into())
        })?;
        if entry.path() == archive {
            continue;
        }

        let relative = entry.path().strip_prefix(source_dir).unwrap_or(entry.path());
        let mut name = base.clone();
        for component in relative.components() {
            name.push('/');
            name.push_str(&component.as_os_str().to_string_lossy());
        }

        entries.push(SourceEntry {
            path: entry.path().to_path_buf(),
            name,
            is_dir: entry.file_type().is_dir(),
            is_symlink: entry.path_is_symlink(),
        });
    }
    Ok(entries)
}

fn write_tar_gz(archive: &Path, entries: &[SourceEntry]) -> Result<(), ArchiveError> {
    let file = File::create(archive).map_err(|err| ArchiveError::io("create", archive, err))?;
    let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.follow_symlinks(false);

    for entry in entries {
        let appended = if entry.is_dir {
            builder.append_dir(&entry.name, &entry.path)
        } else {
            builder.append_path_with_name(&entry.path, &entry.name)
        };
        appended.map_err(|err| ArchiveError::io("add", &entry.path, err))?;
    }

    builder
        .into_inner()
        .and_then(|encoder| encoder.finish())
        .and_then(|mut writer| writer.flush())
        .map_err(|err| ArchiveError::io("write", archive, err))
}

fn write_zip(archive: &Path, entries: &[SourceEntry]) -> Result<(), ArchiveError> {
    let file = File::create(archive).map_err(|err| ArchiveError::io("create", archive, err))?;
    let mut writer = ZipWriter::new(BufWriter::new(file));
    for entry in entries {
        let options = file_options(&entry.path);

        if entry.is_dir {
            writer.add_directory(format!("{}/", entry.name), options)?;
            continue;
        }
        if entry.is_symlink && !entry.path.is_file() {
            log::debug!("skipping dangling or directory link {}", entry.path.display());
            continue;
        }

        writer.start_file(entry.name.as_str(), options)?;
        let mut source =
            File::open(&entry.path).map_err(|err| ArchiveError::io("open", &entry.path, err))?;
        io::copy(&mut source, &mut writer)
            .map_err(|err| ArchiveError::io("compress", &entry.path, err))?;
    }

    writer
        .finish()?
        .flush()
        .map_err(|err| ArchiveError::io("write", archive, err))
}

fn file_options(path: &Path) -> SimpleFileOptions {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    match unix_mode(path) {
        Some(mode) => options.unix_permissions(mode),
        None => options,
    }
}

#[cfg(unix)]
fn unix_mode(path: &Path) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path).ok().map(|m| m.permissions().mode() & 0o777)
}

#[cfg(not(unix))]
fn unix_mode(_path: &Path) -> Option<u32> {
    None
}
