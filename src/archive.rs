//! Zip container handling: extraction, repackaging, and scratch cleanup.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use tracing::debug;
use zip::ZipArchive;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::{Error, Result};
use crate::util::walk_files;

/// Extract every entry of the archive at `archive_path` under `dest`,
/// preserving relative paths and creating intermediate directories.
///
/// Entry names are validated with [`enclosed_name`] so a crafted archive
/// cannot write outside `dest`.
///
/// [`enclosed_name`]: zip::read::ZipFile::enclosed_name
pub fn unpack<P: AsRef<Path>, Q: AsRef<Path>>(archive_path: P, dest: Q) -> Result<()> {
    let dest = dest.as_ref();
    fs::create_dir_all(dest)?;

    let file = File::open(archive_path.as_ref())?;
    let mut archive = ZipArchive::new(file)?;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let Some(relative) = entry.enclosed_name() else {
            return Err(Error::UnsafeEntryPath(entry.name().to_string()));
        };
        let target = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out = File::create(&target)?;
            io::copy(&mut entry, &mut out)?;
        }
    }

    debug!(archive = %archive_path.as_ref().display(), dest = %dest.display(), "unpacked");
    Ok(())
}

/// Package every regular file under `source` into a new zip at `dest`,
/// named by its path relative to `source`. Directory entries are not added.
///
/// Fails with [`Error::OutputExists`] rather than overwriting an existing
/// file.
pub fn repack<P: AsRef<Path>, Q: AsRef<Path>>(source: P, dest: Q) -> Result<()> {
    let source = source.as_ref();
    let dest = dest.as_ref();
    if dest.exists() {
        return Err(Error::OutputExists(dest.to_path_buf()));
    }

    let file = File::create(dest)?;
    let mut zip = ZipWriter::new(file);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for path in walk_files(source)? {
        let relative = path.strip_prefix(source).map_err(|_| {
            io::Error::other(format!(
                "{} is not under {}",
                path.display(),
                source.display()
            ))
        })?;
        // Zip entry names use forward slashes on every platform.
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        zip.start_file(name, options)?;
        let mut input = File::open(&path)?;
        io::copy(&mut input, &mut zip)?;
    }

    zip.finish()?;
    debug!(source = %source.display(), dest = %dest.display(), "repacked");
    Ok(())
}

/// Remove a pipeline's scratch tree.
///
/// Called only after a successful repack; a failed run keeps its scratch
/// tree so it can be inspected.
pub fn clean_scratch<P: AsRef<Path>>(scratch: P) -> Result<()> {
    fs::remove_dir_all(scratch.as_ref())?;
    Ok(())
}
