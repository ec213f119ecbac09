//! Idempotent zip extraction with aggregate progress.
//!
//! Entries are expanded next to the archive (the destination root is the
//! archive's parent directory, matching where the fetcher put it). Entries
//! whose target file already exists are skipped and removed from the
//! progress denominator, so re-running extraction over a partially expanded
//! archive never overwrites anything and still finishes at 100%.

mod error;

pub use error::ExtractError;

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use crate::progress::{ProgressSink, ProgressTracker};

struct ManifestEntry {
    index: usize,
    target: Option<PathBuf>,
    size: u64,
    is_dir: bool,
    #[cfg(unix)]
    unix_mode: Option<u32>,
}

/// Expands `archive_path` into its parent directory.
///
/// Existing target files are never overwritten. When `delete_archive` is
/// true the archive file is removed after a fully successful pass.
pub fn extract(
    archive_path: &Path,
    delete_archive: bool,
    sink: &mut dyn ProgressSink,
) -> Result<(), ExtractError> {
    if !archive_path.exists() {
        return Err(ExtractError::NotFound {
            path: archive_path.to_path_buf(),
        });
    }
    // An archive downloaded to "sdk/archive.zip" expands under "sdk/".
    let dest_root = archive_path.parent().unwrap_or(Path::new("."));

    let file = File::open(archive_path).map_err(|source| ExtractError::Io {
        path: archive_path.to_path_buf(),
        source,
    })?;
    let mut archive = zip::ZipArchive::new(file).map_err(|source| ExtractError::Unreadable {
        path: archive_path.to_path_buf(),
        source,
    })?;

    let unreadable = |source| ExtractError::Unreadable {
        path: archive_path.to_path_buf(),
        source,
    };

    // First pass: entry names and declared sizes, for the progress denominator.
    let mut manifest = Vec::with_capacity(archive.len());
    let mut total_size = 0u64;
    for index in 0..archive.len() {
        let entry = archive.by_index(index).map_err(unreadable)?;
        let target = entry.enclosed_name().map(|rel| dest_root.join(rel));
        total_size += entry.size();
        manifest.push(ManifestEntry {
            index,
            target,
            size: entry.size(),
            is_dir: entry.is_dir(),
            #[cfg(unix)]
            unix_mode: entry.unix_mode(),
        });
    }

    tracing::info!(
        "extracting {} ({} entries, {} bytes declared)",
        archive_path.display(),
        manifest.len(),
        total_size
    );

    let mut tracker = ProgressTracker::new(total_size);
    for entry in &manifest {
        let target = match &entry.target {
            Some(t) => t,
            None => {
                // Entry path escapes the destination root; never write it.
                tracing::warn!("skipping archive entry with unsafe path (index {})", entry.index);
                tracker.discount(entry.size);
                sink.report(&tracker.snapshot());
                continue;
            }
        };

        if entry.is_dir {
            fs::create_dir_all(target).map_err(|source| ExtractError::Io {
                path: target.clone(),
                source,
            })?;
            sink.report(&tracker.snapshot());
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|source| ExtractError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        if target.is_file() {
            // Already materialized by an earlier run; contributes nothing to
            // the remaining work.
            tracker.discount(entry.size);
        } else {
            let mut source = archive.by_index(entry.index).map_err(unreadable)?;
            let mut out = File::create(target).map_err(|source| ExtractError::Io {
                path: target.clone(),
                source,
            })?;
            io::copy(&mut source, &mut out).map_err(|source| ExtractError::Io {
                path: target.clone(),
                source,
            })?;
            #[cfg(unix)]
            if let Some(mode) = entry.unix_mode {
                use std::os::unix::fs::PermissionsExt;
                let _ = fs::set_permissions(target, fs::Permissions::from_mode(mode));
            }
            tracker.add(entry.size);
        }
        sink.report(&tracker.snapshot());
    }

    if manifest.is_empty() {
        // Nothing to do still reports completion once.
        sink.report(&tracker.snapshot());
    }

    if delete_archive {
        drop(archive);
        fs::remove_file(archive_path).map_err(|source| ExtractError::Io {
            path: archive_path.to_path_buf(),
            source,
        })?;
        tracing::info!("removed archive {}", archive_path.display());
    }

    Ok(())
}
