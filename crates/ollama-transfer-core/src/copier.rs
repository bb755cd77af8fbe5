//! File copying with metadata preservation.

use crate::error::{Result, TransferError};
use std::fs::{self, File, FileTimes};
use std::path::Path;
use tracing::{debug, warn};

/// Copies one file to another location.
pub trait FileCopier {
    /// Copy `src` to `dest`, replacing `dest` if it exists.
    ///
    /// Returns the number of bytes copied.
    fn copy(&mut self, src: &Path, dest: &Path) -> Result<u64>;
}

/// Copies contents and permission bits, then carries over the source's
/// access and modification times.
///
/// Timestamp restoration is best effort; a failure is logged and the copy
/// still counts as successful.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataCopier;

impl MetadataCopier {
    fn restore_times(src: &Path, dest: &Path) -> std::io::Result<()> {
        let meta = fs::metadata(src)?;
        let mut times = FileTimes::new().set_modified(meta.modified()?);
        if let Ok(accessed) = meta.accessed() {
            times = times.set_accessed(accessed);
        }

        // Copied permissions may be read-only; the owner can still set times
        // through a read handle on Unix.
        let file = File::options()
            .write(true)
            .open(dest)
            .or_else(|_| File::open(dest))?;
        file.set_times(times)
    }
}

impl FileCopier for MetadataCopier {
    fn copy(&mut self, src: &Path, dest: &Path) -> Result<u64> {
        let bytes = fs::copy(src, dest).map_err(|e| TransferError::Io {
            message: format!("Failed to copy {} to {}: {}", src.display(), dest.display(), e),
            path: Some(dest.to_path_buf()),
            source: Some(e),
        })?;

        if let Err(e) = Self::restore_times(src, dest) {
            warn!("Failed to preserve timestamps on {}: {}", dest.display(), e);
        }

        debug!("Copied {} ({} bytes)", dest.display(), bytes);
        Ok(bytes)
    }
}
