//! Scoped staging directories.
//!
//! Each export or import owns exactly one staging directory. It is removed
//! when the [`StagingDir`] is dropped, so early returns, `?` propagation and
//! declined prompts all clean up.

use crate::error::{Result, TransferError};
use crate::layout::StoreLayout;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

/// A uniquely named temporary directory, deleted on drop.
#[derive(Debug)]
pub struct StagingDir {
    dir: TempDir,
}

impl StagingDir {
    /// Create a staging directory named `<prefix><random>` inside `root`,
    /// or inside the system temp directory when `root` is `None`.
    pub fn create(prefix: &str, root: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(prefix);

        let dir = match root {
            Some(root) => builder
                .tempdir_in(root)
                .map_err(|e| TransferError::io_with_path(e, root))?,
            None => builder.tempdir()?,
        };

        debug!("Created staging directory {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// The staging tree viewed as a store.
    pub fn layout(&self) -> StoreLayout {
        StoreLayout::new(self.dir.path())
    }

    /// Remove the directory now and report any failure.
    pub fn close(self) -> Result<()> {
        let path: PathBuf = self.dir.path().to_path_buf();
        self.dir.close().map_err(|e| {
            warn!("Failed to remove staging directory {}: {}", path.display(), e);
            TransferError::io_with_path(e, &path)
        })?;
        debug!("Removed staging directory {}", path.display());
        Ok(())
    }
}
