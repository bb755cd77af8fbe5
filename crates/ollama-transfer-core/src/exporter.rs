//! Export of an installed model to a tar archive.
//!
//! The export reads the model's manifest, checks that every referenced blob
//! is present, mirrors the manifest and blobs into a staging directory and
//! archives that directory.

use crate::archive::write_archive;
use crate::config::ArchiveConfig;
use crate::copier::{FileCopier, MetadataCopier};
use crate::digest::{is_safe_digest, verify_blob};
use crate::error::{Result, TransferError};
use crate::layout::StoreLayout;
use crate::manifest::read_manifest;
use crate::model_ref::ModelRef;
use crate::outcome::{ExportOutcome, ExportReport, TransferOutcome};
use crate::prompt::{AssumeAnswer, ConfirmOverwrite};
use crate::staging::StagingDir;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Exports models from one store.
///
/// By default overwrites of an existing archive are declined and files are
/// copied with [`MetadataCopier`]; use the builder methods to change that.
pub struct Exporter {
    layout: StoreLayout,
    output_dir: PathBuf,
    staging_root: Option<PathBuf>,
    verify_digests: bool,
    confirm: Box<dyn ConfirmOverwrite>,
    copier: Box<dyn FileCopier>,
}

impl Exporter {
    /// Create an exporter reading from `layout` and writing archives to the
    /// current directory.
    pub fn new(layout: StoreLayout) -> Self {
        Self {
            layout,
            output_dir: PathBuf::from("."),
            staging_root: None,
            verify_digests: false,
            confirm: Box::new(AssumeAnswer(false)),
            copier: Box::new(MetadataCopier),
        }
    }

    /// Directory the archive is written to.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Directory staging directories are created in (system temp by default).
    pub fn with_staging_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_root = Some(dir.into());
        self
    }

    /// Hash every sha256 blob before staging it.
    pub fn with_digest_verification(mut self, enabled: bool) -> Self {
        self.verify_digests = enabled;
        self
    }

    pub fn with_confirm(mut self, confirm: impl ConfirmOverwrite + 'static) -> Self {
        self.confirm = Box::new(confirm);
        self
    }

    pub fn with_copier(mut self, copier: impl FileCopier + 'static) -> Self {
        self.copier = Box::new(copier);
        self
    }

    /// Path the archive for `model` will be written to.
    pub fn archive_path(&self, model: &ModelRef) -> PathBuf {
        self.output_dir.join(model.archive_file_name())
    }

    /// Export `model` to `ollama_export_<name>_<tag>.tar`.
    pub fn export(&mut self, model: &ModelRef) -> Result<ExportOutcome> {
        info!("Using base path: {}", self.layout.base().display());

        let manifest_path = self.layout.manifest_path_for(model);
        info!("Reading manifest from: {}", manifest_path.display());
        let manifest = read_manifest(&manifest_path)?;

        let digests = manifest.digests();
        info!("Found {} digest(s): {:?}", digests.len(), digests);

        if let Some(bad) = digests.iter().find(|d| !is_safe_digest(d)) {
            error!("Manifest references invalid digest '{}'", bad);
            return Err(TransferError::Parse {
                path: manifest_path,
                message: format!("invalid digest '{}'", bad),
                source: None,
            });
        }

        let blobs = self.resolve_blobs(digests.iter().map(String::as_str))?;
        info!("All blob files found in: {}", self.layout.blobs_dir().display());

        if self.verify_digests {
            for (digest, path) in &blobs {
                verify_blob(path, digest)?;
            }
            info!("Verified {} blob(s)", blobs.len());
        }

        let staging = StagingDir::create(
            ArchiveConfig::EXPORT_STAGING_PREFIX,
            self.staging_root.as_deref(),
        )?;
        let staged = staging.layout();

        let staged_manifest = staged.manifest_path_for(model);
        create_parent(&staged_manifest)?;
        info!("Copying manifest to temporary location: {}", staged_manifest.display());
        self.copier.copy(&manifest_path, &staged_manifest)?;

        let staged_blobs = staged.blobs_dir();
        fs::create_dir_all(&staged_blobs)
            .map_err(|e| TransferError::io_with_path(e, &staged_blobs))?;
        for (digest, path) in &blobs {
            info!("Copying blob '{}' to temporary location.", digest);
            self.copier.copy(path, &staged.blob_path(digest))?;
        }

        let archive_path = self.archive_path(model);
        if archive_path.exists() && !self.confirm.confirm(&archive_path) {
            info!("Aborted by user.");
            return Ok(TransferOutcome::Declined { path: archive_path });
        }

        info!("Creating tarball: {}", archive_path.display());
        write_archive(staging.path(), &archive_path)?;
        staging.close()?;

        info!("Export successful. Tarball created: {}", archive_path.display());
        Ok(TransferOutcome::Completed(ExportReport {
            model: model.clone(),
            manifest_path,
            archive_path,
            blob_count: blobs.len(),
        }))
    }

    /// Map digests to blob paths, failing with every missing path at once.
    fn resolve_blobs<'a>(
        &self,
        digests: impl IntoIterator<Item = &'a str>,
    ) -> Result<Vec<(String, PathBuf)>> {
        let mut found = Vec::new();
        let mut missing = Vec::new();

        for digest in digests {
            let path = self.layout.blob_path(digest);
            if path.is_file() {
                found.push((digest.to_string(), path));
            } else {
                missing.push(path);
            }
        }

        if !missing.is_empty() {
            error!("The following blob files are missing:");
            for path in &missing {
                error!("  {}", path.display());
            }
            return Err(TransferError::MissingBlobs { paths: missing });
        }

        Ok(found)
    }
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| TransferError::io_with_path(e, parent))?;
    }
    Ok(())
}
