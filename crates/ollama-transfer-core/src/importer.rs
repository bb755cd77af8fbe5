//! Import of models from a tar archive into a store.
//!
//! The archive is unpacked into a staging directory, then every manifest
//! under `manifests/registry.ollama.ai/library/<name>/<tag>` and every file
//! under `blobs/` is copied into the destination store. Existing files are
//! only replaced after confirmation; a declined prompt stops the import and
//! keeps whatever was already copied.

use crate::archive::unpack_archive;
use crate::config::ArchiveConfig;
use crate::copier::{FileCopier, MetadataCopier};
use crate::digest::{blob_filename_to_digest, verify_blob};
use crate::error::{Result, TransferError};
use crate::layout::StoreLayout;
use crate::model_ref::ModelRef;
use crate::outcome::{ImportOutcome, ImportReport, TransferOutcome};
use crate::prompt::{AssumeAnswer, ConfirmOverwrite};
use crate::staging::StagingDir;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Imports archives into one store.
pub struct Importer {
    layout: StoreLayout,
    staging_root: Option<PathBuf>,
    verify_digests: bool,
    confirm: Box<dyn ConfirmOverwrite>,
    copier: Box<dyn FileCopier>,
}

impl Importer {
    /// Create an importer writing into `layout`.
    ///
    /// Overwrites are declined unless a different [`ConfirmOverwrite`] is set.
    pub fn new(layout: StoreLayout) -> Self {
        Self {
            layout,
            staging_root: None,
            verify_digests: false,
            confirm: Box::new(AssumeAnswer(false)),
            copier: Box::new(MetadataCopier),
        }
    }

    pub fn with_staging_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_root = Some(dir.into());
        self
    }

    /// Hash every `sha256-*` blob before copying it into the store.
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

    /// Import every model contained in the archive at `archive_path`.
    pub fn import(&mut self, archive_path: &Path) -> Result<ImportOutcome> {
        info!("Using base path: {}", self.layout.base().display());
        if !archive_path.is_file() {
            return Err(TransferError::NotFound(archive_path.to_path_buf()));
        }

        let staging = StagingDir::create(
            ArchiveConfig::IMPORT_STAGING_PREFIX,
            self.staging_root.as_deref(),
        )?;
        info!(
            "Extracting tarball '{}' to temporary directory.",
            archive_path.display()
        );
        unpack_archive(archive_path, staging.path())?;
        let unpacked = staging.layout();

        let manifests = match self.copy_manifests(&unpacked)? {
            TransferOutcome::Completed(manifests) => manifests,
            TransferOutcome::Declined { path } => {
                return Ok(TransferOutcome::Declined { path });
            }
        };

        let blob_count = match self.copy_blobs(&unpacked)? {
            TransferOutcome::Completed(count) => count,
            TransferOutcome::Declined { path } => {
                return Ok(TransferOutcome::Declined { path });
            }
        };

        staging.close()?;
        info!("Import successful.");
        Ok(TransferOutcome::Completed(ImportReport {
            manifests,
            blob_count,
        }))
    }

    fn copy_manifests(&mut self, unpacked: &StoreLayout) -> Result<TransferOutcome<Vec<ModelRef>>> {
        let root = unpacked.manifests_root();
        if !root.is_dir() {
            return Err(TransferError::structural(
                "archive does not contain the expected manifest directory structure",
            ));
        }

        let mut copied = Vec::new();
        for model_dir in sorted_entries(&root)? {
            if !model_dir.is_dir() {
                continue;
            }
            let Some(name) = utf8_file_name(&model_dir) else {
                continue;
            };

            for manifest in sorted_entries(&model_dir)? {
                if !manifest.is_file() {
                    continue;
                }
                let Some(tag) = utf8_file_name(&manifest) else {
                    continue;
                };
                let model = ModelRef::new(name.clone(), tag);

                let dest = self.layout.manifest_path_for(&model);
                if let Some(parent) = dest.parent() {
                    fs::create_dir_all(parent)
                        .map_err(|e| TransferError::io_with_path(e, parent))?;
                }
                if dest.exists() && !self.confirm.confirm(&dest) {
                    info!("Aborted by user.");
                    return Ok(TransferOutcome::Declined { path: dest });
                }

                info!(
                    "Copying manifest for model '{}', size '{}' to '{}'",
                    model.name,
                    model.tag,
                    dest.display()
                );
                self.copier.copy(&manifest, &dest)?;
                copied.push(model);
            }
        }

        if copied.is_empty() {
            return Err(TransferError::structural("no manifest found in archive"));
        }
        Ok(TransferOutcome::Completed(copied))
    }

    fn copy_blobs(&mut self, unpacked: &StoreLayout) -> Result<TransferOutcome<usize>> {
        let src_dir = unpacked.blobs_dir();
        if !src_dir.is_dir() {
            return Err(TransferError::structural(
                "archive does not contain a 'blobs' directory",
            ));
        }

        let dest_dir = self.layout.blobs_dir();
        fs::create_dir_all(&dest_dir).map_err(|e| TransferError::io_with_path(e, &dest_dir))?;

        let mut count = 0;
        for src in sorted_entries(&src_dir)? {
            if !src.is_file() {
                warn!("Skipping non-file entry {}", src.display());
                continue;
            }
            let Some(file_name) = src.file_name() else {
                continue;
            };

            if self.verify_digests {
                match blob_filename_to_digest(&file_name.to_string_lossy()) {
                    Some(digest) => {
                        verify_blob(&src, &digest)?;
                    }
                    None => debug!("Not verifying {} (unrecognized name)", src.display()),
                }
            }

            let dest = dest_dir.join(file_name);
            if dest.exists() && !self.confirm.confirm(&dest) {
                info!("Aborted by user.");
                return Ok(TransferOutcome::Declined { path: dest });
            }

            info!(
                "Copying blob file '{}' to '{}'",
                file_name.to_string_lossy(),
                dest_dir.display()
            );
            self.copier.copy(&src, &dest)?;
            count += 1;
        }

        Ok(TransferOutcome::Completed(count))
    }
}

/// Entries of `dir`, sorted by path for a stable copy order.
fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)
        .map_err(|e| TransferError::io_with_path(e, dir))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| TransferError::io_with_path(e, dir))?;
    entries.sort();
    Ok(entries)
}

fn utf8_file_name(path: &Path) -> Option<String> {
    let name = path.file_name()?;
    match name.to_str() {
        Some(name) => Some(name.to_string()),
        None => {
            warn!("Skipping non UTF-8 entry {}", path.display());
            None
        }
    }
}
