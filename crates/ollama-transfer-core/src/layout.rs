//! Canonical store paths.
//!
//! ```text
//! <base>/manifests/registry.ollama.ai/library/<model_name>/<model_size>
//! <base>/blobs/<digest with first ':' replaced by '-'>
//! ```
//!
//! Archives use the same relative paths, so one layout type serves the live
//! store, the staging tree and the unpacked archive.

use crate::config::StoreConfig;
use crate::digest::digest_to_blob_filename;
use crate::error::{Result, TransferError};
use crate::model_ref::ModelRef;
use std::path::{Path, PathBuf};

/// Resolve the default store base path.
///
/// Uses `$OLLAMA_MODELS` when set and non-empty, otherwise
/// `~/.ollama/models`.
pub fn default_base_path() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(StoreConfig::MODELS_ENV_VAR) {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }

    let home = dirs::home_dir().ok_or_else(|| TransferError::Io {
        message: "Could not determine home directory".to_string(),
        path: None,
        source: None,
    })?;
    Ok(StoreConfig::DEFAULT_STORE_SUBDIR
        .iter()
        .fold(home, |path, part| path.join(part)))
}

/// Path computations rooted at one store base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
    base: PathBuf,
}

impl StoreLayout {
    /// Use `base` as given.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Use `base` if provided, else the default store, made absolute against
    /// the current directory.
    pub fn resolve(base: Option<PathBuf>) -> Result<Self> {
        let base = match base {
            Some(base) => base,
            None => default_base_path()?,
        };
        let base = if base.is_absolute() {
            base
        } else {
            std::env::current_dir()?.join(base)
        };
        Ok(Self::new(base))
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// `<base>/manifests/registry.ollama.ai/library`
    pub fn manifests_root(&self) -> PathBuf {
        self.base
            .join(StoreConfig::MANIFESTS_DIR_NAME)
            .join(StoreConfig::REGISTRY_DOMAIN)
            .join(StoreConfig::LIBRARY_NAMESPACE)
    }

    /// `<base>/manifests/registry.ollama.ai/library/<model_name>/<model_size>`
    pub fn manifest_path(&self, model_name: &str, model_size: &str) -> PathBuf {
        self.manifests_root().join(model_name).join(model_size)
    }

    pub fn manifest_path_for(&self, model: &ModelRef) -> PathBuf {
        self.manifest_path(&model.name, &model.tag)
    }

    /// `<base>/blobs`
    pub fn blobs_dir(&self) -> PathBuf {
        self.base.join(StoreConfig::BLOBS_DIR_NAME)
    }

    /// `<base>/blobs/<blob filename for digest>`
    pub fn blob_path(&self, digest: &str) -> PathBuf {
        self.blobs_dir().join(digest_to_blob_filename(digest))
    }
}
