//! Centralized configuration for Ollama model transfer.
//!
//! The on-disk store layout is fixed by Ollama itself, so these are constants
//! rather than runtime settings. The only runtime knob is the store base path;
//! see [`crate::layout::default_base_path`].

/// Store layout constants shared by both endpoints of a transfer.
pub struct StoreConfig;

impl StoreConfig {
    pub const MANIFESTS_DIR_NAME: &'static str = "manifests";
    pub const REGISTRY_DOMAIN: &'static str = "registry.ollama.ai";
    pub const LIBRARY_NAMESPACE: &'static str = "library";
    pub const BLOBS_DIR_NAME: &'static str = "blobs";

    /// Environment variable Ollama reads for a non-default store location.
    pub const MODELS_ENV_VAR: &'static str = "OLLAMA_MODELS";
    /// Default store location relative to the user's home directory.
    pub const DEFAULT_STORE_SUBDIR: [&'static str; 2] = [".ollama", "models"];
}

/// Digest scheme constants.
pub struct DigestConfig;

impl DigestConfig {
    pub const SHA256_PREFIX: &'static str = "sha256:";
    pub const SHA256_FILENAME_PREFIX: &'static str = "sha256-";
    /// Chunk size for streaming blob verification (8MB).
    pub const HASH_CHUNK_SIZE: usize = 8 * 1024 * 1024;
}

/// Archive and staging naming.
pub struct ArchiveConfig;

impl ArchiveConfig {
    pub const EXPORT_NAME_PREFIX: &'static str = "ollama_export_";
    pub const EXPORT_EXTENSION: &'static str = "tar";
    pub const EXPORT_STAGING_PREFIX: &'static str = "ollama_export_";
    pub const IMPORT_STAGING_PREFIX: &'static str = "ollama_import_";
    /// Prefix of the temporary file an archive is written to before it is
    /// renamed into place.
    pub const PARTIAL_ARCHIVE_PREFIX: &'static str = ".ollama_export_partial_";

    pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
    pub const ZSTD_MAGIC: [u8; 4] = [0x28, 0xb5, 0x2f, 0xfd];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staging_prefixes_differ() {
        assert_ne!(
            ArchiveConfig::EXPORT_STAGING_PREFIX,
            ArchiveConfig::IMPORT_STAGING_PREFIX
        );
    }

    #[test]
    fn test_digest_prefixes_agree() {
        assert_eq!(
            DigestConfig::SHA256_PREFIX.trim_end_matches(':'),
            DigestConfig::SHA256_FILENAME_PREFIX.trim_end_matches('-')
        );
    }
}
