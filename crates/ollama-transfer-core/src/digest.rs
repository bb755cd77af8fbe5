//! Content digest helpers.
//!
//! Ollama names blob files after the digest of their content with the first
//! `:` replaced by `-`, e.g. `sha256:abc` is stored as `blobs/sha256-abc`.
//!
//! Verification is opt-in. The store format does not require it and the
//! transfer path never hashes blobs unless asked to.

use crate::config::DigestConfig;
use crate::error::{Result, TransferError};
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Convert a digest such as `sha256:abcdef` to its blob filename `sha256-abcdef`.
///
/// Digests using an unrecognized scheme are returned unchanged.
pub fn digest_to_blob_filename(digest: &str) -> String {
    if digest.starts_with(DigestConfig::SHA256_PREFIX) {
        digest.replacen(':', "-", 1)
    } else {
        digest.to_string()
    }
}

/// Whether `digest` maps to a single file name directly inside `blobs/`.
///
/// Rejects empty digests, path separators, NUL bytes and the `.`/`..` names.
pub fn is_safe_digest(digest: &str) -> bool {
    let filename = digest_to_blob_filename(digest);
    !filename.is_empty()
        && filename != "."
        && filename != ".."
        && !filename.contains(['/', '\\', '\0'])
}

/// Recover the digest a blob filename was derived from.
///
/// Returns `None` for names that do not use the `sha256-` scheme.
pub fn blob_filename_to_digest(filename: &str) -> Option<String> {
    filename
        .strip_prefix(DigestConfig::SHA256_FILENAME_PREFIX)
        .map(|hex| format!("{}{}", DigestConfig::SHA256_PREFIX, hex))
}

/// Compute the SHA256 of a file as a lowercase hex string.
pub fn compute_sha256(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let mut file = std::fs::File::open(path).map_err(|e| TransferError::io_with_path(e, path))?;

    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; DigestConfig::HASH_CHUNK_SIZE];
    loop {
        let bytes_read = file
            .read(&mut buffer)
            .map_err(|e| TransferError::io_with_path(e, path))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Check a blob file against the digest it is stored under.
///
/// Returns `Ok(true)` when the content matches, `Ok(false)` when the digest
/// scheme is not one we can check, and `DigestMismatch` otherwise.
pub fn verify_blob(path: impl AsRef<Path>, digest: &str) -> Result<bool> {
    let path = path.as_ref();
    let Some(expected) = digest.strip_prefix(DigestConfig::SHA256_PREFIX) else {
        debug!("Skipping verification of {} (unsupported digest scheme)", digest);
        return Ok(false);
    };

    let actual = compute_sha256(path)?;
    if !actual.eq_ignore_ascii_case(expected) {
        return Err(TransferError::DigestMismatch {
            path: path.to_path_buf(),
            expected: expected.to_string(),
            actual,
        });
    }

    debug!("Verified {}", path.display());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    // SHA256 of "hello world"
    const HELLO_SHA256: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    #[test]
    fn test_sha256_digest_becomes_filename() {
        assert_eq!(digest_to_blob_filename("sha256:abc123"), "sha256-abc123");
    }

    #[test]
    fn test_only_first_colon_is_replaced() {
        assert_eq!(digest_to_blob_filename("sha256:ab:cd"), "sha256-ab:cd");
    }

    #[test]
    fn test_unknown_scheme_passes_through() {
        assert_eq!(digest_to_blob_filename("blake3:abc"), "blake3:abc");
        assert_eq!(digest_to_blob_filename(""), "");
    }

    #[test]
    fn test_filename_conversion_is_idempotent() {
        let once = digest_to_blob_filename("sha256:deadbeef");
        assert!(!once.contains(':'));
        assert_eq!(digest_to_blob_filename(&once), once);
    }

    #[test]
    fn test_safe_digests() {
        assert!(is_safe_digest("sha256:abc123"));
        assert!(is_safe_digest("blake3:abc"));
        assert!(is_safe_digest("sha256:.."));
    }

    #[test]
    fn test_digests_that_leave_blobs_dir_are_unsafe() {
        assert!(!is_safe_digest(""));
        assert!(!is_safe_digest("."));
        assert!(!is_safe_digest(".."));
        assert!(!is_safe_digest("../../x"));
        assert!(!is_safe_digest("sha256:../../etc/passwd"));
        assert!(!is_safe_digest("sha256:a/b"));
        assert!(!is_safe_digest("sha256:..\\x"));
        assert!(!is_safe_digest("/abs/path"));
        assert!(!is_safe_digest("sha256:a\0b"));
    }

    #[test]
    fn test_filename_to_digest() {
        assert_eq!(
            blob_filename_to_digest("sha256-abc123").as_deref(),
            Some("sha256:abc123")
        );
        assert_eq!(blob_filename_to_digest("blake3-abc"), None);
    }

    #[test]
    fn test_compute_sha256() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"hello world").unwrap();
        file.flush().unwrap();

        assert_eq!(compute_sha256(file.path()).unwrap(), HELLO_SHA256);
    }

    #[test]
    fn test_verify_blob() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"hello world").unwrap();
        file.flush().unwrap();

        let good = format!("sha256:{}", HELLO_SHA256);
        assert!(verify_blob(file.path(), &good).unwrap());

        let bad = format!("sha256:{}", "0".repeat(64));
        let err = verify_blob(file.path(), &bad).unwrap_err();
        assert!(matches!(err, TransferError::DigestMismatch { .. }));

        assert!(!verify_blob(file.path(), "md5:abc").unwrap());
    }
}
