//! Manifest loading and digest extraction.
//!
//! A manifest is only read to find the blobs it references. It is never
//! rewritten; transfers copy the manifest file byte for byte.

use crate::error::{Result, TransferError};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

/// Parsed model manifest.
///
/// The document is kept as untyped JSON. Only `config.digest` and
/// `layers[].digest` are ever looked at, so unexpected shapes elsewhere in
/// the document do not make a well-formed manifest unreadable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManifestDocument {
    value: Value,
}

impl ManifestDocument {
    /// Parse a manifest from raw bytes.
    ///
    /// `path` is only used for error context.
    pub fn from_slice(bytes: &[u8], path: &Path) -> Result<Self> {
        let value = serde_json::from_slice(bytes).map_err(|e| TransferError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
            source: Some(e),
        })?;
        Ok(Self { value })
    }

    /// `config.digest`, if present and a string.
    pub fn config_digest(&self) -> Option<&str> {
        self.value.get("config")?.get("digest")?.as_str()
    }

    /// `digest` of every layer that has one.
    pub fn layer_digests(&self) -> impl Iterator<Item = &str> {
        self.value
            .get("layers")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|layer| layer.get("digest")?.as_str())
    }

    /// Collect every digest referenced by this manifest.
    pub fn digests(&self) -> BTreeSet<String> {
        extract_digests(self)
    }
}

/// Read and parse the manifest at `path`.
///
/// Fails with `NotFound` if `path` is not a regular file, and with `Parse`
/// if the contents are not well-formed JSON.
pub fn read_manifest(path: &Path) -> Result<ManifestDocument> {
    if !path.is_file() {
        return Err(TransferError::NotFound(path.to_path_buf()));
    }

    let bytes = std::fs::read(path).map_err(|e| TransferError::io_with_path(e, path))?;
    let document = ManifestDocument::from_slice(&bytes, path)?;
    debug!("Parsed manifest {}", path.display());
    Ok(document)
}

/// Collect the `config` digest and every layer digest, deduplicated.
///
/// Descriptors without a string digest are skipped.
pub fn extract_digests(document: &ManifestDocument) -> BTreeSet<String> {
    document
        .config_digest()
        .into_iter()
        .chain(document.layer_digests())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(json: &str) -> ManifestDocument {
        ManifestDocument::from_slice(json.as_bytes(), Path::new("test")).unwrap()
    }

    #[test]
    fn test_extract_config_and_layers() {
        let doc = parse(
            r#"{
                "schemaVersion": 2,
                "mediaType": "application/vnd.docker.distribution.manifest.v2+json",
                "config": {"mediaType": "application/vnd.docker.container.image.v1+json", "digest": "sha256:c1", "size": 10},
                "layers": [
                    {"mediaType": "application/vnd.ollama.image.model", "digest": "sha256:l1", "size": 100},
                    {"mediaType": "application/vnd.ollama.image.license", "digest": "sha256:l2", "size": 5}
                ]
            }"#,
        );
        assert_eq!(doc.config_digest(), Some("sha256:c1"));

        let digests: Vec<_> = extract_digests(&doc).into_iter().collect();
        assert_eq!(digests, vec!["sha256:c1", "sha256:l1", "sha256:l2"]);
    }

    #[test]
    fn test_duplicate_digests_are_collapsed() {
        let doc = parse(
            r#"{
                "config": {"digest": "sha256:same"},
                "layers": [{"digest": "sha256:same"}, {"digest": "sha256:other"}, {"digest": "sha256:other"}]
            }"#,
        );
        assert_eq!(doc.digests().len(), 2);
    }

    #[test]
    fn test_missing_fields_are_skipped() {
        assert!(parse("{}").digests().is_empty());
        assert!(parse(r#"{"config": {}}"#).digests().is_empty());
        assert!(parse(r#"{"layers": null}"#).digests().is_empty());

        let doc = parse(r#"{"layers": [{"size": 3}, {"digest": "sha256:x"}]}"#);
        assert_eq!(doc.digests().into_iter().collect::<Vec<_>>(), vec!["sha256:x"]);
    }

    #[test]
    fn test_unused_fields_of_any_type_are_accepted() {
        let doc = parse(
            r#"{
                "schemaVersion": "2",
                "mediaType": 7,
                "config": {"digest": "sha256:a", "size": -1, "mediaType": null},
                "layers": [{"digest": "sha256:b", "size": "big", "annotations": [1, 2]}]
            }"#,
        );
        assert_eq!(
            doc.digests().into_iter().collect::<Vec<_>>(),
            vec!["sha256:a", "sha256:b"]
        );
    }

    #[test]
    fn test_unexpected_shapes_yield_no_digests() {
        assert!(parse("[]").digests().is_empty());
        assert!(parse(r#"{"config": "sha256:a", "layers": {"digest": "sha256:b"}}"#)
            .digests()
            .is_empty());
        assert!(parse(r#"{"config": {"digest": 5}, "layers": [7, {"digest": false}]}"#)
            .digests()
            .is_empty());
    }

    #[test]
    fn test_read_manifest_not_found() {
        let temp = TempDir::new().unwrap();
        let err = read_manifest(&temp.path().join("missing")).unwrap_err();
        assert!(matches!(err, TransferError::NotFound(_)));

        // A directory is not a regular file either.
        let err = read_manifest(temp.path()).unwrap_err();
        assert!(matches!(err, TransferError::NotFound(_)));
    }

    #[test]
    fn test_read_manifest_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("latest");
        std::fs::write(&path, "not json {").unwrap();

        let err = read_manifest(&path).unwrap_err();
        assert!(matches!(err, TransferError::Parse { .. }));
        assert_eq!(err.kind(), "parse");
    }

    #[test]
    fn test_read_manifest_with_string_schema_version() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("latest");
        std::fs::write(&path, r#"{"schemaVersion": "2", "config": {"digest": "sha256:a"}}"#)
            .unwrap();

        let doc = read_manifest(&path).unwrap();
        assert!(doc.digests().contains("sha256:a"));
    }

    #[test]
    fn test_read_manifest_ok() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("latest");
        std::fs::write(&path, r#"{"config": {"digest": "sha256:c"}}"#).unwrap();

        let doc = read_manifest(&path).unwrap();
        assert!(doc.digests().contains("sha256:c"));
    }
}
