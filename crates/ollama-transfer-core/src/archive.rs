//! Tar archive creation and extraction.
//!
//! Archives mirror the store layout relative to their root: entries are
//! `manifests/...` and `blobs/...` with no enclosing directory.

use crate::config::ArchiveConfig;
use crate::error::{Result, TransferError};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Compression applied to a tar stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Zstd,
}

impl Compression {
    /// Detect compression from the leading bytes of a file.
    pub fn detect(head: &[u8]) -> Self {
        if head.starts_with(&ArchiveConfig::GZIP_MAGIC) {
            Compression::Gzip
        } else if head.starts_with(&ArchiveConfig::ZSTD_MAGIC) {
            Compression::Zstd
        } else {
            Compression::None
        }
    }
}

/// Write every file and directory below `root` into a tar at `dest`.
///
/// The archive is assembled in a temporary file next to `dest` and renamed
/// into place once complete, so a failure never leaves a truncated archive
/// under the final name. Returns the number of entries written.
pub fn write_archive(root: &Path, dest: &Path) -> Result<usize> {
    let parent = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let partial = tempfile::Builder::new()
        .prefix(ArchiveConfig::PARTIAL_ARCHIVE_PREFIX)
        .tempfile_in(parent)
        .map_err(|e| TransferError::io_with_path(e, parent))?;

    let mut builder = tar::Builder::new(BufWriter::new(partial.as_file()));
    let mut entries = 0;

    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        let relative = entry.path().strip_prefix(root).map_err(|e| TransferError::Io {
            message: format!("Entry {} escapes archive root: {}", entry.path().display(), e),
            path: Some(entry.path().to_path_buf()),
            source: None,
        })?;

        let appended = if entry.file_type().is_dir() {
            builder.append_dir(relative, entry.path())
        } else {
            builder.append_path_with_name(entry.path(), relative)
        };
        appended.map_err(|e| TransferError::Io {
            message: format!("Failed to add {} to archive: {}", relative.display(), e),
            path: Some(entry.path().to_path_buf()),
            source: Some(e),
        })?;

        debug!("Archived {}", relative.display());
        entries += 1;
    }

    let mut writer = builder
        .into_inner()
        .map_err(|e| TransferError::io_with_path(e, partial.path()))?;
    writer
        .flush()
        .map_err(|e| TransferError::io_with_path(e, partial.path()))?;
    drop(writer);

    partial
        .as_file()
        .sync_all()
        .map_err(|e| TransferError::io_with_path(e, partial.path()))?;
    partial
        .persist(dest)
        .map_err(|e| TransferError::io_with_path(e.error, dest))?;

    info!("Wrote {} entries to {}", entries, dest.display());
    Ok(entries)
}

/// Unpack the archive at `archive_path` into `dest`.
///
/// Plain, gzip-compressed and zstd-compressed tars are accepted. Entries
/// that would land outside `dest` are skipped by the tar reader.
pub fn unpack_archive(archive_path: &Path, dest: &Path) -> Result<Compression> {
    let file = File::open(archive_path).map_err(|e| TransferError::io_with_path(e, archive_path))?;
    let mut reader = BufReader::new(file);

    let head = reader
        .fill_buf()
        .map_err(|e| TransferError::io_with_path(e, archive_path))?;
    let compression = Compression::detect(head);
    debug!(
        "Unpacking {} ({:?} compression) into {}",
        archive_path.display(),
        compression,
        dest.display()
    );

    match compression {
        Compression::None => unpack_tar(reader, archive_path, dest)?,
        Compression::Gzip => unpack_tar(flate2::bufread::GzDecoder::new(reader), archive_path, dest)?,
        Compression::Zstd => {
            let decoder = zstd::Decoder::with_buffer(reader).map_err(|e| TransferError::Io {
                message: format!("Failed to create zstd decoder: {}", e),
                path: Some(archive_path.to_path_buf()),
                source: Some(e),
            })?;
            unpack_tar(decoder, archive_path, dest)?
        }
    }

    Ok(compression)
}

fn unpack_tar<R: Read>(reader: R, archive_path: &Path, dest: &Path) -> Result<()> {
    let mut archive = tar::Archive::new(reader);
    archive.set_preserve_mtime(true);
    archive.unpack(dest).map_err(|e| TransferError::Io {
        message: format!("Failed to extract {}: {}", archive_path.display(), e),
        path: Some(archive_path.to_path_buf()),
        source: Some(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn sample_tree(root: &Path) {
        let manifest_dir = root.join("manifests/registry.ollama.ai/library/m");
        fs::create_dir_all(&manifest_dir).unwrap();
        fs::write(manifest_dir.join("latest"), b"{}").unwrap();
        fs::create_dir_all(root.join("blobs")).unwrap();
        fs::write(root.join("blobs/sha256-aa"), b"blob").unwrap();
    }

    fn entry_names(archive: &Path) -> Vec<String> {
        let mut archive = tar::Archive::new(File::open(archive).unwrap());
        archive
            .entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_detect_compression() {
        assert_eq!(Compression::detect(&[0x1f, 0x8b, 0x08]), Compression::Gzip);
        assert_eq!(
            Compression::detect(&[0x28, 0xb5, 0x2f, 0xfd, 0x00]),
            Compression::Zstd
        );
        assert_eq!(Compression::detect(b"manifests/"), Compression::None);
        assert_eq!(Compression::detect(&[]), Compression::None);
    }

    #[test]
    fn test_archive_has_no_enclosing_directory() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("stage");
        sample_tree(&root);
        let dest = temp.path().join("out.tar");

        let count = write_archive(&root, &dest).unwrap();
        let names = entry_names(&dest);
        assert_eq!(count, names.len());
        assert!(names.iter().all(|n| n.starts_with("blobs") || n.starts_with("manifests")));
        assert!(names.contains(&"blobs/sha256-aa".to_string()));
        assert!(names.contains(&"manifests/registry.ollama.ai/library/m/latest".to_string()));
    }

    #[test]
    fn test_no_partial_file_left_behind() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("stage");
        sample_tree(&root);
        let out_dir = temp.path().join("out");
        fs::create_dir_all(&out_dir).unwrap();

        write_archive(&root, &out_dir.join("a.tar")).unwrap();
        let names: Vec<_> = fs::read_dir(&out_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.tar".to_string()]);
    }

    #[test]
    fn test_unpack_plain_and_gzip() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("stage");
        sample_tree(&root);
        let plain = temp.path().join("out.tar");
        write_archive(&root, &plain).unwrap();

        let dest = temp.path().join("plain");
        fs::create_dir_all(&dest).unwrap();
        assert_eq!(unpack_archive(&plain, &dest).unwrap(), Compression::None);
        assert_eq!(fs::read(dest.join("blobs/sha256-aa")).unwrap(), b"blob");

        let gz = temp.path().join("out.tar.gz");
        {
            let mut encoder = flate2::write::GzEncoder::new(
                File::create(&gz).unwrap(),
                flate2::Compression::default(),
            );
            encoder.write_all(&fs::read(&plain).unwrap()).unwrap();
            encoder.finish().unwrap();
        }
        let dest = temp.path().join("gz");
        fs::create_dir_all(&dest).unwrap();
        assert_eq!(unpack_archive(&gz, &dest).unwrap(), Compression::Gzip);
        assert_eq!(
            fs::read(dest.join("manifests/registry.ollama.ai/library/m/latest")).unwrap(),
            b"{}"
        );
    }

    #[test]
    fn test_unpack_zstd() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("stage");
        sample_tree(&root);
        let plain = temp.path().join("out.tar");
        write_archive(&root, &plain).unwrap();

        let zst = temp.path().join("out.tar.zst");
        let compressed = zstd::encode_all(fs::read(&plain).unwrap().as_slice(), 0).unwrap();
        fs::write(&zst, compressed).unwrap();

        let dest = temp.path().join("zst");
        fs::create_dir_all(&dest).unwrap();
        assert_eq!(unpack_archive(&zst, &dest).unwrap(), Compression::Zstd);
        assert_eq!(fs::read(dest.join("blobs/sha256-aa")).unwrap(), b"blob");
    }
}
