//! Ollama Transfer - move installed Ollama models to and from tar archives.
//!
//! An Ollama store keeps one manifest per `name:tag` and a flat directory of
//! content-addressed blobs. This crate exports a model (its manifest plus the
//! blobs it references) into a single archive that mirrors the store layout,
//! and imports such archives back into a store.
//!
//! The operations never terminate the process. Fatal conditions come back as
//! [`TransferError`]; a declined overwrite prompt comes back as
//! [`TransferOutcome::Declined`].
//!
//! # Example
//!
//! ```rust,no_run
//! use ollama_transfer::{Exporter, Importer, ModelRef, StoreLayout};
//!
//! fn main() -> ollama_transfer::Result<()> {
//!     let model: ModelRef = "llama3:8b".parse()?;
//!
//!     let mut exporter = Exporter::new(StoreLayout::resolve(None)?);
//!     if let Some(report) = exporter.export(&model)?.completed() {
//!         let mut importer = Importer::new(StoreLayout::new("/mnt/backup/models"));
//!         importer.import(&report.archive_path)?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod config;
pub mod copier;
pub mod digest;
pub mod error;
pub mod exporter;
pub mod importer;
pub mod layout;
pub mod manifest;
pub mod model_ref;
pub mod outcome;
pub mod prompt;
pub mod staging;

// Re-export commonly used types
pub use archive::{unpack_archive, write_archive, Compression};
pub use copier::{FileCopier, MetadataCopier};
pub use digest::{blob_filename_to_digest, digest_to_blob_filename, is_safe_digest, verify_blob};
pub use error::{Result, TransferError};
pub use exporter::Exporter;
pub use importer::Importer;
pub use layout::{default_base_path, StoreLayout};
pub use manifest::{extract_digests, read_manifest, ManifestDocument};
pub use model_ref::ModelRef;
pub use outcome::{ExportOutcome, ExportReport, ImportOutcome, ImportReport, TransferOutcome};
pub use prompt::{AssumeAnswer, ConfirmOverwrite, ConsolePrompt};
pub use staging::StagingDir;
