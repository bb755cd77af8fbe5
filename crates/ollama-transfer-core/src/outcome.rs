//! Results of a finished export or import.

use crate::model_ref::ModelRef;
use std::path::PathBuf;

/// How a transfer ended when no fatal error occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome<T> {
    /// All work was committed.
    Completed(T),
    /// The user declined to overwrite `path`. Work committed before the
    /// prompt is kept.
    Declined { path: PathBuf },
}

impl<T> TransferOutcome<T> {
    pub fn is_completed(&self) -> bool {
        matches!(self, TransferOutcome::Completed(_))
    }

    /// The report, if the transfer completed.
    pub fn completed(self) -> Option<T> {
        match self {
            TransferOutcome::Completed(report) => Some(report),
            TransferOutcome::Declined { .. } => None,
        }
    }
}

/// Summary of a completed export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub model: ModelRef,
    pub manifest_path: PathBuf,
    pub archive_path: PathBuf,
    pub blob_count: usize,
}

/// Summary of a completed import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    /// Manifests copied into the store, in discovery order.
    pub manifests: Vec<ModelRef>,
    pub blob_count: usize,
}

pub type ExportOutcome = TransferOutcome<ExportReport>;
pub type ImportOutcome = TransferOutcome<ImportReport>;
