//! Subcommand handlers.

use crate::CommonArgs;
use anyhow::{Context, Result};
use ollama_transfer::{
    AssumeAnswer, ConsolePrompt, Exporter, Importer, ModelRef, StoreLayout, TransferOutcome,
};
use std::path::{Path, PathBuf};
use tracing::info;

pub fn export(model_spec: &str, common: CommonArgs, output_dir: Option<PathBuf>) -> Result<()> {
    let model = ModelRef::parse(model_spec)?;
    info!("Exporting model: name='{}', size='{}'", model.name, model.tag);

    let layout = StoreLayout::resolve(common.base_path)?;
    let mut exporter = Exporter::new(layout).with_digest_verification(common.verify);
    if let Some(dir) = output_dir {
        exporter = exporter.with_output_dir(dir);
    }
    exporter = if common.yes {
        exporter.with_confirm(AssumeAnswer(true))
    } else {
        exporter.with_confirm(ConsolePrompt::stdio())
    };

    let outcome = exporter
        .export(&model)
        .with_context(|| format!("Export of {} failed", model))?;

    if let TransferOutcome::Completed(report) = outcome {
        info!(
            "Exported {} with {} blob(s) to {}",
            report.model,
            report.blob_count,
            report.archive_path.display()
        );
    }
    Ok(())
}

pub fn import(tarball: &Path, common: CommonArgs) -> Result<()> {
    info!("Importing model from tarball: {}", tarball.display());

    let layout = StoreLayout::resolve(common.base_path)?;
    let mut importer = Importer::new(layout).with_digest_verification(common.verify);
    importer = if common.yes {
        importer.with_confirm(AssumeAnswer(true))
    } else {
        importer.with_confirm(ConsolePrompt::stdio())
    };

    let outcome = importer
        .import(tarball)
        .with_context(|| format!("Import of {} failed", tarball.display()))?;

    if let TransferOutcome::Completed(report) = outcome {
        let models: Vec<String> = report.manifests.iter().map(ToString::to_string).collect();
        info!(
            "Imported {} with {} blob(s)",
            models.join(", "),
            report.blob_count
        );
    }
    Ok(())
}
