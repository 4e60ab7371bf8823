//! Ingest command implementation.

use super::parse_metadata;
use crate::cli::{preflight, Output};
use crate::config::Settings;
use crate::rag::RagEngine;
use anyhow::Result;
use std::path::PathBuf;

/// Run the ingest command.
pub async fn run_ingest(
    files: &[PathBuf],
    metadata: Option<&str>,
    settings: Settings,
) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(&settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'kysy doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let metadata = parse_metadata(metadata)?;
    let engine = RagEngine::new(settings)?;

    let spinner = Output::spinner(&format!("Ingesting {} file(s)...", files.len()));
    let ok = engine.add_documents_from_files(files, metadata).await;
    spinner.finish_and_clear();

    if ok {
        Output::success(&format!("Ingested {} file(s).", files.len()));
        Ok(())
    } else {
        Output::error("Ingestion failed. No documents were added.");
        anyhow::bail!("document ingestion failed");
    }
}
