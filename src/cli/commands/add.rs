//! Add command implementation.

use super::parse_metadata;
use crate::cli::{preflight, Output};
use crate::config::Settings;
use crate::rag::RagEngine;
use anyhow::Result;

/// Run the add command.
pub async fn run_add(text: &str, metadata: Option<&str>, settings: Settings) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(&settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'kysy doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let metadata = parse_metadata(metadata)?;
    let engine = RagEngine::new(settings)?;

    let spinner = Output::spinner("Adding document to knowledge base...");
    let ok = engine.add_text_document(text, metadata).await;
    spinner.finish_and_clear();

    if ok {
        Output::success("Document added to the knowledge base.");
        Ok(())
    } else {
        Output::error("Failed to add the document.");
        anyhow::bail!("document ingestion failed");
    }
}
