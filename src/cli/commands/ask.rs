//! Ask command implementation.

use crate::cli::{preflight, Output};
use crate::config::Settings;
use crate::rag::RagEngine;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(question: &str, thread: &str, sources: bool, settings: Settings) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(&settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'kysy doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let engine = RagEngine::new(settings)?;

    let spinner = Output::spinner("Searching knowledge base...");
    let result = engine.ask(question, thread).await;
    spinner.finish_and_clear();

    println!("\n{}\n", result.answer);

    if sources && !result.retrieved_docs.is_empty() {
        Output::header("Sources");
        for (i, doc) in result.retrieved_docs.iter().enumerate() {
            Output::source(i + 1, &doc.content);
        }
        println!();
    }

    Ok(())
}
