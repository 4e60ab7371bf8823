//! Retrieval-Augmented Generation pipeline.
//!
//! Ties retrieval, context assembly, and answer generation into a single
//! `ask` operation, plus the ingestion operations that feed the knowledge
//! base.

pub mod context;
mod engine;
mod retriever;
mod threads;

pub use context::{assemble_context, NO_DOCUMENTS_FOUND};
pub use engine::RagEngine;
pub use retriever::Retriever;
pub use threads::{Role, ThreadLog, ThreadMessage};

use crate::store::Document;
use serde::Serialize;

/// Result of a single `ask` call.
///
/// Always well-formed: failures inside the pipeline are downgraded to a
/// fixed apology answer with empty documents and context.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    /// The original query.
    pub query: String,
    /// The generated answer.
    pub answer: String,
    /// Retrieved documents, most similar first.
    pub retrieved_docs: Vec<Document>,
    /// The assembled context string fed to the generator.
    pub context: String,
}
