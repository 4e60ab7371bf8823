//! Context assembly for answer generation.

use crate::store::Document;

/// Sentinel context used when retrieval finds nothing, so the generator is
/// never silently handed an empty string that implies something was found.
pub const NO_DOCUMENTS_FOUND: &str = "No relevant documents found.";

/// Join retrieved documents into a single numbered context string.
///
/// Emits `"Document {i}:\n{content}\n"` for each document in input order
/// (1-indexed), blocks separated by a single blank line. Input order is
/// preserved exactly; callers pass documents similarity-descending.
pub fn assemble_context(docs: &[Document]) -> String {
    if docs.is_empty() {
        return NO_DOCUMENTS_FOUND.to_string();
    }

    docs.iter()
        .enumerate()
        .map(|(i, doc)| format!("Document {}:\n{}\n", i + 1, doc.content))
        .collect::<Vec<_>>()
        .join("\n")
}
