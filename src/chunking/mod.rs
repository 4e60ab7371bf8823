//! Text chunking for embedding.
//!
//! Splits raw text into overlapping segments small enough to embed, tagging
//! each segment with positional metadata.

mod recursive;

pub use recursive::RecursiveSplitter;

use crate::config::settings::ChunkingSettings;
use crate::store::Document;
use serde_json::{Map, Value};

/// Strategy for estimating the token count of a chunk.
pub type TokenCounter = fn(&str) -> usize;

/// Approximate token count as character count / 4.
///
/// A crude proxy, not a real tokenizer. Kept as a named strategy so the
/// behavior stays reproducible without a tokenizer dependency.
pub fn approx_token_count(text: &str) -> usize {
    text.chars().count() / 4
}

/// Split `text` into chunk documents, merging `metadata` into each chunk.
///
/// Every chunk carries `chunk_index` (0-based, contiguous), `total_chunks`,
/// and `token_count` on top of the source metadata. Empty input produces an
/// empty vector; callers must handle zero chunks.
pub fn chunk_text(
    text: &str,
    metadata: Option<&Map<String, Value>>,
    settings: &ChunkingSettings,
) -> Vec<Document> {
    chunk_text_with_counter(text, metadata, settings, approx_token_count)
}

/// Like [`chunk_text`], with an explicit token counting strategy.
pub fn chunk_text_with_counter(
    text: &str,
    metadata: Option<&Map<String, Value>>,
    settings: &ChunkingSettings,
    token_counter: TokenCounter,
) -> Vec<Document> {
    let splitter = RecursiveSplitter::new(settings.chunk_size, settings.chunk_overlap);
    let pieces = splitter.split_text(text);
    let total = pieces.len();

    pieces
        .into_iter()
        .enumerate()
        .map(|(i, content)| {
            let mut meta = metadata.cloned().unwrap_or_default();
            meta.insert("chunk_index".to_string(), Value::from(i));
            meta.insert("total_chunks".to_string(), Value::from(total));
            meta.insert(
                "token_count".to_string(),
                Value::from(token_counter(&content)),
            );
            Document::new(content, meta)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(chunk_size: usize, chunk_overlap: usize) -> ChunkingSettings {
        ChunkingSettings {
            chunk_size,
            chunk_overlap,
        }
    }

    #[test]
    fn test_approx_token_count() {
        assert_eq!(approx_token_count(""), 0);
        assert_eq!(approx_token_count("abc"), 0);
        assert_eq!(approx_token_count("abcd"), 1);
        assert_eq!(approx_token_count(&"x".repeat(1000)), 250);
    }

    #[test]
    fn test_empty_input_yields_no_chunks() {
        let chunks = chunk_text("", None, &settings(1000, 200));
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_single_chunk_metadata() {
        let mut meta = Map::new();
        meta.insert("topic".to_string(), Value::from("t"));

        let chunks = chunk_text("A. B. C.", Some(&meta), &settings(1000, 200));
        assert_eq!(chunks.len(), 1);

        let chunk = &chunks[0];
        assert_eq!(chunk.content, "A. B. C.");
        assert_eq!(chunk.metadata["topic"], Value::from("t"));
        assert_eq!(chunk.metadata["chunk_index"], Value::from(0));
        assert_eq!(chunk.metadata["total_chunks"], Value::from(1));
        assert_eq!(chunk.metadata["token_count"], Value::from(2));
        assert!(chunk.embedding.is_none());
    }

    #[test]
    fn test_chunk_indices_are_contiguous() {
        let text = "word ".repeat(500);
        let chunks = chunk_text(&text, None, &settings(100, 20));
        assert!(chunks.len() > 1);

        let total = chunks.len();
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.metadata["chunk_index"], Value::from(i));
            assert_eq!(chunk.metadata["total_chunks"], Value::from(total));
        }
    }

    #[test]
    fn test_source_metadata_propagates_to_every_chunk() {
        let mut meta = Map::new();
        meta.insert("source".to_string(), Value::from("notes.txt"));

        let text = "sentence one. ".repeat(200);
        let chunks = chunk_text(&text, Some(&meta), &settings(100, 20));
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert_eq!(chunk.metadata["source"], Value::from("notes.txt"));
        }
    }
}
