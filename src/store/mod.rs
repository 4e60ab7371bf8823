//! Document store abstraction for Kysy.
//!
//! Provides a trait-based interface over remote and in-process stores that
//! persist `(content, metadata, embedding)` rows and answer nearest-neighbor
//! queries.

mod memory;
mod supabase;

pub use memory::MemoryDocumentStore;
pub use supabase::{setup_sql, SupabaseStore};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A document in the knowledge base.
///
/// Immutable once created; the embedding is computed once and never
/// recomputed in place. Row identity is assigned by the store on insert and
/// never relied on to re-identify documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Text content.
    pub content: String,
    /// Arbitrary JSON metadata.
    #[serde(default)]
    pub metadata: Map<String, Value>,
    /// Embedding vector, if computed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl Document {
    /// Create a document without an embedding.
    pub fn new(content: impl Into<String>, metadata: Map<String, Value>) -> Self {
        Self {
            content: content.into(),
            metadata,
            embedding: None,
        }
    }

    /// Attach an embedding.
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }
}

/// A retrieved document with its similarity score (higher is more similar).
#[derive(Debug, Clone)]
pub struct RetrievedDocument {
    /// The matched document.
    pub document: Document,
    /// Cosine-similarity-derived score.
    pub similarity: f32,
}

/// Trait for document store implementations.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persist documents (embeddings must be set) and return their
    /// store-assigned ids.
    async fn insert(&self, documents: &[Document]) -> Result<Vec<String>>;

    /// Return up to `k` documents nearest to `query_embedding`, ordered by
    /// similarity descending. `filter` matches rows whose metadata is a
    /// superset of the given object.
    async fn search(
        &self,
        query_embedding: &[f32],
        k: usize,
        filter: Option<&Map<String, Value>>,
    ) -> Result<Vec<RetrievedDocument>>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Check whether `metadata` is a superset of `filter`.
pub fn metadata_matches(metadata: &Map<String, Value>, filter: &Map<String, Value>) -> bool {
    filter
        .iter()
        .all(|(key, value)| metadata.get(key) == Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_cosine_similarity_mismatched_lengths() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_metadata_matches_superset() {
        let metadata = json!({"topic": "rust", "category": "lang", "chunk_index": 0});
        let metadata = metadata.as_object().unwrap();

        let filter = json!({"topic": "rust"});
        assert!(metadata_matches(metadata, filter.as_object().unwrap()));

        let filter = json!({"topic": "rust", "category": "lang"});
        assert!(metadata_matches(metadata, filter.as_object().unwrap()));

        let filter = json!({"topic": "python"});
        assert!(!metadata_matches(metadata, filter.as_object().unwrap()));

        let filter = json!({"missing": true});
        assert!(!metadata_matches(metadata, filter.as_object().unwrap()));
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let metadata = Map::new();
        let filter = Map::new();
        assert!(metadata_matches(&metadata, &filter));
    }
}
