//! In-memory document store implementation.
//!
//! Useful for testing and for trying Kysy without a Supabase project.

use super::{cosine_similarity, metadata_matches, Document, DocumentStore, RetrievedDocument};
use crate::error::{KysyError, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::RwLock;

/// In-memory document store with cosine similarity computed in-process.
pub struct MemoryDocumentStore {
    documents: RwLock<Vec<Document>>,
}

impl MemoryDocumentStore {
    /// Create a new in-memory document store.
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(Vec::new()),
        }
    }

    /// Get total document count.
    pub fn document_count(&self) -> usize {
        self.documents.read().unwrap().len()
    }
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert(&self, documents: &[Document]) -> Result<Vec<String>> {
        for doc in documents {
            if doc.embedding.is_none() {
                return Err(KysyError::InvalidInput(
                    "document has no embedding".to_string(),
                ));
            }
        }

        let mut store = self.documents.write().unwrap();
        let mut ids = Vec::with_capacity(documents.len());
        for doc in documents {
            ids.push((store.len() + 1).to_string());
            store.push(doc.clone());
        }
        Ok(ids)
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        k: usize,
        filter: Option<&Map<String, Value>>,
    ) -> Result<Vec<RetrievedDocument>> {
        let docs = self.documents.read().unwrap();

        let mut results: Vec<RetrievedDocument> = docs
            .iter()
            .filter(|doc| match filter {
                Some(filter) => metadata_matches(&doc.metadata, filter),
                None => true,
            })
            .filter_map(|doc| {
                doc.embedding.as_ref().map(|embedding| RetrievedDocument {
                    document: doc.clone(),
                    similarity: cosine_similarity(query_embedding, embedding),
                })
            })
            .collect();

        // Stable sort: insertion order breaks ties.
        results.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(k);

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(content: &str, metadata: Value, embedding: Vec<f32>) -> Document {
        Document::new(content, metadata.as_object().unwrap().clone()).with_embedding(embedding)
    }

    #[tokio::test]
    async fn test_insert_and_search() {
        let store = MemoryDocumentStore::new();

        let docs = vec![
            doc("hello world", json!({"topic": "greeting"}), vec![1.0, 0.0, 0.0]),
            doc("goodbye world", json!({"topic": "farewell"}), vec![0.0, 1.0, 0.0]),
        ];

        let ids = store.insert(&docs).await.unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(store.document_count(), 2);

        let results = store.search(&[1.0, 0.0, 0.0], 10, None).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].document.content, "hello world");
        assert!(results[0].similarity > results[1].similarity);
    }

    #[tokio::test]
    async fn test_search_respects_k() {
        let store = MemoryDocumentStore::new();
        let docs: Vec<Document> = (0..10)
            .map(|i| doc(&format!("doc {}", i), json!({}), vec![1.0, i as f32]))
            .collect();
        store.insert(&docs).await.unwrap();

        let results = store.search(&[1.0, 0.0], 4, None).await.unwrap();
        assert_eq!(results.len(), 4);
    }

    #[tokio::test]
    async fn test_search_empty_store_returns_empty() {
        let store = MemoryDocumentStore::new();
        let results = store.search(&[1.0, 0.0, 0.0], 4, None).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_search_with_metadata_filter() {
        let store = MemoryDocumentStore::new();
        let docs = vec![
            doc("rust doc", json!({"topic": "rust"}), vec![1.0, 0.0]),
            doc("python doc", json!({"topic": "python"}), vec![1.0, 0.0]),
        ];
        store.insert(&docs).await.unwrap();

        let filter = json!({"topic": "rust"});
        let results = store
            .search(&[1.0, 0.0], 10, Some(filter.as_object().unwrap()))
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document.content, "rust doc");
    }

    #[tokio::test]
    async fn test_insert_rejects_missing_embedding() {
        let store = MemoryDocumentStore::new();
        let docs = vec![Document::new("no embedding", Map::new())];
        let result = store.insert(&docs).await;
        assert!(matches!(result, Err(KysyError::InvalidInput(_))));
    }
}
