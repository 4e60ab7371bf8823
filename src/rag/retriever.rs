//! Query-time retrieval against the document store.

use crate::embedding::Embedder;
use crate::error::Result;
use crate::store::{DocumentStore, RetrievedDocument};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Retrieves the nearest documents for a query.
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn DocumentStore>,
}

impl Retriever {
    /// Create a new retriever.
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn DocumentStore>) -> Self {
        Self { embedder, store }
    }

    /// Embed the query once and search the store.
    ///
    /// Returns at most `k` documents, most similar first. An empty result is
    /// a valid state ("no knowledge"), not a failure. Embedding and store
    /// errors propagate unchanged; retry policy, if any, belongs to the
    /// underlying clients.
    #[instrument(skip(self, filter), fields(query = %query, k = k))]
    pub async fn retrieve(
        &self,
        query: &str,
        k: usize,
        filter: Option<&Map<String, Value>>,
    ) -> Result<Vec<RetrievedDocument>> {
        let query_embedding = self.embedder.embed_query(query).await?;
        let results = self.store.search(&query_embedding, k, filter).await?;

        debug!("Retrieved {} documents", results.len());
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Document, MemoryDocumentStore};
    use async_trait::async_trait;
    use serde_json::Map;

    /// Deterministic embedder for tests: a fixed unit vector per text hash.
    struct StubEmbedder;

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed_query(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0, 0.0])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0, 0.0]).collect())
        }

        fn dimensions(&self) -> usize {
            3
        }
    }

    #[tokio::test]
    async fn test_empty_store_returns_empty_not_error() {
        let retriever = Retriever::new(
            Arc::new(StubEmbedder),
            Arc::new(MemoryDocumentStore::new()),
        );

        let results = retriever.retrieve("anything", 4, None).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_retrieve_caps_at_k() {
        let store = Arc::new(MemoryDocumentStore::new());
        let docs: Vec<Document> = (0..10)
            .map(|i| {
                Document::new(format!("doc {}", i), Map::new())
                    .with_embedding(vec![1.0, i as f32 * 0.1, 0.0])
            })
            .collect();
        store.insert(&docs).await.unwrap();

        let retriever = Retriever::new(Arc::new(StubEmbedder), store);
        let results = retriever.retrieve("query", 4, None).await.unwrap();

        assert_eq!(results.len(), 4);
        for pair in results.windows(2) {
            assert!(pair[0].similarity >= pair[1].similarity);
        }
    }
}
