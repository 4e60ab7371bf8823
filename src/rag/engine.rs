//! The ask/ingest engine.
//!
//! Sequences retrieve → assemble → generate as a plain ordered pipeline with
//! an explicit state record passed by value between stages. The engine owns
//! the external clients; front-ends construct it once and share it.

use super::{assemble_context, QueryResult, Retriever, ThreadLog, ThreadMessage};
use crate::chunking::chunk_text;
use crate::config::{Prompts, Settings};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{KysyError, Result};
use crate::generation::{Generator, OpenAIGenerator};
use crate::store::{Document, DocumentStore, MemoryDocumentStore, SupabaseStore};
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// RAG engine for question answering and document ingestion.
pub struct RagEngine {
    settings: Settings,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn DocumentStore>,
    generator: Arc<dyn Generator>,
    retriever: Retriever,
    threads: ThreadLog,
    apology: String,
}

/// State carried by value through the ask pipeline.
struct AskState {
    query: String,
    retrieved_docs: Vec<Document>,
    context: String,
}

impl RagEngine {
    /// Create an engine wired to the configured external services.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let embedder: Arc<dyn Embedder> = Arc::new(OpenAIEmbedder::with_config(
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
        ));

        let store: Arc<dyn DocumentStore> = match settings.store.provider.as_str() {
            "memory" => Arc::new(MemoryDocumentStore::new()),
            "supabase" => Arc::new(SupabaseStore::from_env(&settings.store)?),
            other => {
                return Err(KysyError::Config(format!(
                    "Unknown store provider: {}",
                    other
                )))
            }
        };

        let generator: Arc<dyn Generator> = Arc::new(OpenAIGenerator::new(
            &settings.generation.model,
            settings.generation.temperature,
            &settings.generation.language,
            prompts.clone(),
        ));

        Ok(Self::with_components(
            settings, prompts, embedder, store, generator,
        ))
    }

    /// Create an engine with injected components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn DocumentStore>,
        generator: Arc<dyn Generator>,
    ) -> Self {
        let retriever = Retriever::new(embedder.clone(), store.clone());
        let apology = prompts.rag.apology.clone();

        Self {
            settings,
            embedder,
            store,
            generator,
            retriever,
            threads: ThreadLog::new(),
            apology,
        }
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Get a thread's recorded message history.
    pub fn thread_history(&self, thread_id: &str) -> Vec<ThreadMessage> {
        self.threads.history(thread_id)
    }

    /// Ask a question and get an answer from the knowledge base.
    ///
    /// Never fails past this boundary: any error in retrieval or generation
    /// is logged and downgraded to a fixed apology answer with empty
    /// documents and context. `thread_id` only namespaces the recorded
    /// conversation history.
    #[instrument(skip(self), fields(query = %query, thread_id = %thread_id))]
    pub async fn ask(&self, query: &str, thread_id: &str) -> QueryResult {
        let result = match self.run_ask(query).await {
            Ok(result) => result,
            Err(e) => {
                error!("Ask pipeline failed: {}", e);
                QueryResult {
                    query: query.to_string(),
                    answer: self.apology.clone(),
                    retrieved_docs: Vec::new(),
                    context: String::new(),
                }
            }
        };

        self.threads.record_exchange(thread_id, query, &result.answer);
        result
    }

    async fn run_ask(&self, query: &str) -> Result<QueryResult> {
        let state = AskState {
            query: query.to_string(),
            retrieved_docs: Vec::new(),
            context: String::new(),
        };

        let state = self.retrieve_stage(state).await?;
        self.generate_stage(state).await
    }

    /// Retrieve documents and assemble the context, zero or many.
    async fn retrieve_stage(&self, mut state: AskState) -> Result<AskState> {
        let results = self
            .retriever
            .retrieve(&state.query, self.settings.retrieval.top_k, None)
            .await?;

        state.retrieved_docs = results.into_iter().map(|r| r.document).collect();
        state.context = assemble_context(&state.retrieved_docs);
        Ok(state)
    }

    /// Generate the answer from the assembled context.
    async fn generate_stage(&self, state: AskState) -> Result<QueryResult> {
        let answer = self.generator.generate(&state.context, &state.query).await?;

        info!("Generated answer for query: {}", state.query);

        Ok(QueryResult {
            query: state.query,
            answer,
            retrieved_docs: state.retrieved_docs,
            context: state.context,
        })
    }

    /// Add a text document to the knowledge base.
    ///
    /// Returns whether ingestion succeeded; failures are logged, never
    /// raised. A partial failure counts as total failure.
    #[instrument(skip(self, text, metadata))]
    pub async fn add_text_document(
        &self,
        text: &str,
        metadata: Option<Map<String, Value>>,
    ) -> bool {
        match self.ingest_chunks(chunk_text(
            text,
            metadata.as_ref(),
            &self.settings.chunking,
        ))
        .await
        {
            Ok(count) => {
                info!("Added text document with {} chunks", count);
                true
            }
            Err(e) => {
                error!("Failed to add text document: {}", e);
                false
            }
        }
    }

    /// Add one or more files to the knowledge base.
    ///
    /// Unreadable files are skipped with a warning; if no file yields any
    /// chunks, the whole call fails. `metadata` is merged over the
    /// auto-populated file metadata, caller keys winning.
    #[instrument(skip_all, fields(files = paths.len()))]
    pub async fn add_documents_from_files(
        &self,
        paths: &[impl AsRef<Path>],
        metadata: Option<Map<String, Value>>,
    ) -> bool {
        let mut all_chunks = Vec::new();
        for path in paths {
            let path = path.as_ref();
            match self.file_chunks(path, metadata.as_ref()) {
                Ok(chunks) => {
                    info!("Processed {} into {} chunks", path.display(), chunks.len());
                    all_chunks.extend(chunks);
                }
                Err(e) => {
                    warn!("Skipping file {}: {}", path.display(), e);
                }
            }
        }

        if all_chunks.is_empty() {
            warn!("No documents were processed");
            return false;
        }

        let total = all_chunks.len();
        match self.ingest_chunks(all_chunks).await {
            Ok(_) => {
                info!(
                    "Added {} document chunks from {} files",
                    total,
                    paths.len()
                );
                true
            }
            Err(e) => {
                error!("Failed to add documents: {}", e);
                false
            }
        }
    }

    /// Read a file and chunk it with auto-populated source metadata.
    fn file_chunks(
        &self,
        path: &Path,
        extra: Option<&Map<String, Value>>,
    ) -> Result<Vec<Document>> {
        let content = std::fs::read_to_string(path)?;

        let mut metadata = Map::new();
        metadata.insert("source".to_string(), Value::from(path.display().to_string()));
        metadata.insert(
            "file_name".to_string(),
            Value::from(
                path.file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
            ),
        );
        metadata.insert(
            "file_type".to_string(),
            Value::from(
                path.extension()
                    .map(|e| format!(".{}", e.to_string_lossy()))
                    .unwrap_or_default(),
            ),
        );
        // Caller-supplied keys take precedence on conflict.
        if let Some(extra) = extra {
            for (key, value) in extra {
                metadata.insert(key.clone(), value.clone());
            }
        }

        Ok(chunk_text(&content, Some(&metadata), &self.settings.chunking))
    }

    /// Embed chunks in batch and insert them. No partial-commit semantics.
    async fn ingest_chunks(&self, chunks: Vec<Document>) -> Result<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        let documents: Vec<Document> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| chunk.with_embedding(embedding))
            .collect();

        self.store.insert(&documents).await?;
        Ok(documents.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::NO_DOCUMENTS_FOUND;
    use crate::store::RetrievedDocument;
    use async_trait::async_trait;
    use serde_json::json;
    use std::io::Write;

    /// Deterministic embedder: same vector for every text.
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

    /// Generator that reports what it was given instead of calling a model.
    struct StubGenerator;

    #[async_trait]
    impl Generator for StubGenerator {
        async fn generate(&self, context: &str, _query: &str) -> Result<String> {
            if context == NO_DOCUMENTS_FOUND {
                Ok("I cannot find enough information to answer.".to_string())
            } else {
                Ok(format!("Answer based on: {}", context))
            }
        }
    }

    /// Store that always fails, for degradation tests.
    struct FailingStore;

    #[async_trait]
    impl DocumentStore for FailingStore {
        async fn insert(&self, _documents: &[Document]) -> Result<Vec<String>> {
            Err(KysyError::StoreUnavailable("connection refused".to_string()))
        }

        async fn search(
            &self,
            _query_embedding: &[f32],
            _k: usize,
            _filter: Option<&Map<String, Value>>,
        ) -> Result<Vec<RetrievedDocument>> {
            Err(KysyError::StoreUnavailable("connection refused".to_string()))
        }
    }

    fn engine_with_store(store: Arc<dyn DocumentStore>) -> RagEngine {
        RagEngine::with_components(
            Settings::default(),
            Prompts::default(),
            Arc::new(StubEmbedder),
            store,
            Arc::new(StubGenerator),
        )
    }

    #[tokio::test]
    async fn test_end_to_end_ingest_and_ask() {
        let store = Arc::new(MemoryDocumentStore::new());
        let engine = engine_with_store(store.clone());

        let metadata = json!({"topic": "t"}).as_object().unwrap().clone();
        assert!(engine.add_text_document("A. B. C.", Some(metadata)).await);
        assert_eq!(store.document_count(), 1);

        let result = engine.ask("A?", "test_thread").await;

        assert_eq!(result.query, "A?");
        assert_eq!(result.retrieved_docs.len(), 1);
        assert!(result.context.contains("Document 1:\nA. B. C."));
        assert!(result.answer.contains("A. B. C."));

        let chunk = &result.retrieved_docs[0];
        assert_eq!(chunk.metadata["chunk_index"], Value::from(0));
        assert_eq!(chunk.metadata["total_chunks"], Value::from(1));
        assert_eq!(chunk.metadata["topic"], Value::from("t"));
    }

    #[tokio::test]
    async fn test_empty_store_yields_sentinel_context() {
        let engine = engine_with_store(Arc::new(MemoryDocumentStore::new()));

        let result = engine.ask("anything?", "t").await;

        assert!(result.retrieved_docs.is_empty());
        assert_eq!(result.context, NO_DOCUMENTS_FOUND);
        assert_eq!(result.answer, "I cannot find enough information to answer.");
    }

    #[tokio::test]
    async fn test_store_failure_degrades_to_apology() {
        let engine = engine_with_store(Arc::new(FailingStore));
        let apology = Prompts::default().rag.apology;

        let result = engine.ask("anything?", "t").await;

        assert_eq!(result.answer, apology);
        assert!(result.retrieved_docs.is_empty());
        assert_eq!(result.context, "");
    }

    #[tokio::test]
    async fn test_ingestion_failure_reports_false() {
        let engine = engine_with_store(Arc::new(FailingStore));
        assert!(!engine.add_text_document("some text", None).await);
    }

    #[tokio::test]
    async fn test_empty_text_ingestion_succeeds_with_zero_chunks() {
        let engine = engine_with_store(Arc::new(MemoryDocumentStore::new()));
        assert!(engine.add_text_document("", None).await);
    }

    #[tokio::test]
    async fn test_thread_history_records_exchanges() {
        let engine = engine_with_store(Arc::new(MemoryDocumentStore::new()));

        engine.ask("q1", "thread_a").await;
        engine.ask("q2", "thread_a").await;
        engine.ask("q3", "thread_b").await;

        assert_eq!(engine.thread_history("thread_a").len(), 4);
        assert_eq!(engine.thread_history("thread_b").len(), 2);
    }

    #[tokio::test]
    async fn test_file_ingestion_populates_metadata() {
        let store = Arc::new(MemoryDocumentStore::new());
        let engine = engine_with_store(store.clone());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "Helsinki is the capital of Finland.").unwrap();

        let extra = json!({"file_type": ".custom"}).as_object().unwrap().clone();
        assert!(engine.add_documents_from_files(&[&path], Some(extra)).await);

        let results = store.search(&[1.0, 0.0, 0.0], 10, None).await.unwrap();
        assert_eq!(results.len(), 1);

        let metadata = &results[0].document.metadata;
        assert_eq!(metadata["file_name"], Value::from("notes.txt"));
        assert_eq!(metadata["source"], Value::from(path.display().to_string()));
        // Caller-supplied keys win on conflict.
        assert_eq!(metadata["file_type"], Value::from(".custom"));
    }

    #[tokio::test]
    async fn test_missing_files_are_skipped_and_reported() {
        let engine = engine_with_store(Arc::new(MemoryDocumentStore::new()));

        let missing = std::path::PathBuf::from("/nonexistent/file.txt");
        assert!(!engine.add_documents_from_files(&[&missing], None).await);
    }
}
