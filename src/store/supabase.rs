//! Supabase-backed document store.
//!
//! Talks to the PostgREST layer directly: rows live in a `documents` table
//! with a pgvector column, and nearest-neighbor search is a server-side
//! `match_documents` function taking `(query_embedding, match_count, filter)`.

use super::{Document, DocumentStore, RetrievedDocument};
use crate::config::settings::StoreSettings;
use crate::error::{KysyError, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Timeout for store requests.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Document store backed by a Supabase project.
pub struct SupabaseStore {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
    table: String,
    search_function: String,
}

impl SupabaseStore {
    /// Create a store from `SUPABASE_URL` and `SUPABASE_KEY` environment
    /// variables.
    pub fn from_env(settings: &StoreSettings) -> Result<Self> {
        let url = std::env::var("SUPABASE_URL")
            .map_err(|_| KysyError::Config("SUPABASE_URL not set".to_string()))?;
        let key = std::env::var("SUPABASE_KEY")
            .map_err(|_| KysyError::Config("SUPABASE_KEY not set".to_string()))?;
        Self::new(&url, &key, settings)
    }

    /// Create a store for an explicit endpoint and credential.
    pub fn new(url: &str, api_key: &str, settings: &StoreSettings) -> Result<Self> {
        let base_url = Url::parse(url)
            .map_err(|e| KysyError::Config(format!("Invalid SUPABASE_URL '{}': {}", url, e)))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| KysyError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.to_string(),
            table: settings.table.clone(),
            search_function: settings.search_function.clone(),
        })
    }

    fn rest_url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(&format!("rest/v1/{}", path))
            .map_err(|e| KysyError::Config(format!("Invalid store endpoint: {}", e)))
    }

    fn request(&self, url: Url) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    /// Map a transport failure to the store error family.
    fn transport_error(e: reqwest::Error) -> KysyError {
        if e.is_timeout() {
            KysyError::StoreUnavailable("request timed out".to_string())
        } else if e.is_connect() {
            KysyError::StoreUnavailable(format!("connection failed: {}", e))
        } else {
            KysyError::StoreUnavailable(e.to_string())
        }
    }

    /// Turn a non-success response into the appropriate error.
    ///
    /// PostgREST reports a missing table or function as 404; anything else
    /// is treated as the store being unavailable.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::NOT_FOUND {
            Err(KysyError::Schema(format!(
                "expected table or function is missing ({}): {}",
                status, body
            )))
        } else {
            Err(KysyError::StoreUnavailable(format!(
                "store returned {}: {}",
                status, body
            )))
        }
    }
}

/// SQL that provisions the store schema: the pgvector extension, the
/// document table, the similarity search function, and a cosine HNSW index.
///
/// PostgREST cannot execute DDL, so this is printed for the user to run in
/// the Supabase SQL editor rather than applied automatically.
pub fn setup_sql(settings: &StoreSettings, dimensions: u32) -> String {
    format!(
        r#"CREATE EXTENSION IF NOT EXISTS vector;

CREATE TABLE IF NOT EXISTS {table} (
    id BIGSERIAL PRIMARY KEY,
    content TEXT,
    metadata JSONB,
    embedding VECTOR({dims})
);

CREATE OR REPLACE FUNCTION {function} (
    query_embedding VECTOR({dims}),
    match_count INT DEFAULT NULL,
    filter JSONB DEFAULT '{{}}'
) RETURNS TABLE (
    id BIGINT,
    content TEXT,
    metadata JSONB,
    similarity FLOAT
)
LANGUAGE plpgsql
AS $$
#variable_conflict use_column
BEGIN
    RETURN QUERY
    SELECT
        id,
        content,
        metadata,
        1 - ({table}.embedding <=> query_embedding) AS similarity
    FROM {table}
    WHERE metadata @> filter
    ORDER BY {table}.embedding <=> query_embedding
    LIMIT match_count;
END;
$$;

CREATE INDEX IF NOT EXISTS {table}_embedding_idx ON {table}
USING hnsw (embedding vector_cosine_ops);
"#,
        table = settings.table,
        function = settings.search_function,
        dims = dimensions,
    )
}

/// Row returned by the `match_documents` function.
#[derive(Debug, Deserialize)]
struct MatchRow {
    content: String,
    #[serde(default)]
    metadata: Map<String, Value>,
    #[serde(default)]
    similarity: f32,
}

/// Row echoed back from an insert with `Prefer: return=representation`.
#[derive(Debug, Deserialize)]
struct InsertedRow {
    id: Value,
}

#[async_trait]
impl DocumentStore for SupabaseStore {
    #[instrument(skip_all, fields(count = documents.len()))]
    async fn insert(&self, documents: &[Document]) -> Result<Vec<String>> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<Value> = documents
            .iter()
            .map(|doc| {
                let embedding = doc.embedding.as_ref().ok_or_else(|| {
                    KysyError::InvalidInput("document has no embedding".to_string())
                })?;
                Ok(json!({
                    "content": doc.content,
                    "metadata": doc.metadata,
                    "embedding": embedding,
                }))
            })
            .collect::<Result<Vec<_>>>()?;

        let url = self.rest_url(&self.table)?;
        let response = self
            .request(url)
            .header("Prefer", "return=representation")
            .json(&rows)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let response = Self::check_response(response).await?;
        let inserted: Vec<InsertedRow> = response.json().await.map_err(Self::transport_error)?;

        debug!("Inserted {} documents", inserted.len());

        Ok(inserted
            .into_iter()
            .map(|row| match row.id {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect())
    }

    #[instrument(skip_all, fields(k = k))]
    async fn search(
        &self,
        query_embedding: &[f32],
        k: usize,
        filter: Option<&Map<String, Value>>,
    ) -> Result<Vec<RetrievedDocument>> {
        let mut params = json!({
            "query_embedding": query_embedding,
            "match_count": k,
        });
        if let Some(filter) = filter {
            params["filter"] = Value::Object(filter.clone());
        }

        let url = self.rest_url(&format!("rpc/{}", self.search_function))?;
        let response = self
            .request(url)
            .json(&params)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let response = Self::check_response(response).await?;
        let rows: Vec<MatchRow> = response.json().await.map_err(Self::transport_error)?;

        debug!("Search returned {} rows", rows.len());

        Ok(rows
            .into_iter()
            .map(|row| RetrievedDocument {
                document: Document::new(row.content, row.metadata),
                similarity: row.similarity,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> StoreSettings {
        StoreSettings::default()
    }

    #[test]
    fn test_rejects_invalid_url() {
        let result = SupabaseStore::new("not a url", "key", &settings());
        assert!(matches!(result, Err(KysyError::Config(_))));
    }

    #[test]
    fn test_setup_sql_uses_configured_names() {
        let settings = StoreSettings {
            provider: "supabase".to_string(),
            table: "knowledge".to_string(),
            search_function: "find_chunks".to_string(),
        };
        let sql = setup_sql(&settings, 768);

        assert!(sql.contains("CREATE TABLE IF NOT EXISTS knowledge"));
        assert!(sql.contains("CREATE OR REPLACE FUNCTION find_chunks"));
        assert!(sql.contains("VECTOR(768)"));
        assert!(sql.contains("CREATE EXTENSION IF NOT EXISTS vector"));
        assert!(sql.contains("vector_cosine_ops"));
        // The filter default survives the formatting.
        assert!(sql.contains("filter JSONB DEFAULT '{}'"));
    }

    #[test]
    fn test_setup_sql_defaults_match_wire_contract() {
        let sql = setup_sql(&StoreSettings::default(), 1536);
        assert!(sql.contains("FUNCTION match_documents"));
        assert!(sql.contains("FROM documents"));
        assert!(sql.contains("metadata @> filter"));
        assert!(sql.contains("LIMIT match_count"));
    }

    #[test]
    fn test_rest_url_layout() {
        let store =
            SupabaseStore::new("https://example.supabase.co/", "key", &settings()).unwrap();

        let table_url = store.rest_url("documents").unwrap();
        assert_eq!(
            table_url.as_str(),
            "https://example.supabase.co/rest/v1/documents"
        );

        let rpc_url = store.rest_url("rpc/match_documents").unwrap();
        assert_eq!(
            rpc_url.as_str(),
            "https://example.supabase.co/rest/v1/rpc/match_documents"
        );
    }
}
