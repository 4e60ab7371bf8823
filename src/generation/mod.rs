//! Answer generation from assembled context.

mod openai;

pub use openai::OpenAIGenerator;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for answer generation.
///
/// Implementations render a fixed system instruction around the supplied
/// context and answer the user's query from it.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate an answer to `query` grounded in `context`.
    async fn generate(&self, context: &str, query: &str) -> Result<String>;
}
