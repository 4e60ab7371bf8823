//! OpenAI chat-completion generator.

use super::Generator;
use crate::config::Prompts;
use crate::error::{KysyError, Result};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// OpenAI-based answer generator.
pub struct OpenAIGenerator {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
    language: String,
    prompts: Prompts,
}

impl OpenAIGenerator {
    /// Create a new generator.
    pub fn new(model: &str, temperature: f32, language: &str, prompts: Prompts) -> Self {
        Self {
            client: create_client(),
            model: model.to_string(),
            temperature,
            language: language.to_string(),
            prompts,
        }
    }

    /// Render the system instruction with the assembled context.
    fn system_prompt(&self, context: &str) -> String {
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), context.to_string());
        vars.insert("language".to_string(), self.language.clone());
        self.prompts.render_with_custom(&self.prompts.rag.system, &vars)
    }
}

#[async_trait]
impl Generator for OpenAIGenerator {
    #[instrument(skip(self, context, query))]
    async fn generate(&self, context: &str, query: &str) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.system_prompt(context))
                .build()
                .map_err(|e| KysyError::GenerationUnavailable(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(query)
                .build()
                .map_err(|e| KysyError::GenerationUnavailable(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(|e| KysyError::GenerationUnavailable(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            KysyError::GenerationUnavailable(format!("completion API error: {}", e))
        })?;

        let answer = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| {
                KysyError::GenerationUnavailable("empty response from model".to_string())
            })?
            .clone();

        debug!("Generated answer ({} chars)", answer.len());

        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_interpolation() {
        let generator = OpenAIGenerator::new("gpt-4o-mini", 0.0, "English", Prompts::default());
        let prompt = generator.system_prompt("Document 1:\nHelsinki is the capital.\n");

        assert!(prompt.contains("Document 1:"));
        assert!(prompt.contains("Helsinki is the capital."));
        assert!(prompt.contains("English"));
        assert!(!prompt.contains("{{context}}"));
        assert!(!prompt.contains("{{language}}"));
    }
}
