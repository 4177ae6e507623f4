//! Rig-backed model invokers for OpenAI and Ollama.
//!
//! Rig agents take a preamble plus one prompt, so each call rebuilds a
//! lightweight agent: system messages become the preamble and the rest of
//! the conversation is rendered as a transcript.

use std::sync::Arc;

use async_trait::async_trait;
use rig::client::{CompletionClient, Nothing, ProviderClient};
use rig::completion::Prompt;
use rig::providers::{ollama, openai};
use tracing::{debug, info};

use super::message::{extract_system_preamble, render_transcript, Message};
use super::provider::ModelInvoker;
use crate::config::{LlmBackend, ResearcherConfig, TeamConfig};
use crate::error::{ConfigError, LlmError};

// =============================================================================
// OPENAI
// =============================================================================
pub struct OpenAiInvoker {
    client: openai::Client,
    model: String,
    temperature: f64,
}

impl OpenAiInvoker {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, temperature: f64) -> Self {
        let api_key: String = api_key.into();
        Self {
            client: openai::Client::from_val(api_key.into()),
            model: model.into(),
            temperature,
        }
    }
}

#[async_trait]
impl ModelInvoker for OpenAiInvoker {
    async fn invoke(&self, messages: &[Message]) -> Result<String, LlmError> {
        let mut builder = self.client.agent(&self.model).temperature(self.temperature);
        if let Some(preamble) = extract_system_preamble(messages) {
            builder = builder.preamble(&preamble);
        }
        let agent = builder.build();

        let prompt = render_transcript(messages);
        debug!(model = %self.model, chars = prompt.len(), "Sending OpenAI completion");

        agent
            .prompt(prompt.as_str())
            .await
            .map_err(|e| LlmError::Completion(format!("OpenAI completion failed: {}", e)))
    }
}

// =============================================================================
// OLLAMA
// =============================================================================
pub struct OllamaInvoker {
    client: ollama::Client,
    model: String,
    temperature: f64,
}

impl OllamaInvoker {
    /// Connect to the Ollama server at `host`. No request is sent until the
    /// first completion.
    pub fn new(
        host: &str,
        model: impl Into<String>,
        temperature: f64,
    ) -> Result<Self, ConfigError> {
        let client = ollama::Client::builder()
            .api_key(Nothing)
            .base_url(host)
            .build()
            .map_err(|e| ConfigError::invalid("OLLAMA_API_BASE_URL", host, &e.to_string()))?;

        Ok(Self {
            client,
            model: model.into(),
            temperature,
        })
    }
}

#[async_trait]
impl ModelInvoker for OllamaInvoker {
    async fn invoke(&self, messages: &[Message]) -> Result<String, LlmError> {
        let mut builder = self.client.agent(&self.model).temperature(self.temperature);
        if let Some(preamble) = extract_system_preamble(messages) {
            builder = builder.preamble(&preamble);
        }
        let agent = builder.build();

        let prompt = render_transcript(messages);
        debug!(model = %self.model, chars = prompt.len(), "Sending Ollama completion");

        agent
            .prompt(prompt.as_str())
            .await
            .map_err(|e| LlmError::Completion(format!("Ollama completion failed: {}", e)))
    }
}

/// Build the invoker a researcher's configuration asks for.
pub fn build_invoker(
    researcher: &ResearcherConfig,
    team: &TeamConfig,
) -> Result<Arc<dyn ModelInvoker>, ConfigError> {
    match researcher.backend {
        LlmBackend::Ollama => {
            info!(researcher = researcher.id, model = %researcher.model, "Initializing Ollama model");
            Ok(Arc::new(OllamaInvoker::new(
                &team.ollama_host,
                &researcher.model,
                researcher.temperature,
            )?))
        }
        LlmBackend::OpenAi => {
            let api_key = team
                .openai_api_key
                .as_deref()
                .ok_or(ConfigError::MissingApiKey(researcher.id))?;
            info!(researcher = researcher.id, model = %researcher.model, "Initializing OpenAI model");
            Ok(Arc::new(OpenAiInvoker::new(
                api_key,
                &researcher.model,
                researcher.temperature,
            )))
        }
    }
}
