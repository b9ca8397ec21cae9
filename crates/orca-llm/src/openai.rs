use async_trait::async_trait;
use std::time::Duration;
use tracing::warn;

use orca_core::{OrcaError, Result};

use crate::provider::*;

/// OpenAI-compatible chat completions provider (OpenAI, Groq, vLLM, ...).
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    provider_name: String,
    default_model: String,
}

impl OpenAiProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".into(),
            provider_name: "openai".into(),
            default_model: "gpt-4o-mini".into(),
        }
    }

    /// Use a custom base URL and routing name (e.g. Groq's endpoint as "groq").
    pub fn with_base_url(mut self, url: impl Into<String>, name: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self.provider_name = name.into();
        self
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        match reqwest::Client::builder().timeout(timeout).build() {
            Ok(client) => self.client = client,
            Err(e) => warn!(error = %e, "failed to build HTTP client, keeping default"),
        }
        self
    }

    fn body(request: &ChatRequest) -> serde_json::Value {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if !request.system.is_empty() {
            messages.push(serde_json::json!({
                "role": "system",
                "content": request.system,
            }));
        }
        for msg in &request.messages {
            messages.push(serde_json::json!({
                "role": msg.role.as_str(),
                "content": msg.content,
            }));
        }
        serde_json::json!({
            "model": request.model,
            "messages": messages,
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        &self.provider_name
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&Self::body(request))
            .send()
            .await
            .map_err(|e| OrcaError::LlmProvider(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            if status.as_u16() == 429 {
                return Err(OrcaError::LlmProvider(format!(
                    "HTTP 429: rate limited by {}: {text}",
                    self.provider_name
                )));
            }
            return Err(OrcaError::LlmProvider(format!("HTTP {}: {text}", status.as_u16())));
        }

        let data: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| OrcaError::LlmProvider(e.to_string()))?;

        let Some(choice) = data["choices"].as_array().and_then(|c| c.first()) else {
            return Err(OrcaError::LlmProvider("no choices in response".into()));
        };
        let text = choice["message"]["content"].as_str().unwrap_or("").to_string();
        let model = data["model"].as_str().unwrap_or(&request.model).to_string();

        Ok(ChatResponse { text, model })
    }
}
