use async_trait::async_trait;
use std::time::Duration;
use tracing::warn;

use orca_core::{OrcaError, Result, Role};

use crate::provider::*;

/// Google Gemini `generateContent` provider.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    default_model: String,
}

impl GeminiProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
            default_model: "gemini-2.0-flash".into(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
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
        // Gemini has no system turns inside `contents`; those join the
        // system instruction instead.
        let mut system = request.system.clone();
        let mut contents = Vec::with_capacity(request.messages.len());
        for msg in &request.messages {
            let role = match msg.role {
                Role::Assistant => "model",
                Role::User => "user",
                Role::System => {
                    if !system.is_empty() {
                        system.push_str("\n\n");
                    }
                    system.push_str(&msg.content);
                    continue;
                }
            };
            contents.push(serde_json::json!({
                "role": role,
                "parts": [{ "text": msg.content }],
            }));
        }

        let mut body = serde_json::json!({
            "contents": contents,
            "generationConfig": {
                "temperature": request.temperature,
                "maxOutputTokens": request.max_tokens,
            },
        });
        if !system.is_empty() {
            body["systemInstruction"] = serde_json::json!({ "parts": [{ "text": system }] });
        }
        body
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let resp = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, request.model
            ))
            .query(&[("key", self.api_key.as_str())])
            .json(&Self::body(request))
            .send()
            .await
            .map_err(|e| OrcaError::LlmProvider(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            if status.as_u16() == 429 {
                return Err(OrcaError::LlmProvider(format!(
                    "HTTP 429: rate limited, quota exceeded: {text}"
                )));
            }
            return Err(OrcaError::LlmProvider(format!("HTTP {}: {text}", status.as_u16())));
        }

        let data: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| OrcaError::LlmProvider(e.to_string()))?;

        let Some(candidate) = data["candidates"].as_array().and_then(|c| c.first()) else {
            return Err(OrcaError::LlmProvider("no candidates in response".into()));
        };
        let text = candidate["content"]["parts"]
            .as_array()
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p["text"].as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        Ok(ChatResponse {
            text,
            model: request.model.clone(),
        })
    }
}
