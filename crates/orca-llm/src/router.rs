use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use orca_core::{LlmClient, LlmRequest, LlmResponse, OrcaError, Result};

use crate::provider::{ChatMessage, ChatRequest, LlmProvider};

/// Maximum retry attempts for transient errors (429, 500, 502, 503).
const MAX_RETRIES: u32 = 3;
/// Base delay for exponential backoff (doubles each retry).
const BASE_DELAY_MS: u64 = 1000;

/// Routes answer requests to a registered provider.
///
/// Selection order: the provider named on the request (an unknown name is an
/// error), then the configured default, then the first registered provider.
#[derive(Clone)]
pub struct ProviderRouter {
    providers: Vec<Arc<dyn LlmProvider>>,
    default_provider: Option<String>,
    default_model: Option<String>,
    temperature: f32,
    max_tokens: u32,
    base_delay: Duration,
}

impl Default for ProviderRouter {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if an error is transient and worth retrying.
fn is_retryable(err: &OrcaError) -> bool {
    match err {
        OrcaError::LlmProvider(msg) => {
            msg.starts_with("HTTP 429")
                || msg.starts_with("HTTP 500")
                || msg.starts_with("HTTP 502")
                || msg.starts_with("HTTP 503")
                || msg.contains("timed out")
                || msg.contains("connection reset")
                || msg.contains("connection closed")
                || msg.contains("overloaded")
        }
        _ => false,
    }
}

impl ProviderRouter {
    pub fn new() -> Self {
        Self {
            providers: vec![],
            default_provider: None,
            default_model: None,
            temperature: 0.7,
            max_tokens: 2048,
            base_delay: Duration::from_millis(BASE_DELAY_MS),
        }
    }

    /// Register a provider.
    pub fn add_provider(&mut self, provider: Arc<dyn LlmProvider>) {
        info!(provider = %provider.name(), "registered LLM provider");
        self.providers.push(provider);
    }

    pub fn with_provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.add_provider(provider);
        self
    }

    pub fn with_default_provider(mut self, name: impl Into<String>) -> Self {
        self.default_provider = Some(name.into());
        self
    }

    /// Model used with the default provider when the request names none.
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = Some(model.into());
        self
    }

    pub fn with_generation(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    /// Base backoff delay; doubles on each retry.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    fn find(&self, name: &str) -> Option<&Arc<dyn LlmProvider>> {
        self.providers
            .iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
    }

    /// Pick the provider for a request, along with whether it is the default.
    fn resolve(&self, explicit: Option<&str>) -> Result<(Arc<dyn LlmProvider>, bool)> {
        if let Some(name) = explicit.filter(|n| !n.is_empty()) {
            return self
                .find(name)
                .map(|p| (Arc::clone(p), self.is_default(p.name())))
                .ok_or_else(|| OrcaError::ProviderNotConfigured(name.to_string()));
        }
        if let Some(ref name) = self.default_provider {
            match self.find(name) {
                Some(p) => return Ok((Arc::clone(p), true)),
                None => warn!(provider = %name, "default provider not registered, using first available"),
            }
        }
        self.providers
            .first()
            .map(|p| (Arc::clone(p), false))
            .ok_or_else(|| OrcaError::ProviderNotConfigured("no LLM provider configured".into()))
    }

    fn is_default(&self, name: &str) -> bool {
        self.default_provider
            .as_deref()
            .is_some_and(|d| d.eq_ignore_ascii_case(name))
    }

    /// Retry a complete() call with exponential backoff on transient errors.
    async fn complete_with_retry(
        &self,
        provider: &dyn LlmProvider,
        request: &ChatRequest,
    ) -> Result<crate::provider::ChatResponse> {
        let mut attempt = 0;
        loop {
            match provider.complete(request).await {
                Ok(resp) => return Ok(resp),
                Err(e) if is_retryable(&e) && attempt < MAX_RETRIES => {
                    let delay = self.base_delay * 2u32.pow(attempt);
                    attempt += 1;
                    warn!(
                        provider = provider.name(),
                        attempt,
                        max = MAX_RETRIES,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "retrying after transient error"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl LlmClient for ProviderRouter {
    async fn respond(&self, request: &LlmRequest) -> Result<LlmResponse> {
        let (provider, is_default) = self.resolve(request.provider.as_deref())?;

        let model = request
            .model
            .clone()
            .filter(|m| !m.is_empty())
            .or_else(|| if is_default { self.default_model.clone() } else { None })
            .unwrap_or_else(|| provider.default_model().to_string());

        let mut messages: Vec<ChatMessage> = request.history.iter().map(ChatMessage::from).collect();
        messages.push(ChatMessage {
            role: orca_core::Role::User,
            content: request.query.clone(),
        });

        let chat = ChatRequest {
            model: model.clone(),
            system: request.prompt.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        debug!(provider = %provider.name(), model = %model, "sending answer request");
        let resp = self.complete_with_retry(&*provider, &chat).await?;

        Ok(LlmResponse {
            text: resp.text,
            provider: provider.name().to_string(),
            model: if resp.model.is_empty() { model } else { resp.model },
        })
    }
}
