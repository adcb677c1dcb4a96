//! Anthropic Messages API provider.
//!
//! Differences from OpenAI-style backends:
//! - The system instruction is a top-level `system` field, never a message.
//! - `max_tokens` is mandatory.
//! - The reply is a list of typed content blocks instead of `choices`.

use async_trait::async_trait;
use chatbridge_core::config::BackendConfig;
use chatbridge_core::error::BridgeError;
use chatbridge_core::provider::Provider;
use chatbridge_core::types::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_API_BASE: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4096;

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<&'a WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop_sequences: Option<&'a [String]>,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    id: String,
    model: String,
    #[serde(default)]
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
    usage: Option<MessagesUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct MessagesUsage {
    input_tokens: u32,
    output_tokens: u32,
}

/// Anthropic provider over the Messages API
#[derive(Clone)]
pub struct AnthropicProvider {
    http: reqwest::Client,
    api_key: String,
    api_base: String,
    max_tokens: u32,
    info: Arc<ProviderInfo>,
}

impl std::fmt::Debug for AnthropicProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicProvider")
            .field("info", &self.info)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl AnthropicProvider {
    /// Create a builder for more configuration options
    pub fn builder() -> AnthropicBuilder {
        AnthropicBuilder::default()
    }

    /// Create a provider from a backend configuration
    pub fn from_config(config: &BackendConfig) -> Result<Self, BridgeError> {
        Self::builder().config(config).build()
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.api_base.trim_end_matches('/'))
    }

    /// Build the request body.
    ///
    /// Inline system entries, if a caller forced that shape, are folded into
    /// the top-level field since the API rejects a `system` role.
    fn build_body<'a>(&self, req: &'a ChatCompletionRequest) -> MessagesRequest<'a> {
        let mut system_parts: Vec<&str> = req.payload.system.iter().map(String::as_str).collect();
        let mut messages = Vec::with_capacity(req.payload.messages.len());

        for msg in &req.payload.messages {
            match msg.role {
                WireRole::System => system_parts.push(&msg.content),
                WireRole::User | WireRole::Assistant => messages.push(msg),
            }
        }

        MessagesRequest {
            model: &req.model,
            max_tokens: req.max_tokens.unwrap_or(self.max_tokens),
            messages,
            system: (!system_parts.is_empty()).then(|| system_parts.join("\n\n")),
            temperature: req.temperature,
            stop_sequences: req.stop.as_deref(),
        }
    }

    fn convert_response(response: MessagesResponse) -> ChatCompletionResponse {
        let text: Vec<String> = response
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .collect();

        let finish_reason = match response.stop_reason.as_deref() {
            Some("end_turn") | Some("stop_sequence") | None => FinishReason::Stop,
            Some("max_tokens") => FinishReason::Length,
            Some("tool_use") => FinishReason::ToolCalls,
            Some(other) => FinishReason::Other(other.to_string()),
        };

        let choices = if text.is_empty() {
            vec![]
        } else {
            vec![Choice {
                index: 0,
                content: text.concat(),
                finish_reason,
            }]
        };

        let usage = response
            .usage
            .map_or(Usage::default(), |u| Usage::new(u.input_tokens, u.output_tokens));

        ChatCompletionResponse {
            id: response.id,
            model: response.model,
            choices,
            usage,
        }
    }

    fn convert_error(error: reqwest::Error) -> BridgeError {
        if error.is_timeout() {
            BridgeError::timeout(format!("Anthropic API timed out: {}", error))
        } else {
            BridgeError::Network(error)
        }
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    fn info(&self) -> Arc<ProviderInfo> {
        self.info.clone()
    }

    fn payload_shape(&self) -> PayloadShape {
        PayloadShape::OutOfBandSystem
    }

    async fn chat_completion(
        &self,
        req: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, BridgeError> {
        let body = self.build_body(&req);

        let mut request = self
            .http
            .post(self.endpoint())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body);
        if let Some(timeout) = req.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(Self::convert_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::debug!("anthropic returned HTTP {}: {}", status, text);
            return Err(BridgeError::from_status(status.as_u16(), text));
        }

        let parsed: MessagesResponse = response.json().await.map_err(Self::convert_error)?;
        Ok(Self::convert_response(parsed))
    }
}

/// Builder for Anthropic provider
#[derive(Default)]
pub struct AnthropicBuilder {
    api_key: Option<String>,
    api_base: Option<String>,
    max_tokens: Option<u32>,
    timeout: Option<Duration>,
}

impl AnthropicBuilder {
    /// Set API key
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set API base URL
    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    /// Set the default `max_tokens` sent when a request carries none
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set transport timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Take credentials, base URL override, max tokens and timeout from a backend config
    pub fn config(mut self, config: &BackendConfig) -> Self {
        if let Some(api_key) = &config.api_key {
            self.api_key = Some(api_key.clone());
        }
        if let Some(base_url) = &config.base_url {
            self.api_base = Some(base_url.clone());
        }
        if let Some(max_tokens) = config.max_tokens {
            self.max_tokens = Some(max_tokens);
        }
        self.timeout = Some(config.timeout);
        self
    }

    /// Build the provider
    pub fn build(self) -> Result<AnthropicProvider, BridgeError> {
        let api_key = self
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| BridgeError::configuration("Anthropic API key is required"))?;

        let mut http = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }

        Ok(AnthropicProvider {
            http: http.build()?,
            api_key,
            api_base: self
                .api_base
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            info: Arc::new(ProviderInfo {
                id: "anthropic".to_string(),
                name: "Anthropic".to_string(),
            }),
        })
    }
}
