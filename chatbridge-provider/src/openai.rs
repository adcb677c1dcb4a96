//! OpenAI provider implementation using async-openai crate.
//!
//! OpenAI-style backends take the system instruction inline, as the first
//! entry of the message list. The same provider serves OpenAI-compatible
//! endpoints such as DeepSeek through a base URL override.

use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
    CreateChatCompletionResponse,
};
use async_openai::Client;
use async_trait::async_trait;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use chatbridge_core::config::BackendConfig;
use chatbridge_core::error::BridgeError;
use chatbridge_core::provider::Provider;
use chatbridge_core::types::*;
use std::sync::Arc;
use std::time::Duration;

/// OpenAI provider using async-openai
#[derive(Clone)]
pub struct OpenAiProvider {
    client: Client<OpenAIConfig>,
    info: Arc<ProviderInfo>,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("info", &self.info)
            .finish()
    }
}

impl OpenAiProvider {
    /// Create a builder for more configuration options
    pub fn builder() -> OpenAiBuilder {
        OpenAiBuilder::default()
    }

    /// Create a provider from a backend configuration
    pub fn from_config(config: &BackendConfig) -> Result<Self, BridgeError> {
        Self::builder().config(config).build()
    }

    fn convert_message(msg: &WireMessage) -> Result<ChatCompletionRequestMessage, BridgeError> {
        let content = msg.content.clone();
        match msg.role {
            WireRole::System => {
                let msg = ChatCompletionRequestSystemMessageArgs::default()
                    .content(content)
                    .build()
                    .map_err(|e| {
                        BridgeError::provider(format!("Failed to build system message: {}", e))
                    })?;
                Ok(ChatCompletionRequestMessage::System(msg))
            }
            WireRole::User => {
                let msg = ChatCompletionRequestUserMessageArgs::default()
                    .content(content)
                    .build()
                    .map_err(|e| {
                        BridgeError::provider(format!("Failed to build user message: {}", e))
                    })?;
                Ok(ChatCompletionRequestMessage::User(msg))
            }
            WireRole::Assistant => {
                let msg = ChatCompletionRequestAssistantMessageArgs::default()
                    .content(content)
                    .build()
                    .map_err(|e| {
                        BridgeError::provider(format!("Failed to build assistant message: {}", e))
                    })?;
                Ok(ChatCompletionRequestMessage::Assistant(msg))
            }
        }
    }

    /// Build CreateChatCompletionRequest from our ChatCompletionRequest
    ///
    /// An out-of-band system field, if a caller forced one, goes first.
    fn build_request(
        &self,
        req: &ChatCompletionRequest,
    ) -> Result<CreateChatCompletionRequest, BridgeError> {
        let mut messages = Vec::with_capacity(req.payload.messages.len() + 1);
        if let Some(system) = &req.payload.system {
            messages.push(Self::convert_message(&WireMessage::new(
                WireRole::System,
                system.clone(),
            ))?);
        }
        for msg in &req.payload.messages {
            messages.push(Self::convert_message(msg)?);
        }

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder.model(&req.model).messages(messages);

        if let Some(max_tokens) = req.max_tokens {
            builder.max_tokens(max_tokens);
        }
        if let Some(temperature) = req.temperature {
            builder.temperature(temperature);
        }
        if let Some(stop) = &req.stop {
            builder.stop(stop.clone());
        }

        builder
            .build()
            .map_err(|e| BridgeError::provider(format!("Failed to build request: {}", e)))
    }

    /// Convert OpenAI response to our ChatCompletionResponse
    fn convert_response(response: CreateChatCompletionResponse) -> ChatCompletionResponse {
        let choices = response
            .choices
            .into_iter()
            .filter_map(|choice| {
                let content = choice.message.content?;
                let finish_reason = choice
                    .finish_reason
                    .map_or(FinishReason::Stop, |r| match r {
                        async_openai::types::FinishReason::Stop => FinishReason::Stop,
                        async_openai::types::FinishReason::Length => FinishReason::Length,
                        async_openai::types::FinishReason::ToolCalls => FinishReason::ToolCalls,
                        async_openai::types::FinishReason::ContentFilter => {
                            FinishReason::ContentFilter
                        }
                        _ => FinishReason::Other("unknown".to_string()),
                    });

                Some(Choice {
                    index: choice.index,
                    content,
                    finish_reason,
                })
            })
            .collect();

        let usage = response.usage.map_or(Usage::default(), |u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        ChatCompletionResponse {
            id: response.id,
            model: response.model,
            choices,
            usage,
        }
    }

    fn convert_error(&self, error: OpenAIError) -> BridgeError {
        match error {
            OpenAIError::Reqwest(e) if e.is_timeout() => {
                BridgeError::timeout(format!("{} API timed out: {}", self.info.name, e))
            }
            other => BridgeError::provider(format!("{} API error: {}", self.info.name, other)),
        }
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn info(&self) -> Arc<ProviderInfo> {
        self.info.clone()
    }

    fn payload_shape(&self) -> PayloadShape {
        PayloadShape::InlineSystem
    }

    async fn chat_completion(
        &self,
        req: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, BridgeError> {
        let openai_req = self.build_request(&req)?;
        let chat = self.client.chat();
        let call = chat.create(openai_req);

        let response = match req.timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                BridgeError::timeout(format!(
                    "{} API timed out: no response within {:?}",
                    self.info.name, limit
                ))
            })?,
            None => call.await,
        }
        .map_err(|e| self.convert_error(e))?;

        Ok(Self::convert_response(response))
    }
}

/// Backoff that gives up after the first request.
///
/// One invoker attempt is exactly one HTTP request; async-openai would
/// otherwise retry 429 and 5xx responses internally.
fn single_attempt() -> ExponentialBackoff {
    ExponentialBackoffBuilder::new()
        .with_max_elapsed_time(Some(Duration::ZERO))
        .build()
}

/// Builder for OpenAI provider with custom configuration
#[derive(Default)]
pub struct OpenAiBuilder {
    api_key: Option<String>,
    api_base: Option<String>,
    org_id: Option<String>,
    timeout: Option<Duration>,
}

impl OpenAiBuilder {
    /// Set API key
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set API base URL (for OpenAI-compatible APIs like DeepSeek)
    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    /// Set organization ID
    pub fn organization(mut self, org_id: impl Into<String>) -> Self {
        self.org_id = Some(org_id.into());
        self
    }

    /// Set a client-wide transport timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Take credentials and base URL override from a backend config
    ///
    /// The config's timeout travels with each request instead, so it can be
    /// changed after the provider is built.
    pub fn config(mut self, config: &BackendConfig) -> Self {
        if let Some(api_key) = &config.api_key {
            self.api_key = Some(api_key.clone());
        }
        if let Some(base_url) = &config.base_url {
            self.api_base = Some(base_url.clone());
        }
        self
    }

    /// Build the provider
    pub fn build(self) -> Result<OpenAiProvider, BridgeError> {
        self.build_with_id("openai", "OpenAI")
    }

    /// Build a provider with a custom provider ID and name
    ///
    /// This is useful for OpenAI-compatible APIs like DeepSeek that use
    /// the same protocol but different endpoints.
    pub fn build_with_id(
        self,
        provider_id: impl Into<String>,
        provider_name: impl Into<String>,
    ) -> Result<OpenAiProvider, BridgeError> {
        let provider_name = provider_name.into();
        let api_key = self
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                BridgeError::configuration(format!("{} API key is required", provider_name))
            })?;

        let mut config = OpenAIConfig::new().with_api_key(api_key);

        if let Some(api_base) = self.api_base {
            config = config.with_api_base(api_base);
        }

        if let Some(org_id) = self.org_id {
            config = config.with_org_id(org_id);
        }

        let mut client = Client::with_config(config).with_backoff(single_attempt());
        if let Some(timeout) = self.timeout {
            let http_client = reqwest::Client::builder().timeout(timeout).build()?;
            client = client.with_http_client(http_client);
        }

        Ok(OpenAiProvider {
            client,
            info: Arc::new(ProviderInfo {
                id: provider_id.into(),
                name: provider_name,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> OpenAiProvider {
        OpenAiProvider::builder().api_key("sk-test").build().unwrap()
    }

    #[test]
    fn test_missing_api_key_fails_fast() {
        let err = OpenAiProvider::builder().build().unwrap_err();
        assert!(matches!(err, BridgeError::Configuration(_)));

        let err = OpenAiProvider::from_config(&BackendConfig::new("gpt-3.5-turbo")).unwrap_err();
        assert!(err.to_string().contains("OpenAI API key is required"));
    }

    #[test]
    fn test_build_request_keeps_order_and_params() {
        let payload = WirePayload {
            system: None,
            messages: vec![
                WireMessage::new(WireRole::System, "You are concise."),
                WireMessage::new(WireRole::User, "2+2?"),
                WireMessage::new(WireRole::Assistant, "4"),
            ],
        };
        let req = ChatCompletionRequest::new("gpt-3.5-turbo", payload)
            .with_temperature(0.0)
            .with_stop(vec!["\n\n".to_string()]);

        let built = provider().build_request(&req).unwrap();
        let json = serde_json::to_value(&built).unwrap();

        assert_eq!(json["model"], "gpt-3.5-turbo");
        assert_eq!(json["temperature"], 0.0);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "2+2?");
        assert_eq!(json["messages"][2]["role"], "assistant");
    }

    #[test]
    fn test_forced_system_field_goes_first() {
        let payload = WirePayload {
            system: Some("Be brief.".to_string()),
            messages: vec![WireMessage::new(WireRole::User, "hi")],
        };
        let req = ChatCompletionRequest::new("gpt-3.5-turbo", payload);

        let built = provider().build_request(&req).unwrap();
        let json = serde_json::to_value(&built).unwrap();

        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], "Be brief.");
        assert_eq!(json["messages"][1]["role"], "user");
    }

    #[test]
    fn test_transport_backoff_never_retries() {
        use backoff::backoff::Backoff;

        let mut backoff = single_attempt();
        assert_eq!(backoff.next_backoff(), None);
    }
}
