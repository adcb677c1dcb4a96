//! Core types for chat invocation.

use crate::error::BridgeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Prefix of every terminal failure text produced by the invoker.
pub const FAILURE_PREFIX: &str = "API request failed after reaching the maximum number of retries";

/// Message role
///
/// Labels are parsed leniently: `human` is a user, `ai` is an assistant and
/// `function` is a tool result. Anything unknown is kept as [`Role::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
    Other(String),
}

impl Role {
    /// Parse a role label.
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "system" => Role::System,
            "user" | "human" => Role::User,
            "assistant" | "ai" => Role::Assistant,
            "tool" | "function" => Role::Tool,
            _ => Role::Other(label.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
            Role::Other(label) => label,
        }
    }
}

impl From<String> for Role {
    fn from(label: String) -> Self {
        Role::parse(&label)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Create a message with an arbitrary role label
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::from(role.into()),
            content: content.into(),
        }
    }

    /// Create a new system message
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: text.into(),
        }
    }

    /// Create a new user message
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: text.into(),
        }
    }

    /// Create a new assistant message
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: text.into(),
        }
    }

    /// Create a new tool-result message
    pub fn tool(text: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: text.into(),
        }
    }
}

/// An ordered, immutable sequence of messages.
///
/// A bare string converts into a conversation holding a single user message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }
}

impl From<&str> for Conversation {
    fn from(prompt: &str) -> Self {
        Self::new(vec![Message::user(prompt)])
    }
}

impl From<String> for Conversation {
    fn from(prompt: String) -> Self {
        Self::new(vec![Message::user(prompt)])
    }
}

impl From<Vec<Message>> for Conversation {
    fn from(messages: Vec<Message>) -> Self {
        Self::new(messages)
    }
}

impl From<&Conversation> for Conversation {
    fn from(conversation: &Conversation) -> Self {
        conversation.clone()
    }
}

impl FromIterator<Message> for Conversation {
    fn from_iter<I: IntoIterator<Item = Message>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Conversation {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

// ============================================================================
// Wire Types (normalized payload handed to transports)
// ============================================================================

/// Role as understood by chat-completion backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireRole {
    System,
    User,
    Assistant,
}

/// One role-tagged entry of a normalized payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: WireRole,
    pub content: String,
}

impl WireMessage {
    pub fn new(role: WireRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Normalized conversation in the shape a specific backend expects.
///
/// Inline-system backends leave `system` empty and carry system entries in
/// `messages`; out-of-band backends carry at most one `system` field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub messages: Vec<WireMessage>,
}

/// Where a backend expects the system instruction to travel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// System entries stay in the ordered message list
    InlineSystem,
    /// System text is lifted into a separate top-level field
    OutOfBandSystem,
}

// ============================================================================
// Chat Completion Types (Provider Interface)
// ============================================================================

/// Chat completion request
#[derive(Debug, Clone)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub payload: WirePayload,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Stop hints; transports without stop support ignore them
    pub stop: Option<Vec<String>>,
    /// Forwarded to the transport, not enforced by the invoker
    pub timeout: Option<Duration>,
}

impl ChatCompletionRequest {
    /// Create a new chat completion request
    pub fn new(model: impl Into<String>, payload: WirePayload) -> Self {
        Self {
            model: model.into(),
            payload,
            temperature: None,
            max_tokens: None,
            stop: None,
            timeout: None,
        }
    }

    /// Set temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set max tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set stop sequences
    pub fn with_stop(mut self, stop: Vec<String>) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Set transport timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Usage statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl Usage {
    /// Usage from prompt and completion counts; the total saturates.
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }
}

/// Finish reason
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ToolCalls,
    ContentFilter,
    Other(String),
}

/// Single choice in chat completion response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    pub index: u32,
    pub content: String,
    pub finish_reason: FinishReason,
}

/// Chat completion response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    pub id: String,
    pub model: String,
    pub choices: Vec<Choice>,
    pub usage: Usage,
}

impl ChatCompletionResponse {
    /// Take the text of the first choice.
    pub fn into_text(self) -> Result<String, BridgeError> {
        self.choices
            .into_iter()
            .next()
            .map(|choice| choice.content)
            .ok_or_else(|| BridgeError::empty_response("No choices in response"))
    }
}

/// Provider information
#[derive(Debug, Clone)]
pub struct ProviderInfo {
    pub id: String,
    pub name: String,
}

/// Per-invocation context used for log correlation
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub provider_id: String,
    pub model: String,
}

impl RequestContext {
    /// Create a new request context
    pub fn new(provider_id: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            provider_id: provider_id.into(),
            model: model.into(),
        }
    }
}

// ============================================================================
// Invocation Results
// ============================================================================

/// Outcome of one resilient invocation.
///
/// Both arms carry text. A failure reads like model output unless the caller
/// checks [`InvocationResult::is_failure`] or the [`FAILURE_PREFIX`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationResult {
    Success(String),
    Failure(String),
}

impl InvocationResult {
    /// Build the terminal failure text for an error.
    pub fn failure(error: &BridgeError) -> Self {
        Self::Failure(format!("{}: {}", FAILURE_PREFIX, error))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Success(text) | Self::Failure(text) => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Success(text) | Self::Failure(text) => text,
        }
    }
}

impl From<InvocationResult> for String {
    fn from(result: InvocationResult) -> Self {
        result.into_text()
    }
}

/// One generated continuation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generation {
    pub text: String,
}

/// Results of a batch, one single-entry list per input conversation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationBatch {
    pub generations: Vec<Vec<Generation>>,
}

impl GenerationBatch {
    pub fn len(&self) -> usize {
        self.generations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generations.is_empty()
    }

    pub(crate) fn push(&mut self, result: InvocationResult) {
        self.generations.push(vec![Generation {
            text: result.into_text(),
        }]);
    }

    /// First generation text of every entry, in input order
    pub fn texts(&self) -> Vec<&str> {
        self.generations
            .iter()
            .filter_map(|entry| entry.first())
            .map(|generation| generation.text.as_str())
            .collect()
    }
}
