//! Payload strategies for normalizing conversations.
//!
//! This module maps a backend-agnostic [`Conversation`] onto the message shape
//! a backend expects. Two shapes exist:
//! - InlineSystemStrategy: system entries stay in the ordered message list
//! - OutOfBandSystemStrategy: system text travels as a separate top-level field
//!
//! Both share the same role-remap table. Tool results become user messages
//! with [`TOOL_RESULT_PREFIX`] and unknown roles become plain user messages, so
//! no message content is ever dropped.

use crate::types::{Conversation, Message, PayloadShape, Role, WireMessage, WirePayload, WireRole};

/// Marker prepended to tool/function results re-expressed as user messages.
pub const TOOL_RESULT_PREFIX: &str = "tool result: ";

/// Separator used when several system messages fold into one field.
const SYSTEM_JOINER: &str = "\n\n";

/// Strategy for shaping a conversation into a backend payload.
///
/// Implementations must be pure: the same conversation always yields the
/// same payload.
pub trait PayloadStrategy: Send + Sync {
    /// Get the strategy name for debugging
    fn name(&self) -> &str;

    /// The shape this strategy produces
    fn shape(&self) -> PayloadShape;

    /// Normalize a conversation into a wire payload
    fn normalize(&self, conversation: &Conversation) -> WirePayload;
}

/// Map one message through the shared role table.
fn remap(message: &Message) -> WireMessage {
    match &message.role {
        Role::System => WireMessage::new(WireRole::System, message.content.clone()),
        Role::User | Role::Other(_) => WireMessage::new(WireRole::User, message.content.clone()),
        Role::Assistant => WireMessage::new(WireRole::Assistant, message.content.clone()),
        Role::Tool => WireMessage::new(
            WireRole::User,
            format!("{}{}", TOOL_RESULT_PREFIX, message.content),
        ),
    }
}

/// Inline strategy for OpenAI-style backends.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineSystemStrategy;

impl InlineSystemStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl PayloadStrategy for InlineSystemStrategy {
    fn name(&self) -> &str {
        "InlineSystemStrategy"
    }

    fn shape(&self) -> PayloadShape {
        PayloadShape::InlineSystem
    }

    fn normalize(&self, conversation: &Conversation) -> WirePayload {
        WirePayload {
            system: None,
            messages: conversation.iter().map(remap).collect(),
        }
    }
}

/// Out-of-band strategy for Anthropic-style backends.
///
/// Multiple system messages are joined into the single system field, in order.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutOfBandSystemStrategy;

impl OutOfBandSystemStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl PayloadStrategy for OutOfBandSystemStrategy {
    fn name(&self) -> &str {
        "OutOfBandSystemStrategy"
    }

    fn shape(&self) -> PayloadShape {
        PayloadShape::OutOfBandSystem
    }

    fn normalize(&self, conversation: &Conversation) -> WirePayload {
        let mut system_parts: Vec<&str> = Vec::new();
        let mut messages = Vec::with_capacity(conversation.len());

        for message in conversation {
            match message.role {
                Role::System => system_parts.push(&message.content),
                _ => messages.push(remap(message)),
            }
        }

        let system = if system_parts.is_empty() {
            None
        } else {
            Some(system_parts.join(SYSTEM_JOINER))
        };

        WirePayload { system, messages }
    }
}

/// Build the strategy for a payload shape.
pub fn strategy_for_shape(shape: PayloadShape) -> Box<dyn PayloadStrategy> {
    match shape {
        PayloadShape::InlineSystem => Box::new(InlineSystemStrategy::new()),
        PayloadShape::OutOfBandSystem => Box::new(OutOfBandSystemStrategy::new()),
    }
}
