//! Logging sink for invocation events.
//!
//! The invoker never reaches for ambient logging state directly. It reports
//! through an [`InvocationLog`] handed to it at build time; [`TracingLog`]
//! forwards everything to `tracing`, which is the default.

use crate::error::BridgeError;
use crate::types::{RequestContext, WirePayload};
use std::fmt::Debug;

/// Sink for the events of one invocation.
pub trait InvocationLog: Send + Sync + Debug + 'static {
    /// Normalized payload about to be sent (only called in debug mode)
    fn outbound(&self, _ctx: &RequestContext, _payload: &WirePayload) {}

    /// Raw response text of a successful attempt
    fn response(&self, _ctx: &RequestContext, _text: &str) {}

    /// An attempt failed and another one follows
    fn retry(&self, _ctx: &RequestContext, _attempt: u32, _max_attempts: u32, _error: &BridgeError) {}

    /// The last attempt failed
    fn failure(&self, _ctx: &RequestContext, _error: &BridgeError) {}
}

/// Default sink emitting `tracing` events.
///
/// Outbound payloads and responses go out at info, retries at debug and
/// terminal failures at error.
#[derive(Debug, Clone)]
pub struct TracingLog {
    prefix: String,
}

impl TracingLog {
    pub fn new() -> Self {
        Self {
            prefix: "[Chatbridge]".to_string(),
        }
    }

    /// Create a sink with custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for TracingLog {
    fn default() -> Self {
        Self::new()
    }
}

impl InvocationLog for TracingLog {
    fn outbound(&self, ctx: &RequestContext, payload: &WirePayload) {
        let rendered = serde_json::to_string(payload).unwrap_or_else(|e| e.to_string());
        tracing::info!(
            request_id = %ctx.request_id,
            "{} {} API messages: {}",
            self.prefix,
            ctx.provider_id,
            rendered
        );
    }

    fn response(&self, ctx: &RequestContext, text: &str) {
        tracing::info!(
            request_id = %ctx.request_id,
            "{} {} API response: {}",
            self.prefix,
            ctx.provider_id,
            text
        );
    }

    fn retry(&self, ctx: &RequestContext, attempt: u32, max_attempts: u32, error: &BridgeError) {
        tracing::debug!(
            request_id = %ctx.request_id,
            "{} retrying {} API request (attempt {}/{}): {}",
            self.prefix,
            ctx.provider_id,
            attempt,
            max_attempts,
            error
        );
    }

    fn failure(&self, ctx: &RequestContext, error: &BridgeError) {
        tracing::error!(
            request_id = %ctx.request_id,
            "{} {} API call failed: {}",
            self.prefix,
            ctx.provider_id,
            error
        );
    }
}
