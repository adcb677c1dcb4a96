//! Provider trait and core abstractions.

use crate::error::BridgeError;
use crate::types::*;
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

/// Transport for one backend's chat-completion wire protocol.
///
/// A provider only sends an already normalized payload and hands back the
/// response. Retry, logging and result conversion belong to the invoker, so
/// any failure here is simply returned as an error.
#[async_trait]
pub trait Provider: Send + Sync + Debug + 'static {
    /// Get provider information
    fn info(&self) -> Arc<ProviderInfo>;

    /// Where this backend expects the system instruction
    fn payload_shape(&self) -> PayloadShape {
        PayloadShape::InlineSystem
    }

    /// Chat completion (non-streaming)
    ///
    /// Backends without stop-sequence support ignore `req.stop`.
    async fn chat_completion(
        &self,
        req: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, BridgeError>;
}

#[async_trait]
impl<P: Provider + ?Sized> Provider for Arc<P> {
    fn info(&self) -> Arc<ProviderInfo> {
        (**self).info()
    }

    fn payload_shape(&self) -> PayloadShape {
        (**self).payload_shape()
    }

    async fn chat_completion(
        &self,
        req: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, BridgeError> {
        (**self).chat_completion(req).await
    }
}
