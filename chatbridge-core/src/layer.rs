//! Layer trait and abstractions.
//!
//! Layers wrap a provider with transport-level concerns (timing logs, hard
//! timeouts). They sit below the invoker: a layer sees every single attempt,
//! while the invoker owns retries across attempts.

use crate::error::BridgeError;
use crate::provider::Provider;
use crate::types::*;
use async_trait::async_trait;
use std::sync::Arc;

/// Layer trait for wrapping providers.
///
/// Each layer wraps an inner provider and returns a new provider with
/// enhanced capabilities.
pub trait Layer<P: Provider> {
    /// The type of the layered provider
    type LayeredProvider: Provider;

    /// Wrap the inner provider with this layer
    fn layer(&self, inner: P) -> Self::LayeredProvider;
}

/// Helper trait for layered providers.
///
/// This trait provides default forwarding implementations for provider methods.
/// Implementers only need to override the methods they want to intercept.
#[async_trait]
pub trait LayeredProvider: Sized + Provider {
    /// The inner provider type
    type Inner: Provider;

    /// Get a reference to the inner provider
    fn inner(&self) -> &Self::Inner;

    /// Default implementation for info - forwards to inner
    fn layered_info(&self) -> Arc<ProviderInfo> {
        self.inner().info()
    }

    /// Default implementation for payload_shape - forwards to inner
    fn layered_payload_shape(&self) -> PayloadShape {
        self.inner().payload_shape()
    }

    /// Default implementation for chat_completion - forwards to inner
    async fn layered_chat_completion(
        &self,
        req: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, BridgeError> {
        self.inner().chat_completion(req).await
    }
}

/// Macro to implement Provider trait by forwarding to LayeredProvider methods.
///
/// This reduces boilerplate for layered providers.
#[macro_export]
macro_rules! impl_layered_provider {
    ($type:ident) => {
        #[async_trait::async_trait]
        impl<P: $crate::provider::Provider> $crate::provider::Provider for $type<P> {
            fn info(&self) -> std::sync::Arc<$crate::types::ProviderInfo> {
                $crate::layer::LayeredProvider::layered_info(self)
            }

            fn payload_shape(&self) -> $crate::types::PayloadShape {
                $crate::layer::LayeredProvider::layered_payload_shape(self)
            }

            async fn chat_completion(
                &self,
                req: $crate::types::ChatCompletionRequest,
            ) -> Result<$crate::types::ChatCompletionResponse, $crate::error::BridgeError> {
                $crate::layer::LayeredProvider::layered_chat_completion(self, req).await
            }
        }
    };
}
