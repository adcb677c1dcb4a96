//! Wall-clock timeout layer.
//!
//! Transports forward the configured timeout to their HTTP client, but a
//! transport that ignores it can block an attempt forever. Stacking this
//! layer bounds every attempt regardless of what the transport does.

use async_trait::async_trait;
use chatbridge_core::error::BridgeError;
use chatbridge_core::impl_layered_provider;
use chatbridge_core::layer::{Layer, LayeredProvider};
use chatbridge_core::provider::Provider;
use chatbridge_core::types::*;
use std::time::Duration;

/// Timeout layer configuration
#[derive(Debug, Clone)]
pub struct TimeoutLayer {
    timeout: Option<Duration>,
}

impl TimeoutLayer {
    /// Bound each attempt by the request's own timeout
    pub fn new() -> Self {
        Self { timeout: None }
    }

    /// Bound each attempt by a fixed duration
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }
}

impl Default for TimeoutLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Provider> Layer<P> for TimeoutLayer {
    type LayeredProvider = TimeoutProvider<P>;

    fn layer(&self, inner: P) -> Self::LayeredProvider {
        TimeoutProvider {
            inner,
            timeout: self.timeout,
        }
    }
}

/// Provider wrapped with a wall-clock timeout
#[derive(Debug)]
pub struct TimeoutProvider<P> {
    inner: P,
    timeout: Option<Duration>,
}

#[async_trait]
impl<P: Provider> LayeredProvider for TimeoutProvider<P> {
    type Inner = P;

    fn inner(&self) -> &Self::Inner {
        &self.inner
    }

    async fn layered_chat_completion(
        &self,
        req: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, BridgeError> {
        let Some(limit) = self.timeout.or(req.timeout) else {
            return self.inner.chat_completion(req).await;
        };

        match tokio::time::timeout(limit, self.inner.chat_completion(req)).await {
            Ok(result) => result,
            Err(_) => Err(BridgeError::timeout(format!(
                "no response within {:?}",
                limit
            ))),
        }
    }
}

impl_layered_provider!(TimeoutProvider);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// Provider that answers after a fixed delay
    #[derive(Debug)]
    struct SlowProvider {
        delay: Duration,
    }

    #[async_trait]
    impl Provider for SlowProvider {
        fn info(&self) -> Arc<ProviderInfo> {
            Arc::new(ProviderInfo {
                id: "slow".to_string(),
                name: "Slow".to_string(),
            })
        }

        async fn chat_completion(
            &self,
            _req: ChatCompletionRequest,
        ) -> Result<ChatCompletionResponse, BridgeError> {
            tokio::time::sleep(self.delay).await;
            Ok(ChatCompletionResponse {
                id: "slow-1".to_string(),
                model: "slow".to_string(),
                choices: vec![Choice {
                    index: 0,
                    content: "finally".to_string(),
                    finish_reason: FinishReason::Stop,
                }],
                usage: Usage::default(),
            })
        }
    }

    fn request() -> ChatCompletionRequest {
        ChatCompletionRequest::new("slow", WirePayload::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_timeout_cuts_hung_call() {
        let provider = TimeoutLayer::with_timeout(Duration::from_secs(1)).layer(SlowProvider {
            delay: Duration::from_secs(60),
        });

        let err = provider.chat_completion(request()).await.unwrap_err();
        assert!(matches!(err, BridgeError::Timeout(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_timeout_is_used_by_default() {
        let provider = TimeoutLayer::new().layer(SlowProvider {
            delay: Duration::from_secs(5),
        });

        let err = provider
            .chat_completion(request().with_timeout(Duration::from_secs(2)))
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::Timeout(_)));

        let ok = provider
            .chat_completion(request().with_timeout(Duration::from_secs(10)))
            .await
            .unwrap();
        assert_eq!(ok.into_text().unwrap(), "finally");
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_limit_passes_through() {
        let provider = TimeoutLayer::new().layer(SlowProvider {
            delay: Duration::from_secs(30),
        });

        let ok = provider.chat_completion(request()).await.unwrap();
        assert_eq!(ok.choices.len(), 1);
        assert_eq!(provider.info().id, "slow");
    }
}
