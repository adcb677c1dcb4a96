//! Invoker implementation.
//!
//! The invoker normalizes a conversation with the payload strategy of its
//! provider, sends it with bounded retry, and always comes back with text.
//! Transport errors stay typed until the very end, where a terminal error is
//! rendered into [`InvocationResult::Failure`].

use crate::config::BackendConfig;
use crate::error::BridgeError;
use crate::layer::Layer;
use crate::log::{InvocationLog, TracingLog};
use crate::provider::Provider;
use crate::strategy::{strategy_for_shape, PayloadStrategy};
use crate::types::*;
use arc_swap::ArcSwap;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::Instrument;

/// Type-erased provider that can be shared across threads
type BoxedProvider = Arc<dyn Provider>;

/// Builder for composing an invoker from a provider, layers and a log sink.
///
/// # Example
///
/// ```ignore
/// let invoker = Invoker::builder(openai_provider, config)
///     .layer(LoggingLayer::new())
///     .log_sink(Arc::new(TracingLog::new()))
///     .finish();
/// ```
pub struct InvokerBuilder<P> {
    provider: P,
    config: BackendConfig,
    payload_strategy: Option<Box<dyn PayloadStrategy>>,
    log: Option<Arc<dyn InvocationLog>>,
}

impl<P: Provider> InvokerBuilder<P> {
    /// Create a new builder with a provider and its configuration
    pub fn new(provider: P, config: BackendConfig) -> Self {
        Self {
            provider,
            config,
            payload_strategy: None,
            log: None,
        }
    }

    /// Add a layer to wrap the provider
    ///
    /// Each call to `layer()` creates a new concrete type by wrapping the
    /// previous provider.
    pub fn layer<L>(self, layer: L) -> InvokerBuilder<L::LayeredProvider>
    where
        L: Layer<P>,
    {
        InvokerBuilder {
            provider: layer.layer(self.provider),
            config: self.config,
            payload_strategy: self.payload_strategy,
            log: self.log,
        }
    }

    /// Set a custom payload strategy
    ///
    /// If not set, the strategy follows the provider's payload shape.
    pub fn payload_strategy(mut self, strategy: Box<dyn PayloadStrategy>) -> Self {
        self.payload_strategy = Some(strategy);
        self
    }

    /// Set the sink receiving invocation events
    ///
    /// Defaults to [`TracingLog`].
    pub fn log_sink(mut self, log: Arc<dyn InvocationLog>) -> Self {
        self.log = Some(log);
        self
    }

    /// Finish building and create an Invoker
    pub fn finish(self) -> Invoker {
        let payload_strategy = self
            .payload_strategy
            .unwrap_or_else(|| strategy_for_shape(self.provider.payload_shape()));

        Invoker {
            provider: Arc::new(self.provider),
            config: ArcSwap::from_pointee(self.config),
            payload_strategy,
            log: self.log.unwrap_or_else(|| Arc::new(TracingLog::new())),
        }
    }
}

/// Resilient invoker over one backend.
///
/// This is the main entry point. [`Invoker::invoke`] never fails: success and
/// terminal failure both come back as text inside an [`InvocationResult`].
pub struct Invoker {
    provider: BoxedProvider,
    config: ArcSwap<BackendConfig>,
    payload_strategy: Box<dyn PayloadStrategy>,
    log: Arc<dyn InvocationLog>,
}

impl std::fmt::Debug for Invoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invoker")
            .field("provider", &self.provider)
            .field("config", &self.config.load_full())
            .field("payload_strategy", &self.payload_strategy.name())
            .finish()
    }
}

impl Invoker {
    /// Create a new builder
    pub fn builder<P: Provider>(provider: P, config: BackendConfig) -> InvokerBuilder<P> {
        InvokerBuilder::new(provider, config)
    }

    /// Get provider information
    pub fn info(&self) -> Arc<ProviderInfo> {
        self.provider.info()
    }

    /// Snapshot of the current configuration
    pub fn config(&self) -> Arc<BackendConfig> {
        self.config.load_full()
    }

    /// Parameters identifying this backend (provider type and model)
    pub fn identifying_params(&self) -> BTreeMap<&'static str, String> {
        BTreeMap::from([
            ("type", self.provider.info().id.clone()),
            ("model", self.config.load().model.clone()),
        ])
    }

    /// Toggle outbound payload logging for subsequent calls
    pub fn set_debug(&self, debug: bool) {
        self.config.rcu(|current| {
            let mut next = BackendConfig::clone(current);
            next.debug = debug;
            next
        });
    }

    /// Replace the configuration for subsequent calls
    ///
    /// Credentials and base URL are baked into the provider when it is
    /// built; changing them here does not rebuild the transport.
    pub fn reconfigure(&self, config: BackendConfig) {
        self.config.store(Arc::new(config));
    }

    /// Normalize a conversation the way this invoker would send it
    pub fn normalize(&self, conversation: &Conversation) -> WirePayload {
        self.payload_strategy.normalize(conversation)
    }

    /// Invoke the backend with bounded retry.
    pub async fn invoke(
        &self,
        conversation: impl Into<Conversation>,
        stop: Option<&[String]>,
    ) -> InvocationResult {
        let conversation = conversation.into();
        let config = self.config.load_full();
        let ctx = RequestContext::new(self.provider.info().id.clone(), config.model.clone());

        let span = tracing::info_span!(
            "invoke",
            request_id = %ctx.request_id,
            provider = %ctx.provider_id,
            model = %ctx.model
        );

        self.invoke_with_retry(&ctx, &config, &conversation, stop)
            .instrument(span)
            .await
    }

    /// Invoke and return plain text, success or failure alike
    pub async fn call(&self, conversation: impl Into<Conversation>, stop: Option<&[String]>) -> String {
        self.invoke(conversation, stop).await.into_text()
    }

    fn build_request(
        &self,
        config: &BackendConfig,
        conversation: &Conversation,
        stop: Option<&[String]>,
    ) -> ChatCompletionRequest {
        let payload = self.payload_strategy.normalize(conversation);
        let mut req = ChatCompletionRequest::new(config.model.clone(), payload)
            .with_temperature(config.temperature)
            .with_timeout(config.timeout);

        if let Some(max_tokens) = config.max_tokens {
            req = req.with_max_tokens(max_tokens);
        }
        if let Some(stop) = stop.filter(|stop| !stop.is_empty()) {
            req = req.with_stop(stop.to_vec());
        }

        req
    }

    async fn attempt(&self, req: ChatCompletionRequest) -> Result<String, BridgeError> {
        self.provider.chat_completion(req).await?.into_text()
    }

    async fn invoke_with_retry(
        &self,
        ctx: &RequestContext,
        config: &BackendConfig,
        conversation: &Conversation,
        stop: Option<&[String]>,
    ) -> InvocationResult {
        let req = self.build_request(config, conversation, stop);
        let max_attempts = config.attempts();
        let mut attempt = 0;

        loop {
            if config.debug {
                self.log.outbound(ctx, &req.payload);
            }

            match self.attempt(req.clone()).await {
                Ok(text) => {
                    self.log.response(ctx, &text);
                    return InvocationResult::Success(text);
                }
                Err(error) => {
                    attempt += 1;
                    if attempt >= max_attempts {
                        self.log.failure(ctx, &error);
                        return InvocationResult::failure(&error);
                    }

                    self.log.retry(ctx, attempt, max_attempts, &error);

                    let delay = config.backoff.delay(attempt);
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }
    }
}
