//! # Chatbridge Providers
//!
//! Backend transports for Chatbridge.
//!
//! - [`OpenAiProvider`]: OpenAI and OpenAI-compatible endpoints, system inline
//! - [`AnthropicProvider`]: Anthropic Messages API, system out-of-band

#[cfg(feature = "anthropic")]
pub mod anthropic;
#[cfg(feature = "openai")]
pub mod openai;

// Re-exports
#[cfg(feature = "anthropic")]
pub use anthropic::{AnthropicBuilder, AnthropicProvider};
#[cfg(feature = "openai")]
pub use openai::{OpenAiBuilder, OpenAiProvider};

#[cfg(feature = "openai")]
use chatbridge_core::config::BackendConfig;
#[cfg(feature = "openai")]
use chatbridge_core::error::BridgeError;

/// Default DeepSeek endpoint
#[cfg(feature = "openai")]
pub const DEEPSEEK_API_BASE: &str = "https://api.deepseek.com/v1";

/// Create a DeepSeek provider (OpenAI-compatible)
///
/// DeepSeek uses the OpenAI API protocol but with a different endpoint.
/// A `base_url` in the config overrides [`DEEPSEEK_API_BASE`].
///
/// # Example
///
/// ```ignore
/// use chatbridge_provider::deepseek;
///
/// let config = BackendConfig::new("deepseek-chat").with_api_key("your-api-key");
/// let provider = deepseek(&config)?;
/// ```
#[cfg(feature = "openai")]
pub fn deepseek(config: &BackendConfig) -> Result<OpenAiProvider, BridgeError> {
    OpenAiProvider::builder()
        .api_base(DEEPSEEK_API_BASE)
        .config(config)
        .build_with_id("deepseek", "DeepSeek")
}
