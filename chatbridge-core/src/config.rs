//! Backend configuration.

use crate::error::BridgeError;
use crate::retry::RetryBackoff;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default number of attempts per invocation
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default transport timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Per-adapter configuration.
///
/// Read once when a provider and invoker are built. The invoker only swaps it
/// between calls (see `Invoker::set_debug` / `Invoker::reconfigure`).
#[derive(Clone, PartialEq)]
pub struct BackendConfig {
    pub model: String,
    pub temperature: f32,
    /// Total attempts per invocation; `0` still attempts once
    pub max_retries: u32,
    pub timeout: Duration,
    /// Record the outbound payload before each attempt
    pub debug: bool,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub max_tokens: Option<u32>,
    pub backoff: RetryBackoff,
}

impl BackendConfig {
    /// Create a configuration for a model with default settings
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: 0.0,
            max_retries: DEFAULT_MAX_RETRIES,
            timeout: DEFAULT_TIMEOUT,
            debug: false,
            api_key: None,
            base_url: None,
            max_tokens: None,
            backoff: RetryBackoff::none(),
        }
    }

    /// Set temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set maximum number of attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set transport timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enable or disable outbound payload logging
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Set API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set base endpoint override
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set max tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set retry backoff
    pub fn with_backoff(mut self, backoff: RetryBackoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Attempts actually made per invocation
    pub fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }

    /// API key, or a configuration error naming the backend
    pub fn require_api_key(&self, backend: &str) -> Result<&str, BridgeError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| BridgeError::configuration(format!("{} API key is required", backend)))
    }

    /// Load configuration from `{PREFIX}_*` environment variables.
    ///
    /// Recognized: `_API_KEY`, `_BASE_URL` (or `_API_BASE`), `_MODEL`,
    /// `_TEMPERATURE`, `_MAX_RETRIES`, `_TIMEOUT_SECS`, `_DEBUG`.
    pub fn from_env(prefix: &str, default_model: &str) -> Result<Self, BridgeError> {
        Self::from_lookup(prefix, default_model, |key| std::env::var(key).ok())
    }

    /// Same as [`BackendConfig::from_env`] with a custom variable source
    pub fn from_lookup<F>(prefix: &str, default_model: &str, lookup: F) -> Result<Self, BridgeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(&format!("{}_{}", prefix, name)).filter(|value| !value.trim().is_empty())
        };

        let mut config = Self::new(var("MODEL").unwrap_or_else(|| default_model.to_string()));
        config.api_key = var("API_KEY");
        config.base_url = var("BASE_URL").or_else(|| var("API_BASE"));

        if let Some(value) = var("TEMPERATURE") {
            config.temperature = parse_var(prefix, "TEMPERATURE", &value)?;
        }
        if let Some(value) = var("MAX_RETRIES") {
            config.max_retries = parse_var(prefix, "MAX_RETRIES", &value)?;
        }
        if let Some(value) = var("TIMEOUT_SECS") {
            config.timeout = Duration::from_secs(parse_var(prefix, "TIMEOUT_SECS", &value)?);
        }
        if let Some(value) = var("DEBUG") {
            config.debug = parse_flag(prefix, &value)?;
        }

        Ok(config)
    }
}

fn parse_var<T: FromStr>(prefix: &str, name: &str, value: &str) -> Result<T, BridgeError>
where
    T::Err: fmt::Display,
{
    value.trim().parse().map_err(|e| {
        BridgeError::configuration(format!("invalid {}_{}={:?}: {}", prefix, name, value, e))
    })
}

fn parse_flag(prefix: &str, value: &str) -> Result<bool, BridgeError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(BridgeError::configuration(format!(
            "invalid {}_DEBUG={:?}",
            prefix, value
        ))),
    }
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_retries", &self.max_retries)
            .field("timeout", &self.timeout)
            .field("debug", &self.debug)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("max_tokens", &self.max_tokens)
            .field("backoff", &self.backoff)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = BackendConfig::new("deepseek-chat");
        assert_eq!(config.temperature, 0.0);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.timeout, Duration::from_secs(300));
        assert!(!config.debug);
        assert_eq!(config.backoff, RetryBackoff::none());
    }

    #[test]
    fn test_zero_retries_still_attempts_once() {
        assert_eq!(BackendConfig::new("m").with_max_retries(0).attempts(), 1);
        assert_eq!(BackendConfig::new("m").with_max_retries(4).attempts(), 4);
    }

    #[test]
    fn test_from_lookup() {
        let config = BackendConfig::from_lookup(
            "DEEPSEEK",
            "deepseek-chat",
            lookup(&[
                ("DEEPSEEK_API_KEY", "sk-test"),
                ("DEEPSEEK_API_BASE", "https://api.deepseek.com/v1"),
                ("DEEPSEEK_MAX_RETRIES", "5"),
                ("DEEPSEEK_TIMEOUT_SECS", "30"),
                ("DEEPSEEK_DEBUG", "true"),
            ]),
        )
        .unwrap();

        assert_eq!(config.model, "deepseek-chat");
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.base_url.as_deref(), Some("https://api.deepseek.com/v1"));
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.debug);
    }

    #[test]
    fn test_from_lookup_rejects_garbage() {
        let err = BackendConfig::from_lookup(
            "OPENAI",
            "gpt-3.5-turbo",
            lookup(&[("OPENAI_TEMPERATURE", "warm")]),
        )
        .unwrap_err();
        assert!(matches!(err, BridgeError::Configuration(_)));
        assert!(err.to_string().contains("OPENAI_TEMPERATURE"));
    }

    #[test]
    fn test_require_api_key() {
        let config = BackendConfig::new("m");
        assert!(matches!(
            config.require_api_key("OpenAI"),
            Err(BridgeError::Configuration(_))
        ));
        let config = config.with_api_key("sk");
        assert_eq!(config.require_api_key("OpenAI").unwrap(), "sk");
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let rendered = format!("{:?}", BackendConfig::new("m").with_api_key("sk-secret"));
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
