//! Error types for Chatbridge operations.
//!
//! These errors travel between transports, layers and the invoker. They never
//! cross the invoker's public boundary: terminal failures are turned into
//! [`InvocationResult::Failure`](crate::types::InvocationResult) text there.

/// The main error type for backend calls.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Provider-specific errors
    #[error("Provider error: {0}")]
    Provider(String),

    /// Network-related errors
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Rate limit errors
    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    /// Invalid request errors
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Timeout errors
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The backend answered but carried no usable text
    #[error("Empty response: {0}")]
    EmptyResponse(String),
}

impl BridgeError {
    /// Create a provider error
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limit(msg: impl Into<String>) -> Self {
        Self::RateLimit(msg.into())
    }

    /// Create an invalid request error
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an empty response error
    pub fn empty_response(msg: impl Into<String>) -> Self {
        Self::EmptyResponse(msg.into())
    }

    /// Map an HTTP status and body returned by a backend to an error.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let detail = format!("HTTP {}: {}", status, body.into());
        match status {
            400 | 404 | 422 => Self::invalid_request(detail),
            401 | 403 => Self::Authentication(detail),
            408 | 504 => Self::timeout(detail),
            429 => Self::rate_limit(detail),
            _ => Self::provider(detail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_variants() {
        assert!(matches!(
            BridgeError::from_status(401, "bad key"),
            BridgeError::Authentication(_)
        ));
        assert!(matches!(
            BridgeError::from_status(429, "slow down"),
            BridgeError::RateLimit(_)
        ));
        assert!(matches!(
            BridgeError::from_status(400, "bad"),
            BridgeError::InvalidRequest(_)
        ));
        assert!(matches!(
            BridgeError::from_status(529, "overloaded"),
            BridgeError::Provider(_)
        ));
    }

    #[test]
    fn helpers_build_matching_variants() {
        assert!(matches!(BridgeError::provider("x"), BridgeError::Provider(_)));
        assert!(matches!(BridgeError::timeout("x"), BridgeError::Timeout(_)));
        assert!(matches!(
            BridgeError::configuration("x"),
            BridgeError::Configuration(_)
        ));
        assert!(matches!(
            BridgeError::from_status(403, "forbidden"),
            BridgeError::Authentication(_)
        ));
        assert!(matches!(
            BridgeError::from_status(504, "gateway"),
            BridgeError::Timeout(_)
        ));
        assert_eq!(
            BridgeError::empty_response("no choices").to_string(),
            "Empty response: no choices"
        );
    }

    #[test]
    fn display_embeds_description() {
        let err = BridgeError::from_status(500, "boom");
        assert_eq!(err.to_string(), "Provider error: HTTP 500: boom");
    }
}
