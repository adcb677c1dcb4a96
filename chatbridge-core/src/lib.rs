//! # Chatbridge Core
//!
//! Core abstractions and runtime for invoking heterogeneous chat-completion
//! backends.
//!
//! A conversation is normalized into the payload shape a backend expects
//! (system inline or out-of-band), sent through a [`Provider`] with bounded
//! retry, and always answered with text. Terminal failures come back as a
//! descriptive [`InvocationResult::Failure`] instead of an error.

pub mod config;
pub mod error;
pub mod layer;
pub mod log;
pub mod provider;
pub mod retry;
pub mod runtime;
pub mod strategy;
pub mod types;

// Re-exports
pub use config::BackendConfig;
pub use error::BridgeError;
pub use layer::{Layer, LayeredProvider};
pub use log::{InvocationLog, TracingLog};
pub use provider::Provider;
pub use retry::RetryBackoff;
pub use runtime::{Invoker, InvokerBuilder};
pub use strategy::{InlineSystemStrategy, OutOfBandSystemStrategy, PayloadStrategy, TOOL_RESULT_PREFIX};
pub use types::*;

/// Result type alias for backend operations
pub type Result<T> = std::result::Result<T, BridgeError>;
