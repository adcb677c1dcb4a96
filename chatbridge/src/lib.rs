//! # Chatbridge
//!
//! Resilient invocation layer over heterogeneous chat-completion backends.
//!
//! Chatbridge takes a conversation (or a bare prompt string), reshapes it into
//! the payload a backend expects, sends it with bounded retry and always hands
//! back text. When every attempt fails the text is a descriptive failure
//! message instead of an error, so a caller driving a pipeline of model calls
//! never has to unwind.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! chatbridge = { version = "0.1", features = ["openai", "layers"] }
//! ```
//!
//! ```ignore
//! use chatbridge::prelude::*;
//!
//! # async fn example() -> Result<()> {
//! let config = BackendConfig::from_env("DEEPSEEK", "deepseek-chat")?;
//! let provider = chatbridge::provider::deepseek(&config)?;
//!
//! let invoker = Invoker::builder(provider, config)
//!     .layer(LoggingLayer::new())
//!     .finish();
//!
//! let conversation = Conversation::from(vec![
//!     Message::system("You are a helpful assistant."),
//!     Message::user("What is Rust?"),
//! ]);
//!
//! match invoker.invoke(conversation, None).await {
//!     InvocationResult::Success(text) => println!("{text}"),
//!     InvocationResult::Failure(text) => eprintln!("{text}"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `default`: Includes `openai` and `layers`
//! - `openai`: OpenAI and OpenAI-compatible (DeepSeek) transports
//! - `anthropic`: Anthropic Messages API transport
//! - `providers`: All available transports
//! - `layers`: Built-in layers (logging, timeout)
//! - `full`: All features enabled

// Re-export core types and traits
pub use chatbridge_core::*;

// Re-export providers under `provider` module
#[cfg(feature = "chatbridge-provider")]
pub mod provider {
    //! Backend transport implementations.
    pub use chatbridge_provider::*;
}

// Re-export layers under `layer` module
#[cfg(feature = "chatbridge-layer")]
pub mod layer {
    //! Built-in provider layers.
    pub use chatbridge_layer::*;
}

/// Prelude module for convenient imports
pub mod prelude {
    //! Prelude module containing the most commonly used types and traits.
    //!
    //! ```
    //! use chatbridge::prelude::*;
    //! ```

    pub use crate::{
        BackendConfig, BridgeError, Conversation, GenerationBatch, InvocationLog,
        InvocationResult, Invoker, Layer, Message, Provider, Result, RetryBackoff, Role,
    };

    #[cfg(feature = "chatbridge-provider")]
    pub use crate::provider::*;

    #[cfg(feature = "chatbridge-layer")]
    pub use crate::layer::*;
}
