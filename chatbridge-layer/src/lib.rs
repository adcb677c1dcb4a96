//! # Chatbridge Layers
//!
//! Built-in provider layers for Chatbridge.
//!
//! Currently implemented layers:
//! - `LoggingLayer`: Logs every transport call with timing information
//! - `TimeoutLayer`: Bounds every transport call by a wall-clock timeout
//!
//! Retry is not a layer: the invoker owns it, so that exhausted retries can
//! be turned into failure text in one place.
//!
//! ## Usage
//!
//! ```ignore
//! use chatbridge_core::Invoker;
//! use chatbridge_layer::{LoggingLayer, TimeoutLayer};
//!
//! let invoker = Invoker::builder(provider, config)
//!     .layer(TimeoutLayer::new())
//!     .layer(LoggingLayer::new())
//!     .finish();
//! ```

pub mod logging;
pub mod timeout;

// Re-exports
pub use logging::LoggingLayer;
pub use timeout::TimeoutLayer;
