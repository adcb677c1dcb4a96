//! Runtime layer for Chatbridge.
//!
//! This module sits between callers and the provider interface
//! (chat_completion). It is responsible for:
//! - Normalizing conversations with the provider's payload strategy
//! - Bounded retry, with an optional backoff between attempts
//! - Reporting outbound payloads, responses and retries to the log sink
//! - Turning terminal failures into text and batching results

pub mod batch;
pub mod invoker;

#[cfg(test)]
pub(crate) mod testing;

pub use invoker::{Invoker, InvokerBuilder};
