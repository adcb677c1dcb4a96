//! Strategy layer for backend-specific payload shapes.
//!
//! This module holds the message normalizer: one role-remap table applied
//! through a strategy per payload shape (inline vs out-of-band system).

pub mod payload;

pub use payload::{
    strategy_for_shape, InlineSystemStrategy, OutOfBandSystemStrategy, PayloadStrategy,
    TOOL_RESULT_PREFIX,
};
