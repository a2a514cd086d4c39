//! Provider selection under operator control
//!
//! Operator flags (manual override, daily cost cap, provider circuit
//! breaker) are fetched from a shared store, decoded into typed flags at
//! the boundary, and resolved into a single provider decision by strict
//! precedence. Exactly one rule wins; results are never merged.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod flags;
mod select;
mod store;

pub use flags::{FlagKey, SpeechFlag, SpeechFlags, decode_flag};
pub use select::{ProviderDecision, select};
pub use store::{FlagClient, FlagStore, MemoryFlagStore, RedisFlagStore};

use thiserror::Error;

/// Flag store and decode errors
#[derive(Debug, Error)]
pub enum FlagError {
    /// Store connection or command failure
    #[error("flag store backend: {0}")]
    Backend(String),
    /// Flag value did not match its expected shape
    #[error("flag decode for '{key}': {message}")]
    Decode { key: String, message: String },
}
