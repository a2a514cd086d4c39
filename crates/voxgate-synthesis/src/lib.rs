//! Speech synthesis orchestration and HTTP surface
//!
//! Ties the pipeline crates together behind `POST /v1/speech`: replies
//! are classified, long ones segmented, short runs batched, and the
//! surviving units synthesized concurrently against the configured
//! backend with caching, throttling, and operator flags applied.

#![allow(clippy::missing_errors_doc, clippy::must_use_candidate)]

mod client;
mod error;
mod orchestrator;
mod request;
mod server;
mod types;

pub use client::{SynthesisClient, TtsResponse};
pub use error::{Result, SynthesisError};
pub use orchestrator::Orchestrator;
pub use request::ExtractPayload;
pub use server::{Server, endpoint_router};
pub use types::{
    SpeakItem, SpeakRequest, SpeakResponse, SpeechUnit, TtsResult, UnitKind, UnitStatus,
};
