#![allow(clippy::must_use_candidate)]

mod context;
mod error;

pub use context::{MessageType, SpeechContext, SpeechMode, Urgency};
pub use error::HttpError;
