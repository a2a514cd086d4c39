//! Speak-or-mute classification for assistant replies
//!
//! An ordered rule chain decides whether a reply should be synthesized
//! and at what length. The first matching rule wins; rules are never
//! re-evaluated, so priority is encoded purely by position in the chain.

#![allow(clippy::must_use_candidate)]

mod patterns;
mod rules;

use voxgate_core::{SpeechContext, SpeechMode};

pub use patterns::{EMPATHY_PATTERNS, FAREWELL_PATTERNS, GREETING_PATTERNS, SYSTEM_MARKERS};

/// Outcome of the rule chain for one text + context pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechDecision {
    /// Whether the reply should be spoken at all
    pub speak: bool,
    /// Target spoken length
    pub mode: SpeechMode,
    /// Which rule fired, for logs and debugging
    pub reason: String,
}

impl SpeechDecision {
    pub(crate) fn speak(mode: SpeechMode, reason: impl Into<String>) -> Self {
        Self {
            speak: true,
            mode,
            reason: reason.into(),
        }
    }

    pub(crate) fn mute(reason: impl Into<String>) -> Self {
        Self {
            speak: false,
            mode: SpeechMode::Brief,
            reason: reason.into(),
        }
    }
}

/// Decide whether `text` should be spoken given the caller's context
///
/// Pure and side-effect free; safe to call repeatedly (the batcher
/// re-runs it per item).
pub fn decide(text: &str, context: &SpeechContext) -> SpeechDecision {
    for rule in rules::CHAIN {
        if let Some(decision) = rule(text, context) {
            return decision;
        }
    }

    // The word-count rule always matches, so the chain cannot fall through
    unreachable!("rule chain must terminate with the default rule")
}
