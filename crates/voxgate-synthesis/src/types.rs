use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use voxgate_batch::ItemSpan;
use voxgate_core::SpeechContext;

/// Body of `POST /v1/speech`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpeakRequest {
    /// Ordered assistant replies to voice
    pub items: Vec<SpeakItem>,
    /// Authenticated caller, used for throttling; absent means anonymous
    #[serde(default)]
    pub user_id: Option<String>,
    /// Throttle tier; unknown or absent tiers get the default limits
    #[serde(default)]
    pub tier: Option<String>,
}

/// One assistant reply queued for voicing
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpeakItem {
    pub text: String,
    /// Decision-engine context
    #[serde(default)]
    pub context: Option<SpeechContext>,
    /// Requested voice
    #[serde(default)]
    pub voice: Option<String>,
    /// Collision-avoidance keys consumed by the batcher
    #[serde(default)]
    pub metadata: Option<BTreeMap<String, serde_json::Value>>,
}

impl SpeakItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// Body of a successful `POST /v1/speech` response
///
/// Units appear in input order: a muted item is omitted, a batched run
/// of short items collapses into one unit, and a long item expands into
/// one unit per segment.
#[derive(Debug, Clone, Serialize)]
pub struct SpeakResponse {
    pub units: Vec<SpeechUnit>,
}

/// One synthesis unit and what became of it
#[derive(Debug, Clone, Serialize)]
pub struct SpeechUnit {
    pub kind: UnitKind,
    #[serde(flatten)]
    pub status: UnitStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    /// A group of short items voiced in one call
    Batch,
    /// One bounded piece of a long reply
    Segment,
}

/// Terminal state of a unit
///
/// `Skipped` carries policy reasons (throttle, disabled provider) and is
/// not an error; `Failed` means every synthesis attempt was exhausted.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UnitStatus {
    Synthesized { results: Vec<TtsResult> },
    Skipped { reason: String },
    Failed { reason: String },
}

/// One synthesized audio artifact
#[derive(Debug, Clone, Serialize)]
pub struct TtsResult {
    /// Where the audio can be fetched
    pub audio_url: String,
    /// Served from the audio cache instead of a fresh synthesis
    pub cached: bool,
    /// Backend that produced the audio
    pub provider: String,
    /// When the audio URL expires (ISO-8601)
    pub expires_at: String,
    /// Character spans of the source items inside the synthesized text
    pub items: Vec<ItemSpan>,
}
