use serde::{Deserialize, Serialize};

/// Caller-supplied hints about a reply, used by the decision engine
///
/// All fields are optional; an empty context is valid and falls through
/// to the word-count default rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpeechContext {
    /// First message of a conversation (treated like a greeting)
    #[serde(default)]
    pub is_first_message: Option<bool>,
    /// User explicitly asked for this reply to be spoken
    #[serde(default)]
    pub user_requested_audio: Option<bool>,
    /// Coarse classification of the reply
    #[serde(default)]
    pub message_type: Option<MessageType>,
    /// Urgency hint from the caller
    #[serde(default)]
    pub urgency: Option<Urgency>,
    /// Explicit list-item count, overrides counting lines in the text
    #[serde(default)]
    pub item_count: Option<u32>,
}

/// Reply classification supplied by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Greeting,
    Farewell,
    Confirmation,
    Error,
    Info,
    List,
    System,
}

/// Urgency hint from the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

/// Target length for spoken output
///
/// Brief favors short actionable utterances, full allows longer
/// expressive ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeechMode {
    Brief,
    Full,
}
