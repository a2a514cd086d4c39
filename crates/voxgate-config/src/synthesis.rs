use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Synthesis backend and provider-selection configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SynthesisConfig {
    /// Base URL of the synthesis endpoint (the `/tts` path is appended)
    #[serde(default = "default_base_url")]
    pub base_url: Url,
    /// Bearer token for the synthesis endpoint
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Provider used when no override or breaker applies
    #[serde(default)]
    pub preferred_provider: SpeechProvider,
    /// Voice used when falling back away from the preferred provider
    #[serde(default = "default_fallback_voice")]
    pub fallback_voice: String,
    /// Reduced bitrate (kbps) used during provider fallback
    #[serde(default = "default_emergency_bitrate")]
    pub emergency_bitrate: u32,
    /// Per-call timeout (e.g. "30s")
    #[serde(default = "default_timeout")]
    pub timeout: String,
    /// Retries per call after a network failure
    #[serde(default = "default_retries")]
    pub retries: u32,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            preferred_provider: SpeechProvider::default(),
            fallback_voice: default_fallback_voice(),
            emergency_bitrate: default_emergency_bitrate(),
            timeout: default_timeout(),
            retries: default_retries(),
        }
    }
}

/// Speech synthesis backends
///
/// `Disabled` is a valid *resolved* provider (cost cap in effect) but not
/// a valid preference; validation rejects it in `preferred_provider`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SpeechProvider {
    /// `ElevenLabs`
    #[default]
    Elevenlabs,
    /// `OpenAI` TTS
    Openai,
    /// Synthesis switched off by policy
    Disabled,
}

fn default_base_url() -> Url {
    Url::parse("http://127.0.0.1:9090").expect("valid URL")
}
fn default_fallback_voice() -> String {
    "alloy".to_owned()
}
fn default_emergency_bitrate() -> u32 {
    24
}
fn default_timeout() -> String {
    "30s".to_owned()
}
fn default_retries() -> u32 {
    1
}
