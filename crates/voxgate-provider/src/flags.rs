//! Typed operator flags
//!
//! Flag values arrive as loose JSON records; they are decoded here, at
//! the boundary, so the selector works over an exhaustive union instead
//! of stringly-typed key lookups.

use serde::Deserialize;
use voxgate_config::SpeechProvider;

use crate::FlagError;

/// Known flag record keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagKey {
    /// `tts_manual_override`
    ManualOverride,
    /// `tts_hard_cap_reached`
    HardCap,
    /// `tts_eleven_disabled`
    ElevenBreaker,
}

impl FlagKey {
    pub const ALL: [Self; 3] = [Self::ManualOverride, Self::HardCap, Self::ElevenBreaker];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ManualOverride => "tts_manual_override",
            Self::HardCap => "tts_hard_cap_reached",
            Self::ElevenBreaker => "tts_eleven_disabled",
        }
    }
}

/// One decoded operator flag
#[derive(Debug, Clone, PartialEq)]
pub enum SpeechFlag {
    /// Operator dictates provider, voice, and bitrate unconditionally
    ManualOverride {
        enabled: bool,
        provider: SpeechProvider,
        voice: Option<String>,
        bitrate: Option<u32>,
    },
    /// Daily cost cap reached; synthesis switched off
    HardCap { disabled: bool, reason: Option<String> },
    /// `ElevenLabs` forced out of rotation
    CircuitBreaker { disabled: bool, reason: Option<String> },
}

/// The full flag state consulted before each provider decision
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeechFlags {
    pub manual_override: Option<SpeechFlag>,
    pub hard_cap: Option<SpeechFlag>,
    pub eleven_breaker: Option<SpeechFlag>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOverride {
    enabled: bool,
    provider: SpeechProvider,
    #[serde(default)]
    voice: Option<String>,
    #[serde(default)]
    bitrate: Option<u32>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawToggle {
    disabled: bool,
    #[serde(default)]
    reason: Option<String>,
}

/// Decode a raw flag value into its typed form
pub fn decode_flag(key: FlagKey, value: &serde_json::Value) -> Result<SpeechFlag, FlagError> {
    let decode_error = |e: serde_json::Error| FlagError::Decode {
        key: key.as_str().to_owned(),
        message: e.to_string(),
    };

    match key {
        FlagKey::ManualOverride => {
            let raw: RawOverride = serde_json::from_value(value.clone()).map_err(decode_error)?;
            Ok(SpeechFlag::ManualOverride {
                enabled: raw.enabled,
                provider: raw.provider,
                voice: raw.voice,
                bitrate: raw.bitrate,
            })
        }
        FlagKey::HardCap => {
            let raw: RawToggle = serde_json::from_value(value.clone()).map_err(decode_error)?;
            Ok(SpeechFlag::HardCap {
                disabled: raw.disabled,
                reason: raw.reason,
            })
        }
        FlagKey::ElevenBreaker => {
            let raw: RawToggle = serde_json::from_value(value.clone()).map_err(decode_error)?;
            Ok(SpeechFlag::CircuitBreaker {
                disabled: raw.disabled,
                reason: raw.reason,
            })
        }
    }
}

impl SpeechFlags {
    pub(crate) fn insert(&mut self, flag: SpeechFlag) {
        match flag {
            SpeechFlag::ManualOverride { .. } => self.manual_override = Some(flag),
            SpeechFlag::HardCap { .. } => self.hard_cap = Some(flag),
            SpeechFlag::CircuitBreaker { .. } => self.eleven_breaker = Some(flag),
        }
    }
}
