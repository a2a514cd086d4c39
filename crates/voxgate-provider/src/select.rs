//! Provider precedence resolution

use voxgate_config::{SpeechProvider, SynthesisConfig};

use crate::flags::{SpeechFlag, SpeechFlags};

/// Resolved provider decision, never partially applied
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderDecision {
    pub provider: SpeechProvider,
    pub voice: Option<String>,
    pub bitrate: Option<u32>,
    pub reason: Option<String>,
    pub manual_override: bool,
}

impl ProviderDecision {
    fn preferred(provider: SpeechProvider) -> Self {
        Self {
            provider,
            voice: None,
            bitrate: None,
            reason: None,
            manual_override: false,
        }
    }
}

/// Resolve the provider for the next synthesis call
///
/// Precedence is total and strict, evaluated in this order:
/// manual override, daily cost cap, `ElevenLabs` circuit breaker,
/// configured preference. The first applicable rule wins outright.
pub fn select(flags: &SpeechFlags, config: &SynthesisConfig) -> ProviderDecision {
    if let Some(SpeechFlag::ManualOverride {
        enabled: true,
        provider,
        voice,
        bitrate,
    }) = &flags.manual_override
    {
        return ProviderDecision {
            provider: *provider,
            voice: voice.clone(),
            bitrate: *bitrate,
            reason: Some("Manual override by administrator".to_owned()),
            manual_override: true,
        };
    }

    if let Some(SpeechFlag::HardCap {
        disabled: true,
        reason,
    }) = &flags.hard_cap
    {
        return ProviderDecision {
            provider: SpeechProvider::Disabled,
            voice: None,
            bitrate: None,
            reason: Some(
                reason
                    .clone()
                    .unwrap_or_else(|| "Daily cost cap reached".to_owned()),
            ),
            manual_override: false,
        };
    }

    if config.preferred_provider == SpeechProvider::Elevenlabs
        && let Some(SpeechFlag::CircuitBreaker {
            disabled: true,
            reason,
        }) = &flags.eleven_breaker
    {
        return ProviderDecision {
            provider: SpeechProvider::Openai,
            voice: Some(config.fallback_voice.clone()),
            bitrate: Some(config.emergency_bitrate),
            reason: Some(
                reason
                    .clone()
                    .unwrap_or_else(|| "ElevenLabs circuit breaker active".to_owned()),
            ),
            manual_override: false,
        };
    }

    ProviderDecision::preferred(config.preferred_provider)
}
