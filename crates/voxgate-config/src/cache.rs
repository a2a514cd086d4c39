use serde::Deserialize;
use url::Url;

/// Audio cache configuration
///
/// Entries are keyed by the canonical hash of the synthesized text and
/// expire with the provider's `expires_at` for the audio URL.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Redis connection URL
    pub url: Url,
    /// Fallback TTL when the provider response carries no usable expiry
    #[serde(default = "default_ttl")]
    pub default_ttl: String,
    /// Key namespace
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

fn default_ttl() -> String {
    "24h".to_owned()
}

fn default_key_prefix() -> String {
    "voxgate:audio".to_owned()
}
