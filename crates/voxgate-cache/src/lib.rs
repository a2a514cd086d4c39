//! Redis-backed audio cache keyed by canonical hash
//!
//! Entries map a canonical text hash to a previously synthesized audio
//! URL. TTLs follow the provider's `expires_at` so a cached URL never
//! outlives the audio it points at. A per-hash single-flight guard keeps
//! concurrent requests for the same canonical text from paying for the
//! same synthesis twice.

#![allow(clippy::missing_errors_doc, clippy::must_use_candidate)]

mod flight;

use std::time::Duration;

use jiff::Timestamp;
use thiserror::Error;
use voxgate_config::CacheConfig;

pub use flight::SingleFlight;

/// Cache errors
#[derive(Debug, Error)]
pub enum CacheError {
    /// Redis connection or command error
    #[error("cache backend: {0}")]
    Backend(String),
    /// Serialization error
    #[error("serialization: {0}")]
    Serialization(String),
    /// Invalid cache configuration
    #[error("cache config: {0}")]
    Config(String),
}

/// Cached synthesis result
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CachedAudio {
    /// URL of the synthesized audio
    pub audio_url: String,
    /// Provider that produced it
    pub provider: String,
    /// When the audio URL expires (ISO-8601)
    pub expires_at: String,
}

/// Audio cache backed by Redis
#[derive(Clone)]
pub struct AudioCache {
    client: redis::Client,
    default_ttl: Duration,
    key_prefix: String,
}

impl AudioCache {
    /// Create a new audio cache from configuration
    pub fn new(config: &CacheConfig) -> Result<Self, CacheError> {
        let client = redis::Client::open(config.url.as_str())
            .map_err(|e| CacheError::Backend(format!("invalid URL: {e}")))?;

        let default_ttl = duration_str::parse(&config.default_ttl)
            .map_err(|e| CacheError::Config(format!("invalid default_ttl: {e}")))?;

        Ok(Self {
            client,
            default_ttl,
            key_prefix: config.key_prefix.clone(),
        })
    }

    /// Look up cached audio by canonical hash
    pub async fn get(&self, hash: &str) -> Result<Option<CachedAudio>, CacheError> {
        use redis::AsyncCommands;

        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| CacheError::Backend(format!("connection failed: {e}")))?;

        let key = format!("{}:{hash}", self.key_prefix);
        let result: Option<String> = conn
            .get(&key)
            .await
            .map_err(|e| CacheError::Backend(format!("GET failed: {e}")))?;

        if let Some(data) = result {
            let entry: CachedAudio = serde_json::from_str(&data)
                .map_err(|e| CacheError::Serialization(format!("deserialize: {e}")))?;
            tracing::debug!(hash, "audio cache hit");
            Ok(Some(entry))
        } else {
            tracing::debug!(hash, "audio cache miss");
            Ok(None)
        }
    }

    /// Store synthesized audio under its canonical hash
    ///
    /// The entry's TTL is derived from `expires_at`; already-expired
    /// entries are not stored.
    pub async fn put(&self, hash: &str, entry: &CachedAudio) -> Result<(), CacheError> {
        use redis::AsyncCommands;

        let Some(ttl) = ttl_from_expiry(&entry.expires_at, Timestamp::now(), self.default_ttl) else {
            tracing::debug!(hash, "skipping cache write for expired audio");
            return Ok(());
        };

        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| CacheError::Backend(format!("connection failed: {e}")))?;

        let key = format!("{}:{hash}", self.key_prefix);
        let data = serde_json::to_string(entry)
            .map_err(|e| CacheError::Serialization(format!("serialize: {e}")))?;

        let ttl_secs = ttl.as_secs().max(1);
        let _: () = conn
            .set_ex(&key, &data, ttl_secs)
            .await
            .map_err(|e| CacheError::Backend(format!("SET failed: {e}")))?;

        tracing::debug!(hash, ttl_secs, "cached audio");
        Ok(())
    }
}

/// TTL for a cache entry given the provider's expiry timestamp
///
/// Unparseable timestamps fall back to the default TTL; timestamps in
/// the past yield `None` (do not cache).
fn ttl_from_expiry(expires_at: &str, now: Timestamp, default_ttl: Duration) -> Option<Duration> {
    let Ok(expiry) = expires_at.parse::<Timestamp>() else {
        return Some(default_ttl);
    };

    let remaining = expiry.duration_since(now);
    if remaining.is_negative() || remaining.is_zero() {
        return None;
    }

    Duration::try_from(remaining).ok().or(Some(default_ttl))
}
