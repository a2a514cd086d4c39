//! Flag record storage backends

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::{
    FlagError,
    flags::{FlagKey, SpeechFlag, SpeechFlags, decode_flag},
};

/// Keyed flag-record storage shared with the operator tooling
#[async_trait]
pub trait FlagStore: Send + Sync {
    /// Fetch the raw value for a flag key, `None` when unset
    async fn fetch(&self, key: &str) -> Result<Option<serde_json::Value>, FlagError>;
}

/// In-process flag store, set at startup or by tests
#[derive(Debug, Default)]
pub struct MemoryFlagStore {
    records: DashMap<String, serde_json::Value>,
}

impl MemoryFlagStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or replace a flag record
    pub fn set(&self, key: &str, value: serde_json::Value) {
        self.records.insert(key.to_owned(), value);
    }

    /// Remove a flag record
    pub fn clear(&self, key: &str) {
        self.records.remove(key);
    }
}

#[async_trait]
impl FlagStore for MemoryFlagStore {
    async fn fetch(&self, key: &str) -> Result<Option<serde_json::Value>, FlagError> {
        Ok(self.records.get(key).map(|entry| entry.value().clone()))
    }
}

/// Redis-backed flag store shared across gateway instances
pub struct RedisFlagStore {
    client: redis::Client,
    key_prefix: String,
}

impl RedisFlagStore {
    pub fn new(url: &str) -> Result<Self, FlagError> {
        let client =
            redis::Client::open(url).map_err(|e| FlagError::Backend(format!("invalid URL: {e}")))?;

        Ok(Self {
            client,
            key_prefix: "voxgate:flags".to_owned(),
        })
    }
}

#[async_trait]
impl FlagStore for RedisFlagStore {
    async fn fetch(&self, key: &str) -> Result<Option<serde_json::Value>, FlagError> {
        use redis::AsyncCommands;

        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| FlagError::Backend(format!("connection failed: {e}")))?;

        let record_key = format!("{}:{key}", self.key_prefix);
        let raw: Option<String> = conn
            .get(&record_key)
            .await
            .map_err(|e| FlagError::Backend(format!("GET failed: {e}")))?;

        raw.map(|data| {
            serde_json::from_str(&data).map_err(|e| FlagError::Decode {
                key: key.to_owned(),
                message: e.to_string(),
            })
        })
        .transpose()
    }
}

/// Flag store facade with a short-TTL in-process cache
///
/// Flags change rarely but are consulted before every synthesis call;
/// the cache keeps the hot path off the network without letting an
/// operator change go unnoticed for more than the TTL.
pub struct FlagClient {
    store: Arc<dyn FlagStore>,
    cache: mini_moka::sync::Cache<FlagKey, Option<SpeechFlag>>,
}

impl FlagClient {
    pub fn new(store: Arc<dyn FlagStore>, cache_ttl: Duration) -> Self {
        let cache = mini_moka::sync::Cache::builder()
            .max_capacity(16)
            .time_to_live(cache_ttl)
            .build();

        Self { store, cache }
    }

    /// Fetch and decode one flag, serving from cache when fresh
    pub async fn flag(&self, key: FlagKey) -> Result<Option<SpeechFlag>, FlagError> {
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }

        let raw = self.store.fetch(key.as_str()).await?;
        let decoded = raw.map(|value| decode_flag(key, &value)).transpose()?;

        self.cache.insert(key, decoded.clone());
        Ok(decoded)
    }

    /// Load the full flag state, treating per-flag failures as unset
    ///
    /// Selection must not stall because the flag store is down; a
    /// missing flag simply leaves the corresponding rule inactive.
    pub async fn load(&self) -> SpeechFlags {
        let mut flags = SpeechFlags::default();

        for key in FlagKey::ALL {
            match self.flag(key).await {
                Ok(Some(flag)) => flags.insert(flag),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(flag = key.as_str(), error = %e, "flag fetch failed, treating as unset");
                }
            }
        }

        flags
    }
}
