use serde::Deserialize;

use crate::throttle::RedisConfig;

/// Operator feature-flag store configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlagsConfig {
    /// Flag record storage backend
    #[serde(default)]
    pub storage: FlagStorage,
    /// How long a fetched flag may be served from the in-process cache
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl: String,
}

impl Default for FlagsConfig {
    fn default() -> Self {
        Self {
            storage: FlagStorage::default(),
            cache_ttl: default_cache_ttl(),
        }
    }
}

/// Where flag records live
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FlagStorage {
    /// In-process flags, set at startup or by tests
    #[default]
    Memory,
    /// Redis-backed flags shared across instances
    Redis(RedisConfig),
}

fn default_cache_ttl() -> String {
    "10s".to_owned()
}
