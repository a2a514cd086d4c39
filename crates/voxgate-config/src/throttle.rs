use std::collections::HashMap;

use serde::Deserialize;
use url::Url;

/// Per-user synthesis throttle configuration
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThrottleConfig {
    /// Counter storage backend
    #[serde(default)]
    pub storage: CounterStorage,
    /// Limits applied when a user has no tier entry
    #[serde(default)]
    pub default: ThrottleLimits,
    /// Per-tier overrides keyed by tier name
    #[serde(default)]
    pub tiers: HashMap<String, ThrottleLimits>,
}

/// Where per-user counters live
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CounterStorage {
    /// In-process counters (single instance only)
    #[default]
    Memory,
    /// Redis-backed counters shared across instances
    Redis(RedisConfig),
}

/// Requests allowed per window
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThrottleLimits {
    /// Maximum synthesis requests per minute
    #[serde(default = "default_per_minute")]
    pub per_minute: u32,
    /// Maximum synthesis requests per day
    #[serde(default = "default_per_day")]
    pub per_day: u32,
}

impl Default for ThrottleLimits {
    fn default() -> Self {
        Self {
            per_minute: default_per_minute(),
            per_day: default_per_day(),
        }
    }
}

/// Redis connection settings shared by throttle, flags, and cache
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RedisConfig {
    /// Connection URL
    pub url: Url,
    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
}

fn default_per_minute() -> u32 {
    10
}
fn default_per_day() -> u32 {
    50
}
fn default_connect_timeout() -> u64 {
    5
}
