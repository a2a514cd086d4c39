//! Per-user synthesis throttling
//!
//! Counters live in an external atomic counting store (memory for a
//! single instance, Redis when multiple gateway instances share state).
//! The guard never throws for a throttled user; it returns an explicit
//! result the orchestrator consumes to skip synthesis.

#![allow(clippy::missing_errors_doc, clippy::must_use_candidate)]

pub mod storage;

use async_trait::async_trait;
use thiserror::Error;
use voxgate_config::{CounterStorage, ThrottleConfig, ThrottleLimits};

use storage::{memory::MemoryCounters, redis::RedisCounters};

/// Throttle errors
#[derive(Debug, Error)]
pub enum ThrottleError {
    /// Counter store connection or command failure
    #[error("counter store: {0}")]
    Backend(String),
    /// Invalid throttle configuration
    #[error("throttle config: {0}")]
    Config(String),
}

/// Outcome of a throttle check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrottleResult {
    pub allowed: bool,
    pub reason: Option<String>,
    pub current_minute: Option<u32>,
    pub current_day: Option<u32>,
}

impl ThrottleResult {
    fn allowed(minute: u32, day: u32) -> Self {
        Self {
            allowed: true,
            reason: None,
            current_minute: Some(minute),
            current_day: Some(day),
        }
    }

    const fn anonymous() -> Self {
        Self {
            allowed: true,
            reason: None,
            current_minute: None,
            current_day: None,
        }
    }
}

/// Current fixed-window counters after an increment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowCounts {
    pub minute: u32,
    pub day: u32,
}

/// Atomic increment-and-read counter storage
///
/// Multiple orchestrator instances may run concurrently, so the store
/// must mutate counters atomically; in-process locking is not enough
/// for the Redis-backed deployment.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Bump and return this user's minute and day counters
    async fn increment(&self, user: &str) -> Result<WindowCounts, ThrottleError>;
}

enum Counters {
    Memory(MemoryCounters),
    Redis(RedisCounters),
}

/// Per-user throttle guard
pub struct ThrottleGuard {
    counters: Counters,
    config: ThrottleConfig,
}

impl ThrottleGuard {
    /// Create from configuration
    pub fn new(config: ThrottleConfig) -> Result<Self, ThrottleError> {
        let counters = match &config.storage {
            CounterStorage::Memory => Counters::Memory(MemoryCounters::new()),
            CounterStorage::Redis(redis_config) => {
                Counters::Redis(RedisCounters::new(redis_config.url.as_str())?)
            }
        };

        Ok(Self { counters, config })
    }

    /// Check whether this caller may issue another synthesis request
    ///
    /// Anonymous callers are always allowed. Authenticated callers get
    /// their tier's limits, or the defaults when no tier entry exists.
    /// The request that lands exactly on the limit is still allowed.
    pub async fn check(&self, user: Option<&str>, tier: Option<&str>) -> Result<ThrottleResult, ThrottleError> {
        let Some(user) = user else {
            return Ok(ThrottleResult::anonymous());
        };

        let counts = match &self.counters {
            Counters::Memory(store) => store.increment(user).await?,
            Counters::Redis(store) => store.increment(user).await?,
        };

        let limits = self.limits_for(tier);

        if counts.minute > limits.per_minute {
            tracing::debug!(user, minute = counts.minute, limit = limits.per_minute, "per-minute throttle hit");
            return Ok(ThrottleResult {
                allowed: false,
                reason: Some(format!(
                    "Exceeded per-minute limit: {}/{}",
                    counts.minute, limits.per_minute
                )),
                current_minute: Some(counts.minute),
                current_day: Some(counts.day),
            });
        }

        if counts.day > limits.per_day {
            tracing::debug!(user, day = counts.day, limit = limits.per_day, "per-day throttle hit");
            return Ok(ThrottleResult {
                allowed: false,
                reason: Some(format!("Exceeded per-day limit: {}/{}", counts.day, limits.per_day)),
                current_minute: Some(counts.minute),
                current_day: Some(counts.day),
            });
        }

        Ok(ThrottleResult::allowed(counts.minute, counts.day))
    }

    fn limits_for(&self, tier: Option<&str>) -> ThrottleLimits {
        tier.and_then(|name| self.config.tiers.get(name))
            .copied()
            .unwrap_or(self.config.default)
    }
}
