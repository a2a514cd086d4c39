use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::{CounterStore, ThrottleError, WindowCounts};

const MINUTE_SECS: u64 = 60;
const DAY_SECS: u64 = 86_400;

/// In-process fixed-window counters (single instance only)
#[derive(Debug, Default)]
pub struct MemoryCounters {
    /// User -> (window id, count) per dimension
    minutes: DashMap<String, (u64, u32)>,
    days: DashMap<String, (u64, u32)>,
}

impl MemoryCounters {
    pub fn new() -> Self {
        Self::default()
    }

    fn bump(map: &DashMap<String, (u64, u32)>, user: &str, window: u64) -> u32 {
        let mut entry = map.entry(user.to_owned()).or_insert((window, 0));
        let (stored_window, count) = *entry;

        // A new window resets the counter
        let next = if stored_window == window { count + 1 } else { 1 };
        *entry = (window, next);
        next
    }
}

#[async_trait]
impl CounterStore for MemoryCounters {
    async fn increment(&self, user: &str) -> Result<WindowCounts, ThrottleError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| ThrottleError::Backend(format!("clock error: {e}")))?
            .as_secs();

        let minute = Self::bump(&self.minutes, user, now / MINUTE_SECS);
        let day = Self::bump(&self.days, user, now / DAY_SECS);

        Ok(WindowCounts { minute, day })
    }
}
