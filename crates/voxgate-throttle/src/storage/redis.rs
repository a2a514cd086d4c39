use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;

use crate::{CounterStore, ThrottleError, WindowCounts};

const MINUTE_SECS: u64 = 60;
const DAY_SECS: u64 = 86_400;

/// Redis-backed fixed-window counters shared across instances
#[derive(Clone)]
pub struct RedisCounters {
    client: redis::Client,
}

impl RedisCounters {
    pub fn new(url: &str) -> Result<Self, ThrottleError> {
        let client = redis::Client::open(url)
            .map_err(|e| ThrottleError::Backend(format!("invalid URL: {e}")))?;

        Ok(Self { client })
    }

    async fn bump(
        conn: &mut redis::aio::MultiplexedConnection,
        key: &str,
        window_secs: u64,
    ) -> Result<u32, ThrottleError> {
        use redis::AsyncCommands;

        let count: u32 = redis::cmd("INCR")
            .arg(key)
            .query_async(conn)
            .await
            .map_err(|e| ThrottleError::Backend(format!("INCR failed: {e}")))?;

        // Set expiry on the first request in the window
        if count == 1 {
            let _: () = conn
                .expire(key, i64::try_from(window_secs).unwrap_or(i64::MAX))
                .await
                .map_err(|e| ThrottleError::Backend(format!("EXPIRE failed: {e}")))?;
        }

        Ok(count)
    }
}

#[async_trait]
impl CounterStore for RedisCounters {
    async fn increment(&self, user: &str) -> Result<WindowCounts, ThrottleError> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| ThrottleError::Backend(format!("connection failed: {e}")))?;

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| ThrottleError::Backend(format!("clock error: {e}")))?
            .as_secs();

        // Window ids in the key make expiry and rollover self-cleaning
        let minute_key = format!("voxgate:throttle:{user}:m:{}", now / MINUTE_SECS);
        let day_key = format!("voxgate:throttle:{user}:d:{}", now / DAY_SECS);

        let minute = Self::bump(&mut conn, &minute_key, MINUTE_SECS).await?;
        let day = Self::bump(&mut conn, &day_key, DAY_SECS).await?;

        Ok(WindowCounts { minute, day })
    }
}
