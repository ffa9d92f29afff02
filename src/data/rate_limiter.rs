use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

use crate::config::BINANCE;

/// Paces kline requests: a per-minute weight budget plus a fixed pause
/// between consecutive requests.
#[derive(Clone)]
pub struct RequestThrottle {
    inner: Arc<Mutex<InnerThrottle>>,
}

struct InnerThrottle {
    used_weight: u32,
    // We track the specific minute we are currently counting for
    // e.g. 28,500,123 minutes since Epoch
    current_minute_idx: u64,
    limit: u32,
    min_gap: Duration,
    last_request: Option<Instant>,
}

impl Default for RequestThrottle {
    fn default() -> Self {
        Self::new(
            BINANCE.limits.weight_limit_minute,
            Duration::from_millis(BINANCE.limits.batch_pause_ms),
        )
    }
}

impl RequestThrottle {
    pub fn new(limit: u32, min_gap: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(InnerThrottle {
                used_weight: 0,
                current_minute_idx: Self::get_current_minute_idx(),
                limit,
                min_gap,
                last_request: None,
            })),
        }
    }

    /// No pause, effectively unlimited weight. For fakes and tests.
    pub fn unthrottled() -> Self {
        Self::new(u32::MAX, Duration::ZERO)
    }

    /// Acquires permission to use `cost` weight, sleeping out the gap since
    /// the previous request first.
    pub async fn acquire(&self, cost: u32, _context: &str) {
        loop {
            let (wait_duration, _stats) = {
                let mut guard = self.inner.lock().await;

                // 1. Fixed pause since the last request
                let min_gap = guard.min_gap;
                let gap_wait = guard
                    .last_request
                    .map(|last| last.elapsed())
                    .filter(|since| *since < min_gap)
                    .map(|since| min_gap - since);

                // 2. Weight budget for the current minute
                let wait = match gap_wait {
                    Some(wait) => wait,
                    None => match Self::try_take(&mut guard, cost) {
                        None => return,
                        Some(wait) => wait,
                    },
                };

                (wait, (guard.used_weight, guard.limit))
            };

            #[cfg(debug_assertions)]
            if wait_duration > Duration::from_secs(1) {
                log::warn!(
                    "🛑 Rate Limit Saturated for [{}]. Used: {}/{}. Waiting {:.1}s (until :00)...",
                    _context,
                    _stats.0,
                    _stats.1,
                    wait_duration.as_secs_f64()
                );
            }

            tokio::time::sleep(wait_duration).await;
        }
    }

    /// `None` on success, otherwise how long to wait for the next minute.
    fn try_take(guard: &mut InnerThrottle, cost: u32) -> Option<Duration> {
        let now_idx = Self::get_current_minute_idx();

        // New minute (wall clock)
        if now_idx > guard.current_minute_idx {
            guard.used_weight = 0;
            guard.current_minute_idx = now_idx;
        }

        if guard.used_weight.saturating_add(cost) <= guard.limit {
            guard.used_weight = guard.used_weight.saturating_add(cost);
            guard.last_request = Some(Instant::now());
            return None;
        }

        let now_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_secs();

        let seconds_into_minute = now_secs % 60;
        let wait_secs = 60 - seconds_into_minute;

        // Add a tiny buffer (100ms) to ensure we land IN the next minute
        Some(Duration::from_secs(wait_secs) + Duration::from_millis(100))
    }

    fn get_current_minute_idx() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_secs()
            / 60
    }
}
