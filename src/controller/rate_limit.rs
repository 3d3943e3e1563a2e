//! Poll rate limiting.

use std::time::Duration;

use tokio::time::{self, Instant};

/// Longest single sleep in `acquire`; longer waits are taken in steps.
const MAX_WAIT: Duration = Duration::from_secs(3600);

/// A token bucket gating controller cycles.
///
/// Single owner: the controller loop is sequential, so no lock is needed.
#[derive(Debug)]
pub struct RateLimiter {
    tokens: f64,
    capacity: f64,
    refill_rate: f64,
    last_update: Instant,
}

impl RateLimiter {
    /// `qps` tokens per second, holding at most `burst`. Starts full.
    pub fn new(qps: f64, burst: u32) -> Self {
        let capacity = f64::from(burst.max(1));
        Self {
            tokens: capacity,
            capacity,
            refill_rate: qps,
            last_update: Instant::now(),
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.capacity);
        self.last_update = now;
    }

    /// Take a token if one is available.
    pub fn try_acquire(&mut self) -> bool {
        self.refill();
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Time until the next token is available, capped at one hour.
    pub fn next_available(&mut self) -> Duration {
        self.refill();
        if self.tokens >= 1.0 {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64((1.0 - self.tokens) / self.refill_rate)
            .map_or(MAX_WAIT, |wait| wait.min(MAX_WAIT))
    }

    /// Wait until a token is available and take it.
    pub async fn acquire(&mut self) {
        loop {
            if self.try_acquire() {
                return;
            }
            time::sleep(self.next_available()).await;
        }
    }
}
