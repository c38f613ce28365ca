//! Token bucket pacing for outbound embedding calls.
//!
//! A `Pacer` with capacity one spaces consecutive `acquire` calls at least
//! `interval` apart. The first call never waits. Time comes from
//! `tokio::time`, so paused-clock tests run instantly.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

/// Slack for float rounding after a computed sleep.
const TOKEN_EPSILON: f64 = 1e-9;

#[derive(Clone)]
pub struct Pacer {
    state: Arc<Mutex<BucketState>>,
    capacity: f64,
    /// Tokens added per second; `None` disables pacing.
    refill_rate: Option<f64>,
}

struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

impl Pacer {
    /// Pacer admitting one call per `interval`. A zero interval never waits.
    pub fn new(interval: Duration) -> Self {
        let refill_rate = (!interval.is_zero()).then(|| 1.0 / interval.as_secs_f64());
        Self {
            state: Arc::new(Mutex::new(BucketState {
                tokens: 1.0,
                last_refill: Instant::now(),
            })),
            capacity: 1.0,
            refill_rate,
        }
    }

    pub fn from_millis(interval_ms: u64) -> Self {
        Self::new(Duration::from_millis(interval_ms))
    }

    /// A pacer that never waits.
    pub fn unpaced() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn is_unpaced(&self) -> bool {
        self.refill_rate.is_none()
    }

    /// Empty the bucket so the next `acquire` waits a full interval from now.
    pub async fn restart(&self) {
        let mut state = self.state.lock().await;
        state.tokens = 0.0;
        state.last_refill = Instant::now();
    }

    /// Take one token, sleeping until one is available.
    pub async fn acquire(&self) {
        let Some(refill_rate) = self.refill_rate else {
            return;
        };

        loop {
            let wait = {
                let mut state = self.state.lock().await;
                let now = Instant::now();
                let elapsed = now.duration_since(state.last_refill).as_secs_f64();
                state.tokens = (state.tokens + elapsed * refill_rate).min(self.capacity);
                state.last_refill = now;

                if state.tokens + TOKEN_EPSILON >= 1.0 {
                    state.tokens = (state.tokens - 1.0).max(0.0);
                    return;
                }

                Duration::from_secs_f64((1.0 - state.tokens) / refill_rate)
            };

            sleep(wait).await;
        }
    }
}

impl std::fmt::Debug for Pacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pacer")
            .field("refill_rate", &self.refill_rate)
            .finish_non_exhaustive()
    }
}
