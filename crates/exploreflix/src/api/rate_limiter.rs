//! Rate limiter implementation using token bucket algorithm.
//!
//! One limiter is shared by every call to a provider, so concurrent fan-out
//! branches draw from the same budget.

use tokio::sync::Mutex;
use tokio::time::{sleep, Duration, Instant};

/// Token bucket: up to `capacity` requests in a burst, refilled at
/// `refill_per_second`
#[derive(Debug)]
pub struct RateLimiter {
    /// Maximum tokens held
    capacity: f64,
    /// Tokens added per second (non-positive disables limiting)
    refill_per_second: f64,
    /// Current bucket contents
    bucket: Mutex<Bucket>,
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

impl Bucket {
    fn refill(&mut self, capacity: f64, refill_per_second: f64) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * refill_per_second).min(capacity);
        self.last_refill = now;
    }
}

/// Time until the bucket holds a whole token; too long to represent means
/// `Duration::MAX`
fn token_wait(tokens: f64, refill_per_second: f64) -> Duration {
    Duration::try_from_secs_f64((1.0 - tokens) / refill_per_second).unwrap_or(Duration::MAX)
}

impl RateLimiter {
    /// Create a new rate limiter with a full bucket
    pub fn new(capacity: u32, refill_per_second: f64) -> Self {
        let capacity = f64::from(capacity.max(1));
        Self {
            capacity,
            refill_per_second,
            bucket: Mutex::new(Bucket {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
        }
    }

    fn is_limited(&self) -> bool {
        self.refill_per_second.is_finite() && self.refill_per_second > 0.0
    }

    /// Wait until a token is available, then spend it
    pub async fn acquire(&self) {
        if !self.is_limited() {
            return;
        }

        // Waiters queue on the lock, so tokens are handed out in arrival order
        let mut bucket = self.bucket.lock().await;
        bucket.refill(self.capacity, self.refill_per_second);

        if bucket.tokens < 1.0 {
            let wait_time = token_wait(bucket.tokens, self.refill_per_second);
            tracing::debug!(
                wait_ms = wait_time.as_millis() as u64,
                "Rate limit: waiting for token"
            );
            sleep(wait_time).await;
            bucket.refill(self.capacity, self.refill_per_second);
        }

        bucket.tokens = (bucket.tokens - 1.0).max(0.0);
    }

    /// Tokens currently available (rounded down)
    pub async fn available(&self) -> u32 {
        if !self.is_limited() {
            return u32::MAX;
        }
        let mut bucket = self.bucket.lock().await;
        bucket.refill(self.capacity, self.refill_per_second);
        bucket.tokens.floor() as u32
    }
}
