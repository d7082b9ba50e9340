//! Token-bucket rate limiting per connection (§4.7).

use common::Ts;

#[derive(Debug, Clone, Copy)]
pub struct TokenBucket {
    capacity: f64,
    tokens: f64,
    refill_per_sec: f64,
    last_refill: Ts,
}

impl TokenBucket {
    #[must_use]
    pub fn new(capacity: f64, refill_per_sec: f64, now: Ts) -> Self {
        Self {
            capacity,
            tokens: capacity,
            refill_per_sec,
            last_refill: now,
        }
    }

    fn refill(&mut self, now: Ts) {
        let elapsed_secs = self.last_refill.age_ms(now) as f64 / 1_000.0;
        self.tokens = (self.tokens + elapsed_secs * self.refill_per_sec).min(self.capacity);
        self.last_refill = now;
    }

    /// Attempts to take one token; returns `true` if one was available.
    pub fn try_acquire(&mut self, now: Ts) -> bool {
        self.refill(now);
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Milliseconds the caller should wait before a token becomes
    /// available, for callers that want to wait rather than fail fast.
    #[must_use]
    pub fn wait_ms(&self, now: Ts) -> u64 {
        let elapsed_secs = self.last_refill.age_ms(now) as f64 / 1_000.0;
        let projected = (self.tokens + elapsed_secs * self.refill_per_sec).min(self.capacity);
        if projected >= 1.0 {
            0
        } else {
            let deficit = 1.0 - projected;
            ((deficit / self.refill_per_sec.max(1e-9)) * 1_000.0).ceil() as u64
        }
    }
}
