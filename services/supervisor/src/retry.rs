//! Exponential backoff delay computation for retried requests (§4.7).
//! The actual retry loop (including the retryable-error predicate) lives
//! with the caller, which owns the async runtime and the error type.

#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 5_000,
        }
    }
}

/// Delay before the given attempt (1-indexed), capped at `max_delay_ms`.
#[must_use]
pub fn backoff_delay_ms(config: &RetryConfig, attempt: u32) -> u64 {
    let shift = attempt.saturating_sub(1).min(20);
    let delay = config.base_delay_ms.saturating_mul(1_u64 << shift);
    delay.min(config.max_delay_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_exponentially_and_caps() {
        let cfg = RetryConfig {
            max_attempts: 5,
            base_delay_ms: 100,
            max_delay_ms: 1_000,
        };
        assert_eq!(backoff_delay_ms(&cfg, 1), 100);
        assert_eq!(backoff_delay_ms(&cfg, 2), 200);
        assert_eq!(backoff_delay_ms(&cfg, 3), 400);
        assert_eq!(backoff_delay_ms(&cfg, 10), 1_000);
    }
}
