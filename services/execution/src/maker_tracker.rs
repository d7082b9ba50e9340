//! Maker fill-rate tracking and pair degradation (§4.6 "Maker statistics
//! update"). Ported from the original bot's `maker_tracker.py`: a rolling
//! window of (filled, fallback) samples per venue pair drives an
//! auto-degrade / cooldown / self-recover cycle.

use crate::config::ExecutionConfig;
use common::{Ts, Venue};
use dashmap::DashMap;
use std::collections::VecDeque;
use tracing::{info, warn};

/// Normalized, order-independent venue pair key (sorted by id, matching
/// the original's `sorted([exchange1, exchange2])`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pair(Venue, Venue);

impl Pair {
    #[must_use]
    pub fn new(a: Venue, b: Venue) -> Self {
        if a.id() <= b.id() { Self(a, b) } else { Self(b, a) }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MakerStats {
    pub total_attempts: u64,
    pub successful_fills: u64,
    pub timeout_count: u64,
    pub fallback_count: u64,
    pub last_update: Option<Ts>,
}

impl MakerStats {
    #[must_use]
    pub fn fill_rate(&self) -> f64 {
        if self.total_attempts == 0 {
            1.0
        } else {
            self.successful_fills as f64 / self.total_attempts as f64
        }
    }

    #[must_use]
    pub fn fallback_rate(&self) -> f64 {
        if self.total_attempts == 0 {
            0.0
        } else {
            self.fallback_count as f64 / self.total_attempts as f64
        }
    }
}

#[derive(Debug, Clone)]
pub struct DegradationState {
    pub degraded_at: Ts,
    pub cooldown_sec: i64,
    pub reason: String,
}

impl DegradationState {
    #[must_use]
    pub fn in_cooldown(&self, now: Ts) -> bool {
        let elapsed_sec = now.as_millis().saturating_sub(self.degraded_at.as_millis()) / 1000;
        (elapsed_sec as i64) < self.cooldown_sec
    }
}

struct PairState {
    stats: MakerStats,
    recent: VecDeque<(bool, bool)>,
    degradation: Option<DegradationState>,
}

/// Tracks per-pair Maker performance and auto-degrades a pair to
/// `SAFE_TAKER_ONLY` when fill quality drops (§4.6).
pub struct MakerTracker {
    config: ExecutionConfig,
    pairs: DashMap<Pair, PairState>,
}

impl MakerTracker {
    #[must_use]
    pub fn new(config: ExecutionConfig) -> Self {
        Self {
            config,
            pairs: DashMap::new(),
        }
    }

    /// Records one Maker attempt outcome and re-evaluates degradation for
    /// the pair (§5 ordering guarantee 5: serialized per pair).
    pub fn record_attempt(&self, pair: Pair, filled: bool, timed_out: bool, fallback: bool, now: Ts) {
        let mut entry = self.pairs.entry(pair).or_insert_with(|| PairState {
            stats: MakerStats::default(),
            recent: VecDeque::with_capacity(self.config.window_size),
            degradation: None,
        });

        entry.stats.total_attempts += 1;
        if filled {
            entry.stats.successful_fills += 1;
        }
        if timed_out {
            entry.stats.timeout_count += 1;
        }
        if fallback {
            entry.stats.fallback_count += 1;
        }
        entry.stats.last_update = Some(now);

        if entry.recent.len() == self.config.window_size {
            entry.recent.pop_front();
        }
        entry.recent.push_back((filled, fallback));

        self.check_degradation(&mut entry, pair, now);
    }

    fn check_degradation(&self, entry: &mut PairState, pair: Pair, now: Ts) {
        if let Some(state) = &entry.degradation {
            if state.in_cooldown(now) {
                return;
            }
        }

        let min_samples = (self.config.window_size / 2).min(10);
        if entry.recent.len() < min_samples {
            return;
        }

        let filled_count = entry.recent.iter().filter(|(f, _)| *f).count();
        let fallback_count = entry.recent.iter().filter(|(_, fb)| *fb).count();
        let fill_rate = filled_count as f64 / entry.recent.len() as f64;
        let fallback_rate = fallback_count as f64 / entry.recent.len() as f64;

        let mut reasons = Vec::new();
        if fill_rate < self.config.min_fill_rate {
            reasons.push(format!("fill rate {fill_rate:.2} < {:.2}", self.config.min_fill_rate));
        }
        if fallback_rate > self.config.max_fallback_rate {
            reasons.push(format!(
                "fallback rate {fallback_rate:.2} > {:.2}",
                self.config.max_fallback_rate
            ));
        }

        if !reasons.is_empty() {
            warn!(pair = ?pair, reason = %reasons.join(", "), "maker pair degraded");
            entry.degradation = Some(DegradationState {
                degraded_at: now,
                cooldown_sec: self.config.cooldown_sec,
                reason: reasons.join(", "),
            });
        } else if let Some(state) = &entry.degradation {
            if !state.in_cooldown(now) {
                info!(pair = ?pair, "maker pair recovered");
                entry.degradation = None;
            }
        }
    }

    /// Whether the pair is currently degraded (forces `SAFE_TAKER_ONLY`).
    #[must_use]
    pub fn is_degraded(&self, pair: Pair, now: Ts) -> bool {
        self.pairs
            .get(&pair)
            .and_then(|e| e.degradation.clone().map(|d| d.in_cooldown(now)))
            .unwrap_or(false)
    }

    #[must_use]
    pub fn stats(&self, pair: Pair) -> Option<MakerStats> {
        self.pairs.get(&pair).map(|e| e.stats)
    }

    pub fn force_degrade(&self, pair: Pair, reason: String, now: Ts) {
        self.pairs.entry(pair).or_insert_with(|| PairState {
            stats: MakerStats::default(),
            recent: VecDeque::with_capacity(self.config.window_size),
            degradation: None,
        });
        if let Some(mut entry) = self.pairs.get_mut(&pair) {
            entry.degradation = Some(DegradationState {
                degraded_at: now,
                cooldown_sec: self.config.cooldown_sec,
                reason,
            });
        }
    }

    pub fn force_recover(&self, pair: Pair) {
        if let Some(mut entry) = self.pairs.get_mut(&pair) {
            entry.degradation = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> ExecutionConfig {
        ExecutionConfig {
            window_size: 10,
            min_fill_rate: 0.5,
            max_fallback_rate: 0.3,
            cooldown_sec: 300,
            ..ExecutionConfig::default()
        }
    }

    #[test]
    fn pair_normalizes_regardless_of_order() {
        let a = Venue::new(1);
        let b = Venue::new(2);
        assert_eq!(Pair::new(a, b), Pair::new(b, a));
    }

    #[test]
    fn low_fill_rate_triggers_degradation() {
        let tracker = MakerTracker::new(cfg());
        let pair = Pair::new(Venue::new(1), Venue::new(2));
        for i in 0..6 {
            tracker.record_attempt(pair, false, true, true, Ts::from_millis(i * 1000));
        }
        assert!(tracker.is_degraded(pair, Ts::from_millis(6000)));
    }

    #[test]
    fn healthy_pair_is_not_degraded() {
        let tracker = MakerTracker::new(cfg());
        let pair = Pair::new(Venue::new(1), Venue::new(2));
        for i in 0..6 {
            tracker.record_attempt(pair, true, false, false, Ts::from_millis(i * 1000));
        }
        assert!(!tracker.is_degraded(pair, Ts::from_millis(6000)));
    }

    #[test]
    fn degradation_persists_through_cooldown_then_recovers() {
        let tracker = MakerTracker::new(cfg());
        let pair = Pair::new(Venue::new(1), Venue::new(2));
        for i in 0..6 {
            tracker.record_attempt(pair, false, true, true, Ts::from_millis(i * 1000));
        }
        assert!(tracker.is_degraded(pair, Ts::from_millis(6000)));
        // still in cooldown shortly after
        assert!(tracker.is_degraded(pair, Ts::from_millis(10_000)));
        // a healthy sample after cooldown elapses clears degradation
        tracker.record_attempt(pair, true, false, false, Ts::from_millis(310_000));
        assert!(!tracker.is_degraded(pair, Ts::from_millis(310_000)));
    }

    #[test]
    fn below_min_samples_never_degrades() {
        let tracker = MakerTracker::new(cfg());
        let pair = Pair::new(Venue::new(1), Venue::new(2));
        for i in 0..3 {
            tracker.record_attempt(pair, false, true, true, Ts::from_millis(i * 1000));
        }
        assert!(!tracker.is_degraded(pair, Ts::from_millis(3000)));
    }
}
