//! Per-venue aggregate capital state (§3 `VenueCapital`).

use crate::pool::{PoolState, PoolType};
use common::Px;
use serde::{Deserialize, Serialize};

/// Aggregates the three pools plus account-level figures for one venue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueCapital {
    pub equity: Px,
    pub s1: PoolState,
    pub s2: PoolState,
    pub s3: PoolState,
    pub realized_pnl_today: Px,
    pub volume_today: Px,
    pub fees_today: Px,
    pub safe_mode: bool,
    pub last_update: common::Ts,
    /// Peak equity observed today; used to derive drawdown for the
    /// safe-mode trigger.
    pub peak_equity_today: Px,
}

impl VenueCapital {
    #[must_use]
    pub fn new(equity: Px, now: common::Ts) -> Self {
        Self {
            equity,
            s1: PoolState::new(Px::from_ticks(
                (equity.ticks() as f64 * PoolType::S1.default_pct()) as i64,
            )),
            s2: PoolState::new(Px::from_ticks(
                (equity.ticks() as f64 * PoolType::S2.default_pct()) as i64,
            )),
            s3: PoolState::new(Px::from_ticks(
                (equity.ticks() as f64 * PoolType::S3.default_pct()) as i64,
            )),
            realized_pnl_today: Px::ZERO,
            volume_today: Px::ZERO,
            fees_today: Px::ZERO,
            safe_mode: false,
            last_update: now,
            peak_equity_today: equity,
        }
    }

    #[must_use]
    pub const fn pool(&self, pool: PoolType) -> &PoolState {
        match pool {
            PoolType::S1 => &self.s1,
            PoolType::S2 => &self.s2,
            PoolType::S3 => &self.s3,
        }
    }

    pub fn pool_mut(&mut self, pool: PoolType) -> &mut PoolState {
        match pool {
            PoolType::S1 => &mut self.s1,
            PoolType::S2 => &mut self.s2,
            PoolType::S3 => &mut self.s3,
        }
    }

    /// `UpdateEquity`: recompute the three budgets from the new equity,
    /// preserving `used`/`in_flight` on each pool exactly (§4.3).
    pub fn update_equity(&mut self, new_equity: Px, now: common::Ts) {
        self.equity = new_equity;
        if new_equity > self.peak_equity_today {
            self.peak_equity_today = new_equity;
        }
        self.s1
            .rebalance_budget(Px::from_ticks((new_equity.ticks() as f64 * PoolType::S1.default_pct()) as i64));
        self.s2
            .rebalance_budget(Px::from_ticks((new_equity.ticks() as f64 * PoolType::S2.default_pct()) as i64));
        self.s3
            .rebalance_budget(Px::from_ticks((new_equity.ticks() as f64 * PoolType::S3.default_pct()) as i64));
        self.last_update = now;
        self.refresh_safe_mode();
    }

    /// Drawdown-triggered safe mode (§4.8 supplement): once today's
    /// realized loss exceeds the configured fraction of peak equity,
    /// restrict this venue to `{S1, S3}` until a new day resets it.
    fn refresh_safe_mode(&mut self) {
        const DRAWDOWN_LIMIT_PCT: f64 = 0.05;
        if self.peak_equity_today.ticks() <= 0 {
            return;
        }
        let drawdown = (-self.realized_pnl_today.as_f64()) / self.peak_equity_today.as_f64();
        if drawdown > DRAWDOWN_LIMIT_PCT {
            self.safe_mode = true;
        }
    }

    #[must_use]
    pub fn total_in_flight(&self) -> Px {
        Px::from_ticks(self.s1.in_flight.ticks() + self.s2.in_flight.ticks() + self.s3.in_flight.ticks())
    }

    #[must_use]
    pub fn total_used(&self) -> Px {
        Px::from_ticks(self.s1.used.ticks() + self.s2.used.ticks() + self.s3.used.ticks())
    }

    #[must_use]
    pub fn utilization_pct(&self) -> f64 {
        if self.equity.ticks() <= 0 {
            return 0.0;
        }
        (self.total_used().ticks() + self.total_in_flight().ticks()) as f64 / self.equity.as_f64()
            / 10_000.0
            * 100.0
    }

    /// Pools this venue allows reservations against, given its current
    /// safe-mode state (§4.3 per-venue caps).
    #[must_use]
    pub fn allowed_pools(&self) -> &'static [PoolType] {
        if self.safe_mode {
            &[PoolType::S1, PoolType::S3]
        } else {
            &[PoolType::S1, PoolType::S2, PoolType::S3]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Ts;

    #[test]
    fn new_venue_splits_equity_seventy_twenty_ten() {
        let v = VenueCapital::new(Px::from_f64(10_000.0), Ts::from_millis(0));
        assert_eq!(v.s1.budget, Px::from_f64(7_000.0));
        assert_eq!(v.s2.budget, Px::from_f64(2_000.0));
        assert_eq!(v.s3.budget, Px::from_f64(1_000.0));
    }

    #[test]
    fn update_equity_preserves_used_and_in_flight() {
        let mut v = VenueCapital::new(Px::from_f64(10_000.0), Ts::from_millis(0));
        v.s2.soft_lock(Px::from_f64(500.0));
        v.update_equity(Px::from_f64(20_000.0), Ts::from_millis(1));
        assert_eq!(v.s2.in_flight, Px::from_f64(500.0));
        assert_eq!(v.s2.budget, Px::from_f64(4_000.0));
    }

    #[test]
    fn large_drawdown_triggers_safe_mode() {
        let mut v = VenueCapital::new(Px::from_f64(10_000.0), Ts::from_millis(0));
        v.realized_pnl_today = Px::from_f64(-600.0); // 6% of equity
        v.update_equity(v.equity, Ts::from_millis(1));
        assert!(v.safe_mode);
    }

    #[test]
    fn safe_mode_restricts_allowed_pools_to_s1_s3() {
        let mut v = VenueCapital::new(Px::from_f64(10_000.0), Ts::from_millis(0));
        v.safe_mode = true;
        assert_eq!(v.allowed_pools(), &[PoolType::S1, PoolType::S3]);
    }
}
