//! C3 Capital Coordinator: `UpdateEquity`, `CanReserve`, `Reserve`, `Release`.

use crate::error::ReserveError;
use crate::pool::PoolType;
use crate::venue::VenueCapital;
use common::{Job, Leg, Px, StrategyType, Ts, Venue};
use dashmap::DashMap;

impl From<StrategyType> for PoolType {
    fn from(strategy: StrategyType) -> Self {
        match strategy {
            StrategyType::Wash | StrategyType::HedgeRebalance => Self::S1,
            StrategyType::Arbitrage => Self::S2,
        }
    }
}

/// Default per-venue caps (§4.3), all configurable.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct CapitalConfig {
    pub max_single_pct: f64,
    pub max_total_pct: f64,
}

impl Default for CapitalConfig {
    fn default() -> Self {
        Self {
            max_single_pct: 0.10,
            max_total_pct: 0.30,
        }
    }
}

/// A live soft-lock, returned by `Reserve`. Carries everything `Release`
/// needs to reverse or commit the lock without re-deriving it from the job.
#[derive(Debug, Clone)]
pub struct Reservation {
    pub job_strategy: StrategyType,
    pub pool: PoolType,
    pub legs: Vec<(Venue, Px)>,
}

/// Outcome passed to `Release`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    Filled,
    Failed,
}

/// Per-leg notional split: equal qty legs get the job's full notional
/// (matches spec.md's single-notional-per-job examples); unequal legs split
/// proportionally to quantity.
fn leg_notional(job: &Job, leg: &Leg) -> Px {
    if job.legs.len() == 1 {
        return job.notional;
    }
    let total_qty: i64 = job.legs.iter().map(|l| l.qty.raw()).sum();
    if total_qty == 0 {
        return Px::ZERO;
    }
    Px::from_ticks((job.notional.ticks() * leg.qty.raw()) / total_qty)
}

/// Coordinates per-venue capital across all registered venues.
pub struct CapitalCoordinator {
    venues: DashMap<Venue, VenueCapital>,
    config: CapitalConfig,
}

impl CapitalCoordinator {
    #[must_use]
    pub fn new(config: CapitalConfig) -> Self {
        Self {
            venues: DashMap::new(),
            config,
        }
    }

    pub fn register_venue(&self, venue: Venue, equity: Px, now: Ts) {
        self.venues.insert(venue, VenueCapital::new(equity, now));
    }

    pub fn deregister_venue(&self, venue: Venue) {
        self.venues.remove(&venue);
    }

    /// `UpdateEquity(venue, equity)`.
    pub fn update_equity(&self, venue: Venue, equity: Px, now: Ts) -> Result<(), ReserveError> {
        let mut entry = self
            .venues
            .get_mut(&venue)
            .ok_or(ReserveError::NoVenueCapital(venue))?;
        entry.update_equity(equity, now);
        Ok(())
    }

    #[must_use]
    pub fn venue_capital(&self, venue: Venue) -> Option<VenueCapital> {
        self.venues.get(&venue).map(|v| v.clone())
    }

    /// Snapshot of every registered venue, for the operator `/state`
    /// surface.
    #[must_use]
    pub fn all_venues(&self) -> Vec<(Venue, VenueCapital)> {
        self.venues.iter().map(|e| (*e.key(), e.value().clone())).collect()
    }

    /// `CanReserve(job) → (ok, reason)`: pure check against current pool and
    /// hard caps, without mutating any state.
    pub fn can_reserve(&self, job: &Job) -> Result<(), ReserveError> {
        let pool = PoolType::from(job.strategy);
        for leg in &job.legs {
            self.check_leg(leg, job, pool)?;
        }
        Ok(())
    }

    fn check_leg(&self, leg: &Leg, job: &Job, pool: PoolType) -> Result<(), ReserveError> {
        let venue_cap = self
            .venues
            .get(&leg.venue)
            .ok_or(ReserveError::NoVenueCapital(leg.venue))?;
        if !venue_cap.allowed_pools().contains(&pool) {
            return Err(ReserveError::PoolBlockedBySafeMode(leg.venue));
        }
        let pool_state = venue_cap.pool(pool);
        let amount = leg_notional(job, leg);

        let single_cap = Px::from_ticks((pool_state.budget.ticks() as f64 * self.config.max_single_pct) as i64);
        if amount > single_cap {
            return Err(ReserveError::SingleCapExceeded(leg.venue));
        }
        if amount > pool_state.available() {
            return Err(ReserveError::PoolExhausted(leg.venue));
        }
        let total_cap = Px::from_ticks((venue_cap.equity.ticks() as f64 * self.config.max_total_pct) as i64);
        let projected_total_in_flight = Px::from_ticks(venue_cap.total_in_flight().ticks() + amount.ticks());
        if projected_total_in_flight > total_cap {
            return Err(ReserveError::TotalInflightExceeded(leg.venue));
        }
        Ok(())
    }

    /// `Reserve(job) → Reservation`: atomically soft-locks every leg. If any
    /// venue fails its check, every lock acquired earlier in this call is
    /// rolled back before returning the error (§4.3).
    pub fn reserve(&self, job: &Job) -> Result<Reservation, ReserveError> {
        let pool = PoolType::from(job.strategy);
        let mut locked: Vec<(Venue, Px)> = Vec::with_capacity(job.legs.len());

        for leg in &job.legs {
            if let Err(e) = self.check_leg(leg, job, pool) {
                self.rollback(&locked, pool);
                return Err(e);
            }
            let amount = leg_notional(job, leg);
            // Recheck-and-lock must happen under the same per-venue entry
            // lookup to avoid a TOCTOU race against a concurrent Reserve on
            // the same venue.
            let mut venue_cap = match self.venues.get_mut(&leg.venue) {
                Some(v) => v,
                None => {
                    self.rollback(&locked, pool);
                    return Err(ReserveError::NoVenueCapital(leg.venue));
                }
            };
            if !venue_cap.allowed_pools().contains(&pool) {
                drop(venue_cap);
                self.rollback(&locked, pool);
                return Err(ReserveError::PoolBlockedBySafeMode(leg.venue));
            }
            let single_cap = Px::from_ticks((venue_cap.pool(pool).budget.ticks() as f64 * self.config.max_single_pct) as i64);
            if amount > single_cap {
                drop(venue_cap);
                self.rollback(&locked, pool);
                return Err(ReserveError::SingleCapExceeded(leg.venue));
            }
            if amount > venue_cap.pool(pool).available() {
                drop(venue_cap);
                self.rollback(&locked, pool);
                return Err(ReserveError::PoolExhausted(leg.venue));
            }
            let total_cap = Px::from_ticks((venue_cap.equity.ticks() as f64 * self.config.max_total_pct) as i64);
            let projected_total_in_flight = Px::from_ticks(venue_cap.total_in_flight().ticks() + amount.ticks());
            if projected_total_in_flight > total_cap {
                drop(venue_cap);
                self.rollback(&locked, pool);
                return Err(ReserveError::TotalInflightExceeded(leg.venue));
            }
            venue_cap.pool_mut(pool).soft_lock(amount);
            locked.push((leg.venue, amount));
        }

        Ok(Reservation {
            job_strategy: job.strategy,
            pool,
            legs: locked,
        })
    }

    fn rollback(&self, locked: &[(Venue, Px)], pool: PoolType) {
        for (venue, amount) in locked {
            if let Some(mut venue_cap) = self.venues.get_mut(venue) {
                venue_cap.pool_mut(pool).release_failed(*amount);
            }
        }
    }

    /// `Release(reservation, outcome)`.
    pub fn release(&self, reservation: &Reservation, outcome: ReleaseOutcome, realized_pnl: Px, fee: Px, now: Ts) {
        for (venue, amount) in &reservation.legs {
            if let Some(mut venue_cap) = self.venues.get_mut(venue) {
                match outcome {
                    ReleaseOutcome::Filled => {
                        venue_cap.pool_mut(reservation.pool).release_filled(*amount);
                        venue_cap.volume_today = venue_cap.volume_today.add(*amount);
                        venue_cap.realized_pnl_today = venue_cap.realized_pnl_today.add(realized_pnl);
                        venue_cap.fees_today = venue_cap.fees_today.add(fee);
                    }
                    ReleaseOutcome::Failed => {
                        venue_cap.pool_mut(reservation.pool).release_failed(*amount);
                    }
                }
                venue_cap.last_update = now;
                let equity = venue_cap.equity;
                venue_cap.update_equity(equity, now);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{JobId, Qty, Side, Symbol};

    fn arb_job(venue_a: u16, venue_b: u16, notional: f64) -> Job {
        Job {
            id: JobId(1),
            strategy: StrategyType::Arbitrage,
            symbol: Symbol::new(1),
            legs: vec![
                Leg {
                    venue: Venue::new(venue_a),
                    side: Side::Buy,
                    qty: Qty::from_f64(notional / 50_000.0),
                },
                Leg {
                    venue: Venue::new(venue_b),
                    side: Side::Sell,
                    qty: Qty::from_f64(notional / 50_000.0),
                },
            ],
            notional: Px::from_f64(notional),
            expected_edge_bps: 11,
            expected_pnl: Px::ZERO,
            risk_score: 0,
            latency_score: 0,
            volume_score: 0,
            funding_score: 0,
            liquidity_score: 0,
            source: "test".to_string(),
            submit_ts: Ts::from_millis(0),
        }
    }

    #[test]
    fn reserve_happy_path_locks_s2_on_both_venues() {
        let coord = CapitalCoordinator::new(CapitalConfig::default());
        coord.register_venue(Venue::new(1), Px::from_f64(10_000.0), Ts::from_millis(0));
        coord.register_venue(Venue::new(2), Px::from_f64(10_000.0), Ts::from_millis(0));
        let job = arb_job(1, 2, 1_000.0);
        let reservation = coord.reserve(&job).expect("should reserve");
        let v1 = coord.venue_capital(Venue::new(1)).unwrap();
        assert_eq!(v1.s2.in_flight, Px::from_f64(1_000.0));
        assert_eq!(reservation.legs.len(), 2);
    }

    #[test]
    fn single_cap_exceeded_rejects_oversized_reservation() {
        let coord = CapitalCoordinator::new(CapitalConfig::default());
        coord.register_venue(Venue::new(1), Px::from_f64(10_000.0), Ts::from_millis(0));
        coord.register_venue(Venue::new(2), Px::from_f64(10_000.0), Ts::from_millis(0));
        // S2 budget = 2000, single cap = 10% = 200. Request 1000/leg → over.
        let job = arb_job(1, 2, 1_000.0);
        // shrink venue equity so S2 budget is small and single cap triggers
        coord.update_equity(Venue::new(1), Px::from_f64(1_000.0), Ts::from_millis(1)).unwrap();
        assert_eq!(coord.can_reserve(&job), Err(ReserveError::SingleCapExceeded(Venue::new(1))));
    }

    #[test]
    fn reserve_then_release_failed_restores_pool_exactly() {
        let coord = CapitalCoordinator::new(CapitalConfig::default());
        coord.register_venue(Venue::new(1), Px::from_f64(10_000.0), Ts::from_millis(0));
        coord.register_venue(Venue::new(2), Px::from_f64(10_000.0), Ts::from_millis(0));
        let job = arb_job(1, 2, 1_000.0);
        let before = coord.venue_capital(Venue::new(1)).unwrap();
        let reservation = coord.reserve(&job).expect("should reserve");
        coord.release(&reservation, ReleaseOutcome::Failed, Px::ZERO, Px::ZERO, Ts::from_millis(2));
        let after = coord.venue_capital(Venue::new(1)).unwrap();
        assert_eq!(before.s2.used, after.s2.used);
        assert_eq!(before.s2.in_flight, after.s2.in_flight);
    }

    #[test]
    fn safe_mode_blocks_s2_reservations() {
        let coord = CapitalCoordinator::new(CapitalConfig::default());
        coord.register_venue(Venue::new(1), Px::from_f64(10_000.0), Ts::from_millis(0));
        coord.register_venue(Venue::new(2), Px::from_f64(10_000.0), Ts::from_millis(0));
        {
            let mut v = coord.venues.get_mut(&Venue::new(1)).unwrap();
            v.safe_mode = true;
        }
        let job = arb_job(1, 2, 1_000.0);
        assert_eq!(
            coord.can_reserve(&job),
            Err(ReserveError::PoolBlockedBySafeMode(Venue::new(1)))
        );
    }

    #[test]
    fn no_venue_capital_for_unregistered_venue() {
        let coord = CapitalCoordinator::new(CapitalConfig::default());
        coord.register_venue(Venue::new(1), Px::from_f64(10_000.0), Ts::from_millis(0));
        let job = arb_job(1, 99, 1_000.0);
        assert_eq!(
            coord.can_reserve(&job),
            Err(ReserveError::NoVenueCapital(Venue::new(99)))
        );
    }
}
