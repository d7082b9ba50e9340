//! Per-venue capital pools (§3 `PoolState`).

use common::Px;

/// Which of the three capital pools a strategy draws from (§4.3 Pool
/// selection).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoolType {
    /// Wash / hedge-rebalance strategies.
    S1,
    /// Arbitrage strategies.
    S2,
    /// Safe-mode / emergency reserve; never selected by normal scheduling.
    S3,
}

use serde::{Deserialize, Serialize};

impl PoolType {
    /// Default share of venue equity allocated to each pool.
    #[must_use]
    pub const fn default_pct(self) -> f64 {
        match self {
            Self::S1 => 0.70,
            Self::S2 => 0.20,
            Self::S3 => 0.10,
        }
    }
}

/// One pool's budget/used/in-flight state for one venue. The core
/// capital-safety invariant `used + in_flight ≤ budget` must hold at every
/// externally observable point (§3, §8 property 1).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PoolState {
    pub budget: Px,
    pub used: Px,
    pub in_flight: Px,
}

impl PoolState {
    #[must_use]
    pub fn new(budget: Px) -> Self {
        Self {
            budget,
            used: Px::ZERO,
            in_flight: Px::ZERO,
        }
    }

    #[must_use]
    pub fn available(self) -> Px {
        Px::from_ticks((self.budget.ticks() - self.used.ticks() - self.in_flight.ticks()).max(0))
    }

    #[must_use]
    pub const fn invariant_holds(self) -> bool {
        self.used.ticks() >= 0
            && self.in_flight.ticks() >= 0
            && self.used.ticks() + self.in_flight.ticks() <= self.budget.ticks()
    }

    /// Rebalance the budget to a new value, preserving `used`/`in_flight`
    /// exactly (§3 lifecycle: "rebalanced on equity update preserving
    /// used/in-flight").
    pub fn rebalance_budget(&mut self, new_budget: Px) {
        self.budget = new_budget;
    }

    pub(crate) fn soft_lock(&mut self, amount: Px) {
        self.in_flight = self.in_flight.add(amount);
    }

    pub(crate) fn release_filled(&mut self, amount: Px) {
        self.in_flight = self.in_flight.sub(amount);
        self.used = self.used.add(amount);
    }

    pub(crate) fn release_failed(&mut self, amount: Px) {
        self.in_flight = self.in_flight.sub(amount);
    }
}
