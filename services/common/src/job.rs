//! Opportunity/HedgeJob domain types shared by the scoring, capital, risk,
//! scheduler, and execution crates.

use crate::types::{Px, Qty, Side, Symbol, Venue};
use serde::{Deserialize, Serialize};

/// Strategy family a job belongs to; determines pool selection in C3 and
/// mode selection in C6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyType {
    Wash,
    Arbitrage,
    HedgeRebalance,
}

/// One leg of a job: a single-venue order intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leg {
    pub venue: Venue,
    pub side: Side,
    pub qty: Qty,
}

impl Leg {
    /// Signed quantity for balance checks (`+qty` on buy, `-qty` on sell).
    #[must_use]
    pub const fn signed_qty(&self) -> i64 {
        self.side.sign() * self.qty.raw()
    }
}

/// Monotonically increasing job identifier, unique for the life of the
/// process (never persisted across restart per spec §3 lifecycle).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JobId(pub u64);

/// An immutable opportunity candidate once created (§3 `Opportunity/HedgeJob`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub strategy: StrategyType,
    pub symbol: Symbol,
    pub legs: Vec<Leg>,
    pub notional: Px,
    pub expected_edge_bps: i64,
    pub expected_pnl: Px,
    /// Normalized [0,100] component scores.
    pub risk_score: u8,
    pub latency_score: u8,
    pub volume_score: u8,
    pub funding_score: u8,
    pub liquidity_score: u8,
    pub source: String,
    pub submit_ts: crate::types::Ts,
}

/// Reason a job failed the leg-balance invariant check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum JobValidationError {
    #[error("legs do not balance: signed sum {0} != 0")]
    Unbalanced(i64),
    #[error("notional must be positive")]
    NonPositiveNotional,
    #[error("job has no legs")]
    NoLegs,
}

impl Job {
    /// Validate the invariants named in spec §3: legs balance (for
    /// hedge/arb shapes), notional positive, at least one leg.
    pub fn validate(&self) -> Result<(), JobValidationError> {
        if self.legs.is_empty() {
            return Err(JobValidationError::NoLegs);
        }
        if self.notional.ticks() <= 0 {
            return Err(JobValidationError::NonPositiveNotional);
        }
        if matches!(self.strategy, StrategyType::Arbitrage | StrategyType::HedgeRebalance) {
            let sum: i64 = self.legs.iter().map(Leg::signed_qty).sum();
            if sum != 0 {
                return Err(JobValidationError::Unbalanced(sum));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Ts;

    fn leg(venue: u16, side: Side, units: i64) -> Leg {
        Leg {
            venue: Venue::new(venue),
            side,
            qty: Qty::from_units(units),
        }
    }

    fn job(strategy: StrategyType, legs: Vec<Leg>) -> Job {
        Job {
            id: JobId(1),
            strategy,
            symbol: Symbol::new(1),
            legs,
            notional: Px::from_f64(1_000.0),
            expected_edge_bps: 10,
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
    fn balanced_arb_legs_pass_validation() {
        let j = job(
            StrategyType::Arbitrage,
            vec![leg(1, Side::Buy, 1), leg(2, Side::Sell, 1)],
        );
        assert!(j.validate().is_ok());
    }

    #[test]
    fn unbalanced_arb_legs_are_rejected() {
        let j = job(
            StrategyType::Arbitrage,
            vec![leg(1, Side::Buy, 1), leg(2, Side::Sell, 2)],
        );
        assert!(matches!(
            j.validate(),
            Err(JobValidationError::Unbalanced(_))
        ));
    }

    #[test]
    fn wash_strategy_does_not_require_balance() {
        let j = job(StrategyType::Wash, vec![leg(1, Side::Buy, 1)]);
        assert!(j.validate().is_ok());
    }

    #[test]
    fn non_positive_notional_is_rejected() {
        let mut j = job(StrategyType::Wash, vec![leg(1, Side::Buy, 1)]);
        j.notional = Px::ZERO;
        assert_eq!(j.validate(), Err(JobValidationError::NonPositiveNotional));
    }
}
