//! Core value types shared by every control-plane crate.

use crate::constants::{SCALE_4, SCALE_4_F64};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A trading venue identifier (e.g. "binance", "okx"). Interned as a small
/// copy type so it can live in hot paths (quote cache keys, pool maps)
/// without allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Venue(u16);

impl Venue {
    /// Construct a venue from a stable registry id.
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn id(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VENUE_{}", self.0)
    }
}

/// Trading instrument identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Symbol(u32);

impl Symbol {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SYM_{}", self.0)
    }
}

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The other side of a hedge leg.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }

    /// Signed multiplier for position-delta math: `+1` for buy, `-1` for
    /// sell.
    #[must_use]
    pub const fn sign(self) -> i64 {
        match self {
            Self::Buy => 1,
            Self::Sell => -1,
        }
    }
}

/// Price, stored as fixed-point ticks (1 tick = 0.0001 of the quote
/// currency) so arithmetic stays exact and deterministic across restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Px(i64);

impl Px {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn from_ticks(ticks: i64) -> Self {
        Self(ticks)
    }

    /// Construct from a floating-point external value. Only ever call this
    /// at a system boundary (feed adapters, operator API); internal code
    /// should compute in ticks.
    #[must_use]
    pub fn from_f64(value: f64) -> Self {
        Self((value * SCALE_4_F64).round() as i64)
    }

    #[must_use]
    pub const fn ticks(self) -> i64 {
        self.0
    }

    #[must_use]
    pub fn as_f64(self) -> f64 {
        self.0 as f64 / SCALE_4_F64
    }

    #[must_use]
    pub const fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }

    #[must_use]
    pub const fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }

    /// Notional value of `self` priced at this price, in ticks (divide by
    /// `SCALE_4` twice for display: once for the price scale, once for the
    /// quantity scale).
    #[must_use]
    pub const fn mul_qty(self, qty: Qty) -> i64 {
        (self.0 * qty.raw()) / SCALE_4
    }

    /// Relative deviation between `self` and `reference`, as a fraction
    /// (e.g. `0.01` = 1%). Returns `0.0` if `reference` is zero.
    #[must_use]
    pub fn deviation_from(self, reference: Self) -> f64 {
        if reference.0 == 0 {
            return 0.0;
        }
        ((self.0 - reference.0).abs() as f64) / (reference.0.abs() as f64)
    }
}

impl fmt::Display for Px {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / SCALE_4;
        let frac = (self.0 % SCALE_4).abs();
        write!(f, "{whole}.{frac:04}")
    }
}

/// Quantity, stored as fixed-point units (1 unit = 0.0001 of the base
/// instrument).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Qty(i64);

impl Qty {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn from_units(units: i64) -> Self {
        Self(units * SCALE_4)
    }

    #[must_use]
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub fn from_f64(value: f64) -> Self {
        Self((value * SCALE_4_F64).round() as i64)
    }

    #[must_use]
    pub const fn raw(self) -> i64 {
        self.0
    }

    #[must_use]
    pub fn as_f64(self) -> f64 {
        self.0 as f64 / SCALE_4_F64
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }

    #[must_use]
    pub const fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl fmt::Display for Qty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / SCALE_4;
        let frac = (self.0 % SCALE_4).abs();
        write!(f, "{whole}.{frac:04}")
    }
}

/// Monotonic wall-clock timestamp in milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Ts(pub u64);

impl Ts {
    #[must_use]
    pub fn now() -> Self {
        let millis = u64::try_from(chrono::Utc::now().timestamp_millis().max(0)).unwrap_or(0);
        Self(millis)
    }

    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Saturating age of this timestamp relative to `now`, in milliseconds.
    #[must_use]
    pub const fn age_ms(self, now: Self) -> u64 {
        now.0.saturating_sub(self.0)
    }
}

impl fmt::Display for Ts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn px_roundtrips_through_ticks() {
        let px = Px::from_ticks(50_001_2345);
        assert_eq!(px.ticks(), 50_001_2345);
    }

    #[test]
    fn px_display_matches_decimal_form() {
        assert_eq!(Px::from_f64(50001.0).to_string(), "50001.0000");
    }

    #[test]
    fn qty_from_units_scales_correctly() {
        assert_eq!(Qty::from_units(5).raw(), 5 * SCALE_4);
    }

    #[test]
    fn side_opposite_and_sign() {
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Buy.sign(), 1);
        assert_eq!(Side::Sell.sign(), -1);
    }

    #[test]
    fn px_deviation_from_zero_reference_is_zero() {
        assert_eq!(Px::from_f64(100.0).deviation_from(Px::ZERO), 0.0);
    }

    #[test]
    fn px_deviation_matches_fraction() {
        let dev = Px::from_f64(101.0).deviation_from(Px::from_f64(100.0));
        assert!((dev - 0.01).abs() < 1e-9);
    }

    #[test]
    fn ts_age_is_saturating() {
        let earlier = Ts::from_millis(100);
        let later = Ts::from_millis(50);
        assert_eq!(earlier.age_ms(later), 0);
    }
}
