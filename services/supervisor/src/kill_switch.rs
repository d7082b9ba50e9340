//! Global and per-venue kill switches, and the trading read/write
//! separation gate (§4.7 "Read/write separation").

use crate::circuit::RequestError;
use common::Venue;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};

pub struct KillSwitches {
    global: AtomicBool,
    venues: DashMap<Venue, ()>,
    /// Venues whose trading (read-write) connection is allowed to send
    /// orders; absence means market-data-only.
    trade_enabled: DashMap<Venue, bool>,
}

impl Default for KillSwitches {
    fn default() -> Self {
        Self::new()
    }
}

impl KillSwitches {
    #[must_use]
    pub fn new() -> Self {
        Self {
            global: AtomicBool::new(false),
            venues: DashMap::new(),
            trade_enabled: DashMap::new(),
        }
    }

    pub fn set_global(&self, on: bool) {
        self.global.store(on, Ordering::SeqCst);
    }

    #[must_use]
    pub fn global(&self) -> bool {
        self.global.load(Ordering::SeqCst)
    }

    pub fn set_venue(&self, venue: Venue, on: bool) {
        if on {
            self.venues.insert(venue, ());
        } else {
            self.venues.remove(&venue);
        }
    }

    #[must_use]
    pub fn venue(&self, venue: Venue) -> bool {
        self.venues.contains_key(&venue)
    }

    pub fn set_trade_enabled(&self, venue: Venue, enabled: bool) {
        self.trade_enabled.insert(venue, enabled);
    }

    /// Gate for a trading-connection request: requires `trade_enabled`
    /// plus neither kill switch active (§4.7).
    pub fn check_trading(&self, venue: Venue) -> Result<(), RequestError> {
        if self.global() {
            return Err(RequestError::GlobalKillSwitch);
        }
        if self.venue(venue) {
            return Err(RequestError::VenueKillSwitch);
        }
        if !self.trade_enabled.get(&venue).map(|v| *v).unwrap_or(false) {
            return Err(RequestError::TradeDisabled);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trading_requires_trade_enabled() {
        let ks = KillSwitches::new();
        assert_eq!(
            ks.check_trading(Venue::new(1)),
            Err(RequestError::TradeDisabled)
        );
        ks.set_trade_enabled(Venue::new(1), true);
        assert!(ks.check_trading(Venue::new(1)).is_ok());
    }

    #[test]
    fn global_kill_switch_blocks_all_venues() {
        let ks = KillSwitches::new();
        ks.set_trade_enabled(Venue::new(1), true);
        ks.set_global(true);
        assert_eq!(
            ks.check_trading(Venue::new(1)),
            Err(RequestError::GlobalKillSwitch)
        );
    }

    #[test]
    fn venue_kill_switch_blocks_only_that_venue() {
        let ks = KillSwitches::new();
        ks.set_trade_enabled(Venue::new(1), true);
        ks.set_trade_enabled(Venue::new(2), true);
        ks.set_venue(Venue::new(1), true);
        assert_eq!(
            ks.check_trading(Venue::new(1)),
            Err(RequestError::VenueKillSwitch)
        );
        assert!(ks.check_trading(Venue::new(2)).is_ok());
    }
}
