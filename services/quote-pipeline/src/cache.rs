//! Read-side helpers for the quote cache, kept separate from `pipeline.rs`
//! so downstream crates (scoring, scheduler) depend only on the read
//! contract and not on the ingest/write path.

use crate::quote::Quote;
use common::{Px, Symbol, Venue};

/// Cross-venue best bid/ask snapshot for one symbol, as returned by
/// `QuotePipeline::best_bid_ask`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BestBidAsk {
    pub symbol: Symbol,
    pub bid_venue: Venue,
    pub bid: Px,
    pub ask_venue: Venue,
    pub ask: Px,
}

impl BestBidAsk {
    /// Net top-of-book spread across venues, in ticks. Negative when the
    /// best bid on one venue already crosses the best ask on another,
    /// which is exactly the cross-venue opportunity C2 scores.
    #[must_use]
    pub const fn cross_venue_spread(&self) -> i64 {
        self.bid.ticks() - self.ask.ticks()
    }
}

/// Build a `BestBidAsk` from a single quote, treating it as both sides'
/// source (same-venue fallback when only one venue quotes a symbol).
impl From<&Quote> for BestBidAsk {
    fn from(q: &Quote) -> Self {
        Self {
            symbol: q.symbol,
            bid_venue: q.venue,
            bid: q.best_bid,
            ask_venue: q.venue,
            ask: q.best_ask,
        }
    }
}
