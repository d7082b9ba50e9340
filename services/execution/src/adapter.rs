//! `ExchangeAdapter`: the contract C6/C7 require of any venue integration
//! (§6 "Exchange adapter → C6/C7"). Real venue adapters are out of scope;
//! this crate ships `SimulatedAdapter`, a deterministic test double used
//! by the property/scenario tests in §8.

use anyhow::Result;
use async_trait::async_trait;
use common::{Px, Qty, Side, Symbol, Venue};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderKind {
    Market,
    PostOnly(Px),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Filled,
    Open,
    Rejected,
    Cancelled,
}

#[derive(Debug, Clone, Copy)]
pub struct OrderAck {
    pub order_id: u64,
    pub status: OrderStatus,
    pub filled_price: Option<Px>,
}

#[derive(Debug, Clone, Copy)]
pub struct Balance {
    pub asset: Symbol,
    pub free: Qty,
    pub locked: Qty,
}

#[derive(Debug, Clone, Copy)]
pub struct Position {
    pub symbol: Symbol,
    pub qty: Qty,
    pub entry_px: Px,
}

/// Required operations a venue integration must provide (§6). Each is
/// expected to respect a caller-supplied deadline and surface retryable
/// vs. terminal errors distinctly — real implementations map transport
/// failures accordingly; `anyhow::Result` is used here, at the adapter
/// boundary, rather than a typed error enum, since the set of possible
/// venue-side failures is adapter-specific.
#[async_trait]
pub trait ExchangeAdapter: Send + Sync {
    async fn place_order(&self, venue: Venue, symbol: Symbol, side: Side, qty: Qty, kind: OrderKind) -> Result<OrderAck>;
    async fn cancel_order(&self, venue: Venue, order_id: u64) -> Result<()>;
    async fn fetch_balances(&self, venue: Venue) -> Result<Vec<Balance>>;
    async fn fetch_positions(&self, venue: Venue) -> Result<Vec<Position>>;
    async fn ping(&self, venue: Venue) -> Result<u64>;
}

/// Deterministic in-memory adapter: Market orders always fill
/// immediately at a caller-supplied reference price; `PostOnly` orders
/// fill only when `set_next_maker_fill` has armed a fill for that venue.
pub struct SimulatedAdapter {
    next_order_id: AtomicU64,
    maker_fills_armed: DashMap<Venue, bool>,
    reference_price: DashMap<(Venue, Symbol), Px>,
    ping_latency_ms: DashMap<Venue, u64>,
}

impl Default for SimulatedAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedAdapter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_order_id: AtomicU64::new(1),
            maker_fills_armed: DashMap::new(),
            reference_price: DashMap::new(),
            ping_latency_ms: DashMap::new(),
        }
    }

    pub fn set_reference_price(&self, venue: Venue, symbol: Symbol, px: Px) {
        self.reference_price.insert((venue, symbol), px);
    }

    pub fn set_next_maker_fill(&self, venue: Venue, will_fill: bool) {
        self.maker_fills_armed.insert(venue, will_fill);
    }

    pub fn set_ping_latency(&self, venue: Venue, latency_ms: u64) {
        self.ping_latency_ms.insert(venue, latency_ms);
    }
}

#[async_trait]
impl ExchangeAdapter for SimulatedAdapter {
    async fn place_order(&self, venue: Venue, symbol: Symbol, _side: Side, _qty: Qty, kind: OrderKind) -> Result<OrderAck> {
        let order_id = self.next_order_id.fetch_add(1, Ordering::SeqCst);
        match kind {
            OrderKind::Market => {
                let px = self
                    .reference_price
                    .get(&(venue, symbol))
                    .map(|p| *p)
                    .unwrap_or(Px::ZERO);
                Ok(OrderAck {
                    order_id,
                    status: OrderStatus::Filled,
                    filled_price: Some(px),
                })
            }
            OrderKind::PostOnly(px) => {
                let will_fill = self.maker_fills_armed.get(&venue).map(|v| *v).unwrap_or(false);
                Ok(OrderAck {
                    order_id,
                    status: if will_fill { OrderStatus::Filled } else { OrderStatus::Open },
                    filled_price: if will_fill { Some(px) } else { None },
                })
            }
        }
    }

    async fn cancel_order(&self, _venue: Venue, _order_id: u64) -> Result<()> {
        Ok(())
    }

    async fn fetch_balances(&self, _venue: Venue) -> Result<Vec<Balance>> {
        Ok(Vec::new())
    }

    async fn fetch_positions(&self, _venue: Venue) -> Result<Vec<Position>> {
        Ok(Vec::new())
    }

    async fn ping(&self, venue: Venue) -> Result<u64> {
        Ok(self.ping_latency_ms.get(&venue).map(|v| *v).unwrap_or(5))
    }
}
