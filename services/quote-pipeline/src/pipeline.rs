//! C1 Quote Pipeline: normalize, filter, score, and cache raw feed updates.

use crate::quote::{QualityLabel, Quote, QuoteConfig, QuoteRejectReason, RawQuote};
use common::{Px, Symbol, Ts, Venue};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// Per-venue counters for rejected updates, exposed at `GET /metrics`.
#[derive(Debug, Default)]
struct VenueCounters {
    rejected: AtomicU64,
    accepted: AtomicU64,
}

/// The quote cache and pipeline. Readers go through `DashMap`'s lock-free
/// shard reads; writers serialize per (venue, symbol) shard, matching the
/// "lock-free reads, per-key serialized writes" model in §4.1/§5.
pub struct QuotePipeline {
    config: QuoteConfig,
    cache: DashMap<(Venue, Symbol), Quote>,
    counters: DashMap<Venue, VenueCounters>,
}

impl Default for QuotePipeline {
    fn default() -> Self {
        Self::new(QuoteConfig::default())
    }
}

impl QuotePipeline {
    #[must_use]
    pub fn new(config: QuoteConfig) -> Self {
        Self {
            config,
            cache: DashMap::new(),
            counters: DashMap::new(),
        }
    }

    /// Feed-adapter entry point (§6 `OnRawQuote`). Never propagates errors
    /// to the caller; rejections are counted and logged.
    pub fn on_raw_quote(&self, raw: &RawQuote, now: Ts) {
        match self.process(raw, now) {
            Ok(quote) => {
                self.record(raw.venue, true);
                debug!(venue = %raw.venue, symbol = %raw.symbol, mid = %quote.mid, "quote accepted");
            }
            Err(reason) => {
                self.record(raw.venue, false);
                warn!(venue = %raw.venue, symbol = %raw.symbol, ?reason, "quote rejected");
            }
        }
    }

    fn record(&self, venue: Venue, accepted: bool) {
        let entry = self.counters.entry(venue).or_default();
        if accepted {
            entry.accepted.fetch_add(1, Ordering::Relaxed);
        } else {
            entry.rejected.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Run the four pipeline stages; returns the committed quote or the
    /// reason it was rejected. `pub(crate)` so unit tests can assert on
    /// rejection reasons directly instead of only observed side effects.
    pub(crate) fn process(&self, raw: &RawQuote, now: Ts) -> Result<Quote, QuoteRejectReason> {
        // Stage 1: normalize.
        if raw.bid.ticks() <= 0 || raw.ask.ticks() <= 0 {
            return Err(QuoteRejectReason::NonPositivePrice);
        }
        if raw.bid >= raw.ask {
            return Err(QuoteRejectReason::Crossed);
        }
        let mid = Px::from_ticks((raw.bid.ticks() + raw.ask.ticks()) / 2);
        let spread_bps = ((raw.ask.ticks() - raw.bid.ticks()) * 10_000) / mid.ticks().max(1);

        // Stage 2: noise filter.
        let age_ms = raw.event_ts.age_ms(now);
        if age_ms > self.config.stale_ms {
            return Err(QuoteRejectReason::Stale);
        }
        let key = (raw.venue, raw.symbol);
        let deviation = self
            .cache
            .get(&key)
            .map(|existing| mid.deviation_from(existing.mid))
            .unwrap_or(0.0);
        if deviation > self.config.max_dev {
            return Err(QuoteRejectReason::Deviation);
        }

        // Ordering guarantee: never let an earlier event-ts replace a
        // later one for the same key (§5 ordering guarantee 1).
        if let Some(existing) = self.cache.get(&key)
            && raw.event_ts < existing.event_ts
        {
            return Err(QuoteRejectReason::Stale);
        }

        // Stage 3: quality score.
        let (label, score) = self.score_quality(age_ms, deviation, raw, now);

        let quote = Quote {
            venue: raw.venue,
            symbol: raw.symbol,
            best_bid: raw.bid,
            best_ask: raw.ask,
            bid_size: raw.bid_size,
            ask_size: raw.ask_size,
            event_ts: raw.event_ts,
            receive_ts: now,
            processing_ts: Ts::now(),
            mid,
            spread_bps,
            quality: label,
            quality_score: score,
        };

        // Stage 4: cache commit — only if not BAD.
        if matches!(label, QualityLabel::Bad) {
            return Err(QuoteRejectReason::BadQuality);
        }

        // Re-check ordering under the write to avoid a race between the
        // read above and this insert clobbering a newer concurrent write.
        self.cache
            .entry(key)
            .and_modify(|existing| {
                if quote.event_ts >= existing.event_ts {
                    *existing = quote.clone();
                }
            })
            .or_insert_with(|| quote.clone());

        Ok(quote)
    }

    fn score_quality(
        &self,
        age_ms: u64,
        deviation: f64,
        raw: &RawQuote,
        now: Ts,
    ) -> (QualityLabel, u8) {
        let cfg = &self.config;
        let mut score: i32 = 100;

        // Latency band: processing delay relative to receive, approximated
        // here by the event-to-now age since adapters don't separately
        // report wire latency.
        let latency_ms = raw.event_ts.age_ms(now);
        if latency_ms > cfg.latency_bad_ms {
            score -= 40;
        } else if latency_ms > cfg.latency_warn_ms {
            score -= 15;
        }

        if age_ms > cfg.freshness_bad_ms {
            score -= 40;
        } else if age_ms > cfg.freshness_warn_ms {
            score -= 15;
        }

        if deviation > cfg.variance_bad {
            score -= 30;
        } else if deviation > cfg.variance_warn {
            score -= 10;
        }

        let score = score.clamp(0, 100) as u8;
        let label = if score >= cfg.good_threshold {
            QualityLabel::Good
        } else if score >= cfg.warn_threshold {
            QualityLabel::Warn
        } else {
            QualityLabel::Bad
        };
        (label, score)
    }

    /// `BestQuote(venue, symbol)` (§4.1 contract).
    #[must_use]
    pub fn best_quote(&self, venue: Venue, symbol: Symbol) -> Option<Quote> {
        self.cache.get(&(venue, symbol)).map(|q| q.clone())
    }

    /// `BestBidAsk(symbol)`: the best bid and best ask across all venues
    /// quoting this symbol, each with its originating venue.
    #[must_use]
    pub fn best_bid_ask(&self, symbol: Symbol) -> Option<(Venue, Px, Venue, Px)> {
        let mut best_bid: Option<(Venue, Px)> = None;
        let mut best_ask: Option<(Venue, Px)> = None;
        for entry in &self.cache {
            let (v, s) = *entry.key();
            if s != symbol {
                continue;
            }
            let q = entry.value();
            if best_bid.is_none_or(|(_, p)| q.best_bid > p) {
                best_bid = Some((v, q.best_bid));
            }
            if best_ask.is_none_or(|(_, p)| q.best_ask < p) {
                best_ask = Some((v, q.best_ask));
            }
        }
        match (best_bid, best_ask) {
            (Some((bv, bp)), Some((av, ap))) => Some((bv, bp, av, ap)),
            _ => None,
        }
    }

    /// Rejected-update count for a venue, for `/metrics`.
    #[must_use]
    pub fn rejected_count(&self, venue: Venue) -> u64 {
        self.counters
            .get(&venue)
            .map(|c| c.rejected.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    #[must_use]
    pub fn accepted_count(&self, venue: Venue) -> u64 {
        self.counters
            .get(&venue)
            .map(|c| c.accepted.load(Ordering::Relaxed))
            .unwrap_or(0)
    }
}
