//! C1 Quote Pipeline: ingest, normalize, filter, score, and cache
//! multi-venue market data for the rest of the control plane.

pub mod cache;
pub mod pipeline;
pub mod quote;

pub use cache::BestBidAsk;
pub use pipeline::QuotePipeline;
pub use quote::{QualityLabel, Quote, QuoteConfig, QuoteRejectReason, RawQuote};
