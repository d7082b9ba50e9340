//! C2 Cost & Scoring Model: turns a candidate job plus market context into
//! an `OpportunityScore`, and provides filter/rank helpers over batches.

pub mod context;
pub mod cost;
pub mod filter;
pub mod score;

pub use context::{Context, DepthSample, FeeKey, FeeRate, FundingSnapshot, OrderType};
pub use filter::{filter_executable, rank_by, RankKey};
pub use score::{score, OpportunityScore, ScoreInputs};
