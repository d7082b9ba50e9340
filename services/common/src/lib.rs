//! Shared types, constants, errors, and config loading for the trading
//! coordinator control plane.

pub mod config;
pub mod constants;
pub mod errors;
pub mod job;
pub mod types;

pub use config::load_layered;
pub use errors::ServiceError;
pub use job::{Job, JobId, JobValidationError, Leg, StrategyType};
pub use types::{Px, Qty, Side, Symbol, Ts, Venue};
