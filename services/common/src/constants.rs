//! Shared constants used across the control plane
//!
//! Single source of truth for fixed-point scale and the time constants every
//! crate would otherwise re-derive.

/// Fixed-point scale factor: 1 tick = 0.0001 of a unit (4 decimal places).
pub const SCALE_4: i64 = 10_000;
pub const SCALE_4_U64: u64 = 10_000;
pub const SCALE_4_I32: i32 = 10_000;
pub const SCALE_4_F64: f64 = 10_000.0;

/// Basis points per 100% (`10_000 bps = 100%`), same scale as prices.
pub const BPS_PER_UNIT: i64 = SCALE_4;

pub const MILLIS_PER_SEC: u64 = 1_000;
pub const NANOS_PER_MILLI: u64 = 1_000_000;
pub const NANOS_PER_MICRO: u64 = 1_000;
pub const SECS_PER_MIN: u64 = 60;
pub const MINS_PER_HOUR: u64 = 60;
pub const HOURS_PER_DAY: u64 = 24;
pub const SECS_PER_HOUR: u64 = SECS_PER_MIN * MINS_PER_HOUR;
pub const HOURS_PER_YEAR: f64 = 24.0 * 365.0;

/// Default bounded channel / ring-buffer capacity where no tighter figure is
/// specified elsewhere.
pub const DEFAULT_CHANNEL_SIZE: usize = 1_000;
