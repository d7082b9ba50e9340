//! Execution-facing error types (§7 Trading errors / Validation gate).

use common::{Px, Venue};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExecutionError {
    #[error("wash-mode execution requested for a non-wash job")]
    NotWashMode,
    #[error("expected pnl {0} below configured minimum {1}")]
    BelowMinPnl(Px, Px),
    #[error("hedge leg failed on venue {0}, opportunity aborted before exposure")]
    HedgeLegFailed(Venue),
    #[error("no adapter registered for venue {0}")]
    NoAdapter(Venue),
    #[error("order placement rejected on venue {0}: {1}")]
    OrderRejected(Venue, String),
}
