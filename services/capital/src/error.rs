//! C3 enumerated reservation failure reasons (§4.3 Failure).

use common::Venue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ReserveError {
    #[error("pool exhausted on venue {0}")]
    PoolExhausted(Venue),
    #[error("single-reservation cap exceeded on venue {0}")]
    SingleCapExceeded(Venue),
    #[error("total in-flight cap exceeded on venue {0}")]
    TotalInflightExceeded(Venue),
    #[error("selected pool is blocked by safe mode on venue {0}")]
    PoolBlockedBySafeMode(Venue),
    #[error("no capital record for venue {0}")]
    NoVenueCapital(Venue),
}
