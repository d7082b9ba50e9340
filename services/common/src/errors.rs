//! Shared error type for cross-cutting infrastructure failures.
//!
//! Component-specific rejection reasons (capacity, risk, trading) get their
//! own `thiserror` enums in their crate per §7 of the design; this one
//! covers the generic transport/config failures the ambient stack needs.

use thiserror::Error;

/// Infrastructure-level error shared across crates.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("internal error: {0}")]
    InternalError(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("rate limited: {0}")]
    RateLimited(String),
}
