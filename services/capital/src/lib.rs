//! C3 Capital Coordinator: three-pool (S1/S2/S3) per-venue capital
//! accounting with two-phase soft-lock reservations.

pub mod coordinator;
pub mod error;
pub mod pool;
pub mod venue;

pub use coordinator::{CapitalConfig, CapitalCoordinator, ReleaseOutcome, Reservation};
pub use error::ReserveError;
pub use pool::{PoolState, PoolType};
pub use venue::VenueCapital;
