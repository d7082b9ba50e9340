//! C7 Connection Supervisor: per-(venue, role) circuit breaker, health,
//! kill switches, rate limiting, and retry backoff.

pub mod circuit;
pub mod kill_switch;
pub mod rate_limit;
pub mod retry;
pub mod supervisor;

pub use circuit::{ConnectionHealth, ConnectionRole, ConnectionState, RequestError, SupervisorConfig};
pub use kill_switch::KillSwitches;
pub use rate_limit::TokenBucket;
pub use retry::{backoff_delay_ms, RetryConfig};
pub use supervisor::ConnectionSupervisor;
