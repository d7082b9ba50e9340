//! C7 Connection Supervisor: owns per-(venue, role) health, kill
//! switches, and rate limiting.

use crate::circuit::{ConnectionHealth, ConnectionRole, RequestError, SupervisorConfig};
use crate::kill_switch::KillSwitches;
use crate::rate_limit::TokenBucket;
use common::{Ts, Venue};
use dashmap::DashMap;
use parking_lot::Mutex;

pub struct ConnectionSupervisor {
    config: SupervisorConfig,
    health: DashMap<(Venue, ConnectionRole), Mutex<ConnectionHealth>>,
    limiters: DashMap<(Venue, ConnectionRole), Mutex<TokenBucket>>,
    pub kill_switches: KillSwitches,
    bucket_capacity: f64,
    bucket_refill_per_sec: f64,
}

impl ConnectionSupervisor {
    #[must_use]
    pub fn new(config: SupervisorConfig, bucket_capacity: f64, bucket_refill_per_sec: f64) -> Self {
        Self {
            config,
            health: DashMap::new(),
            limiters: DashMap::new(),
            kill_switches: KillSwitches::new(),
            bucket_capacity,
            bucket_refill_per_sec,
        }
    }

    fn entry(&self, venue: Venue, role: ConnectionRole, now: Ts) {
        self.health
            .entry((venue, role))
            .or_insert_with(|| Mutex::new(ConnectionHealth::new(self.config, now)));
        self.limiters.entry((venue, role)).or_insert_with(|| {
            Mutex::new(TokenBucket::new(self.bucket_capacity, self.bucket_refill_per_sec, now))
        });
    }

    pub fn begin_connect(&self, venue: Venue, role: ConnectionRole, now: Ts) {
        self.entry(venue, role, now);
        self.health.get(&(venue, role)).unwrap().lock().begin_connect();
    }

    pub fn connect_succeeded(&self, venue: Venue, role: ConnectionRole, now: Ts) {
        self.entry(venue, role, now);
        self.health.get(&(venue, role)).unwrap().lock().connect_succeeded(now);
    }

    pub fn connect_failed(&self, venue: Venue, role: ConnectionRole) {
        if let Some(h) = self.health.get(&(venue, role)) {
            h.lock().connect_failed();
        }
    }

    pub fn heartbeat(&self, venue: Venue, role: ConnectionRole, now: Ts) {
        self.entry(venue, role, now);
        self.health.get(&(venue, role)).unwrap().lock().heartbeat(now);
    }

    pub fn check_heartbeats(&self, now: Ts) {
        for entry in &self.health {
            entry.value().lock().check_heartbeat(now);
        }
    }

    /// Gate a request before issuing it: circuit state, rate limit, and
    /// (for `Trading`) the kill-switch/trade-enabled checks.
    pub fn admit(&self, venue: Venue, role: ConnectionRole, now: Ts) -> Result<(), RequestError> {
        self.entry(venue, role, now);
        if role == ConnectionRole::Trading {
            self.kill_switches.check_trading(venue)?;
        }
        self.health.get(&(venue, role)).unwrap().lock().admit(now)?;
        if !self.limiters.get(&(venue, role)).unwrap().lock().try_acquire(now) {
            // Rate limiting doesn't have its own enumerated reason in the
            // contract; callers waiting for a token should use
            // `wait_ms` instead of calling `admit` in a hot loop.
            return Err(RequestError::CircuitOpen);
        }
        Ok(())
    }

    pub fn on_request_success(&self, venue: Venue, role: ConnectionRole, latency_ms: u64, now: Ts) {
        if let Some(h) = self.health.get(&(venue, role)) {
            h.lock().on_request_success(latency_ms, now);
        }
    }

    pub fn on_request_failure(&self, venue: Venue, role: ConnectionRole, now: Ts) {
        if let Some(h) = self.health.get(&(venue, role)) {
            h.lock().on_request_failure(now);
        }
    }

    #[must_use]
    pub fn health_score(&self, venue: Venue, role: ConnectionRole) -> Option<u8> {
        self.health.get(&(venue, role)).map(|h| h.lock().health_score())
    }

    /// Current circuit state, used by C6 to force `SAFE_TAKER_ONLY` when a
    /// venue pair is degraded or worse (§4.6 Forced degradation).
    #[must_use]
    pub fn connection_state(&self, venue: Venue, role: ConnectionRole) -> Option<crate::circuit::ConnectionState> {
        self.health.get(&(venue, role)).map(|h| h.lock().state)
    }

    /// Snapshot of every tracked (venue, role) connection's health, for the
    /// operator `/health` surface.
    #[must_use]
    pub fn health_snapshot(&self) -> Vec<(Venue, ConnectionRole, ConnectionHealth)> {
        self.health
            .iter()
            .map(|entry| {
                let (venue, role) = *entry.key();
                (venue, role, entry.value().lock().clone())
            })
            .collect()
    }
}
