//! Per-(venue, role) circuit breaker state machine (§4.7), generalized
//! from the single-breaker idiom in the risk manager's circuit breaker.

use common::Ts;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionRole {
    MarketData,
    Trading,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Degraded,
    CircuitOpen,
}

#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct SupervisorConfig {
    /// Consecutive failures before the circuit opens (default 5).
    pub open_streak: u32,
    pub halfopen_wait_ms: u64,
    pub hb_timeout_ms: u64,
    pub max_latency_ms: u64,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            open_streak: 5,
            halfopen_wait_ms: 5_000,
            hb_timeout_ms: 10_000,
            max_latency_ms: 250,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("circuit open")]
    CircuitOpen,
    #[error("venue kill switch active")]
    VenueKillSwitch,
    #[error("global kill switch active")]
    GlobalKillSwitch,
    #[error("trading not enabled for this connection")]
    TradeDisabled,
}

/// `ConnectionHealth` (§3): per (venue, role) liveness/latency/circuit
/// state.
#[derive(Debug, Clone)]
pub struct ConnectionHealth {
    pub state: ConnectionState,
    pub last_heartbeat: Ts,
    pub error_streak: u32,
    /// Most recent observed latencies, newest last, capped at 20 samples.
    pub latency_window: Vec<u64>,
    pub circuit_open_at: Option<Ts>,
    config: SupervisorConfig,
}

const LATENCY_WINDOW_CAP: usize = 20;

impl ConnectionHealth {
    #[must_use]
    pub fn new(config: SupervisorConfig, now: Ts) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            last_heartbeat: now,
            error_streak: 0,
            latency_window: Vec::with_capacity(LATENCY_WINDOW_CAP),
            circuit_open_at: None,
            config,
        }
    }

    pub fn begin_connect(&mut self) {
        self.state = ConnectionState::Connecting;
    }

    pub fn connect_succeeded(&mut self, now: Ts) {
        self.state = ConnectionState::Connected;
        self.last_heartbeat = now;
    }

    pub fn connect_failed(&mut self) {
        self.state = ConnectionState::Disconnected;
    }

    pub fn heartbeat(&mut self, now: Ts) {
        self.last_heartbeat = now;
    }

    /// Heartbeat-loop check (§4.7): opens the circuit with reason
    /// `HeartbeatTimeout` if too much time has passed since the last beat.
    pub fn check_heartbeat(&mut self, now: Ts) {
        if self.last_heartbeat.age_ms(now) > self.config.hb_timeout_ms {
            self.open_circuit(now);
        }
    }

    fn open_circuit(&mut self, now: Ts) {
        self.state = ConnectionState::CircuitOpen;
        self.circuit_open_at = Some(now);
    }

    /// Must be called before issuing a request; returns `Err` if the
    /// circuit is open and the cooldown hasn't elapsed.
    pub fn admit(&mut self, now: Ts) -> Result<(), RequestError> {
        if self.state == ConnectionState::CircuitOpen {
            let opened_at = self.circuit_open_at.unwrap_or(now);
            if opened_at.age_ms(now) < self.config.halfopen_wait_ms {
                return Err(RequestError::CircuitOpen);
            }
            // Half-open: allow exactly one probing request through.
            self.state = ConnectionState::Degraded;
        }
        Ok(())
    }

    pub fn on_request_success(&mut self, latency_ms: u64, now: Ts) {
        self.error_streak = 0;
        if self.latency_window.len() >= LATENCY_WINDOW_CAP {
            self.latency_window.remove(0);
        }
        self.latency_window.push(latency_ms);
        self.last_heartbeat = now;
        if latency_ms <= self.config.max_latency_ms {
            if self.state == ConnectionState::Degraded {
                self.state = ConnectionState::Connected;
            }
        } else {
            self.state = ConnectionState::Degraded;
        }
    }

    pub fn on_request_failure(&mut self, now: Ts) {
        self.error_streak += 1;
        if self.error_streak >= self.config.open_streak {
            self.open_circuit(now);
        }
    }

    /// Derived `health_score` (§4.8 supplement): combines latency band,
    /// error streak, and circuit state into a single 0-100 figure for
    /// `GET /health`.
    #[must_use]
    pub fn health_score(&self) -> u8 {
        let mut score: i32 = 100;
        score -= (self.error_streak as i32) * 10;
        match self.state {
            ConnectionState::CircuitOpen => score -= 60,
            ConnectionState::Degraded => score -= 25,
            ConnectionState::Disconnected | ConnectionState::Connecting => score -= 40,
            ConnectionState::Connected => {}
        }
        if let Some(&latest) = self.latency_window.last()
            && latest > self.config.max_latency_ms
        {
            score -= 10;
        }
        score.clamp(0, 100) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_streak_transitions_to_circuit_open() {
        let mut h = ConnectionHealth::new(SupervisorConfig::default(), Ts::from_millis(0));
        h.connect_succeeded(Ts::from_millis(0));
        for _ in 0..5 {
            h.on_request_failure(Ts::from_millis(0));
        }
        assert_eq!(h.state, ConnectionState::CircuitOpen);
    }

    #[test]
    fn circuit_open_rejects_before_cooldown() {
        let mut h = ConnectionHealth::new(SupervisorConfig::default(), Ts::from_millis(0));
        h.connect_succeeded(Ts::from_millis(0));
        for _ in 0..5 {
            h.on_request_failure(Ts::from_millis(0));
        }
        assert_eq!(h.admit(Ts::from_millis(1_000)), Err(RequestError::CircuitOpen));
    }

    #[test]
    fn circuit_half_opens_after_cooldown() {
        let mut h = ConnectionHealth::new(SupervisorConfig::default(), Ts::from_millis(0));
        h.connect_succeeded(Ts::from_millis(0));
        for _ in 0..5 {
            h.on_request_failure(Ts::from_millis(0));
        }
        assert!(h.admit(Ts::from_millis(6_000)).is_ok());
        assert_eq!(h.state, ConnectionState::Degraded);
    }

    #[test]
    fn high_latency_success_marks_degraded() {
        let mut h = ConnectionHealth::new(SupervisorConfig::default(), Ts::from_millis(0));
        h.connect_succeeded(Ts::from_millis(0));
        h.on_request_success(500, Ts::from_millis(1));
        assert_eq!(h.state, ConnectionState::Degraded);
    }

    #[test]
    fn low_latency_success_recovers_from_degraded() {
        let mut h = ConnectionHealth::new(SupervisorConfig::default(), Ts::from_millis(0));
        h.connect_succeeded(Ts::from_millis(0));
        h.on_request_success(500, Ts::from_millis(1));
        h.on_request_success(10, Ts::from_millis(2));
        assert_eq!(h.state, ConnectionState::Connected);
    }

    #[test]
    fn heartbeat_timeout_opens_circuit() {
        let mut h = ConnectionHealth::new(SupervisorConfig::default(), Ts::from_millis(0));
        h.connect_succeeded(Ts::from_millis(0));
        h.check_heartbeat(Ts::from_millis(20_000));
        assert_eq!(h.state, ConnectionState::CircuitOpen);
    }

    #[test]
    fn health_score_degrades_with_error_streak() {
        let mut h = ConnectionHealth::new(SupervisorConfig::default(), Ts::from_millis(0));
        h.connect_succeeded(Ts::from_millis(0));
        let before = h.health_score();
        h.on_request_failure(Ts::from_millis(1));
        assert!(h.health_score() < before);
    }
}
