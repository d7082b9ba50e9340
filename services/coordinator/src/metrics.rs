//! Prometheus metrics for the operator `/metrics` surface (§6: "gauges for
//! pool utilization, in-flight notional, latency, error rate; counters for
//! submitted/completed/failed/rejected; histograms for execution time and
//! unhedged time"). Grounded on the risk manager's
//! `prometheus::register_*_vec!` usage in `grpc_service.rs`, built against
//! a dedicated [`Registry`] instead of the process-global default so tests
//! can construct independent instances.

use prometheus::{
    CounterVec, Encoder, Gauge, GaugeVec, Histogram, HistogramOpts, HistogramVec, Opts, Registry,
    TextEncoder,
};

pub struct CoordinatorMetrics {
    registry: Registry,
    pub pool_utilization_pct: GaugeVec,
    pub in_flight_notional_usd: GaugeVec,
    pub connection_latency_ms: GaugeVec,
    pub connection_error_streak: GaugeVec,
    pub jobs_submitted_total: CounterVec,
    pub jobs_completed_total: CounterVec,
    pub jobs_failed_total: CounterVec,
    pub jobs_rejected_total: CounterVec,
    pub execution_time_ms: Histogram,
    pub unhedged_time_ms: Histogram,
    pub global_kill_switch: Gauge,
}

impl CoordinatorMetrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let pool_utilization_pct = GaugeVec::new(
            Opts::new("coordinator_pool_utilization_pct", "Per-venue capital pool utilization, 0-100"),
            &["venue"],
        )?;
        let in_flight_notional_usd = GaugeVec::new(
            Opts::new("coordinator_in_flight_notional_usd", "Per-venue in-flight notional, USD"),
            &["venue"],
        )?;
        let connection_latency_ms = GaugeVec::new(
            Opts::new("coordinator_connection_latency_ms", "Observed request latency per venue/role"),
            &["venue", "role"],
        )?;
        let connection_error_streak = GaugeVec::new(
            Opts::new("coordinator_connection_error_streak", "Consecutive request failures per venue/role"),
            &["venue", "role"],
        )?;
        let jobs_submitted_total = CounterVec::new(
            Opts::new("coordinator_jobs_submitted_total", "Jobs accepted by Submit"),
            &["scope"],
        )?;
        let jobs_completed_total = CounterVec::new(
            Opts::new("coordinator_jobs_completed_total", "Jobs that completed successfully"),
            &["scope"],
        )?;
        let jobs_failed_total = CounterVec::new(
            Opts::new("coordinator_jobs_failed_total", "Jobs that failed execution"),
            &["scope"],
        )?;
        let jobs_rejected_total = CounterVec::new(
            Opts::new("coordinator_jobs_rejected_total", "Jobs rejected at risk evaluation"),
            &["scope"],
        )?;
        let execution_time_ms = Histogram::with_opts(HistogramOpts::new(
            "coordinator_execution_time_ms",
            "Time from dispatch to terminal outcome",
        ))?;
        let unhedged_time_ms = Histogram::with_opts(HistogramOpts::new(
            "coordinator_unhedged_time_ms",
            "Time either hedge leg spent unfilled during execution",
        ))?;
        let global_kill_switch = Gauge::new(
            "coordinator_global_kill_switch",
            "1 if the global kill switch is engaged, else 0",
        )?;

        registry.register(Box::new(pool_utilization_pct.clone()))?;
        registry.register(Box::new(in_flight_notional_usd.clone()))?;
        registry.register(Box::new(connection_latency_ms.clone()))?;
        registry.register(Box::new(connection_error_streak.clone()))?;
        registry.register(Box::new(jobs_submitted_total.clone()))?;
        registry.register(Box::new(jobs_completed_total.clone()))?;
        registry.register(Box::new(jobs_failed_total.clone()))?;
        registry.register(Box::new(jobs_rejected_total.clone()))?;
        registry.register(Box::new(execution_time_ms.clone()))?;
        registry.register(Box::new(unhedged_time_ms.clone()))?;
        registry.register(Box::new(global_kill_switch.clone()))?;

        Ok(Self {
            registry,
            pool_utilization_pct,
            in_flight_notional_usd,
            connection_latency_ms,
            connection_error_streak,
            jobs_submitted_total,
            jobs_completed_total,
            jobs_failed_total,
            jobs_rejected_total,
            execution_time_ms,
            unhedged_time_ms,
            global_kill_switch,
        })
    }

    /// Renders the current registry as Prometheus text exposition format.
    pub fn render(&self) -> anyhow::Result<String> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        Ok(String::from_utf8(buf)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_includes_registered_metric_names() {
        let metrics = CoordinatorMetrics::new().unwrap();
        metrics.pool_utilization_pct.with_label_values(&["VENUE_1"]).set(42.0);
        metrics.jobs_submitted_total.with_label_values(&["VENUE_1"]).inc();
        let text = metrics.render().unwrap();
        assert!(text.contains("coordinator_pool_utilization_pct"));
        assert!(text.contains("coordinator_jobs_submitted_total"));
    }
}
