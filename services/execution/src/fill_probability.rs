//! Fill-probability model for Maker legs (§4.6). Informational only —
//! used at decision time, never to gate the watchdog.

/// Estimates the probability a post-only Maker order fills before the
/// watchdog's timeout, from three independent signals: how far the quote
/// sits from mid (closer fills more often), how much of top-of-book depth
/// the order represents (smaller clears faster), and the pair's recent
/// fill-rate track record.
#[must_use]
pub fn estimate_fill_probability(offset_from_mid_bps: f64, notional_over_depth: f64, recent_fill_rate: f64) -> f64 {
    let offset_component = (-offset_from_mid_bps.abs() / 10.0).exp(); // decays ~63% per 10bps
    let depth_component = (1.0 - notional_over_depth.clamp(0.0, 1.0)).max(0.0);
    let track_record_component = recent_fill_rate.clamp(0.0, 1.0);

    (0.5 * offset_component + 0.2 * depth_component + 0.3 * track_record_component).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_mid_with_full_depth_and_perfect_history_is_near_certain() {
        let p = estimate_fill_probability(0.0, 0.0, 1.0);
        assert!(p > 0.9, "expected near-certain fill, got {p}");
    }

    #[test]
    fn far_from_mid_with_thin_depth_and_poor_history_is_low() {
        let p = estimate_fill_probability(50.0, 1.0, 0.1);
        assert!(p < 0.1, "expected low fill probability, got {p}");
    }

    #[test]
    fn probability_always_clamped_to_unit_interval() {
        let p = estimate_fill_probability(-1000.0, -5.0, 2.0);
        assert!((0.0..=1.0).contains(&p));
    }
}
