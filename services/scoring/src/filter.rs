//! Filtering and ranking helpers over a batch of scores (§4.2).

use crate::score::OpportunityScore;

/// `FilterExecutable(scores, min_pnl, min_score, min_roi) → scores`.
/// Keeps only scores that clear all three thresholds; a job whose
/// `expected_pnl` is exactly 0 is never executable (§8 boundary behavior).
#[must_use]
pub fn filter_executable<'a>(
    scores: &'a [OpportunityScore],
    min_pnl_ticks: i64,
    min_final_score: f64,
    min_roi_pct: f64,
) -> Vec<&'a OpportunityScore> {
    scores
        .iter()
        .filter(|s| {
            s.expected_pnl.ticks() > min_pnl_ticks.max(0)
                && s.final_score >= min_final_score
                && s.roi_pct >= min_roi_pct
        })
        .collect()
}

/// Ranking key for `RankBy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankKey {
    FinalScore,
    ExpectedPnl,
    RoiPct,
}

/// `RankBy(scores, key) → scores`, descending (best first).
#[must_use]
pub fn rank_by<'a>(
    mut scores: Vec<&'a OpportunityScore>,
    key: RankKey,
) -> Vec<&'a OpportunityScore> {
    scores.sort_by(|a, b| {
        let (x, y) = match key {
            RankKey::FinalScore => (a.final_score, b.final_score),
            RankKey::ExpectedPnl => (a.expected_pnl.as_f64(), b.expected_pnl.as_f64()),
            RankKey::RoiPct => (a.roi_pct, b.roi_pct),
        };
        y.partial_cmp(&x).unwrap_or(std::cmp::Ordering::Equal)
    });
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Px;

    fn score_with(expected_pnl: f64, final_score: f64, roi: f64) -> OpportunityScore {
        OpportunityScore {
            price_spread_pnl: Px::ZERO,
            funding_pnl: Px::ZERO,
            fee_cost: Px::ZERO,
            slippage_cost: Px::ZERO,
            latency_penalty: Px::ZERO,
            capital_time_cost: Px::ZERO,
            expected_pnl: Px::from_f64(expected_pnl),
            roi_pct: roi,
            annualized_roi: 0.0,
            time_cost_seconds: 0.0,
            risk_score: 0.0,
            final_score,
        }
    }

    #[test]
    fn zero_expected_pnl_is_not_executable() {
        let scores = vec![score_with(0.0, 50.0, 5.0)];
        let kept = filter_executable(&scores, 0, 0.0, 0.0);
        assert!(kept.is_empty());
    }

    #[test]
    fn strictly_positive_expected_pnl_is_executable() {
        let scores = vec![score_with(0.01, 50.0, 5.0)];
        let kept = filter_executable(&scores, 0, 0.0, 0.0);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn rank_by_final_score_sorts_descending() {
        let scores = vec![score_with(10.0, 20.0, 1.0), score_with(10.0, 80.0, 1.0)];
        let refs: Vec<&OpportunityScore> = scores.iter().collect();
        let ranked = rank_by(refs, RankKey::FinalScore);
        assert_eq!(ranked[0].final_score, 80.0);
        assert_eq!(ranked[1].final_score, 20.0);
    }
}
