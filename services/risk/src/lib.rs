//! C4 Risk Evaluator: multi-dimensional risk checks, kill switches, and
//! mode-dependent admission thresholds.

pub mod dimensions;
pub mod evaluator;
pub mod modes;
pub mod verdict;

pub use dimensions::{DimensionInputs, DimensionScores};
pub use evaluator::{RiskContext, RiskEvaluator};
pub use modes::{ModePreset, RiskMode};
pub use verdict::{Decision, RejectReason, Verdict};
