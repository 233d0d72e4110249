//! # Allocation Types
//!
//! $$
//! \text{Sharpe} = \frac{\mathbb E[R_p]-r_f}{\sigma_p}
//! $$
//!
//! Shared enums and result containers for the allocation pipeline.

use std::collections::BTreeMap;

/// Supported allocation strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
  /// Maximize the Sharpe ratio over the long-only simplex.
  MaxSharpe,
  /// Minimize portfolio variance over the long-only simplex.
  MinVolatility,
  /// Hierarchical Risk Parity (Lopez de Prado); no covariance inversion.
  Hrp,
  /// Black-Litterman posterior blend of prior and views, then max-Sharpe.
  BlackLitterman,
}

impl Strategy {
  /// Parse a string into a [`Strategy`].
  pub fn from_str(s: &str) -> Self {
    match s.to_lowercase().as_str() {
      "min_volatility" | "min-volatility" | "minvol" => Self::MinVolatility,
      "hrp" => Self::Hrp,
      "bl" | "black_litterman" | "black-litterman" | "blacklitterman" => Self::BlackLitterman,
      _ => Self::MaxSharpe,
    }
  }
}

/// Performance triple for a weight vector.
#[derive(Clone, Copy, Debug, Default)]
pub struct PortfolioPerformance {
  /// Expected portfolio return (annualized if inputs are annualized).
  pub expected_return: f64,
  /// Portfolio volatility.
  pub volatility: f64,
  /// Sharpe ratio computed as `(expected_return - risk_free) / volatility`.
  pub sharpe: f64,
}

/// Raw solver output, index-aligned with the instrument set.
#[derive(Clone, Debug, Default)]
pub struct SolverResult {
  /// Raw (pre-repair) portfolio weights.
  pub weights: Vec<f64>,
  /// Model expected portfolio return.
  pub expected_return: f64,
  /// Model portfolio volatility.
  pub volatility: f64,
  /// Sharpe ratio at the solver's risk-free rate.
  pub sharpe: f64,
}

/// Final output of an allocation request.
#[derive(Clone, Debug, Default)]
pub struct AllocationReport {
  /// Repaired weights per ticker. May sum below 1 when caps are infeasible.
  pub weights: BTreeMap<String, f64>,
  /// Performance of the repaired weight vector.
  pub performance: PortfolioPerformance,
}

pub(crate) fn empty_solver_result() -> SolverResult {
  SolverResult::default()
}
