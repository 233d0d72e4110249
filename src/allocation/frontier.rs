//! # Efficient Frontier
//!
//! $$
//! \min_{\mathbf w} \mathbf w^\top\Sigma\,\mathbf w \quad \text{s.t.}\quad \mathbf w^\top\mu = r^\*
//! $$
//!
//! Sweep of target returns across the attainable range, solving the
//! return-constrained problem at each point.

use super::solver::optimize_target_return;
use super::types::PortfolioPerformance;

/// One point on the frontier.
#[derive(Clone, Debug)]
pub struct FrontierPoint {
  /// Target return requested for this point.
  pub target_return: f64,
  /// Solved weights, index-aligned with the instrument set.
  pub weights: Vec<f64>,
  /// Performance of the solved weights.
  pub performance: PortfolioPerformance,
}

/// Trace the frontier between the lowest and highest single-asset return.
pub fn efficient_frontier(
  mu: &[f64],
  cov: &[Vec<f64>],
  risk_free: f64,
  n_points: usize,
) -> Vec<FrontierPoint> {
  if mu.is_empty() || n_points == 0 {
    return Vec::new();
  }

  let low = mu.iter().cloned().fold(f64::INFINITY, f64::min);
  let high = mu.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
  let step = if n_points > 1 {
    (high - low) / (n_points - 1) as f64
  } else {
    0.0
  };

  (0..n_points)
    .map(|i| {
      let target = low + step * i as f64;
      let result = optimize_target_return(mu, cov, target, risk_free);

      FrontierPoint {
        target_return: target,
        weights: result.weights,
        performance: PortfolioPerformance {
          expected_return: result.expected_return,
          volatility: result.volatility,
          sharpe: result.sharpe,
        },
      }
    })
    .collect()
}
