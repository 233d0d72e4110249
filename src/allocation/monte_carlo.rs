//! # Monte Carlo Simulation
//!
//! $$
//! V_t = V_{t-1}\,\exp\!\left(\mu_d - \tfrac12\sigma_d^2 + \sigma_d Z_t\right)
//! $$
//!
//! Portfolio-level geometric Brownian motion from annualized statistics.
//! Drift and diffusion are scaled to daily steps; output is the percentile
//! envelope across paths.

use rand::Rng;
use rand_distr::StandardNormal;

use super::matrix::dot;
use super::matrix::mat_vec_mul;
use crate::stats::TRADING_DAYS_PER_YEAR;

/// Simulation parameters.
#[derive(Clone, Copy, Debug)]
pub struct MonteCarloConfig {
  /// Number of simulated paths.
  pub num_paths: usize,
  /// Days to simulate.
  pub horizon: usize,
  /// Starting portfolio value.
  pub initial_value: f64,
}

impl Default for MonteCarloConfig {
  fn default() -> Self {
    Self {
      num_paths: 1000,
      horizon: TRADING_DAYS_PER_YEAR,
      initial_value: 10_000.0,
    }
  }
}

/// Percentile envelope of the simulated portfolio value.
#[derive(Clone, Debug, Default)]
pub struct MonteCarloSummary {
  /// Day offsets, `0..horizon`.
  pub days: Vec<usize>,
  /// 10th percentile per day.
  pub p10: Vec<f64>,
  /// Median per day.
  pub p50: Vec<f64>,
  /// 90th percentile per day.
  pub p90: Vec<f64>,
  /// Lowest terminal value.
  pub final_min: f64,
  /// Highest terminal value.
  pub final_max: f64,
  /// Mean terminal value.
  pub final_mean: f64,
}

/// Simulate with a caller-supplied RNG; deterministic under a seeded one.
pub fn simulate_portfolio_with_rng<R: Rng>(
  mu: &[f64],
  cov: &[Vec<f64>],
  weights: &[f64],
  config: &MonteCarloConfig,
  rng: &mut R,
) -> MonteCarloSummary {
  if config.num_paths == 0 || config.horizon == 0 || weights.is_empty() {
    return MonteCarloSummary::default();
  }

  let port_return = dot(weights, mu);
  let sigma_w = mat_vec_mul(cov, weights);
  let port_vol = dot(weights, &sigma_w).max(0.0).sqrt();

  let dt = 1.0 / TRADING_DAYS_PER_YEAR as f64;
  let daily_return = port_return * dt;
  let daily_vol = port_vol * dt.sqrt();
  let drift = daily_return - 0.5 * daily_vol * daily_vol;

  let mut values = vec![vec![config.initial_value; config.num_paths]; config.horizon];
  for t in 1..config.horizon {
    for path in 0..config.num_paths {
      let z: f64 = rng.sample(StandardNormal);
      values[t][path] = values[t - 1][path] * (drift + daily_vol * z).exp();
    }
  }

  let mut p10 = Vec::with_capacity(config.horizon);
  let mut p50 = Vec::with_capacity(config.horizon);
  let mut p90 = Vec::with_capacity(config.horizon);
  for day in &values {
    let mut sorted = day.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    p10.push(percentile(&sorted, 0.10));
    p50.push(percentile(&sorted, 0.50));
    p90.push(percentile(&sorted, 0.90));
  }

  let terminal = &values[config.horizon - 1];
  let final_min = terminal.iter().cloned().fold(f64::INFINITY, f64::min);
  let final_max = terminal.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
  let final_mean = terminal.iter().sum::<f64>() / terminal.len() as f64;

  MonteCarloSummary {
    days: (0..config.horizon).collect(),
    p10,
    p50,
    p90,
    final_min,
    final_max,
    final_mean,
  }
}

/// Simulate with the thread-local RNG.
pub fn simulate_portfolio(
  mu: &[f64],
  cov: &[Vec<f64>],
  weights: &[f64],
  config: &MonteCarloConfig,
) -> MonteCarloSummary {
  simulate_portfolio_with_rng(mu, cov, weights, config, &mut rand::thread_rng())
}

/// Nearest-rank percentile on a sorted slice.
fn percentile(sorted: &[f64], p: f64) -> f64 {
  if sorted.is_empty() {
    return 0.0;
  }
  let rank = ((sorted.len() - 1) as f64 * p).round() as usize;
  sorted[rank]
}
