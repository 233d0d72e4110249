//! # Allocation Solvers
//!
//! $$
//! \min_{\mathbf{x}} \ \mathcal{L}(\operatorname{softmax}(\mathbf{x}))
//! $$
//!
//! Long-only solvers over the weight simplex. Mean-variance objectives run
//! Nelder-Mead on softmax-parameterized weights; HRP works on the
//! correlation structure alone and never inverts the covariance matrix, so
//! it stays usable when the covariance is ill-conditioned.

use argmin::core::CostFunction;
use argmin::core::Executor;
use argmin::solver::neldermead::NelderMead;

use super::matrix::dot;
use super::matrix::mat_vec_mul;
use super::types::empty_solver_result;
use super::types::PortfolioPerformance;
use super::types::SolverResult;
use super::types::Strategy;
use crate::stats::data::corr_from_cov;

fn softmax(x: &[f64]) -> Vec<f64> {
  if x.is_empty() {
    return Vec::new();
  }

  let max_x = x.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
  let exps: Vec<f64> = x.iter().map(|&v| (v - max_x).exp()).collect();
  let sum: f64 = exps.iter().sum();

  if sum < 1e-15 {
    vec![1.0 / x.len() as f64; x.len()]
  } else {
    exps.iter().map(|&e| e / sum).collect()
  }
}

pub(crate) fn portfolio_performance(
  w: &[f64],
  mu: &[f64],
  cov: &[Vec<f64>],
  risk_free: f64,
) -> PortfolioPerformance {
  let expected_return = dot(w, mu);
  let sigma_w = mat_vec_mul(cov, w);
  let volatility = dot(w, &sigma_w).max(0.0).sqrt();
  let sharpe = if volatility > 1e-15 {
    (expected_return - risk_free) / volatility
  } else {
    0.0
  };

  PortfolioPerformance {
    expected_return,
    volatility,
    sharpe,
  }
}

fn with_performance(w: Vec<f64>, mu: &[f64], cov: &[Vec<f64>], risk_free: f64) -> SolverResult {
  let perf = portfolio_performance(&w, mu, cov, risk_free);

  SolverResult {
    weights: w,
    expected_return: perf.expected_return,
    volatility: perf.volatility,
    sharpe: perf.sharpe,
  }
}

/// Run Nelder-Mead from the axis-aligned simplex; equal weights on failure.
fn run_simplex<C>(cost: C, n: usize) -> Vec<f64>
where
  C: CostFunction<Param = Vec<f64>, Output = f64>,
{
  let x0 = vec![0.0; n];
  let mut simplex = Vec::with_capacity(n + 1);
  simplex.push(x0.clone());
  for i in 0..n {
    let mut point = x0.clone();
    point[i] = 1.0;
    simplex.push(point);
  }

  match NelderMead::new(simplex).with_sd_tolerance(1e-8) {
    Ok(solver) => {
      match Executor::new(cost, solver)
        .configure(|state| state.max_iters(5000))
        .run()
      {
        Ok(res) => {
          let best_x = res.state.best_param.unwrap_or(x0);
          softmax(&best_x)
        }
        Err(_) => vec![1.0 / n as f64; n],
      }
    }
    Err(_) => vec![1.0 / n as f64; n],
  }
}

/// Maximize the Sharpe ratio over the long-only simplex.
pub fn optimize_max_sharpe(mu: &[f64], cov: &[Vec<f64>], risk_free: f64) -> SolverResult {
  let n = mu.len();
  if n == 0 {
    return empty_solver_result();
  }

  struct SharpeCost {
    mu: Vec<f64>,
    cov: Vec<Vec<f64>>,
    risk_free: f64,
  }

  impl CostFunction for SharpeCost {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, x: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
      let w = softmax(x);
      let sigma_w = mat_vec_mul(&self.cov, &w);
      let port_vol = dot(&w, &sigma_w).max(0.0).sqrt();
      if port_vol < 1e-15 {
        return Ok(1e10);
      }
      let port_ret = dot(&w, &self.mu);

      Ok(-(port_ret - self.risk_free) / port_vol)
    }
  }

  let w = run_simplex(
    SharpeCost {
      mu: mu.to_vec(),
      cov: cov.to_vec(),
      risk_free,
    },
    n,
  );

  with_performance(w, mu, cov, risk_free)
}

/// Minimize portfolio variance over the long-only simplex.
pub fn optimize_min_volatility(mu: &[f64], cov: &[Vec<f64>], risk_free: f64) -> SolverResult {
  let n = mu.len();
  if n == 0 {
    return empty_solver_result();
  }

  struct MinVolCost {
    cov: Vec<Vec<f64>>,
  }

  impl CostFunction for MinVolCost {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, x: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
      let w = softmax(x);
      let sigma_w = mat_vec_mul(&self.cov, &w);

      Ok(dot(&w, &sigma_w))
    }
  }

  let w = run_simplex(MinVolCost { cov: cov.to_vec() }, n);

  with_performance(w, mu, cov, risk_free)
}

/// Minimize variance subject to a soft target-return penalty.
///
/// Used by the efficient-frontier sweep; the penalty weight matches the
/// variance scale of annualized equity covariances.
pub fn optimize_target_return(
  mu: &[f64],
  cov: &[Vec<f64>],
  target_return: f64,
  risk_free: f64,
) -> SolverResult {
  let n = mu.len();
  if n == 0 {
    return empty_solver_result();
  }

  struct TargetCost {
    mu: Vec<f64>,
    cov: Vec<Vec<f64>>,
    target_return: f64,
    penalty: f64,
  }

  impl CostFunction for TargetCost {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, x: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
      let w = softmax(x);
      let sigma_w = mat_vec_mul(&self.cov, &w);
      let port_var = dot(&w, &sigma_w);
      let port_ret = dot(&w, &self.mu);
      let ret_penalty = (port_ret - self.target_return).powi(2);

      Ok(port_var + self.penalty * ret_penalty)
    }
  }

  let w = run_simplex(
    TargetCost {
      mu: mu.to_vec(),
      cov: cov.to_vec(),
      target_return,
      penalty: 10.0,
    },
    n,
  );

  with_performance(w, mu, cov, risk_free)
}

// Diagonal entries below this are treated as zero-variance when forming
// inverse-variance weights inside a cluster.
const VARIANCE_FLOOR: f64 = 1e-12;

/// Hierarchical Risk Parity over the correlation distance structure.
///
/// Instruments are seriated by single-linkage clustering on the correlation
/// distance, then the budget is split top-down: each segment hands the
/// larger share to whichever half carries less inverse-variance risk. The
/// per-asset weights are the product of the splits along the way, so they
/// sum to 1 by construction.
pub fn optimize_hrp(
  mu: &[f64],
  cov: &[Vec<f64>],
  corr: &[Vec<f64>],
  risk_free: f64,
) -> SolverResult {
  let n = mu.len();
  if n == 0 {
    return empty_solver_result();
  }

  if n == 1 {
    return with_performance(vec![1.0], mu, cov, risk_free);
  }

  let dist = correlation_distance(corr);
  let order = seriate_by_correlation(&dist);

  let mut weights = vec![0.0; n];
  let mut pending: Vec<(&[usize], f64)> = vec![(&order, 1.0)];
  while let Some((segment, budget)) = pending.pop() {
    if segment.len() == 1 {
      weights[segment[0]] = budget;
      continue;
    }

    let (head, tail) = segment.split_at(segment.len() / 2);
    let risk_head = cluster_variance(cov, head);
    let risk_tail = cluster_variance(cov, tail);
    let combined = risk_head + risk_tail;
    let head_share = if combined > 0.0 {
      risk_tail / combined
    } else {
      0.5
    };

    pending.push((head, budget * head_share));
    pending.push((tail, budget * (1.0 - head_share)));
  }

  with_performance(weights, mu, cov, risk_free)
}

/// Map correlations into the metric `sqrt((1 - rho) / 2)`.
fn correlation_distance(corr: &[Vec<f64>]) -> Vec<Vec<f64>> {
  corr
    .iter()
    .map(|row| {
      row
        .iter()
        .map(|&rho| (0.5 * (1.0 - rho.clamp(-1.0, 1.0))).sqrt())
        .collect()
    })
    .collect()
}

/// Quasi-diagonal instrument order from greedy single-linkage merging.
///
/// Clusters keep their member order as they merge, so the surviving list is
/// already the seriation the bisection step walks; no dendrogram is built.
fn seriate_by_correlation(dist: &[Vec<f64>]) -> Vec<usize> {
  let mut clusters: Vec<Vec<usize>> = (0..dist.len()).map(|i| vec![i]).collect();

  while clusters.len() > 1 {
    let mut closest = (0, 1);
    let mut closest_d = f64::INFINITY;
    for a in 0..clusters.len() {
      for b in (a + 1)..clusters.len() {
        let d = single_link_distance(dist, &clusters[a], &clusters[b]);
        if d < closest_d {
          closest_d = d;
          closest = (a, b);
        }
      }
    }

    let absorbed = clusters.swap_remove(closest.1);
    clusters[closest.0].extend(absorbed);
  }

  clusters.pop().unwrap_or_default()
}

fn single_link_distance(dist: &[Vec<f64>], a: &[usize], b: &[usize]) -> f64 {
  let mut min_d = f64::INFINITY;
  for &i in a {
    for &j in b {
      if dist[i][j] < min_d {
        min_d = dist[i][j];
      }
    }
  }
  min_d
}

/// Variance of a cluster under its internal inverse-variance allocation.
fn cluster_variance(cov: &[Vec<f64>], members: &[usize]) -> f64 {
  if members.len() == 1 {
    return cov[members[0]][members[0]].max(0.0);
  }

  let inverse_vars: Vec<f64> = members
    .iter()
    .map(|&i| {
      let v = cov[i][i];
      if v > VARIANCE_FLOOR {
        1.0 / v
      } else {
        0.0
      }
    })
    .collect();
  let scale: f64 = inverse_vars.iter().sum();
  if scale <= 0.0 {
    return 0.0;
  }

  let mut var = 0.0;
  for (a, &i) in members.iter().enumerate() {
    for (b, &j) in members.iter().enumerate() {
      var += (inverse_vars[a] / scale) * (inverse_vars[b] / scale) * cov[i][j];
    }
  }

  var
}

/// Dispatch a non-posterior strategy to its solver.
///
/// [`Strategy::BlackLitterman`] resolves to max-Sharpe here because the
/// engine has already blended the posterior by the time a solver runs.
pub fn solve_with_strategy(
  strategy: Strategy,
  mu: &[f64],
  cov: &[Vec<f64>],
  risk_free: f64,
) -> SolverResult {
  if mu.is_empty() {
    return empty_solver_result();
  }

  match strategy {
    Strategy::MaxSharpe | Strategy::BlackLitterman => optimize_max_sharpe(mu, cov, risk_free),
    Strategy::MinVolatility => optimize_min_volatility(mu, cov, risk_free),
    Strategy::Hrp => {
      let corr = corr_from_cov(cov);
      optimize_hrp(mu, cov, &corr, risk_free)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use approx::assert_abs_diff_eq;

  fn three_asset_inputs() -> (Vec<f64>, Vec<Vec<f64>>) {
    let mu = vec![0.08, 0.10, 0.12];
    let cov = vec![
      vec![0.04, 0.01, 0.0],
      vec![0.01, 0.09, 0.02],
      vec![0.0, 0.02, 0.16],
    ];
    (mu, cov)
  }

  #[test]
  fn max_sharpe_weights_sum_to_one() {
    let (mu, cov) = three_asset_inputs();
    let result = optimize_max_sharpe(&mu, &cov, 0.02);

    assert_abs_diff_eq!(result.weights.iter().sum::<f64>(), 1.0, epsilon = 1e-6);
    assert!(result.volatility > 0.0);
  }

  #[test]
  fn min_volatility_prefers_the_low_variance_asset() {
    let mu = vec![0.05, 0.05];
    let cov = vec![vec![0.01, 0.0], vec![0.0, 0.25]];
    let result = optimize_min_volatility(&mu, &cov, 0.0);

    assert!(result.weights[0] > result.weights[1]);
    assert_abs_diff_eq!(result.weights.iter().sum::<f64>(), 1.0, epsilon = 1e-6);
  }

  #[test]
  fn target_return_solver_tracks_the_target() {
    let (mu, cov) = three_asset_inputs();
    let result = optimize_target_return(&mu, &cov, 0.10, 0.02);

    assert_abs_diff_eq!(result.weights.iter().sum::<f64>(), 1.0, epsilon = 1e-6);
    assert!((result.expected_return - 0.10).abs() < 0.03);
  }

  #[test]
  fn hrp_weights_sum_to_one_and_stay_positive() {
    let (mu, cov) = three_asset_inputs();
    let corr = corr_from_cov(&cov);
    let result = optimize_hrp(&mu, &cov, &corr, 0.02);

    assert_abs_diff_eq!(result.weights.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
    assert!(result.weights.iter().all(|w| *w > 0.0));
  }

  #[test]
  fn hrp_single_asset_gets_full_weight() {
    let result = optimize_hrp(&[0.07], &[vec![0.04]], &[vec![1.0]], 0.0);
    assert_eq!(result.weights, vec![1.0]);
  }

  #[test]
  fn solver_handles_empty_inputs() {
    let result = solve_with_strategy(Strategy::MaxSharpe, &[], &[], 0.0);

    assert!(result.weights.is_empty());
    assert_eq!(result.expected_return, 0.0);
    assert_eq!(result.volatility, 0.0);
  }

  #[test]
  fn hrp_favors_less_volatile_clusters() {
    let mu = vec![0.08, 0.08];
    let cov = vec![vec![0.01, 0.0], vec![0.0, 0.09]];
    let corr = corr_from_cov(&cov);
    let result = optimize_hrp(&mu, &cov, &corr, 0.0);

    assert!(result.weights[0] > result.weights[1]);
  }
}
