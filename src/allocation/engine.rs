//! # Allocation Engine
//!
//! $$
//! \text{prices} \to (\pi, \Sigma) \to [\text{views}] \to \mathbf{w}_{\text{raw}} \to \mathbf{w}_{\text{capped}}
//! $$
//!
//! Orchestration of one allocation request: validation, optional posterior
//! blending, solving, and weight-cap repair. Each request is independent and
//! immutable; the engine keeps no state between calls.

use std::collections::BTreeMap;

use tracing::info;

use super::black_litterman::blend_posterior;
use super::black_litterman::DEFAULT_TAU;
use super::constraints::apply_weight_caps;
use super::error::AllocationError;
use super::solver::portfolio_performance;
use super::solver::solve_with_strategy;
use super::types::AllocationReport;
use super::types::Strategy;
use super::views::encode_views;
use super::views::view_uncertainty;
use super::views::View;
use crate::market::PriceHistory;
use crate::stats::CovarianceEstimator;
use crate::stats::ExpectedReturnEstimator;

/// Default risk-free rate for Sharpe computations.
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.02;

/// One allocation request: one instrument set, one constraint set, one set
/// of views. Never persisted, never mutated by the pipeline.
#[derive(Clone, Debug)]
pub struct AllocationRequest {
  /// Ordered instrument set; order fixes index correspondence throughout.
  pub tickers: Vec<String>,
  /// Allocation strategy.
  pub strategy: Strategy,
  /// Investor views; required for [`Strategy::BlackLitterman`], ignored
  /// otherwise.
  pub views: Vec<View>,
  /// Per-asset maximum weights in [0, 1]. Unlisted tickers are uncapped.
  pub constraints: BTreeMap<String, f64>,
  /// Risk-free rate for Sharpe computations.
  pub risk_free_rate: f64,
  /// Scale for the default view-uncertainty estimate; smaller means more
  /// confidence in the views.
  pub omega_tau: f64,
  /// Explicit Omega diagonal, bypassing the proportional-to-prior default.
  pub omega: Option<Vec<f64>>,
}

impl AllocationRequest {
  pub fn new(tickers: Vec<String>, strategy: Strategy) -> Self {
    Self {
      tickers,
      strategy,
      views: Vec::new(),
      constraints: BTreeMap::new(),
      risk_free_rate: DEFAULT_RISK_FREE_RATE,
      omega_tau: DEFAULT_TAU,
      omega: None,
    }
  }
}

/// Engine-level configuration shared across requests.
#[derive(Clone, Copy, Debug)]
pub struct AllocationConfig {
  /// Scale applied to the prior covariance inside the posterior blend.
  pub tau: f64,
}

impl Default for AllocationConfig {
  fn default() -> Self {
    Self { tau: DEFAULT_TAU }
  }
}

/// Entry point mapping requests plus statistics to repaired weights.
#[derive(Clone, Debug, Default)]
pub struct AllocationEngine {
  config: AllocationConfig,
}

impl AllocationEngine {
  /// Construct an engine with explicit configuration.
  pub fn new(config: AllocationConfig) -> Self {
    Self { config }
  }

  /// Borrow engine configuration.
  pub fn config(&self) -> &AllocationConfig {
    &self.config
  }

  /// Allocate from already-estimated statistics.
  ///
  /// `mu` and `cov` must be index-aligned with `request.tickers`. Validation
  /// errors fail fast with no partial result; an infeasible constraint set
  /// is not an error and shows up as a weight sum below 1.
  pub fn allocate(
    &self,
    request: &AllocationRequest,
    mu: &[f64],
    cov: &[Vec<f64>],
  ) -> Result<AllocationReport, AllocationError> {
    let n = request.tickers.len();
    self.validate(request, mu, cov)?;

    info!(
      strategy = ?request.strategy,
      assets = n,
      views = request.views.len(),
      "allocating"
    );

    let (mu_eff, cov_eff) = match request.strategy {
      Strategy::BlackLitterman => {
        let (p, q) = encode_views(&request.tickers, &request.views)?;
        let omega = match &request.omega {
          Some(omega) => omega.clone(),
          None => view_uncertainty(&p, cov, request.omega_tau)?,
        };
        let posterior = blend_posterior(mu, cov, &p, &q, &omega, self.config.tau)?;
        (posterior.expected_returns, posterior.covariance)
      }
      _ => (mu.to_vec(), cov.to_vec()),
    };

    let raw = solve_with_strategy(
      request.strategy,
      &mu_eff,
      &cov_eff,
      request.risk_free_rate,
    );

    let caps: Vec<f64> = request
      .tickers
      .iter()
      .map(|t| request.constraints.get(t).copied().unwrap_or(1.0))
      .collect();
    let repaired = apply_weight_caps(&raw.weights, &caps);

    let performance =
      portfolio_performance(&repaired, &mu_eff, &cov_eff, request.risk_free_rate);

    let weights = request
      .tickers
      .iter()
      .cloned()
      .zip(repaired)
      .collect::<BTreeMap<String, f64>>();

    Ok(AllocationReport {
      weights,
      performance,
    })
  }

  /// Allocate from price history via the configured estimator strategies.
  pub fn allocate_from_history(
    &self,
    request: &AllocationRequest,
    history: &PriceHistory,
    returns: &dyn ExpectedReturnEstimator,
    covariance: &dyn CovarianceEstimator,
  ) -> Result<AllocationReport, AllocationError> {
    let mu = returns.expected_returns(history)?;
    let cov = covariance.covariance(history)?;

    self.allocate(request, &mu, &cov)
  }

  fn validate(
    &self,
    request: &AllocationRequest,
    mu: &[f64],
    cov: &[Vec<f64>],
  ) -> Result<(), AllocationError> {
    let n = request.tickers.len();
    if n < 2 {
      return Err(AllocationError::InsufficientHistory(
        "at least two instruments are required",
      ));
    }
    if mu.len() != n || cov.len() != n || cov.iter().any(|row| row.len() != n) {
      return Err(AllocationError::Precomputation(
        "statistics are not aligned with the instrument set",
      ));
    }

    for (ticker, cap) in &request.constraints {
      if !request.tickers.iter().any(|t| t == ticker) {
        return Err(AllocationError::UnknownAsset {
          ticker: ticker.clone(),
        });
      }
      if !(0.0..=1.0).contains(cap) {
        return Err(AllocationError::InvalidConstraint {
          ticker: ticker.clone(),
          cap: *cap,
        });
      }
    }

    if request.strategy == Strategy::BlackLitterman {
      if request.views.is_empty() {
        return Err(AllocationError::ViewsNotSet);
      }
      if let Some(omega) = &request.omega {
        if omega.len() != request.views.len() {
          return Err(AllocationError::Precomputation(
            "omega diagonal does not match the view count",
          ));
        }
      }
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::stats::MeanHistoricalReturn;
  use crate::stats::SampleCovariance;
  use approx::assert_abs_diff_eq;
  use chrono::NaiveDate;
  use tracing_test::traced_test;

  fn tickers(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
  }

  fn two_asset_stats() -> (Vec<f64>, Vec<Vec<f64>>) {
    let mu = vec![0.08, 0.08];
    let cov = vec![vec![0.04, 0.005], vec![0.005, 0.05]];
    (mu, cov)
  }

  #[test]
  fn max_sharpe_respects_caps_and_preserves_the_sum() {
    let (mu, cov) = two_asset_stats();
    let mut request = AllocationRequest::new(tickers(&["A", "B"]), Strategy::MaxSharpe);
    request.constraints.insert("A".to_string(), 0.3);

    let report = AllocationEngine::default()
      .allocate(&request, &mu, &cov)
      .unwrap();

    assert!(report.weights["A"] <= 0.3 + 1e-5);
    let total: f64 = report.weights.values().sum();
    assert_abs_diff_eq!(total, 1.0, epsilon = 1e-4);
  }

  #[test]
  fn black_litterman_requires_views() {
    let (mu, cov) = two_asset_stats();
    let request = AllocationRequest::new(tickers(&["A", "B"]), Strategy::BlackLitterman);

    let err = AllocationEngine::default()
      .allocate(&request, &mu, &cov)
      .unwrap_err();
    assert!(matches!(err, AllocationError::ViewsNotSet));
  }

  #[test]
  fn black_litterman_tilts_toward_the_viewed_asset() {
    let (mu, cov) = two_asset_stats();
    let mut request = AllocationRequest::new(tickers(&["A", "B"]), Strategy::BlackLitterman);
    request.views.push(View::Absolute {
      asset: "A".to_string(),
      expected_return: 0.30,
    });
    request.omega_tau = 0.01;

    let report = AllocationEngine::default()
      .allocate(&request, &mu, &cov)
      .unwrap();

    assert!(report.weights["A"] > report.weights["B"]);
  }

  #[test]
  fn explicit_omega_must_match_view_count() {
    let (mu, cov) = two_asset_stats();
    let mut request = AllocationRequest::new(tickers(&["A", "B"]), Strategy::BlackLitterman);
    request.views.push(View::Absolute {
      asset: "A".to_string(),
      expected_return: 0.10,
    });
    request.omega = Some(vec![0.001, 0.001]);

    let err = AllocationEngine::default()
      .allocate(&request, &mu, &cov)
      .unwrap_err();
    assert!(matches!(err, AllocationError::Precomputation(_)));
  }

  #[test]
  fn unknown_constraint_ticker_fails_fast() {
    let (mu, cov) = two_asset_stats();
    let mut request = AllocationRequest::new(tickers(&["A", "B"]), Strategy::MaxSharpe);
    request.constraints.insert("ZZZ".to_string(), 0.5);

    let err = AllocationEngine::default()
      .allocate(&request, &mu, &cov)
      .unwrap_err();
    assert!(matches!(err, AllocationError::UnknownAsset { .. }));
  }

  #[test]
  fn out_of_range_cap_fails_fast() {
    let (mu, cov) = two_asset_stats();
    let mut request = AllocationRequest::new(tickers(&["A", "B"]), Strategy::MaxSharpe);
    request.constraints.insert("A".to_string(), 1.5);

    let err = AllocationEngine::default()
      .allocate(&request, &mu, &cov)
      .unwrap_err();
    assert!(matches!(err, AllocationError::InvalidConstraint { .. }));
  }

  #[test]
  fn single_instrument_is_rejected() {
    let request = AllocationRequest::new(tickers(&["A"]), Strategy::MaxSharpe);
    let err = AllocationEngine::default()
      .allocate(&request, &[0.08], &[vec![0.04]])
      .unwrap_err();
    assert!(matches!(err, AllocationError::InsufficientHistory(_)));
  }

  #[test]
  #[traced_test]
  fn infeasible_caps_warn_and_sum_below_one() {
    let mu = vec![0.08, 0.09, 0.07, 0.08];
    let cov = vec![
      vec![0.04, 0.0, 0.0, 0.0],
      vec![0.0, 0.05, 0.0, 0.0],
      vec![0.0, 0.0, 0.03, 0.0],
      vec![0.0, 0.0, 0.0, 0.06],
    ];
    let mut request =
      AllocationRequest::new(tickers(&["A", "B", "C", "D"]), Strategy::MinVolatility);
    for t in ["A", "B", "C", "D"] {
      request.constraints.insert(t.to_string(), 0.1);
    }

    let report = AllocationEngine::default()
      .allocate(&request, &mu, &cov)
      .unwrap();

    let total: f64 = report.weights.values().sum();
    assert_abs_diff_eq!(total, 0.4, epsilon = 0.1);
    assert!(logs_contain("jointly infeasible"));
  }

  #[test]
  fn allocates_from_history_through_the_estimator_traits() {
    let dates: Vec<NaiveDate> = (0..6)
      .map(|i| {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i as i64)
      })
      .collect();
    let history = PriceHistory::new(
      tickers(&["A", "B"]),
      dates,
      vec![
        vec![100.0, 101.0, 100.5, 102.0, 103.0, 102.5],
        vec![50.0, 50.2, 50.1, 50.6, 50.4, 50.9],
      ],
    )
    .unwrap();

    let request = AllocationRequest::new(tickers(&["A", "B"]), Strategy::Hrp);
    let report = AllocationEngine::default()
      .allocate_from_history(
        &request,
        &history,
        &MeanHistoricalReturn::default(),
        &SampleCovariance::default(),
      )
      .unwrap();

    let total: f64 = report.weights.values().sum();
    assert_abs_diff_eq!(total, 1.0, epsilon = 1e-4);
  }
}
