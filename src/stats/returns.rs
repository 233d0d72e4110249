//! # Expected Return Estimators
//!
//! $$
//! \mathbb E[R_i] = r_f + \beta_i\,(\mathbb E[R_m] - r_f)
//! $$
//!
//! Prior strategies for the allocation pipeline. Mean-historical compounds
//! the observed mean return; the CAPM prior regresses each asset on a market
//! benchmark and prices it off the equilibrium premium.

use linreg::linear_regression;

use super::data::align_return_series;
use super::data::pct_returns_series;
use super::data::sample_mean;
use crate::allocation::error::AllocationError;
use crate::market::PriceHistory;

/// Annualization frequency for daily observations.
pub const TRADING_DAYS_PER_YEAR: usize = 252;

/// Strategy producing one expected return per instrument.
pub trait ExpectedReturnEstimator {
  /// Expected annualized returns, index-aligned with `history.tickers()`.
  fn expected_returns(&self, history: &PriceHistory) -> Result<Vec<f64>, AllocationError>;
}

/// Compounded annualized mean of historical percent returns.
#[derive(Clone, Copy, Debug)]
pub struct MeanHistoricalReturn {
  /// Observations per year used for compounding.
  pub frequency: usize,
}

impl Default for MeanHistoricalReturn {
  fn default() -> Self {
    Self {
      frequency: TRADING_DAYS_PER_YEAR,
    }
  }
}

impl ExpectedReturnEstimator for MeanHistoricalReturn {
  fn expected_returns(&self, history: &PriceHistory) -> Result<Vec<f64>, AllocationError> {
    if history.len() < 2 {
      return Err(AllocationError::InsufficientHistory(
        "at least two observations are needed for a return",
      ));
    }

    let mut out = Vec::with_capacity(history.n_assets());
    for i in 0..history.n_assets() {
      let rets = pct_returns_series(history.closes(i));
      let mean = sample_mean(&rets);
      out.push((1.0 + mean).powi(self.frequency as i32) - 1.0);
    }

    Ok(out)
  }
}

/// CAPM equilibrium prior off a market benchmark.
///
/// Betas are regression slopes of asset returns on market returns over the
/// common tail; degenerate series fall back to a beta of zero rather than
/// failing the whole request.
#[derive(Clone, Debug)]
pub struct CapmEquilibrium {
  market_closes: Vec<f64>,
  risk_free_rate: f64,
  frequency: usize,
}

impl CapmEquilibrium {
  pub fn new(market_closes: Vec<f64>, risk_free_rate: f64) -> Self {
    Self {
      market_closes,
      risk_free_rate,
      frequency: TRADING_DAYS_PER_YEAR,
    }
  }

  /// Take the risk-free rate from the latest value of a treasury-yield
  /// series quoted in percent (e.g. a 3-month T-bill proxy).
  pub fn from_yield_series(
    market_closes: Vec<f64>,
    treasury_yields: &[f64],
  ) -> Result<Self, AllocationError> {
    let last = treasury_yields.last().ok_or(AllocationError::InsufficientHistory(
      "empty treasury-yield series",
    ))?;

    Ok(Self::new(market_closes, last / 100.0))
  }

  /// Annualized benchmark return from its historical mean.
  fn market_return(&self, market_returns: &[f64]) -> f64 {
    let mean = sample_mean(market_returns);
    (1.0 + mean).powi(self.frequency as i32) - 1.0
  }

  fn beta(asset_returns: &[f64], market_returns: &[f64]) -> f64 {
    if asset_returns.len() < 2 || market_returns.len() < 2 {
      return 0.0;
    }
    match linear_regression::<f64, f64, f64>(market_returns, asset_returns) {
      Ok((slope, _)) => slope,
      Err(_) => 0.0,
    }
  }
}

impl ExpectedReturnEstimator for CapmEquilibrium {
  fn expected_returns(&self, history: &PriceHistory) -> Result<Vec<f64>, AllocationError> {
    if history.len() < 2 {
      return Err(AllocationError::InsufficientHistory(
        "at least two observations are needed for a return",
      ));
    }
    if self.market_closes.len() < 2 {
      return Err(AllocationError::InsufficientHistory(
        "market benchmark series too short",
      ));
    }

    let market_rets = pct_returns_series(&self.market_closes);
    let premium = self.market_return(&market_rets) - self.risk_free_rate;

    let mut out = Vec::with_capacity(history.n_assets());
    for i in 0..history.n_assets() {
      let asset_rets = pct_returns_series(history.closes(i));
      let aligned = align_return_series(&[asset_rets, market_rets.clone()]);
      let beta = Self::beta(&aligned[0], &aligned[1]);
      out.push(self.risk_free_rate + beta * premium);
    }

    Ok(out)
  }
}
