//! # Allocation Errors
//!
//! Typed failure modes for the allocation pipeline. Validation errors fail
//! fast with no partial result; numerical edge cases inside the
//! redistribution loop terminate instead of raising.

use thiserror::Error;

/// Errors surfaced by the allocation pipeline.
#[derive(Debug, Error)]
pub enum AllocationError {
  /// A view or constraint references a ticker outside the instrument set.
  #[error("unknown asset `{ticker}`: not in the instrument set")]
  UnknownAsset { ticker: String },

  /// Black-Litterman was invoked without any views.
  #[error("views must be set before Black-Litterman optimization")]
  ViewsNotSet,

  /// A derived quantity was requested before its prerequisite existed.
  #[error("precomputation missing: {0}")]
  Precomputation(&'static str),

  /// A matrix inversion failed; the covariance input is not positive-definite.
  #[error("covariance matrix is singular or ill-conditioned")]
  SingularCovariance,

  /// A maximum-weight constraint lies outside [0, 1].
  #[error("invalid constraint for `{ticker}`: cap {cap} outside [0, 1]")]
  InvalidConstraint { ticker: String, cap: f64 },

  /// Too few aligned observations to estimate statistics.
  #[error("insufficient history: {0}")]
  InsufficientHistory(&'static str),

  /// The market-data boundary failed to produce a usable series.
  #[error("market data unavailable: {0}")]
  MarketData(String),
}
