//! # Statistics
//!
//! $$
//! \hat\Sigma_{ij} = \frac{252}{T-1}\sum_t (r_{it}-\bar r_i)(r_{jt}-\bar r_j)
//! $$
//!
//! Baseline estimators feeding the allocation core: return preprocessing,
//! expected-return strategies and the sample covariance. Estimators are
//! pluggable; the engine only depends on the traits.

pub mod covariance;
pub mod data;
pub mod returns;

pub use covariance::CovarianceEstimator;
pub use covariance::SampleCovariance;
pub use data::align_return_series;
pub use data::pct_returns_series;
pub use data::sample_covariance;
pub use returns::CapmEquilibrium;
pub use returns::ExpectedReturnEstimator;
pub use returns::MeanHistoricalReturn;
pub use returns::TRADING_DAYS_PER_YEAR;
