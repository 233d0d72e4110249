//! # Covariance Estimators
//!
//! Risk-model strategies for the allocation pipeline.

use super::data::align_return_series;
use super::data::pct_returns_series;
use super::data::sample_covariance;
use super::returns::TRADING_DAYS_PER_YEAR;
use crate::allocation::error::AllocationError;
use crate::market::PriceHistory;

/// Strategy producing the instrument covariance matrix.
pub trait CovarianceEstimator {
  /// Annualized covariance, index-aligned with `history.tickers()`.
  fn covariance(&self, history: &PriceHistory) -> Result<Vec<Vec<f64>>, AllocationError>;
}

/// Annualized sample covariance of percent returns.
#[derive(Clone, Copy, Debug)]
pub struct SampleCovariance {
  /// Observations per year used for annualization.
  pub frequency: usize,
}

impl Default for SampleCovariance {
  fn default() -> Self {
    Self {
      frequency: TRADING_DAYS_PER_YEAR,
    }
  }
}

impl CovarianceEstimator for SampleCovariance {
  fn covariance(&self, history: &PriceHistory) -> Result<Vec<Vec<f64>>, AllocationError> {
    if history.len() < 3 {
      return Err(AllocationError::InsufficientHistory(
        "at least three observations are needed for a sample covariance",
      ));
    }

    let returns: Vec<Vec<f64>> = (0..history.n_assets())
      .map(|i| pct_returns_series(history.closes(i)))
      .collect();
    let aligned = align_return_series(&returns);

    Ok(sample_covariance(&aligned, self.frequency as f64))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use approx::assert_abs_diff_eq;
  use chrono::NaiveDate;

  fn history(rows: Vec<(&str, Vec<f64>)>) -> PriceHistory {
    let t = rows[0].1.len();
    let dates: Vec<NaiveDate> = (0..t)
      .map(|i| {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i as i64)
      })
      .collect();
    let (tickers, closes): (Vec<String>, Vec<Vec<f64>>) = rows
      .into_iter()
      .map(|(ticker, row)| (ticker.to_string(), row))
      .unzip();

    PriceHistory::new(tickers, dates, closes).unwrap()
  }

  #[test]
  fn sample_covariance_is_symmetric_with_positive_diagonal() {
    let h = history(vec![
      ("AAA", vec![100.0, 101.0, 99.5, 102.0, 101.2]),
      ("BBB", vec![50.0, 50.4, 49.9, 50.8, 50.2]),
    ]);
    let cov = SampleCovariance::default().covariance(&h).unwrap();

    assert_eq!(cov.len(), 2);
    assert_abs_diff_eq!(cov[0][1], cov[1][0], epsilon = 1e-15);
    assert!(cov[0][0] > 0.0);
    assert!(cov[1][1] > 0.0);
  }

  #[test]
  fn too_short_history_is_rejected() {
    let h = history(vec![("AAA", vec![100.0, 101.0])]);
    let err = SampleCovariance::default().covariance(&h).unwrap_err();

    assert!(matches!(err, AllocationError::InsufficientHistory(_)));
  }
}
