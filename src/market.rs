//! # Market Data Boundary
//!
//! $$
//! \{(t, p_t)\}_{i=1}^{n} \longrightarrow \text{aligned } n\times T
//! $$
//!
//! Price-history container and the provider boundary. Retrieval itself
//! (network clients, ticker validation services) lives outside this crate;
//! only the interface and an in-memory implementation ship here.

pub mod history;

pub use history::PriceHistory;

use chrono::NaiveDate;

use crate::allocation::error::AllocationError;

/// Source of adjusted close prices for a set of instruments.
pub trait MarketDataProvider {
  /// Fetch adjusted closes for `tickers` between `start` and `end`
  /// (inclusive), aligned to a common date index.
  fn adjusted_closes(
    &self,
    tickers: &[String],
    start: NaiveDate,
    end: NaiveDate,
  ) -> Result<PriceHistory, AllocationError>;
}

/// Provider backed by a preloaded [`PriceHistory`].
///
/// Used in tests and backtests; a live provider would implement
/// [`MarketDataProvider`] over its own transport.
#[derive(Clone, Debug)]
pub struct InMemoryDataProvider {
  history: PriceHistory,
}

impl InMemoryDataProvider {
  pub fn new(history: PriceHistory) -> Self {
    Self { history }
  }
}

impl MarketDataProvider for InMemoryDataProvider {
  fn adjusted_closes(
    &self,
    tickers: &[String],
    start: NaiveDate,
    end: NaiveDate,
  ) -> Result<PriceHistory, AllocationError> {
    self.history.slice(tickers, start, end)
  }
}
