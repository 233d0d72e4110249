//! # Price History
//!
//! Date-aligned adjusted-close container. Per-instrument series may have
//! gaps; alignment keeps only dates every instrument quotes, so downstream
//! statistics see a rectangular panel.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::allocation::error::AllocationError;

/// Rectangular panel of adjusted closes: one row per ticker, one column per
/// date. Row order fixes index correspondence for every downstream vector
/// and matrix.
#[derive(Clone, Debug)]
pub struct PriceHistory {
  tickers: Vec<String>,
  dates: Vec<NaiveDate>,
  closes: Vec<Vec<f64>>,
}

impl PriceHistory {
  /// Build from already-aligned rows. Every row must match the date index.
  pub fn new(
    tickers: Vec<String>,
    dates: Vec<NaiveDate>,
    closes: Vec<Vec<f64>>,
  ) -> Result<Self, AllocationError> {
    if tickers.len() != closes.len() {
      return Err(AllocationError::MarketData(format!(
        "{} tickers but {} close rows",
        tickers.len(),
        closes.len()
      )));
    }
    for (ticker, row) in tickers.iter().zip(closes.iter()) {
      if row.len() != dates.len() {
        return Err(AllocationError::MarketData(format!(
          "`{ticker}` has {} closes for {} dates",
          row.len(),
          dates.len()
        )));
      }
    }

    Ok(Self {
      tickers,
      dates,
      closes,
    })
  }

  /// Inner-join per-ticker `(date, close)` series on their common dates.
  pub fn from_series(
    series: Vec<(String, Vec<(NaiveDate, f64)>)>,
  ) -> Result<Self, AllocationError> {
    if series.is_empty() {
      return Err(AllocationError::MarketData("no series supplied".to_string()));
    }

    let maps: Vec<(String, BTreeMap<NaiveDate, f64>)> = series
      .into_iter()
      .map(|(ticker, points)| (ticker, points.into_iter().collect()))
      .collect();

    let mut dates: Vec<NaiveDate> = maps[0].1.keys().copied().collect();
    for (_, map) in maps.iter().skip(1) {
      dates.retain(|d| map.contains_key(d));
    }

    if dates.is_empty() {
      return Err(AllocationError::MarketData(
        "series share no common dates".to_string(),
      ));
    }

    let mut tickers = Vec::with_capacity(maps.len());
    let mut closes = Vec::with_capacity(maps.len());
    for (ticker, map) in maps {
      closes.push(dates.iter().map(|d| map[d]).collect());
      tickers.push(ticker);
    }

    Self::new(tickers, dates, closes)
  }

  /// Restrict to a subset of tickers and a date window (inclusive).
  pub fn slice(
    &self,
    tickers: &[String],
    start: NaiveDate,
    end: NaiveDate,
  ) -> Result<Self, AllocationError> {
    let col_range: Vec<usize> = self
      .dates
      .iter()
      .enumerate()
      .filter(|(_, d)| **d >= start && **d <= end)
      .map(|(i, _)| i)
      .collect();

    if col_range.is_empty() {
      return Err(AllocationError::MarketData(format!(
        "no observations between {start} and {end}"
      )));
    }

    let mut closes = Vec::with_capacity(tickers.len());
    for ticker in tickers {
      let row = self
        .index_of(ticker)
        .ok_or_else(|| AllocationError::MarketData(format!("no history for `{ticker}`")))?;
      closes.push(col_range.iter().map(|&i| self.closes[row][i]).collect());
    }

    Self::new(
      tickers.to_vec(),
      col_range.iter().map(|&i| self.dates[i]).collect(),
      closes,
    )
  }

  /// Ordered instrument set backing this panel.
  pub fn tickers(&self) -> &[String] {
    &self.tickers
  }

  /// Common date index.
  pub fn dates(&self) -> &[NaiveDate] {
    &self.dates
  }

  /// Closes for the asset at `index`.
  pub fn closes(&self, index: usize) -> &[f64] {
    &self.closes[index]
  }

  /// Position of `ticker` in the instrument set.
  pub fn index_of(&self, ticker: &str) -> Option<usize> {
    self.tickers.iter().position(|t| t == ticker)
  }

  /// Number of aligned observations.
  pub fn len(&self) -> usize {
    self.dates.len()
  }

  pub fn is_empty(&self) -> bool {
    self.dates.is_empty()
  }

  /// Number of instruments.
  pub fn n_assets(&self) -> usize {
    self.tickers.len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  #[test]
  fn alignment_keeps_only_common_dates() {
    let history = PriceHistory::from_series(vec![
      (
        "AAA".to_string(),
        vec![
          (date(2024, 1, 2), 100.0),
          (date(2024, 1, 3), 101.0),
          (date(2024, 1, 4), 102.0),
        ],
      ),
      (
        "BBB".to_string(),
        vec![(date(2024, 1, 2), 50.0), (date(2024, 1, 4), 51.0)],
      ),
    ])
    .unwrap();

    assert_eq!(history.len(), 2);
    assert_eq!(history.dates(), &[date(2024, 1, 2), date(2024, 1, 4)]);
    assert_eq!(history.closes(0), &[100.0, 102.0]);
    assert_eq!(history.closes(1), &[50.0, 51.0]);
  }

  #[test]
  fn disjoint_series_fail() {
    let result = PriceHistory::from_series(vec![
      ("AAA".to_string(), vec![(date(2024, 1, 2), 100.0)]),
      ("BBB".to_string(), vec![(date(2024, 1, 3), 50.0)]),
    ]);

    assert!(result.is_err());
  }

  #[test]
  fn mismatched_row_length_is_rejected() {
    let result = PriceHistory::new(
      vec!["AAA".to_string()],
      vec![date(2024, 1, 2), date(2024, 1, 3)],
      vec![vec![100.0]],
    );

    assert!(result.is_err());
  }

  #[test]
  fn index_lookup_is_exact() {
    let history = PriceHistory::new(
      vec!["AAA".to_string(), "BBB".to_string()],
      vec![date(2024, 1, 2)],
      vec![vec![100.0], vec![50.0]],
    )
    .unwrap();

    assert_eq!(history.index_of("BBB"), Some(1));
    assert_eq!(history.index_of("bbb"), None);
  }
}
