use anyhow::Result;
use chrono::Duration;
use chrono::NaiveDate;

use portfolio_rs::allocation::AllocationEngine;
use portfolio_rs::allocation::AllocationRequest;
use portfolio_rs::allocation::MonteCarloConfig;
use portfolio_rs::allocation::Strategy;
use portfolio_rs::allocation::View;
use portfolio_rs::allocation::simulate_portfolio;
use portfolio_rs::market::PriceHistory;
use portfolio_rs::stats::CovarianceEstimator;
use portfolio_rs::stats::ExpectedReturnEstimator;
use portfolio_rs::stats::MeanHistoricalReturn;
use portfolio_rs::stats::SampleCovariance;

fn synthetic_closes(start: f64, daily_drift: f64, wobble: f64, days: usize) -> Vec<f64> {
  let mut closes = Vec::with_capacity(days);
  let mut price = start;
  for i in 0..days {
    let cycle = (i as f64 * 0.7).sin() * wobble;
    price *= 1.0 + daily_drift + cycle;
    closes.push(price);
  }
  closes
}

fn main() -> Result<()> {
  let tickers = vec!["AAA".to_string(), "BBB".to_string(), "CCC".to_string()];
  let days = 252;
  let dates: Vec<NaiveDate> = (0..days)
    .map(|i| NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(i as i64))
    .collect();
  let history = PriceHistory::new(
    tickers.clone(),
    dates,
    vec![
      synthetic_closes(100.0, 0.0006, 0.004, days),
      synthetic_closes(250.0, 0.0004, 0.002, days),
      synthetic_closes(40.0, 0.0002, 0.007, days),
    ],
  )?;

  let mu = MeanHistoricalReturn::default().expected_returns(&history)?;
  let cov = SampleCovariance::default().covariance(&history)?;

  let mut request = AllocationRequest::new(tickers, Strategy::BlackLitterman);
  request.views.push(View::Absolute {
    asset: "AAA".to_string(),
    expected_return: 0.12,
  });
  request.views.push(View::Relative {
    asset: "BBB".to_string(),
    benchmark: "CCC".to_string(),
    outperformance: 0.03,
  });
  request.constraints.insert("AAA".to_string(), 0.5);

  let engine = AllocationEngine::default();
  let report = engine.allocate(&request, &mu, &cov)?;

  println!("Allocation (Black-Litterman, AAA capped at 0.5):");
  for (ticker, weight) in &report.weights {
    println!("  {ticker}: {weight:.5}");
  }
  println!(
    "Expected return: {:.4}, volatility: {:.4}, Sharpe: {:.4}",
    report.performance.expected_return,
    report.performance.volatility,
    report.performance.sharpe
  );

  let weights: Vec<f64> = report.weights.values().copied().collect();
  let summary = simulate_portfolio(&mu, &cov, &weights, &MonteCarloConfig::default());
  println!(
    "One-year Monte Carlo from 10000: p10 {:.0}, median {:.0}, p90 {:.0}",
    summary.p10.last().copied().unwrap_or_default(),
    summary.p50.last().copied().unwrap_or_default(),
    summary.p90.last().copied().unwrap_or_default()
  );

  Ok(())
}
