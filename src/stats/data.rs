//! # Return Preprocessing
//!
//! $$
//! r_t = \frac{p_t - p_{t-1}}{p_{t-1}}
//! $$
//!
//! Helpers for return-series construction and covariance/correlation
//! assembly.

pub(crate) fn sample_mean(xs: &[f64]) -> f64 {
  if xs.is_empty() {
    0.0
  } else {
    xs.iter().sum::<f64>() / xs.len() as f64
  }
}

/// Convert close prices to simple percent-return series.
///
/// Observations with a non-positive predecessor are skipped.
pub fn pct_returns_series(closes: &[f64]) -> Vec<f64> {
  let mut out = Vec::with_capacity(closes.len().saturating_sub(1));
  for i in 1..closes.len() {
    if closes[i - 1] > 0.0 {
      out.push((closes[i] - closes[i - 1]) / closes[i - 1]);
    }
  }
  out
}

/// Align multiple return series to common tail length.
pub fn align_return_series(all_returns: &[Vec<f64>]) -> Vec<Vec<f64>> {
  let min_len = all_returns.iter().map(|r| r.len()).min().unwrap_or(0);
  all_returns
    .iter()
    .map(|r| r[r.len().saturating_sub(min_len)..].to_vec())
    .collect()
}

/// Annualized sample covariance matrix of aligned return series.
pub fn sample_covariance(aligned_returns: &[Vec<f64>], periods_per_year: f64) -> Vec<Vec<f64>> {
  let n = aligned_returns.len();
  let t = aligned_returns.first().map(|r| r.len()).unwrap_or(0);
  let mut cov = vec![vec![0.0; n]; n];
  if t < 2 {
    return cov;
  }

  let means: Vec<f64> = aligned_returns.iter().map(|r| sample_mean(r)).collect();

  for i in 0..n {
    for j in i..n {
      let mut acc = 0.0;
      for k in 0..t {
        acc += (aligned_returns[i][k] - means[i]) * (aligned_returns[j][k] - means[j]);
      }
      let c = acc / (t - 1) as f64 * periods_per_year;
      cov[i][j] = c;
      cov[j][i] = c;
    }
  }

  cov
}

pub(crate) fn corr_from_cov(cov: &[Vec<f64>]) -> Vec<Vec<f64>> {
  let n = cov.len();
  let mut corr = vec![vec![0.0; n]; n];

  for i in 0..n {
    let vi = cov
      .get(i)
      .and_then(|row| row.get(i))
      .copied()
      .unwrap_or(0.0)
      .max(0.0);
    let si = vi.sqrt();

    for j in 0..n {
      let vj = cov
        .get(j)
        .and_then(|row| row.get(j))
        .copied()
        .unwrap_or(0.0)
        .max(0.0);
      let sj = vj.sqrt();
      let cij = cov
        .get(i)
        .and_then(|row| row.get(j))
        .copied()
        .unwrap_or(0.0);

      let denom = si * sj;
      corr[i][j] = if i == j {
        1.0
      } else if denom > 1e-15 {
        (cij / denom).clamp(-1.0, 1.0)
      } else {
        0.0
      };
    }
  }

  corr
}
