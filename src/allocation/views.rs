//! # Investor Views
//!
//! $$
//! P\,\mathbb E[R] = Q + \varepsilon,\qquad \varepsilon\sim\mathcal N(0,\Omega)
//! $$
//!
//! Encoding of view statements into the picking matrix `P` and value vector
//! `Q`, and the default proportional-to-prior-variance view uncertainty.

use super::error::AllocationError;

/// An investor belief about future returns.
///
/// Every referenced ticker must belong to the instrument set; encoding fails
/// otherwise rather than silently skipping the view.
#[derive(Clone, Debug, PartialEq)]
pub enum View {
  /// "`asset` will return `expected_return`".
  Absolute { asset: String, expected_return: f64 },
  /// "`asset` will outperform `benchmark` by `outperformance`".
  Relative {
    asset: String,
    benchmark: String,
    outperformance: f64,
  },
}

fn asset_index(tickers: &[String], asset: &str) -> Result<usize, AllocationError> {
  tickers
    .iter()
    .position(|t| t == asset)
    .ok_or_else(|| AllocationError::UnknownAsset {
      ticker: asset.to_string(),
    })
}

/// Encode views into `(P, Q)` against the ordered instrument set.
///
/// Row `i` of `P` corresponds to view `i`: a single `1.0` entry for an
/// absolute view, a `+1/-1` pair for a relative view. `Q[i]` carries the
/// stated value unmodified.
pub fn encode_views(
  tickers: &[String],
  views: &[View],
) -> Result<(Vec<Vec<f64>>, Vec<f64>), AllocationError> {
  let mut p = vec![vec![0.0; tickers.len()]; views.len()];
  let mut q = vec![0.0; views.len()];

  for (i, view) in views.iter().enumerate() {
    match view {
      View::Absolute {
        asset,
        expected_return,
      } => {
        p[i][asset_index(tickers, asset)?] = 1.0;
        q[i] = *expected_return;
      }
      View::Relative {
        asset,
        benchmark,
        outperformance,
      } => {
        p[i][asset_index(tickers, asset)?] = 1.0;
        p[i][asset_index(tickers, benchmark)?] = -1.0;
        q[i] = *outperformance;
      }
    }
  }

  Ok((p, q))
}

/// Diagonal of `Omega = diag(diag(P · diag(diag(Sigma)) · Pᵗ · tau))`.
///
/// Each view's uncertainty is proportional to the variance of the assets it
/// references, scaled by `tau`; smaller `tau` means higher confidence.
/// Cross-view covariance is discarded so `Omega` stays diagonal.
pub fn view_uncertainty(
  p: &[Vec<f64>],
  sigma: &[Vec<f64>],
  tau: f64,
) -> Result<Vec<f64>, AllocationError> {
  if p.is_empty() {
    return Err(AllocationError::Precomputation(
      "picking matrix must be encoded before view uncertainty",
    ));
  }

  let omega = p
    .iter()
    .map(|row| {
      let var: f64 = row
        .iter()
        .enumerate()
        .map(|(j, &p_ij)| p_ij * p_ij * sigma[j][j])
        .sum();
      var * tau
    })
    .collect();

  Ok(omega)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn universe() -> Vec<String> {
    vec!["AAA".to_string(), "BBB".to_string(), "CCC".to_string()]
  }

  #[test]
  fn absolute_view_sets_single_entry() {
    let views = vec![View::Absolute {
      asset: "BBB".to_string(),
      expected_return: 0.08,
    }];
    let (p, q) = encode_views(&universe(), &views).unwrap();

    assert_eq!(p.len(), 1);
    assert_eq!(p[0], vec![0.0, 1.0, 0.0]);
    assert_eq!(q, vec![0.08]);
  }

  #[test]
  fn relative_view_sets_plus_minus_pair() {
    let views = vec![View::Relative {
      asset: "CCC".to_string(),
      benchmark: "AAA".to_string(),
      outperformance: 0.02,
    }];
    let (p, q) = encode_views(&universe(), &views).unwrap();

    assert_eq!(p[0], vec![-1.0, 0.0, 1.0]);
    assert_eq!(q, vec![0.02]);
  }

  #[test]
  fn one_row_per_view_in_input_order() {
    let views = vec![
      View::Absolute {
        asset: "AAA".to_string(),
        expected_return: 0.10,
      },
      View::Relative {
        asset: "BBB".to_string(),
        benchmark: "CCC".to_string(),
        outperformance: -0.01,
      },
    ];
    let (p, q) = encode_views(&universe(), &views).unwrap();

    assert_eq!(p.len(), 2);
    let nonzero_0 = p[0].iter().filter(|v| **v != 0.0).count();
    let nonzero_1 = p[1].iter().filter(|v| **v != 0.0).count();
    assert_eq!(nonzero_0, 1);
    assert_eq!(nonzero_1, 2);
    assert_eq!(q, vec![0.10, -0.01]);
  }

  #[test]
  fn unknown_asset_fails_absolute() {
    let views = vec![View::Absolute {
      asset: "ZZZ".to_string(),
      expected_return: 0.05,
    }];
    let err = encode_views(&universe(), &views).unwrap_err();
    assert!(matches!(err, AllocationError::UnknownAsset { ticker } if ticker == "ZZZ"));
  }

  #[test]
  fn unknown_asset_fails_relative_benchmark() {
    let views = vec![View::Relative {
      asset: "AAA".to_string(),
      benchmark: "ZZZ".to_string(),
      outperformance: 0.02,
    }];
    assert!(encode_views(&universe(), &views).is_err());
  }

  #[test]
  fn omega_scales_with_referenced_variances() {
    let sigma = vec![
      vec![0.04, 0.00, 0.00],
      vec![0.00, 0.09, 0.00],
      vec![0.00, 0.00, 0.16],
    ];
    let views = vec![
      View::Absolute {
        asset: "AAA".to_string(),
        expected_return: 0.10,
      },
      View::Relative {
        asset: "BBB".to_string(),
        benchmark: "CCC".to_string(),
        outperformance: 0.02,
      },
    ];
    let (p, _) = encode_views(&universe(), &views).unwrap();
    let omega = view_uncertainty(&p, &sigma, 0.05).unwrap();

    assert!((omega[0] - 0.05 * 0.04).abs() < 1e-12);
    assert!((omega[1] - 0.05 * (0.09 + 0.16)).abs() < 1e-12);
  }

  #[test]
  fn omega_requires_picking_matrix() {
    let sigma = vec![vec![0.04]];
    let err = view_uncertainty(&[], &sigma, 0.05).unwrap_err();
    assert!(matches!(err, AllocationError::Precomputation(_)));
  }
}
