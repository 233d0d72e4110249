//! # Weight-Cap Redistribution
//!
//! $$
//! w_i' = \min(w_i, c_i),\qquad
//! w_j' \mathrel{+}= e\,\frac{w_j}{\sum_{k\in\mathcal E} w_k}\ \ (j\in\mathcal E)
//! $$
//!
//! Repairs a raw weight vector that violates per-asset maximum-weight caps.
//! Excess above each cap is redistributed across assets still strictly below
//! their caps, in proportion to their current weight, and the pass repeats
//! until the vector is feasible or no asset can absorb more. When the caps
//! sum below 1 the result simply sums below 1; callers check the sum.

use tracing::debug;
use tracing::warn;

/// Iteration bound for the redistribution loop. Observed sufficient for
/// convergence on realistic portfolios; guards against pathological inputs.
pub const MAX_REDISTRIBUTION_PASSES: usize = 100;

/// Excess below this is treated as fully absorbed, and an asset must sit
/// more than this far below its cap to be eligible for redistribution.
pub const EXCESS_TOLERANCE: f64 = 1e-6;

// Final weights are rounded to 5 decimals for presentation stability. This
// is cosmetic, not the convergence tolerance.
const ROUND_SCALE: f64 = 1e5;

/// Clamp `weights` to `caps` and redistribute the removed excess.
///
/// Both slices are index-aligned with the instrument set; uncapped assets
/// carry a cap of 1.0. A cap exactly equal to the current weight generates
/// no excess. Zero-cap assets are fully zeroed and their weight moves to the
/// eligible set.
pub fn apply_weight_caps(weights: &[f64], caps: &[f64]) -> Vec<f64> {
  let n = weights.len();
  let mut w = weights.to_vec();

  for pass in 0..MAX_REDISTRIBUTION_PASSES {
    let mut excess = 0.0;
    let mut clamped = false;

    for i in 0..n {
      if w[i] > caps[i] {
        excess += w[i] - caps[i];
        w[i] = caps[i];
        clamped = true;
      }
    }

    if !clamped && excess < EXCESS_TOLERANCE {
      break;
    }

    let eligible: Vec<usize> = (0..n)
      .filter(|&i| w[i] < caps[i] - EXCESS_TOLERANCE)
      .collect();
    let eligible_total: f64 = eligible.iter().map(|&i| w[i]).sum();

    if eligible.is_empty() || eligible_total <= 0.0 {
      // Caps saturate below the total: nothing can absorb the excess.
      break;
    }

    debug!(
      pass,
      excess,
      eligible = eligible.len(),
      "redistributing capped weight"
    );

    for &i in &eligible {
      w[i] += excess * w[i] / eligible_total;
    }
  }

  for v in &mut w {
    *v = (*v * ROUND_SCALE).round() / ROUND_SCALE;
  }

  let total: f64 = w.iter().sum();
  if total < 1.0 - 1e-4 {
    warn!(total, "caps are jointly infeasible; weights sum below 1");
  }

  w
}
