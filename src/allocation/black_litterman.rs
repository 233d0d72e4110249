//! # Black-Litterman Posterior
//!
//! $$
//! \mathbb E[R] = \pi + \tau\Sigma P^\top\left(P\tau\Sigma P^\top+\Omega\right)^{-1}(Q-P\pi)
//! $$
//!
//! Closed-form blend of the prior return distribution with investor views.
//! Only the k×k view-space system is inverted, so the asset-space covariance
//! never has to be; an ill-conditioned view system still surfaces as
//! [`AllocationError::SingularCovariance`].

use super::error::AllocationError;
use super::matrix::mat_add;
use super::matrix::mat_inverse;
use super::matrix::mat_mul;
use super::matrix::mat_scale;
use super::matrix::mat_sub;
use super::matrix::mat_vec_mul;
use super::matrix::transpose;

/// Scale applied to the prior covariance inside the posterior update.
pub const DEFAULT_TAU: f64 = 0.05;

/// Posterior return distribution after incorporating views.
#[derive(Clone, Debug)]
pub struct Posterior {
  /// Blended expected returns, index-aligned with the instrument set.
  pub expected_returns: Vec<f64>,
  /// Blended covariance matrix.
  pub covariance: Vec<Vec<f64>>,
}

/// Blend prior `(pi, sigma)` with views `(p, q, omega)`.
///
/// `omega` is the diagonal of the view-uncertainty matrix. Views must be
/// present; the blender never silently falls back to the prior.
pub fn blend_posterior(
  pi: &[f64],
  sigma: &[Vec<f64>],
  p: &[Vec<f64>],
  q: &[f64],
  omega: &[f64],
  tau: f64,
) -> Result<Posterior, AllocationError> {
  if p.is_empty() || q.is_empty() {
    return Err(AllocationError::ViewsNotSet);
  }

  let k = p.len();
  let tau_sigma = mat_scale(sigma, tau);
  let p_t = transpose(p);

  // A = P (tau Sigma) P^T + Omega, the k×k view-space system.
  let p_tau_sigma = mat_mul(p, &tau_sigma);
  let mut a = mat_mul(&p_tau_sigma, &p_t);
  for i in 0..k {
    a[i][i] += omega[i];
  }

  let a_inv = mat_inverse(&a).ok_or(AllocationError::SingularCovariance)?;

  // Gain = tau Sigma P^T A^{-1}, mapping view residuals back to asset space.
  let tau_sigma_pt = mat_mul(&tau_sigma, &p_t);
  let gain = mat_mul(&tau_sigma_pt, &a_inv);

  let p_pi = mat_vec_mul(p, pi);
  let residual: Vec<f64> = q.iter().zip(p_pi.iter()).map(|(qi, pp)| qi - pp).collect();

  let adjustment = mat_vec_mul(&gain, &residual);
  let expected_returns: Vec<f64> = pi
    .iter()
    .zip(adjustment.iter())
    .map(|(prior, adj)| prior + adj)
    .collect();

  // Sigma_post = Sigma + tau Sigma - Gain P (tau Sigma).
  let shrink = mat_mul(&gain, &p_tau_sigma);
  let covariance = mat_sub(&mat_add(sigma, &tau_sigma), &shrink);

  Ok(Posterior {
    expected_returns,
    covariance,
  })
}
