//! # portfolio-rs
//!
//! $$
//! \mathbf{w}^\* = \arg\max_{\mathbf{w}\in\Delta^{n-1}} \frac{\mathbb E[R_p]-r_f}{\sigma_p},
//! \qquad \mathbb E[R] = \pi + \tau\Sigma P^\top (P\tau\Sigma P^\top + \Omega)^{-1}(Q - P\pi)
//! $$
//!
//! Portfolio allocation with investor views. Historical statistics feed a
//! prior (mean-historical or CAPM-implied), views are blended in through the
//! Black-Litterman update, a long-only solver produces raw weights, and a
//! cap-and-redistribute pass repairs per-asset maximum-weight violations.

pub mod allocation;
pub mod market;
pub mod stats;
