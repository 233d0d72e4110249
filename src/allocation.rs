//! # Allocation
//!
//! $$
//! \mathbf{w}^\top \mathbf{1} \le 1,\qquad 0 \le w_i \le c_i
//! $$
//!
//! View encoding, Black-Litterman posterior blending, long-only solvers and
//! weight-cap repair.

pub mod black_litterman;
pub mod constraints;
pub mod engine;
pub mod error;
pub mod frontier;
pub(crate) mod matrix;
pub mod monte_carlo;
pub mod solver;
pub mod types;
pub mod views;

pub use black_litterman::blend_posterior;
pub use black_litterman::Posterior;
pub use black_litterman::DEFAULT_TAU;
pub use constraints::apply_weight_caps;
pub use constraints::EXCESS_TOLERANCE;
pub use constraints::MAX_REDISTRIBUTION_PASSES;
pub use engine::AllocationConfig;
pub use engine::AllocationEngine;
pub use engine::AllocationRequest;
pub use engine::DEFAULT_RISK_FREE_RATE;
pub use error::AllocationError;
pub use frontier::efficient_frontier;
pub use frontier::FrontierPoint;
pub use monte_carlo::simulate_portfolio;
pub use monte_carlo::simulate_portfolio_with_rng;
pub use monte_carlo::MonteCarloConfig;
pub use monte_carlo::MonteCarloSummary;
pub use solver::optimize_hrp;
pub use solver::optimize_max_sharpe;
pub use solver::optimize_min_volatility;
pub use solver::optimize_target_return;
pub use solver::solve_with_strategy;
pub use types::AllocationReport;
pub use types::PortfolioPerformance;
pub use types::SolverResult;
pub use types::Strategy;
pub use views::encode_views;
pub use views::view_uncertainty;
pub use views::View;
