pub mod estimator;
pub mod solver;

pub use estimator::FusionEstimator;
pub use solver::solve_tdoa;
