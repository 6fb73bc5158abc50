//! Partial dependence explainability
//!
//! Provides the building blocks of a PDP analysis:
//! - Evaluation grids and in-place feature perturbation
//! - One-way and two-way partial dependence
//! - Adaptive spline trend fitting
//! - Friedman's H-statistic for pairwise interaction
//! - Marginal feature distributions

mod grid;
mod interaction;
mod marginal;
mod pdp;
mod perturbation;
mod spline;
mod trend;

pub use grid::build_grid;
pub use interaction::{h_statistic, InteractionScore};
pub use marginal::{marginal_distribution, MarginalDistribution};
pub use pdp::{ClusterAssignment, OneWayPdp, PartialDependence, PdpKind, TwoWayKind, TwoWayPdp};
pub use perturbation::WorkingSample;
pub use spline::bspline_basis;
pub use trend::{TrendConfig, TrendFit, TrendFitter};
