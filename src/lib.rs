//! PDP Explorer - partial dependence analysis for black-box models
//!
//! This crate explains how a prediction function responds to its inputs:
//! - One-way partial dependence curves with adaptive spline trends
//! - Two-way partial dependence surfaces with Friedman's H-statistic
//! - Clustering of response curves (DTW for shapes, deviation for the rest)
//! - Sequential or thread-pool evaluation with a private sample per task
//!
//! # Modules
//!
//! - [`data`] - Typed access to polars data frames and cell values
//! - [`metadata`] - Feature descriptors and the feature catalog
//! - [`explainability`] - Grids, perturbation, PDP evaluation, trends, interaction
//! - [`clustering`] - DTW / Euclidean k-means and cluster-count selection
//! - [`analysis`] - End-to-end runs, configuration and reports
//! - [`utils`] - Task distribution, model selection and statistics helpers
//!
//! # Example
//!
//! ```no_run
//! use pdp_explorer::prelude::*;
//! use polars::prelude::*;
//!
//! # fn main() -> pdp_explorer::Result<()> {
//! let age: Vec<f64> = (0..200).map(|i| 18.0 + (i % 63) as f64).collect();
//! let data = DataFrame::new(vec![Series::new("age".into(), &age).into()])?;
//! let catalog = FeatureCatalog::new()
//!     .with_feature("age", FeatureDescriptor::continuous(&age)?);
//!
//! let predict = |ds: &DataFrame| -> pdp_explorer::Result<ndarray::Array1<f64>> {
//!     Ok(ds.numeric("age")?.mapv(|a| 0.1 * a))
//! };
//!
//! let report = Analyzer::new(predict, catalog)
//!     .with_config(AnalysisConfig::new().with_resolution(10).with_seed(7))
//!     .run(&data, &["age"], &[])?;
//! println!("{:?}", report.one_way("age").map(|p| &p.trend));
//! # Ok(())
//! # }
//! ```

// Core error handling
pub mod error;

// Inputs
pub mod data;
pub mod metadata;

// Computation
pub mod explainability;
pub mod clustering;

// Orchestration
pub mod analysis;

// Utilities
pub mod utils;

pub use error::{PdpError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{PdpError, Result};

    // Inputs
    pub use crate::data::{FrameExt, Value};
    pub use crate::metadata::{FeatureCatalog, FeatureDescriptor, FeatureType};

    // Evaluation
    pub use crate::explainability::{
        ClusterAssignment, MarginalDistribution, OneWayPdp, PartialDependence, PdpKind,
        TrendConfig, TrendFit, TwoWayKind, TwoWayPdp, WorkingSample,
    };

    // Clustering
    pub use crate::clustering::{Cluster, ClusterKind, ClusteringConfig};

    // Analysis
    pub use crate::analysis::{
        AnalysisConfig, AnalysisReport, Analyzer, OneWaySort, TwoWaySort, WorkItem, WorkResult,
    };

    // Parallelism
    pub use crate::utils::ParallelConfig;
}
