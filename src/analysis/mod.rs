//! End-to-end partial dependence analysis
//!
//! Ties the evaluator, clustering and task distribution together into a
//! single run that produces an [`AnalysisReport`].

mod config;
mod engine;
mod report;

pub use config::AnalysisConfig;
pub use engine::{Analyzer, WorkItem, WorkResult};
pub use report::{validate_output_path, AnalysisReport, OneWaySort, PredictionExtent, TwoWaySort};
