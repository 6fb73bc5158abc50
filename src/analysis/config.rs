//! Analysis configuration

use crate::clustering::ClusteringConfig;
use crate::error::{PdpError, Result};
use crate::explainability::TrendConfig;
use crate::utils::ParallelConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for a partial dependence analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Rows drawn from the reference dataset into the working sample
    pub n_instances: usize,

    /// Maximum grid length for continuous and integer features
    pub resolution: usize,

    /// Seed for the working-sample draw (None = fresh entropy)
    pub seed: Option<u64>,

    /// Task distribution
    pub parallel: ParallelConfig,

    /// Trend complexity search
    pub trend: TrendConfig,

    /// Curve clustering
    pub clustering: ClusteringConfig,

    /// Where to write the report as JSON
    pub output_path: Option<PathBuf>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            n_instances: 100,
            resolution: 20,
            seed: None,
            parallel: ParallelConfig::default(),
            trend: TrendConfig::default(),
            clustering: ClusteringConfig::default(),
            output_path: None,
        }
    }
}

impl AnalysisConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_n_instances(mut self, n: usize) -> Self {
        self.n_instances = n;
        self
    }

    pub fn with_resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Run work items on `n` threads (1 = sequential)
    pub fn with_threads(mut self, n: usize) -> Self {
        self.parallel = ParallelConfig::new().with_threads(n);
        self
    }

    pub fn with_parallel(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_trend(mut self, trend: TrendConfig) -> Self {
        self.trend = trend;
        self
    }

    pub fn with_clustering(mut self, clustering: ClusteringConfig) -> Self {
        self.clustering = clustering;
        self
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    /// Reject settings no analysis can run with
    pub fn validate(&self) -> Result<()> {
        if self.n_instances == 0 {
            return Err(PdpError::InvalidParameter {
                name: "n_instances".to_string(),
                value: "0".to_string(),
                reason: "at least one row must be sampled".to_string(),
            });
        }
        if self.resolution == 0 {
            return Err(PdpError::InvalidParameter {
                name: "resolution".to_string(),
                value: "0".to_string(),
                reason: "grids need at least one point".to_string(),
            });
        }
        if self.trend.min_complexity > self.trend.max_complexity {
            return Err(PdpError::InvalidParameter {
                name: "trend.min_complexity".to_string(),
                value: self.trend.min_complexity.to_string(),
                reason: format!("exceeds max_complexity {}", self.trend.max_complexity),
            });
        }
        if self.trend.nrmse_threshold.is_nan() || self.trend.nrmse_threshold <= 0.0 {
            return Err(PdpError::InvalidParameter {
                name: "trend.nrmse_threshold".to_string(),
                value: self.trend.nrmse_threshold.to_string(),
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.n_instances, 100);
        assert_eq!(config.resolution, 20);
        assert!(config.parallel.is_sequential());
        assert!(config.output_path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = AnalysisConfig::new()
            .with_n_instances(50)
            .with_resolution(10)
            .with_seed(3)
            .with_threads(4)
            .with_output_path("/tmp/report.json");
        assert_eq!(config.n_instances, 50);
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.parallel.num_threads(), 4);
        assert_eq!(config.output_path, Some(PathBuf::from("/tmp/report.json")));
    }

    #[test]
    fn test_validate_rejects_zeroes() {
        assert!(AnalysisConfig::new().with_resolution(0).validate().is_err());
        assert!(AnalysisConfig::new().with_n_instances(0).validate().is_err());
    }

    #[test]
    fn test_roundtrip_json() {
        let config = AnalysisConfig::new().with_seed(9);
        let json = serde_json::to_string(&config).unwrap();
        let back: AnalysisConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.seed, Some(9));
        assert_eq!(back.clustering, config.clustering);
    }
}
