//! Analysis results and their JSON persistence

use crate::clustering::Cluster;
use crate::error::{PdpError, Result};
use crate::explainability::{MarginalDistribution, OneWayPdp, TwoWayPdp};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::Path;

/// Smallest and largest mean prediction across all curves and surfaces
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionExtent {
    pub min: f64,
    pub max: f64,
}

impl PredictionExtent {
    pub fn empty() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    pub fn include(&mut self, min: f64, max: f64) {
        self.min = self.min.min(min);
        self.max = self.max.max(max);
    }
}

/// Orderings for one-way results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OneWaySort {
    /// Most complex trend first, then worst fit
    GoodFit,
    /// Largest deviation first
    Deviation,
}

/// Orderings for two-way results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TwoWaySort {
    /// Strongest interaction first
    H,
    Deviation,
}

/// Everything an analysis run produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub one_way: Vec<OneWayPdp>,
    pub two_way: Vec<TwoWayPdp>,
    pub quantitative_clusters: Vec<Cluster>,
    pub categorical_clusters: Vec<Cluster>,
    pub prediction_extent: PredictionExtent,
    pub marginal_distributions: BTreeMap<String, MarginalDistribution>,
    /// Rows actually in the working sample
    pub n_instances: usize,
    pub resolution: usize,
    /// Clustering pipelines that could not run
    pub warnings: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl AnalysisReport {
    pub fn one_way(&self, feature: &str) -> Option<&OneWayPdp> {
        self.one_way.iter().find(|p| p.id == feature)
    }

    /// Two-way result of a pair, in either order
    pub fn two_way(&self, a: &str, b: &str) -> Option<&TwoWayPdp> {
        self.two_way.iter().find(|p| {
            (p.x_feature == a && p.y_feature == b) || (p.x_feature == b && p.y_feature == a)
        })
    }

    pub fn n_clusters(&self) -> usize {
        self.quantitative_clusters.len() + self.categorical_clusters.len()
    }

    pub fn sort_one_way(&mut self, order: OneWaySort) {
        match order {
            OneWaySort::GoodFit => self.one_way.sort_by(|a, b| {
                let key = |p: &OneWayPdp| {
                    p.trend
                        .as_ref()
                        .map_or((0, 0.0), |t| (t.complexity, t.nrmse))
                };
                let (ka, ea) = key(a);
                let (kb, eb) = key(b);
                kb.cmp(&ka).then_with(|| eb.total_cmp(&ea))
            }),
            OneWaySort::Deviation => self.one_way.sort_by(|a, b| descending(a.deviation, b.deviation)),
        }
    }

    pub fn sort_two_way(&mut self, order: TwoWaySort) {
        match order {
            TwoWaySort::H => self
                .two_way
                .sort_by(|a, b| descending(a.h_statistic, b.h_statistic)),
            TwoWaySort::Deviation => self
                .two_way
                .sort_by(|a, b| descending(a.deviation, b.deviation)),
        }
    }

    /// Write the report as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        validate_output_path(path)?;
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        tracing::info!(path = %path.display(), "report written");
        Ok(())
    }

    /// Read a report written by [`AnalysisReport::save`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(PdpError::ConfigError(format!(
                "Report file '{}' does not exist",
                path.display()
            )));
        }
        let json = std::fs::read_to_string(path)?;
        let report: Self = serde_json::from_str(&json)?;
        Ok(report)
    }
}

fn descending(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

/// Fail unless `path` names a file inside an existing directory
pub fn validate_output_path(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() || path.is_dir() {
        return Err(PdpError::ConfigError(format!(
            "Output path '{}' is not a file path",
            path.display()
        )));
    }
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => {
            Err(PdpError::ConfigError(format!(
                "Output directory '{}' does not exist",
                parent.display()
            )))
        }
        _ => Ok(()),
    }
}
