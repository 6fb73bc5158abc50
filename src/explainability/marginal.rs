//! Marginal distributions of analyzed features over the working sample

use crate::data::{FrameExt, Value};
use crate::error::Result;
use crate::metadata::FeatureDescriptor;
use crate::utils::stats::{auto_bin_count, histogram};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// How often each part of a feature's range occurs in the sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MarginalDistribution {
    /// Histogram; `bin_edges` has one more entry than `counts`
    Quantitative {
        bin_edges: Vec<f64>,
        counts: Vec<usize>,
    },
    Categorical {
        labels: Vec<Value>,
        counts: Vec<usize>,
    },
}

impl MarginalDistribution {
    pub fn total(&self) -> usize {
        match self {
            MarginalDistribution::Quantitative { counts, .. }
            | MarginalDistribution::Categorical { counts, .. } => counts.iter().sum(),
        }
    }
}

/// Summarize `feature` over `sample`.
///
/// Continuous and integer features get an automatically sized histogram
/// over their observed range, ordinal features one bin per unique value.
/// Categorical features count each distinct label and one-hot groups sum
/// their indicator columns.
pub fn marginal_distribution(
    feature: &str,
    descriptor: &FeatureDescriptor,
    sample: &DataFrame,
) -> Result<MarginalDistribution> {
    let distribution = match descriptor {
        FeatureDescriptor::Continuous { unique_values }
        | FeatureDescriptor::Integer { unique_values }
        | FeatureDescriptor::Ordinal { unique_values } => {
            let values = sample.numeric(feature)?.to_vec();
            let range = match (unique_values.first(), unique_values.last()) {
                (Some(&lo), Some(&hi)) => (lo, hi),
                _ => (0.0, 0.0),
            };
            let bins = if matches!(descriptor, FeatureDescriptor::Ordinal { .. }) {
                unique_values.len()
            } else {
                auto_bin_count(&values, range)
            };
            let (bin_edges, counts) = histogram(&values, bins, range);
            MarginalDistribution::Quantitative { bin_edges, counts }
        }
        FeatureDescriptor::OneHot { columns } => {
            let mut labels = Vec::with_capacity(columns.len());
            let mut counts = Vec::with_capacity(columns.len());
            for c in columns {
                let indicator = sample.numeric(&c.column)?;
                labels.push(c.value.clone());
                counts.push(indicator.sum().round().max(0.0) as usize);
            }
            MarginalDistribution::Categorical { labels, counts }
        }
        FeatureDescriptor::Categorical { .. } => {
            let mut values = sample.values(feature)?;
            values.sort_by(|a, b| a.total_cmp(b));

            let mut labels: Vec<Value> = Vec::new();
            let mut counts: Vec<usize> = Vec::new();
            for value in values {
                match labels.last() {
                    Some(last) if *last == value => {
                        if let Some(n) = counts.last_mut() {
                            *n += 1;
                        }
                    }
                    _ => {
                        labels.push(value);
                        counts.push(1);
                    }
                }
            }
            MarginalDistribution::Categorical { labels, counts }
        }
    };

    Ok(distribution)
}
