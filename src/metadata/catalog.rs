//! Feature descriptor catalog

use crate::data::FrameExt;
use crate::error::{PdpError, Result};
use crate::metadata::FeatureDescriptor;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Descriptors for every feature of a dataset, keyed by feature id.
///
/// Built by the caller (type inference is not done here) and read-only
/// for the duration of an analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureCatalog {
    features: BTreeMap<String, FeatureDescriptor>,
}

impl FeatureCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a feature
    pub fn with_feature(mut self, name: &str, descriptor: FeatureDescriptor) -> Self {
        self.insert(name, descriptor);
        self
    }

    pub fn insert(&mut self, name: &str, descriptor: FeatureDescriptor) {
        self.features.insert(name.to_string(), descriptor);
    }

    /// Descriptor of `name`, or a descriptor error
    pub fn get(&self, name: &str) -> Result<&FeatureDescriptor> {
        self.features
            .get(name)
            .ok_or_else(|| PdpError::FeatureNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.features.contains_key(name)
    }

    /// Feature ids in name order
    pub fn feature_names(&self) -> impl Iterator<Item = &str> {
        self.features.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Check that every backing column of `feature` exists in `dataset`
    /// with a type able to hold the feature's values.
    pub fn check_against(&self, feature: &str, dataset: &DataFrame) -> Result<()> {
        let descriptor = self.get(feature)?;
        for column in descriptor.columns(feature) {
            if !dataset.has_column(column) {
                return Err(PdpError::ColumnNotFound(format!(
                    "{} (required by feature '{}')",
                    column, feature
                )));
            }
        }
        match descriptor {
            FeatureDescriptor::Categorical { .. } => Ok(()),
            FeatureDescriptor::OneHot { .. } => descriptor
                .columns(feature)
                .into_iter()
                .try_for_each(|c| dataset.numeric(c).map(|_| ())),
            _ => dataset.numeric(feature).map(|_| ()),
        }
    }
}
