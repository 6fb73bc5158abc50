//! Per-feature descriptors

use crate::data::{sorted_unique, Value};
use crate::error::{PdpError, Result};
use serde::{Deserialize, Serialize};

/// Payload-free feature type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureType {
    Continuous,
    Integer,
    Ordinal,
    Categorical,
    OneHot,
}

impl FeatureType {
    /// Swept as an ordered numeric axis (and trend-fitted)
    pub fn is_quantitative(self) -> bool {
        matches!(
            self,
            FeatureType::Continuous | FeatureType::Integer | FeatureType::Ordinal
        )
    }

    /// Clustered by curve shape rather than by magnitude
    pub fn clusters_by_shape(self) -> bool {
        matches!(self, FeatureType::Continuous | FeatureType::Integer)
    }
}

/// One indicator column of a one-hot group and the value it stands for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotColumn {
    pub column: String,
    pub value: Value,
}

/// What the engine knows about a feature: its kind and its observed values.
///
/// Unique values are kept sorted; the one-hot mapping keeps its given order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureDescriptor {
    Continuous { unique_values: Vec<f64> },
    Integer { unique_values: Vec<f64> },
    Ordinal { unique_values: Vec<f64> },
    Categorical { unique_values: Vec<Value> },
    OneHot { columns: Vec<OneHotColumn> },
}

fn sorted_numbers(values: &[f64]) -> Result<Vec<f64>> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(PdpError::DataError(
            "Feature values must be finite".to_string(),
        ));
    }
    let mut unique = values.to_vec();
    unique.sort_by(|a, b| a.total_cmp(b));
    unique.dedup();
    Ok(unique)
}

impl FeatureDescriptor {
    /// Continuous feature from observed values
    pub fn continuous(values: &[f64]) -> Result<Self> {
        Ok(FeatureDescriptor::Continuous {
            unique_values: sorted_numbers(values)?,
        })
    }

    /// Integer feature from observed values
    pub fn integer(values: &[f64]) -> Result<Self> {
        if values.iter().any(|v| v.fract() != 0.0) {
            return Err(PdpError::DataError(
                "Integer feature has non-integral values".to_string(),
            ));
        }
        Ok(FeatureDescriptor::Integer {
            unique_values: sorted_numbers(values)?,
        })
    }

    /// Ordinal feature from observed (numerically coded) values
    pub fn ordinal(values: &[f64]) -> Result<Self> {
        Ok(FeatureDescriptor::Ordinal {
            unique_values: sorted_numbers(values)?,
        })
    }

    /// Categorical feature from observed values
    pub fn categorical<V: Into<Value>>(values: Vec<V>) -> Self {
        FeatureDescriptor::Categorical {
            unique_values: sorted_unique(values.into_iter().map(Into::into).collect()),
        }
    }

    /// One-hot group from `(indicator column, represented value)` pairs
    pub fn one_hot<C: Into<String>, V: Into<Value>>(columns: Vec<(C, V)>) -> Self {
        FeatureDescriptor::OneHot {
            columns: columns
                .into_iter()
                .map(|(column, value)| OneHotColumn {
                    column: column.into(),
                    value: value.into(),
                })
                .collect(),
        }
    }

    pub fn feature_type(&self) -> FeatureType {
        match self {
            FeatureDescriptor::Continuous { .. } => FeatureType::Continuous,
            FeatureDescriptor::Integer { .. } => FeatureType::Integer,
            FeatureDescriptor::Ordinal { .. } => FeatureType::Ordinal,
            FeatureDescriptor::Categorical { .. } => FeatureType::Categorical,
            FeatureDescriptor::OneHot { .. } => FeatureType::OneHot,
        }
    }

    pub fn is_quantitative(&self) -> bool {
        self.feature_type().is_quantitative()
    }

    /// Ordered unique values of the feature
    pub fn unique_values(&self) -> Vec<Value> {
        match self {
            FeatureDescriptor::Continuous { unique_values }
            | FeatureDescriptor::Integer { unique_values }
            | FeatureDescriptor::Ordinal { unique_values } => {
                unique_values.iter().map(|&v| Value::Number(v)).collect()
            }
            FeatureDescriptor::Categorical { unique_values } => unique_values.clone(),
            FeatureDescriptor::OneHot { columns } => {
                columns.iter().map(|c| c.value.clone()).collect()
            }
        }
    }

    pub fn n_unique(&self) -> usize {
        match self {
            FeatureDescriptor::Continuous { unique_values }
            | FeatureDescriptor::Integer { unique_values }
            | FeatureDescriptor::Ordinal { unique_values } => unique_values.len(),
            FeatureDescriptor::Categorical { unique_values } => unique_values.len(),
            FeatureDescriptor::OneHot { columns } => columns.len(),
        }
    }

    /// Data frame columns backing the feature named `feature`
    pub fn columns<'a>(&'a self, feature: &'a str) -> Vec<&'a str> {
        match self {
            FeatureDescriptor::OneHot { columns } => {
                columns.iter().map(|c| c.column.as_str()).collect()
            }
            _ => vec![feature],
        }
    }

    /// Indicator column standing for `value` in a one-hot group
    pub fn one_hot_column(&self, value: &Value) -> Option<&str> {
        match self {
            FeatureDescriptor::OneHot { columns } => columns
                .iter()
                .find(|c| &c.value == value)
                .map(|c| c.column.as_str()),
            _ => None,
        }
    }
}
