//! In-place feature perturbation over a private working sample

use crate::data::{bitwise_eq, constant_series, Value};
use crate::error::{PdpError, Result};
use crate::metadata::FeatureDescriptor;
use polars::prelude::DataFrame;

/// A working copy of the sampled rows plus the pristine snapshot it is
/// restored from.
///
/// Perturbation replaces whole columns of the working copy, so a
/// `WorkingSample` must be owned by exactly one task at a time;
/// concurrent tasks each clone their own.
#[derive(Debug, Clone)]
pub struct WorkingSample {
    data: DataFrame,
    snapshot: DataFrame,
}

impl WorkingSample {
    pub fn new(sample: DataFrame) -> Self {
        Self {
            snapshot: sample.clone(),
            data: sample,
        }
    }

    /// The (possibly perturbed) rows handed to the prediction function
    pub fn data(&self) -> &DataFrame {
        &self.data
    }

    pub fn snapshot(&self) -> &DataFrame {
        &self.snapshot
    }

    pub fn n_rows(&self) -> usize {
        self.data.height()
    }

    /// Whether every cell is bit-identical to the snapshot
    pub fn is_pristine(&self) -> bool {
        bitwise_eq(&self.data, &self.snapshot)
    }

    /// Set `feature` to `value` on every row.
    ///
    /// For a one-hot group all indicator columns are zeroed and the one
    /// standing for `value` is set to 1.
    pub fn set(&mut self, feature: &str, descriptor: &FeatureDescriptor, value: &Value) -> Result<()> {
        match descriptor {
            FeatureDescriptor::OneHot { columns } => {
                let target = descriptor.one_hot_column(value).ok_or_else(|| {
                    PdpError::DataError(format!(
                        "Value '{}' is not part of one-hot feature '{}'",
                        value, feature
                    ))
                })?;
                for c in columns {
                    let fill = if c.column == target { 1.0 } else { 0.0 };
                    self.fill(&c.column, &Value::Number(fill))?;
                }
                Ok(())
            }
            _ => self.fill(feature, value),
        }
    }

    /// Restore the column(s) of `feature` from the snapshot
    pub fn reset(&mut self, feature: &str, descriptor: &FeatureDescriptor) -> Result<()> {
        for column in descriptor.columns(feature) {
            let pristine = self
                .snapshot
                .column(column)
                .map_err(|_| PdpError::ColumnNotFound(column.to_string()))?
                .clone();
            self.data.with_column(pristine)?;
        }
        Ok(())
    }

    fn fill(&mut self, column: &str, value: &Value) -> Result<()> {
        let like = self
            .data
            .column(column)
            .map_err(|_| PdpError::ColumnNotFound(column.to_string()))?;
        let series = constant_series(column, value, self.data.height(), like)?;
        self.data.with_column(series)?;
        Ok(())
    }
}
