//! Evaluation grids for one feature

use crate::data::Value;
use crate::error::{PdpError, Result};
use crate::metadata::FeatureDescriptor;
use crate::utils::stats::linspace;

/// Build the ordered values a feature is swept over.
///
/// - continuous with more unique values than `resolution`: `resolution`
///   evenly spaced points between the observed min and max
/// - integer with more unique values than `resolution`: first and last
///   observed value plus every `n / resolution`-th interior value
/// - anything else: the unique values verbatim
pub fn build_grid(descriptor: &FeatureDescriptor, resolution: usize) -> Result<Vec<Value>> {
    if resolution == 0 {
        return Err(PdpError::InvalidParameter {
            name: "resolution".to_string(),
            value: "0".to_string(),
            reason: "must be positive".to_string(),
        });
    }
    if descriptor.n_unique() == 0 {
        return Err(PdpError::DataError(
            "Feature has no observed values".to_string(),
        ));
    }

    let grid = match descriptor {
        FeatureDescriptor::Continuous { unique_values } if unique_values.len() > resolution => {
            let first = unique_values[0];
            let last = unique_values[unique_values.len() - 1];
            linspace(first, last, resolution)
                .into_iter()
                .map(Value::Number)
                .collect()
        }
        FeatureDescriptor::Integer { unique_values } if unique_values.len() > resolution => {
            let n = unique_values.len();
            let stride = (n / resolution).max(1);
            let mut grid = Vec::with_capacity(resolution + 2);
            grid.push(unique_values[0]);
            grid.extend(unique_values[1..n - 1].iter().step_by(stride).copied());
            grid.push(unique_values[n - 1]);
            grid.into_iter().map(Value::Number).collect()
        }
        _ => descriptor.unique_values(),
    };

    Ok(grid)
}
