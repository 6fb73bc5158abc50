//! One-way and two-way partial dependence evaluation

use crate::data::Value;
use crate::error::{PdpError, Result};
use crate::explainability::grid::build_grid;
use crate::explainability::interaction::h_statistic;
use crate::explainability::perturbation::WorkingSample;
use crate::explainability::trend::{TrendFit, TrendFitter};
use crate::metadata::{FeatureCatalog, FeatureDescriptor, FeatureType};
use crate::utils::stats::{centered, std_dev};
use ndarray::Array1;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// How a one-way curve is read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PdpKind {
    Quantitative,
    Categorical,
}

/// Axis types of a two-way surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TwoWayKind {
    /// Both axes quantitative
    Quantitative,
    /// Quantitative x axis, categorical y axis
    Mixed,
    Categorical,
}

/// Cluster membership of a one-way curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusterAssignment {
    pub cluster: usize,
    pub distance_to_center: f64,
}

/// Result of a one-way partial dependence computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneWayPdp {
    /// Feature id
    pub id: String,
    pub feature_type: FeatureType,
    pub kind: PdpKind,
    /// Grid the feature was swept over
    pub x_values: Vec<Value>,
    /// Mean prediction at each grid point
    pub mean_predictions: Vec<f64>,
    /// Mean predictions minus their own mean
    pub mean_predictions_centered: Vec<f64>,
    pub min_prediction: f64,
    pub max_prediction: f64,
    /// Standard deviation of the mean predictions
    pub deviation: f64,
    /// Trend fit (quantitative features only)
    pub trend: Option<TrendFit>,
    /// Filled in by clustering
    pub cluster: Option<ClusterAssignment>,
}

impl OneWayPdp {
    pub fn len(&self) -> usize {
        self.x_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x_values.is_empty()
    }
}

/// Result of a two-way partial dependence computation.
///
/// Cells are stored x-major: cell `i * y_axis.len() + j` is `(x_axis[i], y_axis[j])`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwoWayPdp {
    /// `"{x_feature}_{y_feature}"`
    pub id: String,
    pub kind: TwoWayKind,
    pub x_feature: String,
    pub y_feature: String,
    pub x_axis: Vec<Value>,
    pub y_axis: Vec<Value>,
    /// x value of each cell
    pub x_values: Vec<Value>,
    /// y value of each cell
    pub y_values: Vec<Value>,
    /// Mean prediction of each cell
    pub mean_predictions: Vec<f64>,
    /// Interaction residual of each cell
    pub interactions: Vec<f64>,
    /// L2 norm of the interaction residuals
    pub h_statistic: f64,
    pub min_prediction: f64,
    pub max_prediction: f64,
    pub deviation: f64,
}

impl TwoWayPdp {
    pub fn n_cells(&self) -> usize {
        self.mean_predictions.len()
    }
}

/// Partial dependence evaluator.
///
/// Sweeps features over their grids on a [`WorkingSample`] and averages
/// the predictions of `predict_fn` at every grid point.
pub struct PartialDependence<'a, F>
where
    F: Fn(&DataFrame) -> Result<Array1<f64>>,
{
    /// Prediction function
    predict_fn: &'a F,
    catalog: &'a FeatureCatalog,
    /// Grid resolution
    resolution: usize,
    /// Trend fitter for quantitative curves
    trend_fitter: Option<TrendFitter>,
}

impl<'a, F> PartialDependence<'a, F>
where
    F: Fn(&DataFrame) -> Result<Array1<f64>>,
{
    /// Create new PDP evaluator
    pub fn new(predict_fn: &'a F, catalog: &'a FeatureCatalog) -> Self {
        Self {
            predict_fn,
            catalog,
            resolution: 20,
            trend_fitter: None,
        }
    }

    /// Set grid resolution
    pub fn with_resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution.max(1);
        self
    }

    /// Fit trends on quantitative curves with `fitter`
    pub fn with_trend_fitter(mut self, fitter: TrendFitter) -> Self {
        self.trend_fitter = Some(fitter);
        self
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    // Mean prediction over the (perturbed) working sample
    fn mean_prediction(&self, sample: &WorkingSample) -> Result<f64> {
        let predictions = (self.predict_fn)(sample.data())?;
        if predictions.len() != sample.n_rows() {
            return Err(PdpError::ShapeError {
                expected: format!("{} predictions", sample.n_rows()),
                actual: format!("{} predictions", predictions.len()),
            });
        }
        predictions
            .mean()
            .ok_or_else(|| PdpError::DataError("Working sample is empty".to_string()))
    }

    // Set `feature`, predict, and restore it whatever the outcome
    fn mean_prediction_at(
        &self,
        sample: &mut WorkingSample,
        feature: &str,
        descriptor: &FeatureDescriptor,
        value: &Value,
    ) -> Result<f64> {
        sample.set(feature, descriptor, value)?;
        let outcome = self.mean_prediction(sample);
        sample.reset(feature, descriptor)?;
        outcome
    }

    /// Compute the one-way PDP of `feature`
    pub fn one_way(&self, sample: &mut WorkingSample, feature: &str) -> Result<OneWayPdp> {
        let descriptor = self.catalog.get(feature)?;
        let x_values = build_grid(descriptor, self.resolution)?;

        let mut mean_predictions = Vec::with_capacity(x_values.len());
        let mut min_prediction = f64::INFINITY;
        let mut max_prediction = f64::NEG_INFINITY;

        for value in &x_values {
            let mean = self.mean_prediction_at(sample, feature, descriptor, value)?;
            min_prediction = min_prediction.min(mean);
            max_prediction = max_prediction.max(mean);
            mean_predictions.push(mean);
        }

        let feature_type = descriptor.feature_type();
        let (kind, trend) = if feature_type.is_quantitative() {
            let trend = match &self.trend_fitter {
                Some(fitter) => {
                    let xs = numeric_axis(feature, &x_values)?;
                    Some(fitter.fit(&xs, &mean_predictions)?)
                }
                None => None,
            };
            (PdpKind::Quantitative, trend)
        } else {
            (PdpKind::Categorical, None)
        };

        let deviation = std_dev(&mean_predictions);

        tracing::debug!(
            feature = %feature,
            grid_points = x_values.len(),
            deviation,
            complexity = trend.as_ref().map(|t| t.complexity),
            "one-way partial dependence computed"
        );

        Ok(OneWayPdp {
            id: feature.to_string(),
            feature_type,
            kind,
            mean_predictions_centered: centered(&mean_predictions),
            x_values,
            mean_predictions,
            min_prediction,
            max_prediction,
            deviation,
            trend,
            cluster: None,
        })
    }

    /// Compute the two-way PDP of a feature pair.
    ///
    /// `one_way` must contain the one-way results of both features at the
    /// same resolution. When exactly one feature is quantitative it is put
    /// on the x axis.
    pub fn two_way(
        &self,
        sample: &mut WorkingSample,
        pair: (&str, &str),
        one_way: &[OneWayPdp],
    ) -> Result<TwoWayPdp> {
        let (mut x_feature, mut y_feature) = pair;
        if x_feature == y_feature {
            return Err(PdpError::ConfigError(format!(
                "Two-way pair needs two distinct features, got ('{}', '{}')",
                x_feature, y_feature
            )));
        }

        let mut x_desc = self.catalog.get(x_feature)?;
        let mut y_desc = self.catalog.get(y_feature)?;
        if y_desc.is_quantitative() && !x_desc.is_quantitative() {
            std::mem::swap(&mut x_feature, &mut y_feature);
            std::mem::swap(&mut x_desc, &mut y_desc);
        }

        let x_pdp = find_one_way(one_way, x_feature)?;
        let y_pdp = find_one_way(one_way, y_feature)?;

        let x_axis = build_grid(x_desc, self.resolution)?;
        let y_axis = build_grid(y_desc, self.resolution)?;
        for (axis, pdp) in [(&x_axis, x_pdp), (&y_axis, y_pdp)] {
            if axis.len() != pdp.mean_predictions_centered.len() {
                return Err(PdpError::ShapeError {
                    expected: format!("{} one-way values for '{}'", axis.len(), pdp.id),
                    actual: format!("{}", pdp.mean_predictions_centered.len()),
                });
            }
        }

        let n_cells = x_axis.len() * y_axis.len();
        let mut x_values = Vec::with_capacity(n_cells);
        let mut y_values = Vec::with_capacity(n_cells);
        let mut mean_predictions = Vec::with_capacity(n_cells);

        for x_value in &x_axis {
            sample.set(x_feature, x_desc, x_value)?;
            let row: Result<Vec<f64>> = y_axis
                .iter()
                .map(|y_value| self.mean_prediction_at(sample, y_feature, y_desc, y_value))
                .collect();
            sample.reset(x_feature, x_desc)?;

            for (y_value, mean) in y_axis.iter().zip(row?) {
                x_values.push(x_value.clone());
                y_values.push(y_value.clone());
                mean_predictions.push(mean);
            }
        }

        let score = h_statistic(
            &mean_predictions,
            &x_pdp.mean_predictions_centered,
            &y_pdp.mean_predictions_centered,
        )?;

        let kind = match (x_desc.is_quantitative(), y_desc.is_quantitative()) {
            (true, true) => TwoWayKind::Quantitative,
            (true, false) | (false, true) => TwoWayKind::Mixed,
            (false, false) => TwoWayKind::Categorical,
        };

        let min_prediction = mean_predictions.iter().copied().fold(f64::INFINITY, f64::min);
        let max_prediction = mean_predictions
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);

        tracing::debug!(
            x = %x_feature,
            y = %y_feature,
            cells = n_cells,
            h = score.h_statistic,
            "two-way partial dependence computed"
        );

        Ok(TwoWayPdp {
            id: format!("{}_{}", x_feature, y_feature),
            kind,
            x_feature: x_feature.to_string(),
            y_feature: y_feature.to_string(),
            x_axis,
            y_axis,
            x_values,
            y_values,
            deviation: std_dev(&mean_predictions),
            mean_predictions,
            interactions: score.residuals,
            h_statistic: score.h_statistic,
            min_prediction,
            max_prediction,
        })
    }
}

fn find_one_way<'p>(one_way: &'p [OneWayPdp], feature: &str) -> Result<&'p OneWayPdp> {
    one_way.iter().find(|p| p.id == feature).ok_or_else(|| {
        PdpError::DataError(format!(
            "Two-way evaluation requires the one-way result of '{}'",
            feature
        ))
    })
}

fn numeric_axis(feature: &str, values: &[Value]) -> Result<Vec<f64>> {
    values
        .iter()
        .map(|v| {
            v.as_f64().ok_or_else(|| PdpError::TypeMismatch {
                column: feature.to_string(),
                expected: "number".to_string(),
                actual: v.type_name().to_string(),
            })
        })
        .collect()
}
