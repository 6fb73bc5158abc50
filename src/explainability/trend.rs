//! Adaptive-complexity trend fitting for quantitative PDP curves

use crate::error::{PdpError, Result};
use crate::explainability::spline::bspline_basis;
use crate::utils::first_adequate;
use crate::utils::stats::{mean, std_dev};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Settings for the complexity search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendConfig {
    /// First (simplest) number of spline knots tried
    pub min_complexity: usize,
    /// Last number of knots; accepted unconditionally
    pub max_complexity: usize,
    /// A fit is adequate once its normalized RMSE is below this
    pub nrmse_threshold: f64,
    /// Spline degree
    pub degree: usize,
    /// Ridge penalty on the spline coefficients
    pub ridge_alpha: f64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            min_complexity: 2,
            max_complexity: 9,
            nrmse_threshold: 0.02,
            degree: 3,
            ridge_alpha: 1e-4,
        }
    }
}

impl TrendConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the knot range searched
    pub fn with_complexity_range(mut self, min: usize, max: usize) -> Self {
        self.min_complexity = min.max(2);
        self.max_complexity = max.max(self.min_complexity);
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.nrmse_threshold = threshold;
        self
    }

    pub fn with_ridge_alpha(mut self, alpha: f64) -> Self {
        self.ridge_alpha = alpha.max(0.0);
        self
    }
}

/// Smooth reference curve for a quantitative PDP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendFit {
    /// Fitted curve evaluated at the grid
    pub values: Vec<f64>,
    /// Number of spline knots accepted
    pub complexity: usize,
    /// RMSE divided by the prediction output IQR
    pub nrmse: f64,
}

/// Fits the simplest adequate spline trend to a PDP curve
#[derive(Debug, Clone)]
pub struct TrendFitter {
    config: TrendConfig,
    /// IQR of the prediction function over the whole reference dataset
    output_iqr: f64,
}

impl TrendFitter {
    /// `output_iqr` must be positive; it scales every RMSE.
    pub fn new(config: TrendConfig, output_iqr: f64) -> Result<Self> {
        if !(output_iqr.is_finite() && output_iqr > 0.0) {
            return Err(PdpError::DegenerateInput(format!(
                "prediction output IQR is {}, normalized RMSE is undefined",
                output_iqr
            )));
        }
        Ok(Self { config, output_iqr })
    }

    pub fn output_iqr(&self) -> f64 {
        self.output_iqr
    }

    /// Search knot counts in ascending order and keep the first whose
    /// normalized RMSE is below the threshold (or the last one).
    pub fn fit(&self, x: &[f64], y: &[f64]) -> Result<TrendFit> {
        if x.len() != y.len() {
            return Err(PdpError::ShapeError {
                expected: format!("{} predictions", x.len()),
                actual: format!("{} predictions", y.len()),
            });
        }
        if x.len() < 2 {
            return Ok(TrendFit {
                values: y.to_vec(),
                complexity: self.config.min_complexity,
                nrmse: 0.0,
            });
        }

        let z = standardize(x);
        let y = Array1::from_vec(y.to_vec());
        let threshold = self.config.nrmse_threshold;

        let selected = first_adequate(
            self.config.min_complexity..=self.config.max_complexity,
            |&knots| self.fit_level(&z, &y, knots),
            |fit| fit.nrmse < threshold,
        )?;

        selected
            .map(|(_, fit)| fit)
            .ok_or_else(|| PdpError::ConfigError("empty trend complexity range".to_string()))
    }

    fn fit_level(&self, z: &[f64], y: &Array1<f64>, knots: usize) -> Result<TrendFit> {
        let basis = bspline_basis(z, knots, self.config.degree);
        let trend = ridge_fit_predict(&basis, y, self.config.ridge_alpha)?;

        let mse = trend
            .iter()
            .zip(y.iter())
            .map(|(t, v)| (t - v).powi(2))
            .sum::<f64>()
            / y.len() as f64;
        let nrmse = mse.sqrt() / self.output_iqr;

        tracing::trace!(knots, nrmse, "trend candidate");

        Ok(TrendFit {
            values: trend.to_vec(),
            complexity: knots,
            nrmse,
        })
    }
}

/// Zero mean, unit (population) variance; a constant input is only centered
fn standardize(x: &[f64]) -> Vec<f64> {
    let m = mean(x);
    let s = std_dev(x);
    let scale = if s > 0.0 { s } else { 1.0 };
    x.iter().map(|v| (v - m) / scale).collect()
}

/// Ridge regression with intercept, returning in-sample predictions
fn ridge_fit_predict(x: &Array2<f64>, y: &Array1<f64>, alpha: f64) -> Result<Array1<f64>> {
    let n_features = x.ncols();
    let x_mean = x
        .mean_axis(Axis(0))
        .ok_or_else(|| PdpError::ComputationError("empty design matrix".to_string()))?;
    let y_mean = y.mean().unwrap_or(0.0);

    let x_c = x - &x_mean.clone().insert_axis(Axis(0));
    let y_c = y - y_mean;

    let mut xtx = x_c.t().dot(&x_c);
    for i in 0..n_features {
        xtx[[i, i]] += alpha;
    }
    let xty = x_c.t().dot(&y_c);

    let coefficients = cholesky_solve(&xtx, &xty)
        .ok_or_else(|| PdpError::ComputationError("Singular ridge system".to_string()))?;
    let intercept = y_mean - coefficients.dot(&x_mean);

    Ok(x.dot(&coefficients) + intercept)
}

/// Solve symmetric positive-definite system Ax = b using Cholesky decomposition.
/// Retries once with a small diagonal jitter if the matrix is not positive definite.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    cholesky_solve_inner(a, b).or_else(|| {
        let n = a.nrows();
        let mut a_reg = a.clone();
        let ridge = 1e-8 * a.diag().iter().map(|v| v.abs()).sum::<f64>() / n as f64 + 1e-12;
        for k in 0..n {
            a_reg[[k, k]] += ridge;
        }
        cholesky_solve_inner(&a_reg, b)
    })
}

fn cholesky_solve_inner(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    // A = L * L^T
    let mut l = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }
            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // Forward substitution: L * y = b
    let mut y = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    // Backward substitution: L^T * x = y
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }

    Some(x)
}
