//! Friedman's H-statistic for two-way partial dependence

use crate::error::{PdpError, Result};
use crate::utils::stats::centered;

/// Interaction residuals and their aggregate strength
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionScore {
    /// Centered surface minus the additive (no-interaction) surface, x-major
    pub residuals: Vec<f64>,
    /// L2 norm of the residuals
    pub h_statistic: f64,
}

/// Score how far a two-way surface departs from the sum of its one-way parts.
///
/// `surface` holds the mean predictions in x-major order
/// (`surface[i * y_centered.len() + j]` is cell `(x_i, y_j)`); `x_centered`
/// and `y_centered` are the mean-centered one-way curves on the same axes.
pub fn h_statistic(surface: &[f64], x_centered: &[f64], y_centered: &[f64]) -> Result<InteractionScore> {
    let n_x = x_centered.len();
    let n_y = y_centered.len();
    if surface.len() != n_x * n_y {
        return Err(PdpError::ShapeError {
            expected: format!("{} x {} = {} cells", n_x, n_y, n_x * n_y),
            actual: format!("{} cells", surface.len()),
        });
    }

    let surface_centered = centered(surface);
    let residuals: Vec<f64> = surface_centered
        .iter()
        .enumerate()
        .map(|(cell, value)| {
            let no_interaction = x_centered[cell / n_y] + y_centered[cell % n_y];
            value - no_interaction
        })
        .collect();

    let h_statistic = residuals.iter().map(|r| r * r).sum::<f64>().sqrt();

    Ok(InteractionScore {
        residuals,
        h_statistic,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface(xs: &[f64], ys: &[f64], f: impl Fn(f64, f64) -> f64) -> Vec<f64> {
        xs.iter()
            .flat_map(|&x| ys.iter().map(move |&y| (x, y)))
            .map(|(x, y)| f(x, y))
            .collect()
    }

    #[test]
    fn test_additive_surface_has_no_interaction() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [-1.0, 0.5, 4.0];
        let s = surface(&xs, &ys, |x, y| x * x + 3.0 * y + 10.0);

        let gx: Vec<f64> = xs.iter().map(|x| x * x).collect();
        let hy: Vec<f64> = ys.iter().map(|y| 3.0 * y).collect();

        let score = h_statistic(&s, &centered(&gx), &centered(&hy)).unwrap();
        assert!(score.h_statistic < 1e-10);
        assert_eq!(score.residuals.len(), 12);
    }

    #[test]
    fn test_multiplicative_surface_interacts() {
        let xs = [0.0, 1.0, 2.0];
        let ys = [0.0, 1.0, 2.0];
        let s = surface(&xs, &ys, |x, y| x * y);

        // one-way curves averaged over the other axis
        let gx: Vec<f64> = xs.iter().map(|x| x * 1.0).collect();
        let hy: Vec<f64> = ys.iter().map(|y| y * 1.0).collect();

        let score = h_statistic(&s, &centered(&gx), &centered(&hy)).unwrap();
        assert!(score.h_statistic > 0.5);
    }

    #[test]
    fn test_shape_mismatch() {
        assert!(h_statistic(&[1.0, 2.0, 3.0], &[0.0, 0.0], &[0.0, 0.0]).is_err());
    }
}
