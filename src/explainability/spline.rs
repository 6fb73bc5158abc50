//! B-spline basis expansion with uniformly spaced knots

use ndarray::Array2;

/// Expand `x` into a B-spline basis of the given `degree` with `n_knots`
/// uniformly spaced knots over `[min(x), max(x)]`.
///
/// The knot vector is extended by `degree` knots on each side at the same
/// spacing, giving `n_knots + degree - 1` basis functions that sum to one
/// everywhere in the data range. Requires `n_knots >= 2` and a non-empty `x`.
pub fn bspline_basis(x: &[f64], n_knots: usize, degree: usize) -> Array2<f64> {
    let n_knots = n_knots.max(2);
    let lo = x.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (lo, hi) = if hi > lo { (lo, hi) } else { (lo - 0.5, lo + 0.5) };

    let spacing = (hi - lo) / (n_knots - 1) as f64;
    let mut knots: Vec<f64> = Vec::with_capacity(n_knots + 2 * degree);
    knots.extend((0..degree).map(|i| lo - spacing * (degree - i) as f64));
    knots.extend((0..n_knots).map(|i| lo + spacing * i as f64));
    knots[degree + n_knots - 1] = hi;
    knots.extend((1..=degree).map(|i| hi + spacing * i as f64));

    let n_basis = knots.len() - degree - 1;
    let mut basis = Array2::zeros((x.len(), n_basis));

    for (row, &xi) in x.iter().enumerate() {
        let values = cox_de_boor(&knots, degree, xi);
        for (j, v) in values.into_iter().take(n_basis).enumerate() {
            basis[[row, j]] = v;
        }
    }

    basis
}

// Cox-de Boor recursion evaluated bottom-up for every basis function at `x`
fn cox_de_boor(knots: &[f64], degree: usize, x: f64) -> Vec<f64> {
    let mut n: Vec<f64> = knots
        .windows(2)
        .map(|w| if w[0] <= x && x < w[1] { 1.0 } else { 0.0 })
        .collect();

    for p in 1..=degree {
        n = (0..knots.len() - 1 - p)
            .map(|i| {
                let mut v = 0.0;
                let left = knots[i + p] - knots[i];
                if left != 0.0 {
                    v += (x - knots[i]) / left * n[i];
                }
                let right = knots[i + p + 1] - knots[i + 1];
                if right != 0.0 {
                    v += (knots[i + p + 1] - x) / right * n[i + 1];
                }
                v
            })
            .collect();
    }

    n
}
