//! Dynamic time warping between numeric series

use ndarray::Array2;

/// Accumulated squared-difference cost matrix with a padded first row and
/// column, `(n + 1) x (m + 1)`.
fn accumulated_cost(a: &[f64], b: &[f64]) -> Array2<f64> {
    let (n, m) = (a.len(), b.len());
    let mut acc = Array2::from_elem((n + 1, m + 1), f64::INFINITY);
    acc[[0, 0]] = 0.0;

    for i in 1..=n {
        for j in 1..=m {
            let cost = (a[i - 1] - b[j - 1]).powi(2);
            let best = acc[[i - 1, j - 1]].min(acc[[i - 1, j]]).min(acc[[i, j - 1]]);
            acc[[i, j]] = cost + best;
        }
    }

    acc
}

/// DTW distance: square root of the minimal accumulated squared difference
/// over all monotone alignments.
///
/// Two empty series are at distance 0; an empty and a non-empty one are
/// infinitely far apart.
pub fn dtw_distance(a: &[f64], b: &[f64]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return if a.len() == b.len() { 0.0 } else { f64::INFINITY };
    }
    accumulated_cost(a, b)[[a.len(), b.len()]].sqrt()
}

/// DTW distance plus the optimal alignment as `(index in a, index in b)`
/// pairs from the first to the last element.
pub fn dtw_path(a: &[f64], b: &[f64]) -> (f64, Vec<(usize, usize)>) {
    if a.is_empty() || b.is_empty() {
        return (dtw_distance(a, b), Vec::new());
    }

    let acc = accumulated_cost(a, b);
    let (mut i, mut j) = (a.len(), b.len());
    let mut path = Vec::with_capacity(i + j);
    path.push((i - 1, j - 1));

    while i > 1 || j > 1 {
        if i == 1 {
            j -= 1;
        } else if j == 1 {
            i -= 1;
        } else {
            let diag = acc[[i - 1, j - 1]];
            let up = acc[[i - 1, j]];
            let left = acc[[i, j - 1]];
            if diag <= up && diag <= left {
                i -= 1;
                j -= 1;
            } else if up <= left {
                i -= 1;
            } else {
                j -= 1;
            }
        }
        path.push((i - 1, j - 1));
    }

    path.reverse();
    (acc[[a.len(), b.len()]].sqrt(), path)
}
