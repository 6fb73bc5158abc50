//! Silhouette coefficient over a precomputed distance matrix

use ndarray::Array2;

/// Pairwise distances between all series under `distance`
pub fn distance_matrix<F>(series: &[Vec<f64>], distance: F) -> Array2<f64>
where
    F: Fn(&[f64], &[f64]) -> f64,
{
    let n = series.len();
    let mut d = Array2::zeros((n, n));
    for i in 0..n {
        for j in (i + 1)..n {
            let v = distance(&series[i], &series[j]);
            d[[i, j]] = v;
            d[[j, i]] = v;
        }
    }
    d
}

/// Mean silhouette coefficient of `labels`.
///
/// Members of singleton clusters score 0. Returns `None` when fewer than
/// two distinct labels are present.
pub fn silhouette_score(distances: &Array2<f64>, labels: &[usize]) -> Option<f64> {
    let n = labels.len();
    let n_labels = labels.iter().max().map_or(0, |&m| m + 1);
    let mut sizes = vec![0usize; n_labels];
    for &l in labels {
        sizes[l] += 1;
    }
    if sizes.iter().filter(|&&s| s > 0).count() < 2 {
        return None;
    }

    let total: f64 = (0..n)
        .map(|i| {
            let own = labels[i];
            if sizes[own] <= 1 {
                return 0.0;
            }

            let mut sums = vec![0.0; n_labels];
            for j in 0..n {
                if j != i {
                    sums[labels[j]] += distances[[i, j]];
                }
            }

            let a = sums[own] / (sizes[own] - 1) as f64;
            let b = (0..n_labels)
                .filter(|&c| c != own && sizes[c] > 0)
                .map(|c| sums[c] / sizes[c] as f64)
                .fold(f64::INFINITY, f64::min);

            let denom = a.max(b);
            if denom > 0.0 {
                (b - a) / denom
            } else {
                0.0
            }
        })
        .sum();

    Some(total / n as f64)
}
