//! Distances and cluster centers for series k-means

use crate::clustering::dtw::{dtw_distance, dtw_path};

/// A distance between series together with the matching notion of a
/// cluster center.
pub trait SeriesMetric: Send + Sync {
    fn distance(&self, a: &[f64], b: &[f64]) -> f64;

    /// Center of `members`, refined from `current`. `members` is never empty.
    fn barycenter(&self, members: &[&[f64]], current: &[f64]) -> Vec<f64>;

    fn name(&self) -> &'static str;
}

/// Plain Euclidean distance with arithmetic-mean centers
#[derive(Debug, Clone, Copy, Default)]
pub struct Euclidean;

impl SeriesMetric for Euclidean {
    fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y).powi(2))
            .sum::<f64>()
            .sqrt()
    }

    fn barycenter(&self, members: &[&[f64]], current: &[f64]) -> Vec<f64> {
        let mut center = vec![0.0; current.len()];
        for member in members {
            for (c, v) in center.iter_mut().zip(member.iter()) {
                *c += v;
            }
        }
        let n = members.len().max(1) as f64;
        center.iter_mut().for_each(|c| *c /= n);
        center
    }

    fn name(&self) -> &'static str {
        "euclidean"
    }
}

/// Dynamic time warping with DTW barycenter averaging (DBA) centers
#[derive(Debug, Clone, Copy)]
pub struct Dtw {
    /// DBA refinement rounds per center update
    pub barycenter_iter: usize,
    /// Stop refining once the center moves less than this
    pub tol: f64,
}

impl Default for Dtw {
    fn default() -> Self {
        Self {
            barycenter_iter: 30,
            tol: 1e-5,
        }
    }
}

impl SeriesMetric for Dtw {
    fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        dtw_distance(a, b)
    }

    fn barycenter(&self, members: &[&[f64]], current: &[f64]) -> Vec<f64> {
        let mut center = current.to_vec();
        if center.is_empty() {
            return center;
        }

        for _ in 0..self.barycenter_iter {
            let mut sums = vec![0.0; center.len()];
            let mut counts = vec![0usize; center.len()];

            for member in members {
                let (_, path) = dtw_path(&center, member);
                for (i, j) in path {
                    sums[i] += member[j];
                    counts[i] += 1;
                }
            }

            let updated: Vec<f64> = sums
                .iter()
                .zip(counts.iter())
                .zip(center.iter())
                .map(|((&s, &n), &c)| if n > 0 { s / n as f64 } else { c })
                .collect();

            let shift: f64 = updated
                .iter()
                .zip(center.iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f64>()
                .sqrt();
            center = updated;

            if shift < self.tol {
                break;
            }
        }

        center
    }

    fn name(&self) -> &'static str {
        "dtw"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_euclidean_mean_center() {
        let a = [0.0, 2.0];
        let b = [2.0, 4.0];
        let center = Euclidean.barycenter(&[&a, &b], &[0.0, 0.0]);
        assert_eq!(center, vec![1.0, 3.0]);
        assert!((Euclidean.distance(&a, &b) - 8.0f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_dba_of_identical_members() {
        let s = [1.0, 3.0, 2.0, 5.0];
        let center = Dtw::default().barycenter(&[&s, &s, &s], &[0.0, 0.0, 0.0, 0.0]);
        let d = dtw_distance(&center, &s);
        assert!(d < 1e-9, "distance {}", d);
    }

    #[test]
    fn test_dba_does_not_increase_spread() {
        let a = [0.0, 0.0, 1.0, 2.0, 1.0];
        let b = [0.0, 1.0, 2.0, 1.0, 0.0];
        let start = [0.0, 0.5, 1.5, 1.5, 0.5];
        let dtw = Dtw::default();
        let spread = |c: &[f64]| dtw.distance(c, &a).powi(2) + dtw.distance(c, &b).powi(2);

        let center = dtw.barycenter(&[&a, &b], &start);
        assert!(spread(&center) <= spread(&start) + 1e-12);
    }
}
