//! K-means over variable-length series under a pluggable metric

use crate::clustering::metric::SeriesMetric;
use crate::error::{PdpError, Result};
use rand::RngCore;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Fitted partition of a set of series
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansFit {
    pub centers: Vec<Vec<f64>>,
    /// Index of the nearest center per series
    pub labels: Vec<usize>,
    /// Distance of each series to its nearest center
    pub distances: Vec<f64>,
    /// Sum of squared distances to the nearest center
    pub inertia: f64,
}

impl KMeansFit {
    pub fn n_clusters(&self) -> usize {
        self.centers.len()
    }
}

/// K-means with k-means++ initialization and seeded restarts
#[derive(Debug, Clone)]
pub struct SeriesKMeans<M: SeriesMetric> {
    pub n_clusters: usize,
    /// Independent restarts; the lowest inertia wins
    pub n_init: usize,
    pub max_iter: usize,
    pub tol: f64,
    pub random_state: u64,
    metric: M,
}

impl<M: SeriesMetric> SeriesKMeans<M> {
    pub fn new(n_clusters: usize, metric: M) -> Self {
        Self {
            n_clusters,
            n_init: 5,
            max_iter: 300,
            tol: 1e-4,
            random_state: 42,
            metric,
        }
    }

    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init.max(1);
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter.max(1);
        self
    }

    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Fit `n_init` times and keep the partition with the lowest inertia
    pub fn fit(&self, series: &[Vec<f64>]) -> Result<KMeansFit> {
        let n_samples = series.len();
        if self.n_clusters == 0 || n_samples < self.n_clusters {
            return Err(PdpError::InvalidParameter {
                name: "n_clusters".to_string(),
                value: self.n_clusters.to_string(),
                reason: format!("must be between 1 and the number of series ({})", n_samples),
            });
        }

        let mut best: Option<KMeansFit> = None;
        for init in 0..self.n_init {
            let mut rng = ChaCha8Rng::seed_from_u64(self.random_state.wrapping_add(init as u64));
            let fit = self.fit_once(series, &mut rng);
            let better = match &best {
                None => true,
                Some(incumbent) => fit.inertia < incumbent.inertia,
            };
            if better {
                best = Some(fit);
            }
        }

        best.ok_or_else(|| PdpError::ComputationError("k-means produced no fit".to_string()))
    }

    fn fit_once(&self, series: &[Vec<f64>], rng: &mut ChaCha8Rng) -> KMeansFit {
        let n_samples = series.len();
        let mut centers = self.kmeans_pp_init(series, rng);
        let (mut labels, _) = self.assign(series, &centers);

        for _iter in 0..self.max_iter {
            // Update step: recompute centers from their members
            let mut new_centers = Vec::with_capacity(centers.len());
            for (c, current) in centers.iter().enumerate() {
                let members: Vec<&[f64]> = labels
                    .iter()
                    .zip(series.iter())
                    .filter(|(l, _)| **l == c)
                    .map(|(_, s)| s.as_slice())
                    .collect();
                if members.is_empty() {
                    // Empty cluster, reinitialize randomly
                    let idx = (rng.next_u64() as usize) % n_samples;
                    new_centers.push(series[idx].clone());
                } else {
                    new_centers.push(self.metric.barycenter(&members, current));
                }
            }

            let shift: f64 = centers
                .iter()
                .zip(new_centers.iter())
                .map(|(a, b)| self.metric.distance(a, b).powi(2))
                .sum::<f64>()
                .sqrt();
            centers = new_centers;

            // Assignment step
            let (new_labels, _) = self.assign(series, &centers);
            let changed = new_labels.iter().zip(labels.iter()).filter(|(a, b)| a != b).count();
            labels = new_labels;

            if changed == 0 || shift < self.tol {
                break;
            }
        }

        let (labels, distances) = self.assign(series, &centers);
        let inertia = distances.iter().map(|d| d * d).sum();

        KMeansFit {
            centers,
            labels,
            distances,
            inertia,
        }
    }

    /// Nearest center (lowest index on ties) and distance for every series
    fn assign(&self, series: &[Vec<f64>], centers: &[Vec<f64>]) -> (Vec<usize>, Vec<f64>) {
        series
            .iter()
            .map(|s| {
                let mut best_c = 0;
                let mut best_dist = f64::INFINITY;
                for (c, center) in centers.iter().enumerate() {
                    let d = self.metric.distance(s, center);
                    if d < best_dist {
                        best_dist = d;
                        best_c = c;
                    }
                }
                (best_c, best_dist)
            })
            .unzip()
    }

    /// K-means++ initialization: pick centers spread apart
    fn kmeans_pp_init(&self, series: &[Vec<f64>], rng: &mut ChaCha8Rng) -> Vec<Vec<f64>> {
        let n_samples = series.len();
        let mut centers: Vec<Vec<f64>> = Vec::with_capacity(self.n_clusters);

        // First center uniformly at random
        let first = (rng.next_u64() as usize) % n_samples;
        centers.push(series[first].clone());

        while centers.len() < self.n_clusters {
            let dists: Vec<f64> = series
                .iter()
                .map(|s| {
                    centers
                        .iter()
                        .map(|c| self.metric.distance(s, c).powi(2))
                        .fold(f64::INFINITY, f64::min)
                })
                .collect();

            // Weighted random selection proportional to D²
            let total: f64 = dists.iter().sum();
            if !(total > 0.0 && total.is_finite()) {
                let idx = (rng.next_u64() as usize) % n_samples;
                centers.push(series[idx].clone());
                continue;
            }

            let r = (rng.next_u64() as f64 / u64::MAX as f64) * total;
            let mut cumulative = 0.0;
            let mut chosen = n_samples - 1;
            for (i, &d) in dists.iter().enumerate() {
                cumulative += d;
                if cumulative >= r && d > 0.0 {
                    chosen = i;
                    break;
                }
            }
            centers.push(series[chosen].clone());
        }

        centers
    }
}
