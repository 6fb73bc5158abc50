//! Grouping one-way curves into clusters with automatic cluster-count selection

use crate::clustering::kmeans::{KMeansFit, SeriesKMeans};
use crate::clustering::metric::{Dtw, Euclidean, SeriesMetric};
use crate::clustering::silhouette::{distance_matrix, silhouette_score};
use crate::error::{PdpError, Result};
use crate::explainability::{ClusterAssignment, OneWayPdp};
use crate::utils::best_of;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::{debug, info, warn};

/// Settings shared by both clustering pipelines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusteringConfig {
    /// k-means restarts per candidate cluster count
    pub n_init: usize,
    /// Iteration cap of the DTW (curve shape) pipeline
    pub quantitative_max_iter: usize,
    /// Iteration cap of the deviation pipeline
    pub categorical_max_iter: usize,
    pub tol: f64,
    /// DBA refinement rounds per center update
    pub barycenter_iter: usize,
    pub seed: u64,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            n_init: 5,
            quantitative_max_iter: 50,
            categorical_max_iter: 300,
            tol: 1e-4,
            barycenter_iter: 30,
            seed: 42,
        }
    }
}

impl ClusteringConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init.max(1);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_iter(mut self, quantitative: usize, categorical: usize) -> Self {
        self.quantitative_max_iter = quantitative.max(1);
        self.categorical_max_iter = categorical.max(1);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterKind {
    Quantitative,
    Categorical,
}

/// A group of features whose one-way curves behave alike
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: usize,
    pub kind: ClusterKind,
    /// Mean distance of the members to the cluster center
    pub mean_distance: f64,
    /// Member feature ids in one-way result order
    pub features: Vec<String>,
}

/// Clusters of both pipelines plus any pipeline that could not run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterSet {
    pub quantitative: Vec<Cluster>,
    pub categorical: Vec<Cluster>,
    pub warnings: Vec<String>,
}

/// Candidate cluster counts for `n_features` series: `2..upper` where
/// `upper` is half the feature count when that exceeds 2, else the count.
pub fn candidate_counts(n_features: usize) -> Range<usize> {
    let half = n_features / 2;
    let upper = if half > 2 { half } else { n_features };
    2..upper.max(2)
}

/// Partition with empty clusters dropped and ids compacted to `0..n_clusters`
#[derive(Debug, Clone)]
struct Partition {
    n_clusters: usize,
    labels: Vec<usize>,
    distances: Vec<f64>,
}

impl Partition {
    fn compact(fit: KMeansFit) -> Self {
        let mut used = vec![false; fit.n_clusters()];
        for &l in &fit.labels {
            used[l] = true;
        }

        let mut remap = vec![0; used.len()];
        let mut next = 0;
        for (old, &in_use) in used.iter().enumerate() {
            if in_use {
                remap[old] = next;
                next += 1;
            }
        }

        Self {
            n_clusters: next,
            labels: fit.labels.iter().map(|&l| remap[l]).collect(),
            distances: fit.distances,
        }
    }
}

/// Fit k-means for every candidate count and keep the best silhouette
fn select_partition<M>(
    pipeline: &str,
    series: &[Vec<f64>],
    metric: M,
    max_iter: usize,
    config: &ClusteringConfig,
) -> Result<Partition>
where
    M: SeriesMetric + Clone,
{
    if series.is_empty() {
        return Ok(Partition {
            n_clusters: 0,
            labels: Vec::new(),
            distances: Vec::new(),
        });
    }

    let candidates = candidate_counts(series.len());
    if candidates.is_empty() {
        return Err(PdpError::DegenerateInput(format!(
            "{} clustering needs at least 3 features, got {}",
            pipeline,
            series.len()
        )));
    }

    let distances = distance_matrix(series, |a, b| metric.distance(a, b));

    let selected = best_of(candidates, |&k| {
        let fit = SeriesKMeans::new(k, metric.clone())
            .with_n_init(config.n_init)
            .with_max_iter(max_iter)
            .with_tol(config.tol)
            .with_random_state(config.seed)
            .fit(series)?;
        let score = silhouette_score(&distances, &fit.labels).unwrap_or(f64::NEG_INFINITY);
        debug!(pipeline, n_clusters = k, score, metric = metric.name(), "cluster candidate");
        Ok((fit, score))
    })?;

    let selected = selected
        .ok_or_else(|| PdpError::ComputationError(format!("{} clustering had no candidates", pipeline)))?;

    Ok(Partition::compact(selected.model))
}

fn build_clusters(
    kind: ClusterKind,
    first_id: usize,
    partition: &Partition,
    members: &[usize],
    one_way: &mut [OneWayPdp],
) -> Vec<Cluster> {
    let mut clusters: Vec<Cluster> = (0..partition.n_clusters)
        .map(|i| Cluster {
            id: first_id + i,
            kind,
            mean_distance: 0.0,
            features: Vec::new(),
        })
        .collect();

    for ((&idx, &label), &distance) in members
        .iter()
        .zip(partition.labels.iter())
        .zip(partition.distances.iter())
    {
        let pdp = &mut one_way[idx];
        let cluster = &mut clusters[label];
        pdp.cluster = Some(ClusterAssignment {
            cluster: cluster.id,
            distance_to_center: distance,
        });
        cluster.mean_distance += distance;
        cluster.features.push(pdp.id.clone());
    }

    for cluster in &mut clusters {
        cluster.mean_distance /= cluster.features.len().max(1) as f64;
    }

    clusters
}

/// Cluster one-way results and record each one's assignment in place.
///
/// Continuous and integer curves are grouped by shape (DTW k-means on the
/// raw mean predictions); every other curve by its deviation alone.
/// Categorical cluster ids follow the quantitative ones. A pipeline with too
/// few features is skipped with a warning.
pub fn cluster_one_way(one_way: &mut [OneWayPdp], config: &ClusteringConfig) -> Result<ClusterSet> {
    let (quantitative, categorical): (Vec<usize>, Vec<usize>) =
        (0..one_way.len()).partition(|&i| one_way[i].feature_type.clusters_by_shape());

    for pdp in one_way.iter_mut() {
        pdp.cluster = None;
    }

    let mut set = ClusterSet::default();

    let series: Vec<Vec<f64>> = quantitative
        .iter()
        .map(|&i| one_way[i].mean_predictions.clone())
        .collect();
    let dtw = Dtw {
        barycenter_iter: config.barycenter_iter,
        ..Dtw::default()
    };
    match select_partition("quantitative", &series, dtw, config.quantitative_max_iter, config) {
        Ok(partition) => {
            set.quantitative =
                build_clusters(ClusterKind::Quantitative, 0, &partition, &quantitative, one_way);
        }
        Err(PdpError::DegenerateInput(reason)) => {
            warn!(features = series.len(), "{}", reason);
            set.warnings.push(reason);
        }
        Err(e) => return Err(e),
    }

    let series: Vec<Vec<f64>> = categorical
        .iter()
        .map(|&i| vec![one_way[i].deviation])
        .collect();
    match select_partition("categorical", &series, Euclidean, config.categorical_max_iter, config) {
        Ok(partition) => {
            let first_id = set.quantitative.len();
            set.categorical =
                build_clusters(ClusterKind::Categorical, first_id, &partition, &categorical, one_way);
        }
        Err(PdpError::DegenerateInput(reason)) => {
            warn!(features = series.len(), "{}", reason);
            set.warnings.push(reason);
        }
        Err(e) => return Err(e),
    }

    info!(
        quantitative = set.quantitative.len(),
        categorical = set.categorical.len(),
        "feature clusters chosen"
    );

    Ok(set)
}
