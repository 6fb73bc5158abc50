//! Clustering of one-way partial dependence curves
//!
//! - DTW k-means with DBA centers for curve shapes
//! - Euclidean k-means for scalar deviations
//! - Silhouette-based choice of the cluster count

mod dtw;
mod kmeans;
mod metric;
mod pipeline;
mod silhouette;

pub use dtw::{dtw_distance, dtw_path};
pub use kmeans::{KMeansFit, SeriesKMeans};
pub use metric::{Dtw, Euclidean, SeriesMetric};
pub use pipeline::{candidate_counts, cluster_one_way, Cluster, ClusterKind, ClusterSet, ClusteringConfig};
pub use silhouette::{distance_matrix, silhouette_score};
