//! Task distribution: sequential or rayon thread pool

use crate::error::Result;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Configuration for distributing independent work items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallelConfig {
    /// Number of worker threads (None or 1 = run on the calling thread)
    pub n_threads: Option<usize>,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self { n_threads: None }
    }
}

impl ParallelConfig {
    /// Create a new (sequential) configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set number of threads
    pub fn with_threads(mut self, n: usize) -> Self {
        self.n_threads = Some(n.max(1));
        self
    }

    /// Use every core rayon sees
    pub fn all_cores() -> Self {
        Self {
            n_threads: Some(rayon::current_num_threads()),
        }
    }

    /// Get the number of threads to use
    pub fn num_threads(&self) -> usize {
        self.n_threads.unwrap_or(1).max(1)
    }

    pub fn is_sequential(&self) -> bool {
        self.num_threads() == 1
    }
}

/// Run a fallible task per item and gather results in item order.
///
/// The first error aborts the batch and is returned as-is; no partial
/// output is produced.
pub fn try_map_with_config<T, U, F>(items: Vec<T>, config: &ParallelConfig, f: F) -> Result<Vec<U>>
where
    T: Send,
    U: Send,
    F: Fn(T) -> Result<U> + Send + Sync,
{
    if config.is_sequential() {
        return items.into_iter().map(f).collect();
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.num_threads())
        .build()?;

    pool.install(|| items.into_par_iter().map(f).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PdpError;

    #[test]
    fn test_parallel_config() {
        let config = ParallelConfig::new();
        assert!(config.is_sequential());

        let config = ParallelConfig::new().with_threads(4);
        assert_eq!(config.n_threads, Some(4));
        assert!(!config.is_sequential());

        assert_eq!(ParallelConfig::new().with_threads(0).num_threads(), 1);
    }

    #[test]
    fn test_all_cores_matches_rayon() {
        let config = ParallelConfig::all_cores();
        assert_eq!(config.num_threads(), rayon::current_num_threads());

        let out = try_map_with_config(vec![1, 2, 3], &config, |x: i32| Ok(x + 1)).unwrap();
        assert_eq!(out, vec![2, 3, 4]);
    }

    #[test]
    fn test_try_map_keeps_order() {
        for config in [ParallelConfig::new(), ParallelConfig::new().with_threads(3)] {
            let items: Vec<usize> = (0..64).collect();
            let out = try_map_with_config(items, &config, |x| Ok(x * x)).unwrap();
            assert_eq!(out, (0..64).map(|x| x * x).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_try_map_propagates_error() {
        let config = ParallelConfig::new().with_threads(2);
        let result = try_map_with_config((0..10).collect(), &config, |x: usize| {
            if x == 7 {
                Err(PdpError::PredictionError("boom".to_string()))
            } else {
                Ok(x)
            }
        });
        assert!(matches!(result, Err(PdpError::PredictionError(msg)) if msg == "boom"));
    }
}
