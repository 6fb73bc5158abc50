//! Utility functions and types

mod parallel;
mod selection;
pub mod stats;

pub use parallel::{try_map_with_config, ParallelConfig};
pub use selection::{best_of, first_adequate, Selected};
