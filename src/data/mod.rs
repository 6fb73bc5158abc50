//! Tabular data consumed by the engine
//!
//! Reference data and working samples are polars [`DataFrame`](polars::prelude::DataFrame)s.
//!
//! - [`FrameExt`] - typed column access for frames
//! - [`Value`] - a single grid / cell value

mod frame;
mod value;

pub use frame::{bitwise_eq, constant_series, sample_rows, FrameExt};
pub use value::{sorted_unique, Value};
