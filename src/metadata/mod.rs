//! Feature metadata consumed by the engine
//!
//! Descriptors are produced outside this crate (type inference, one-hot
//! grouping); the catalog only stores and validates them.

mod catalog;
mod descriptor;

pub use catalog::FeatureCatalog;
pub use descriptor::{FeatureDescriptor, FeatureType, OneHotColumn};
