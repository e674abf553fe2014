//! Generic stages usable in any pipeline.
//!
//! Domain stages (configuration loading, variables, schema collection) live
//! in the `confix` crate next to the pipelines that use them.

pub mod timing;

pub use timing::{Elapsed, TimingMiddleware};
