//! Mesh processing algorithms.
//!
//! - **Decimation**: greedy edge collapse driven by cost, placement and stop policies
//! - **Progress**: callback used by long-running algorithms to report progress

pub mod decimate;
pub mod progress;

pub use progress::Progress;
