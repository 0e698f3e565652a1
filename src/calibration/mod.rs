//! Offline derivation of calibration constants: normalization bounds from a
//! benchmark corpus and node weights from pairwise comparison matrices.

pub mod ahp;
pub mod benchmark;
pub mod weighter;

pub use ahp::CONSISTENCY_THRESHOLD;
pub use benchmark::{BenchmarkOutcome, Benchmarker, Bound, BoundStrategy};
pub use weighter::{WeightResult, elicit_weights};
