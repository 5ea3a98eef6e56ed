//! Experiment Runner (C7): bounded-parallelism ablation execution,
//! local metrics, derived pseudo-ablations, and aggregate statistics.

pub mod ablation;
pub mod aggregate;
pub mod metrics;
pub mod result;
pub mod runner;
pub mod sample;

pub use ablation::AblationConfig;
pub use aggregate::{AggregateStats, aggregate};
pub use metrics::{LocalMetrics, compute_local_metrics};
pub use result::SampleResult;
pub use runner::ExperimentRunner;
pub use sample::Sample;
