//! Benchmark Execution
//!
//! The executor selects the probe set for a provider's storage kind, folds
//! the measurements into an immutable result snapshot, computes the
//! composite score, and binds the key fields into an attestation digest.

pub mod attestation;
pub mod executor;
pub mod result;
pub mod scoring;

pub use executor::BenchmarkExecutor;
pub use result::{
    BenchmarkResult, ContentAddressedMetrics, DurabilityMetrics, IopsMetrics, LatencyMetrics,
    NetworkMetrics, StorageMetrics, ThroughputMetrics,
};
