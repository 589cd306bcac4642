//! Benchmark Scheduling
//!
//! Job records plus the orchestrator that owns all engine state and drives
//! periodic, spot-check, and operator-triggered benchmarks.

pub mod jobs;
pub mod orchestrator;

pub use jobs::{BenchmarkJob, JobStatus, TriggerKind};
pub use orchestrator::{AuditOrchestrator, AuditorStats, RankedProvider, HISTORY_LIMIT};
