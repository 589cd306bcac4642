//! Storage Auditor
//!
//! Benchmark-and-reputation engine for decentralized storage providers:
//! probes each registered provider's endpoint surface, folds the
//! measurements into a composite score with a tamper-evident attestation,
//! compares the measurements against the provider's self-declared
//! capabilities, and adapts the audit cadence to the resulting reputation.
//!
//! ## Module Structure
//!
//! ```text
//! src/
//! ├── lib.rs         - Crate root with re-exports
//! ├── main.rs        - Server entrypoint
//! ├── config.rs      - Configuration management
//! ├── provider.rs    - Provider registry records
//! ├── probes/        - Metric probes against provider endpoints
//! │   ├── client.rs     - Timed HTTP probe client
//! │   ├── iops.rs       - Paced 4K write+read IOPS loop
//! │   ├── throughput.rs - Sequential & 4-stream parallel transfers
//! │   ├── latency.rs    - Paired 1KB samples, p99
//! │   ├── durability.rs - Checksum round-trip
//! │   ├── network.rs    - Health sampling & bandwidth estimate
//! │   └── content.rs    - Content-addressed pin/resolve/retrieve
//! ├── bench/         - Benchmark execution & scoring
//! │   ├── executor.rs    - Per-kind probe suite runner
//! │   ├── result.rs      - Immutable result records
//! │   ├── scoring.rs     - 0-10000 composite score
//! │   └── attestation.rs - SHA-256 result attestation
//! ├── reputation/    - Deviation & reputation system
//! │   ├── score.rs   - Bounded score, tiers
//! │   └── engine.rs  - Deviation, transitions, due-check
//! ├── scheduler/     - Benchmark scheduling
//! │   ├── jobs.rs         - Job records & lifecycle
//! │   └── orchestrator.rs - State owner & periodic driver
//! └── api/           - HTTP API endpoints
//!     └── routes.rs  - Auditor API router
//! ```

pub mod api;
pub mod bench;
pub mod config;
pub mod probes;
pub mod provider;
pub mod reputation;
pub mod scheduler;

// Re-export main types for convenience
pub use config::{
    AuditorConfig, DeviationConfig, LoggingConfig, ProbeConfig, ScheduleConfig, ServerConfig,
};
pub use provider::{DeclaredCapabilities, ProviderInfo, StorageKind};

pub use bench::result::{
    BenchmarkResult, ContentAddressedMetrics, DurabilityMetrics, IopsMetrics, LatencyMetrics,
    NetworkMetrics, StorageMetrics, ThroughputMetrics, LATENCY_SENTINEL_MS,
};
pub use bench::BenchmarkExecutor;

pub use probes::{ProbeClient, ProbeResponse};

pub use reputation::{
    apply_benchmark, deviation_percent, should_benchmark, BenchmarkDue, Reputation,
    ReputationTier, DEFAULT_SCORE,
};

pub use scheduler::{
    AuditOrchestrator, AuditorStats, BenchmarkJob, JobStatus, RankedProvider, TriggerKind,
    HISTORY_LIMIT,
};

pub use api::{create_audit_router, AuditorApiState};
