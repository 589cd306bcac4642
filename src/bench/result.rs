//! Benchmark Result Records
//!
//! One immutable snapshot per completed benchmark: every metric family the
//! probe suite produces, the 0-10000 composite score, and the attestation
//! digest binding the key fields for tamper-evidence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Capacity the provider reports about itself (advisory, read from the
/// health endpoint when present)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageMetrics {
    /// Usable capacity in GB as reported by the provider, 0 if unreported
    pub usable_capacity_gb: f64,
}

/// IOPS measurements from the paced write+read loop
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IopsMetrics {
    /// Measured 4K read operations per second
    pub read_iops_4k: f64,
    /// Measured 4K write operations per second
    pub write_iops_4k: f64,
    /// Estimated 64K read IOPS, derived as `read_iops_4k * sqrt(4/64)`.
    /// Not measured: assumes IOPS degrades with the square root of the
    /// block-size ratio.
    pub read_iops_64k_estimated: f64,
    /// Estimated 64K write IOPS (same derivation as reads)
    pub write_iops_64k_estimated: f64,
    /// Weighted mix `0.7*read_iops_4k + 0.3*write_iops_4k`, rounded half
    /// away from zero
    pub mixed_iops: f64,
    /// Successful read operations in the window
    pub successful_reads: u64,
    /// Successful write operations in the window
    pub successful_writes: u64,
    /// Failed operations (reads + writes)
    pub failed_operations: u64,
}

/// Sequential and parallel throughput in MB/s
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThroughputMetrics {
    pub sequential_read_mbps: f64,
    pub sequential_write_mbps: f64,
    pub parallel_read_mbps: f64,
    pub parallel_write_mbps: f64,
}

/// Sentinel reported for every latency field when either the read or the
/// write side collected zero successful samples.
pub const LATENCY_SENTINEL_MS: f64 = 9999.0;

/// Latency statistics over the paired 1KB write+read samples, milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatencyMetrics {
    /// Minimum observed latency across all operations
    pub first_byte_ms: f64,
    /// Arithmetic mean of successful read latencies
    pub avg_read_ms: f64,
    /// Arithmetic mean of successful write latencies
    pub avg_write_ms: f64,
    /// p99 over all collected latencies, index `min(floor(n*0.99), n-1)`
    pub p99_ms: f64,
}

impl Default for LatencyMetrics {
    fn default() -> Self {
        Self {
            first_byte_ms: LATENCY_SENTINEL_MS,
            avg_read_ms: LATENCY_SENTINEL_MS,
            avg_write_ms: LATENCY_SENTINEL_MS,
            p99_ms: LATENCY_SENTINEL_MS,
        }
    }
}

/// Checksum round-trip outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DurabilityMetrics {
    /// Whether the digest recomputed over the read-back bytes matched
    pub checksum_verified: bool,
    /// Replication factor reported by the provider (default 1)
    pub replication_factor: u32,
    /// 0 on write failure; 50 on read failure; `70 + min(rf*10, 30)` on
    /// digest match; 0 on digest mismatch
    pub integrity_score: u32,
}

impl Default for DurabilityMetrics {
    fn default() -> Self {
        Self {
            checksum_verified: false,
            replication_factor: 1,
            integrity_score: 0,
        }
    }
}

/// Raw network quality of the link to the provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkMetrics {
    /// Mean health-check round-trip latency over successful samples, ms
    pub avg_latency_ms: f64,
    /// Failed round-trips as a percentage of the sample count
    pub packet_loss_percent: f64,
    /// Estimated bandwidth in Mbps, the larger of upload and download
    pub bandwidth_mbps: f64,
}

/// Measurements specific to content-addressed (pin/resolve/retrieve) providers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentAddressedMetrics {
    /// Content id the add/pin call returned, if any
    pub content_id: Option<String>,
    /// Speed of the timed add/pin in Mbps
    pub pinning_speed_mbps: f64,
    /// Time to resolve the content id (HEAD), ms
    pub resolve_ms: f64,
    /// Full-content retrieval speed in Mbps
    pub retrieval_speed_mbps: f64,
    /// Peer count from the provider's swarm status
    pub peer_count: u32,
}

/// Immutable snapshot of one completed benchmark.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub provider_id: String,
    pub timestamp: DateTime<Utc>,
    pub storage: StorageMetrics,
    pub iops: IopsMetrics,
    pub throughput: ThroughputMetrics,
    pub latency: LatencyMetrics,
    pub durability: DurabilityMetrics,
    pub network: NetworkMetrics,
    /// Present only for content-addressed providers
    pub content: Option<ContentAddressedMetrics>,
    /// Composite score in [0, 10000]
    pub overall_score: u32,
    /// SHA-256 digest binding provider id, timestamp, score and key metrics
    pub attestation: String,
}

impl BenchmarkResult {
    /// Measured throughput used for deviation against the declared claim:
    /// mean of the sequential read and write rates, MB/s
    pub fn measured_throughput_mbps(&self) -> f64 {
        (self.throughput.sequential_read_mbps + self.throughput.sequential_write_mbps) / 2.0
    }
}
