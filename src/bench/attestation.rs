//! Attestation Digests
//!
//! Binds a benchmark's key inputs and outputs into a SHA-256 digest so a
//! stored result can later be checked for tampering. Advisory only, not a
//! cryptographic proof of service.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Digest over `{provider_id, timestamp, score, iops, throughput}` for
/// block/object benchmarks
pub fn attestation_digest(
    provider_id: &str,
    timestamp: DateTime<Utc>,
    score: u32,
    mixed_iops: f64,
    throughput_mbps: f64,
) -> String {
    let input = serde_json::json!({
        "provider_id": provider_id,
        "timestamp": timestamp.to_rfc3339(),
        "score": score,
        "iops": mixed_iops,
        "throughput_mbps": throughput_mbps,
    });

    let mut hasher = Sha256::new();
    hasher.update(input.to_string().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Reduced digest for content-addressed providers, which have no
/// block-level IOPS/throughput measurements to bind
pub fn reduced_attestation_digest(
    provider_id: &str,
    timestamp: DateTime<Utc>,
    score: u32,
) -> String {
    let input = serde_json::json!({
        "provider_id": provider_id,
        "timestamp": timestamp.to_rfc3339(),
        "score": score,
    });

    let mut hasher = Sha256::new();
    hasher.update(input.to_string().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// SHA-256 hex digest of a probe payload, used by the durability round-trip
pub fn payload_digest(payload: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload);
    format!("{:x}", hasher.finalize())
}
