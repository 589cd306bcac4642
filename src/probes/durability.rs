//! Durability Probe
//!
//! Checksum round-trip: write a payload with its digest attached, read it
//! back, recompute the digest over the returned bytes. The integrity score
//! grades the outcome: 0 on write failure, 50 on read failure, and
//! `70 + min(replication_factor*10, 30)` on a verified round-trip.

use crate::bench::attestation::payload_digest;
use crate::bench::result::DurabilityMetrics;
use crate::config::ProbeConfig;
use crate::probes::client::ProbeClient;
use std::time::Duration;
use tracing::debug;

/// Request header carrying the expected digest on the write
pub const DIGEST_HEADER: &str = "x-content-digest";

/// Response header the provider may use to report its replication factor
pub const REPLICATION_HEADER: &str = "x-replication-factor";

pub async fn run(client: &ProbeClient, endpoint: &str, config: &ProbeConfig) -> DurabilityMetrics {
    let payload = vec![0xD7u8; 64 * 1024];
    let expected_digest = payload_digest(&payload);
    let timeout = Duration::from_secs(config.probe_timeout_secs);

    let write_response = match client
        .post_bytes(
            endpoint,
            "/benchmark/durability-write",
            payload,
            &[(DIGEST_HEADER, expected_digest.as_str())],
            timeout,
        )
        .await
    {
        Ok(response) if response.is_success() => response,
        _ => {
            debug!(endpoint = %endpoint, "Durability write failed");
            return DurabilityMetrics {
                checksum_verified: false,
                replication_factor: 1,
                integrity_score: 0,
            };
        }
    };

    let replication_factor = write_response
        .header(REPLICATION_HEADER)
        .and_then(|value| value.parse::<u32>().ok())
        .unwrap_or(1);

    let read_back = match client
        .get_bytes(endpoint, "/benchmark/durability-read", timeout)
        .await
    {
        Ok(response) if response.is_success() => response.body,
        _ => {
            debug!(endpoint = %endpoint, "Durability read-back failed");
            return DurabilityMetrics {
                checksum_verified: false,
                replication_factor,
                integrity_score: 50,
            };
        }
    };

    let checksum_verified = payload_digest(&read_back) == expected_digest;
    DurabilityMetrics {
        checksum_verified,
        replication_factor,
        integrity_score: integrity_score(checksum_verified, replication_factor),
    }
}

/// Score a completed round-trip: digest mismatch is worth nothing even
/// though both calls succeeded
pub fn integrity_score(checksum_verified: bool, replication_factor: u32) -> u32 {
    if checksum_verified {
        70 + (replication_factor * 10).min(30)
    } else {
        0
    }
}
