//! Content-Addressed Probe Set
//!
//! Used instead of the block/object suite for content-addressed providers:
//! pin a payload (timed), resolve the returned content id, retrieve the
//! full content, and query the swarm peer count. Integrity is binary on
//! whether the pin produced a content id at all.

use crate::bench::result::{ContentAddressedMetrics, DurabilityMetrics};
use crate::config::ProbeConfig;
use crate::probes::client::ProbeClient;
use crate::probes::network::transfer_rate_mbps;
use std::time::Duration;
use tracing::debug;

pub async fn run(
    client: &ProbeClient,
    endpoint: &str,
    config: &ProbeConfig,
) -> ContentAddressedMetrics {
    let payload = vec![0xC4u8; config.throughput_payload_bytes];
    let payload_len = payload.len();
    let timeout = Duration::from_secs(config.probe_timeout_secs);
    let transfer_timeout = Duration::from_secs(config.large_transfer_timeout_secs);

    // Pin/add the payload, timed
    let (content_id, pinning_speed_mbps) = match client
        .post_bytes(endpoint, "/api/v0/add", payload, &[], transfer_timeout)
        .await
    {
        Ok(response) if response.is_success() => {
            let speed = transfer_rate_mbps(payload_len as u64, response.elapsed_ms);
            (parse_content_id(&response.body), speed)
        }
        _ => {
            debug!(endpoint = %endpoint, "Content add/pin failed");
            (None, 0.0)
        }
    };

    let (resolve_ms, retrieval_speed_mbps) = match &content_id {
        Some(cid) => {
            let resolve_ms = match client
                .head(endpoint, &format!("/content/{}", cid), timeout)
                .await
            {
                Ok(response) if response.is_success() => response.elapsed_ms,
                _ => 0.0,
            };

            let retrieval_speed_mbps = match client
                .get_bytes(endpoint, &format!("/content/{}", cid), transfer_timeout)
                .await
            {
                Ok(response) if response.is_success() => {
                    transfer_rate_mbps(response.body.len() as u64, response.elapsed_ms)
                }
                _ => 0.0,
            };

            (resolve_ms, retrieval_speed_mbps)
        }
        None => (0.0, 0.0),
    };

    let peer_count = match client.get_bytes(endpoint, "/swarm/peers", timeout).await {
        Ok(response) if response.is_success() => parse_peer_count(&response.body),
        _ => 0,
    };

    ContentAddressedMetrics {
        content_id,
        pinning_speed_mbps,
        resolve_ms,
        retrieval_speed_mbps,
        peer_count,
    }
}

/// The add/pin response is either a JSON object carrying the content id or
/// the bare id as text
pub fn parse_content_id(body: &[u8]) -> Option<String> {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) {
        for key in ["cid", "Hash", "hash"] {
            if let Some(cid) = value.get(key).and_then(|v| v.as_str()) {
                return Some(cid.to_string());
            }
        }
    }

    let text = String::from_utf8_lossy(body);
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.contains(char::is_whitespace) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Swarm status is either a JSON peer list, an object with a count, or a
/// bare integer
pub fn parse_peer_count(body: &[u8]) -> u32 {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) {
        if let Some(peers) = value.get("peers").or_else(|| value.get("Peers")) {
            if let Some(list) = peers.as_array() {
                return list.len() as u32;
            }
            if let Some(count) = peers.as_u64() {
                return count as u32;
            }
        }
        if let Some(count) = value.as_u64() {
            return count as u32;
        }
    }
    String::from_utf8_lossy(body).trim().parse().unwrap_or(0)
}

/// Durability metrics derived from the content-addressed suite: replication
/// is approximated by the peer count (capped at 3), integrity is binary on
/// the pin producing a content id
pub fn durability_from_content(content: &ContentAddressedMetrics) -> DurabilityMetrics {
    let replication_factor = if content.peer_count > 0 {
        content.peer_count.min(3)
    } else {
        1
    };

    DurabilityMetrics {
        checksum_verified: content.content_id.is_some(),
        replication_factor,
        integrity_score: if content.content_id.is_some() { 100 } else { 0 },
    }
}
