//! Network Probe
//!
//! Raw link quality independent of storage behavior: 20 sequential
//! health-check round-trips for latency and loss, then one 1MB upload and
//! matching download to estimate bandwidth. Reports the larger of the two
//! bandwidth estimates, falling back to upload-only when the download fails.

use crate::bench::result::NetworkMetrics;
use crate::config::ProbeConfig;
use crate::probes::client::ProbeClient;
use std::time::Duration;
use tracing::debug;

/// Health-check round-trips per probe
const HEALTH_SAMPLES: usize = 20;

const MEGABIT: f64 = 1_000_000.0;

pub async fn run(client: &ProbeClient, endpoint: &str, config: &ProbeConfig) -> NetworkMetrics {
    let timeout = Duration::from_secs(config.probe_timeout_secs);
    let transfer_timeout = Duration::from_secs(config.large_transfer_timeout_secs);

    let mut latencies = Vec::with_capacity(HEALTH_SAMPLES);
    let mut failures: usize = 0;
    for _ in 0..HEALTH_SAMPLES {
        match client.get_bytes(endpoint, "/health", timeout).await {
            Ok(response) if response.is_success() => latencies.push(response.elapsed_ms),
            _ => failures += 1,
        }
    }

    // Bandwidth: timed 1MB upload, then a matching download
    let payload = vec![0x7Eu8; 1024 * 1024];
    let payload_len = payload.len();
    let upload_mbps = match client
        .post_bytes(
            endpoint,
            "/benchmark/bandwidth-test",
            payload,
            &[],
            transfer_timeout,
        )
        .await
    {
        Ok(response) if response.is_success() && response.elapsed_ms > 0.0 => {
            transfer_rate_mbps(payload_len as u64, response.elapsed_ms)
        }
        _ => {
            debug!(endpoint = %endpoint, "Bandwidth upload failed");
            0.0
        }
    };

    let download_mbps = match client
        .get_bytes(endpoint, "/benchmark/bandwidth-test", transfer_timeout)
        .await
    {
        Ok(response) if response.is_success() && response.elapsed_ms > 0.0 => {
            Some(transfer_rate_mbps(response.body.len() as u64, response.elapsed_ms))
        }
        _ => {
            debug!(endpoint = %endpoint, "Bandwidth download failed, using upload estimate");
            None
        }
    };

    fold(latencies, failures, upload_mbps, download_mbps)
}

/// Bits moved over elapsed milliseconds, in Mbps
pub fn transfer_rate_mbps(bytes: u64, elapsed_ms: f64) -> f64 {
    if elapsed_ms > 0.0 {
        (bytes as f64 * 8.0) / MEGABIT / (elapsed_ms / 1000.0)
    } else {
        0.0
    }
}

/// Reduce collected round-trips and bandwidth estimates to the metric family
pub fn fold(
    latencies: Vec<f64>,
    failures: usize,
    upload_mbps: f64,
    download_mbps: Option<f64>,
) -> NetworkMetrics {
    let samples = latencies.len() + failures;
    let packet_loss_percent = if samples > 0 {
        failures as f64 / samples as f64 * 100.0
    } else {
        100.0
    };

    let avg_latency_ms = if latencies.is_empty() {
        0.0
    } else {
        latencies.iter().sum::<f64>() / latencies.len() as f64
    };

    NetworkMetrics {
        avg_latency_ms,
        packet_loss_percent,
        bandwidth_mbps: match download_mbps {
            Some(download) => upload_mbps.max(download),
            None => upload_mbps,
        },
    }
}
