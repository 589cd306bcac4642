//! Throughput Probe
//!
//! One large timed sequential write and read, then a fixed fan-out of 4
//! concurrent read streams and 4 concurrent write streams. A failed stream
//! contributes zero bytes but never aborts the batch.

use crate::bench::result::ThroughputMetrics;
use crate::config::ProbeConfig;
use crate::probes::client::ProbeClient;
use futures::future::join_all;
use std::time::{Duration, Instant};
use tracing::debug;

/// Concurrent streams per direction in the parallel batch
const PARALLEL_STREAMS: usize = 4;

const MB: f64 = 1024.0 * 1024.0;

pub async fn run(client: &ProbeClient, endpoint: &str, config: &ProbeConfig) -> ThroughputMetrics {
    let payload = vec![0x5Au8; config.throughput_payload_bytes];
    let timeout = Duration::from_secs(config.large_transfer_timeout_secs);

    // Sequential write, timed on its own
    let sequential_write_mbps = match client
        .post_bytes(endpoint, "/benchmark/write-large", payload.clone(), &[], timeout)
        .await
    {
        Ok(response) if response.is_success() && response.elapsed_ms > 0.0 => {
            payload.len() as f64 / MB / (response.elapsed_ms / 1000.0)
        }
        _ => {
            debug!(endpoint = %endpoint, "Sequential write probe failed");
            0.0
        }
    };

    // Sequential read, timed on its own
    let sequential_read_mbps = match client
        .get_bytes(endpoint, "/benchmark/read-large", timeout)
        .await
    {
        Ok(response) if response.is_success() && response.elapsed_ms > 0.0 => {
            response.body.len() as f64 / MB / (response.elapsed_ms / 1000.0)
        }
        _ => {
            debug!(endpoint = %endpoint, "Sequential read probe failed");
            0.0
        }
    };

    // Parallel reads: aggregate bytes over the batch wall-clock
    let batch_start = Instant::now();
    let reads = join_all((0..PARALLEL_STREAMS).map(|_| {
        let client = client.clone();
        let endpoint = endpoint.to_string();
        async move {
            client
                .get_bytes(&endpoint, "/benchmark/read-large", timeout)
                .await
        }
    }))
    .await;
    let read_span_secs = batch_start.elapsed().as_secs_f64();
    let read_bytes: u64 = reads
        .iter()
        .map(|outcome| match outcome {
            Ok(response) if response.is_success() => response.body.len() as u64,
            _ => 0,
        })
        .sum();

    // Parallel writes, same shape
    let batch_start = Instant::now();
    let writes = join_all((0..PARALLEL_STREAMS).map(|_| {
        let client = client.clone();
        let endpoint = endpoint.to_string();
        let payload = payload.clone();
        async move {
            client
                .post_bytes(&endpoint, "/benchmark/write-large", payload, &[], timeout)
                .await
        }
    }))
    .await;
    let write_span_secs = batch_start.elapsed().as_secs_f64();
    let write_bytes: u64 = writes
        .iter()
        .map(|outcome| match outcome {
            Ok(response) if response.is_success() => payload.len() as u64,
            _ => 0,
        })
        .sum();

    ThroughputMetrics {
        sequential_read_mbps,
        sequential_write_mbps,
        parallel_read_mbps: parallel_rate_mbps(read_bytes, read_span_secs),
        parallel_write_mbps: parallel_rate_mbps(write_bytes, write_span_secs),
    }
}

/// Aggregate bytes moved divided by the wall-clock span of the batch, MB/s
pub fn parallel_rate_mbps(total_bytes: u64, span_secs: f64) -> f64 {
    if span_secs > 0.0 {
        total_bytes as f64 / MB / span_secs
    } else {
        0.0
    }
}
