//! Latency Probe
//!
//! Paired 1KB write+read samples under a short timeout. Latencies are
//! summarized as min (first byte), per-direction arithmetic means, and p99
//! at index `min(floor(n*0.99), n-1)` over the combined sorted samples.
//! If either direction collected zero successes, every field reports the
//! 9999 sentinel instead of dividing by zero.

use crate::bench::result::{LatencyMetrics, LATENCY_SENTINEL_MS};
use crate::config::ProbeConfig;
use crate::probes::client::ProbeClient;
use std::time::Duration;

/// 1KB sample payload
const SAMPLE_SIZE_BYTES: usize = 1024;

pub async fn run(client: &ProbeClient, endpoint: &str, config: &ProbeConfig) -> LatencyMetrics {
    let payload = vec![0x3Cu8; SAMPLE_SIZE_BYTES];
    let timeout = Duration::from_secs(config.latency_timeout_secs);

    let mut write_latencies = Vec::with_capacity(config.latency_test_samples);
    let mut read_latencies = Vec::with_capacity(config.latency_test_samples);

    for _ in 0..config.latency_test_samples {
        if let Ok(response) = client
            .post_bytes(endpoint, "/benchmark/write", payload.clone(), &[], timeout)
            .await
        {
            if response.is_success() {
                write_latencies.push(response.elapsed_ms);
            }
        }

        if let Ok(response) = client
            .get_bytes(
                endpoint,
                &format!("/benchmark/read?size={}", SAMPLE_SIZE_BYTES),
                timeout,
            )
            .await
        {
            if response.is_success() {
                read_latencies.push(response.elapsed_ms);
            }
        }
    }

    summarize(read_latencies, write_latencies)
}

/// p99 sample index for `n` collected samples
pub fn p99_index(n: usize) -> usize {
    ((n as f64 * 0.99).floor() as usize).min(n.saturating_sub(1))
}

/// Reduce collected per-operation latencies to the metric family
pub fn summarize(read_latencies: Vec<f64>, write_latencies: Vec<f64>) -> LatencyMetrics {
    if read_latencies.is_empty() || write_latencies.is_empty() {
        return LatencyMetrics {
            first_byte_ms: LATENCY_SENTINEL_MS,
            avg_read_ms: LATENCY_SENTINEL_MS,
            avg_write_ms: LATENCY_SENTINEL_MS,
            p99_ms: LATENCY_SENTINEL_MS,
        };
    }

    let avg_read_ms = read_latencies.iter().sum::<f64>() / read_latencies.len() as f64;
    let avg_write_ms = write_latencies.iter().sum::<f64>() / write_latencies.len() as f64;

    let mut all: Vec<f64> = read_latencies
        .into_iter()
        .chain(write_latencies)
        .collect();
    all.sort_by(|a, b| a.total_cmp(b));

    LatencyMetrics {
        first_byte_ms: all[0],
        avg_read_ms,
        avg_write_ms,
        p99_ms: all[p99_index(all.len())],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_p99_index_clamped() {
        assert_eq!(p99_index(1), 0);
        assert_eq!(p99_index(100), 99);
        assert_eq!(p99_index(10), 9);
        assert_eq!(p99_index(200), 198);
    }

    #[test]
    fn test_single_sample_p99_is_the_sample() {
        let metrics = summarize(vec![4.0], vec![6.0]);
        // Two combined samples: p99 index = min(floor(2*0.99), 1) = 1
        assert_eq!(metrics.p99_ms, 6.0);
        assert_eq!(metrics.first_byte_ms, 4.0);
    }

    #[test]
    fn test_means_are_per_direction() {
        let metrics = summarize(vec![2.0, 4.0], vec![10.0, 20.0]);
        assert_eq!(metrics.avg_read_ms, 3.0);
        assert_eq!(metrics.avg_write_ms, 15.0);
        assert_eq!(metrics.first_byte_ms, 2.0);
    }

    #[test]
    fn test_empty_reads_yield_sentinel() {
        let metrics = summarize(vec![], vec![5.0, 6.0]);
        assert_eq!(metrics.avg_read_ms, LATENCY_SENTINEL_MS);
        assert_eq!(metrics.avg_write_ms, LATENCY_SENTINEL_MS);
        assert_eq!(metrics.p99_ms, LATENCY_SENTINEL_MS);
    }

    #[test]
    fn test_empty_writes_yield_sentinel() {
        let metrics = summarize(vec![5.0], vec![]);
        assert_eq!(metrics.first_byte_ms, LATENCY_SENTINEL_MS);
    }

    #[test]
    fn test_p99_picks_tail_sample() {
        let reads: Vec<f64> = (1..=99).map(|v| v as f64).collect();
        let writes = vec![1000.0];
        // 100 combined samples: index min(floor(99.0), 99) = 99 -> the
        // slowest sample
        let metrics = summarize(reads, writes);
        assert_eq!(metrics.p99_ms, 1000.0);
    }
}
