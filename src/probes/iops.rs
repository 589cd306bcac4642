//! IOPS Probe
//!
//! Paced loop of paired 4K write+read calls for the configured window.
//! Individual request failures are folded into the metric; five consecutive
//! failures across both operations abort the loop early.

use crate::bench::result::IopsMetrics;
use crate::config::ProbeConfig;
use crate::probes::client::ProbeClient;
use std::time::{Duration, Instant};
use tracing::debug;

/// 4K operation payload
const OP_SIZE_BYTES: usize = 4096;

/// Consecutive failures (reads and writes combined) that abort the loop
const MAX_CONSECUTIVE_FAILURES: u32 = 5;

pub async fn run(client: &ProbeClient, endpoint: &str, config: &ProbeConfig) -> IopsMetrics {
    let payload = vec![0xA5u8; OP_SIZE_BYTES];
    let timeout = Duration::from_secs(config.probe_timeout_secs);
    let pacing = Duration::from_millis(config.iops_pacing_delay_ms);
    let deadline = Instant::now() + Duration::from_millis(config.iops_test_duration_ms);

    let started = Instant::now();
    let mut successful_reads: u64 = 0;
    let mut successful_writes: u64 = 0;
    let mut failed_operations: u64 = 0;
    let mut consecutive_failures: u32 = 0;

    while Instant::now() < deadline {
        let write_ok = matches!(
            client
                .post_bytes(endpoint, "/benchmark/write", payload.clone(), &[], timeout)
                .await,
            Ok(response) if response.is_success()
        );
        if write_ok {
            successful_writes += 1;
            consecutive_failures = 0;
        } else {
            failed_operations += 1;
            consecutive_failures += 1;
        }

        if consecutive_failures >= MAX_CONSECUTIVE_FAILURES {
            debug!(
                endpoint = %endpoint,
                failures = consecutive_failures,
                "Aborting IOPS probe after consecutive failures"
            );
            break;
        }

        let read_ok = matches!(
            client
                .get_bytes(
                    endpoint,
                    &format!("/benchmark/read?size={}", OP_SIZE_BYTES),
                    timeout,
                )
                .await,
            Ok(response) if response.is_success()
        );
        if read_ok {
            successful_reads += 1;
            consecutive_failures = 0;
        } else {
            failed_operations += 1;
            consecutive_failures += 1;
        }

        if consecutive_failures >= MAX_CONSECUTIVE_FAILURES {
            debug!(
                endpoint = %endpoint,
                failures = consecutive_failures,
                "Aborting IOPS probe after consecutive failures"
            );
            break;
        }

        // Pace iterations to avoid saturating a single connection
        tokio::time::sleep(pacing).await;
    }

    fold(
        successful_reads,
        successful_writes,
        failed_operations,
        started.elapsed().as_secs_f64(),
    )
}

/// Reduce raw operation counts to the IOPS metric family.
///
/// 64K IOPS is not measured; it is estimated from the 4K figure assuming
/// IOPS degrades with the square root of the block-size ratio. Mixed IOPS
/// is rounded half away from zero.
pub fn fold(
    successful_reads: u64,
    successful_writes: u64,
    failed_operations: u64,
    elapsed_secs: f64,
) -> IopsMetrics {
    let (read_iops_4k, write_iops_4k) = if elapsed_secs > 0.0 {
        (
            successful_reads as f64 / elapsed_secs,
            successful_writes as f64 / elapsed_secs,
        )
    } else {
        (0.0, 0.0)
    };

    let block_scale = (4.0f64 / 64.0).sqrt();

    IopsMetrics {
        read_iops_4k,
        write_iops_4k,
        read_iops_64k_estimated: read_iops_4k * block_scale,
        write_iops_64k_estimated: write_iops_4k * block_scale,
        mixed_iops: (0.7 * read_iops_4k + 0.3 * write_iops_4k).round(),
        successful_reads,
        successful_writes,
        failed_operations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_thirty_second_window() {
        // 300 reads and 150 writes over 30s: read 10, write 5,
        // mixed 10*0.7 + 5*0.3 = 8.5 which rounds to 9
        let metrics = fold(300, 150, 0, 30.0);
        assert_eq!(metrics.read_iops_4k, 10.0);
        assert_eq!(metrics.write_iops_4k, 5.0);
        assert_eq!(metrics.mixed_iops, 9.0);
    }

    #[test]
    fn test_fold_64k_estimate_scaling() {
        let metrics = fold(640, 0, 0, 10.0);
        // sqrt(4/64) = 0.25
        assert!((metrics.read_iops_64k_estimated - 64.0 * 0.25).abs() < 1e-9);
        assert_eq!(metrics.write_iops_64k_estimated, 0.0);
    }

    #[test]
    fn test_fold_zero_elapsed_yields_zero() {
        let metrics = fold(100, 100, 0, 0.0);
        assert_eq!(metrics.read_iops_4k, 0.0);
        assert_eq!(metrics.mixed_iops, 0.0);
    }

    #[test]
    fn test_fold_all_failures() {
        let metrics = fold(0, 0, 5, 0.1);
        assert_eq!(metrics.read_iops_4k, 0.0);
        assert_eq!(metrics.failed_operations, 5);
    }

    #[tokio::test]
    async fn test_aborts_on_exactly_five_consecutive_failures() {
        let client = ProbeClient::new().unwrap();
        // Long window so only the abort threshold can end the loop; nothing
        // listens on port 9, so every operation fails immediately
        let config = ProbeConfig {
            iops_test_duration_ms: 60_000,
            iops_pacing_delay_ms: 1,
            probe_timeout_secs: 1,
            ..Default::default()
        };

        let metrics = run(&client, "http://127.0.0.1:9", &config).await;

        assert_eq!(metrics.failed_operations, 5);
        assert_eq!(metrics.successful_reads, 0);
        assert_eq!(metrics.successful_writes, 0);
        assert_eq!(metrics.mixed_iops, 0.0);
    }
}
