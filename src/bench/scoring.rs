//! Composite Scoring
//!
//! Reduces the IOPS, throughput and latency metric families to a single
//! 0-10000 number. The normalization constants encode reference targets:
//! ~200k combined IOPS, ~20 GB/s combined sequential throughput, and ~10ms
//! average latency each map to 100 on their sub-score; anything above the
//! reference saturates.

use crate::bench::result::{IopsMetrics, LatencyMetrics, ThroughputMetrics};

/// Weights of the three sub-scores in the composite
const IOPS_WEIGHT: f64 = 0.3;
const THROUGHPUT_WEIGHT: f64 = 0.4;
const LATENCY_WEIGHT: f64 = 0.3;

/// Sub-score in [0, 100] for measured 4K IOPS
pub fn iops_score(iops: &IopsMetrics) -> f64 {
    ((iops.read_iops_4k + iops.write_iops_4k) / 2000.0).min(100.0)
}

/// Sub-score in [0, 100] for sequential throughput
pub fn throughput_score(throughput: &ThroughputMetrics) -> f64 {
    ((throughput.sequential_read_mbps + throughput.sequential_write_mbps) / 200.0).min(100.0)
}

/// Sub-score in [0, 100] for average latency; the 9999 sentinel lands at 0
pub fn latency_score(latency: &LatencyMetrics) -> f64 {
    let avg_latency = (latency.avg_read_ms + latency.avg_write_ms) / 2.0;
    (100.0 - (avg_latency / 10.0) * 100.0).max(0.0)
}

/// Composite score in [0, 10000], monotonic in each sub-score
pub fn composite_score(
    iops: &IopsMetrics,
    throughput: &ThroughputMetrics,
    latency: &LatencyMetrics,
) -> u32 {
    let weighted = IOPS_WEIGHT * iops_score(iops)
        + THROUGHPUT_WEIGHT * throughput_score(throughput)
        + LATENCY_WEIGHT * latency_score(latency);
    (100.0 * weighted).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iops(read: f64, write: f64) -> IopsMetrics {
        IopsMetrics {
            read_iops_4k: read,
            write_iops_4k: write,
            ..Default::default()
        }
    }

    fn throughput(read: f64, write: f64) -> ThroughputMetrics {
        ThroughputMetrics {
            sequential_read_mbps: read,
            sequential_write_mbps: write,
            ..Default::default()
        }
    }

    fn latency(avg_ms: f64) -> LatencyMetrics {
        LatencyMetrics {
            first_byte_ms: avg_ms,
            avg_read_ms: avg_ms,
            avg_write_ms: avg_ms,
            p99_ms: avg_ms,
        }
    }

    #[test]
    fn test_score_saturates_at_10000() {
        let score = composite_score(
            &iops(1_000_000.0, 1_000_000.0),
            &throughput(100_000.0, 100_000.0),
            &latency(0.0),
        );
        assert_eq!(score, 10_000);
    }

    #[test]
    fn test_score_floor_is_zero() {
        let score = composite_score(&iops(0.0, 0.0), &throughput(0.0, 0.0), &latency(9999.0));
        assert_eq!(score, 0);
    }

    #[test]
    fn test_reference_targets_hit_100_per_dimension() {
        // 200k combined IOPS, 20 GB/s combined throughput, 0ms latency
        assert_eq!(iops_score(&iops(150_000.0, 50_000.0)), 100.0);
        assert_eq!(throughput_score(&throughput(10_000.0, 10_000.0)), 100.0);
        assert_eq!(latency_score(&latency(0.0)), 100.0);
    }

    #[test]
    fn test_latency_sentinel_scores_zero() {
        assert_eq!(latency_score(&LatencyMetrics::default()), 0.0);
    }

    #[test]
    fn test_monotonic_in_each_sub_score() {
        let thr = throughput(500.0, 500.0);
        let lat = latency(5.0);
        let lower = composite_score(&iops(1000.0, 1000.0), &thr, &lat);
        let higher = composite_score(&iops(2000.0, 2000.0), &thr, &lat);
        assert!(higher > lower);

        let io = iops(1000.0, 1000.0);
        let lower = composite_score(&io, &throughput(100.0, 100.0), &lat);
        let higher = composite_score(&io, &throughput(200.0, 200.0), &lat);
        assert!(higher > lower);

        let lower = composite_score(&io, &thr, &latency(8.0));
        let higher = composite_score(&io, &thr, &latency(2.0));
        assert!(higher > lower);
    }

    #[test]
    fn test_mid_range_example() {
        // 10ms average latency zeroes the latency term; 1000 combined IOPS
        // and 100 combined MB/s contribute their weighted shares.
        let score = composite_score(&iops(700.0, 300.0), &throughput(60.0, 40.0), &latency(10.0));
        // 100 * (0.3*(1000/2000) + 0.4*(100/200) + 0.3*0) = 35
        assert_eq!(score, 35);
    }
}
