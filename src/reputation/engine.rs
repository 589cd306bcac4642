//! Deviation & Reputation Engine
//!
//! Compares a benchmark snapshot against the provider's self-declared
//! capabilities, reduces the gap to a deviation percentage, applies the
//! reputation transition, and answers the scheduler's "is this provider
//! due" question. Flags are appended, never removed; the score saturates
//! at both ends of [0, 100].

use crate::bench::result::BenchmarkResult;
use crate::config::{DeviationConfig, ScheduleConfig};
use crate::provider::DeclaredCapabilities;
use crate::reputation::score::Reputation;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Outcome of the due-check for one provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BenchmarkDue {
    /// Not due for a benchmark
    NotDue,
    /// Mandatory re-verification (never benchmarked, or tier interval elapsed)
    Scheduled,
    /// Probabilistic spot audit fired
    RandomSpotCheck,
}

impl BenchmarkDue {
    pub fn is_due(&self) -> bool {
        !matches!(self, BenchmarkDue::NotDue)
    }
}

/// Percentage gap between declared capabilities and measured values.
///
/// Each of {IOPS, throughput, capacity} contributes `|claimed - measured|
/// / claimed` when the claim is nonzero; capacity additionally requires a
/// nonzero measurement, since providers are not obliged to report capacity
/// on their health endpoint. No nonzero claims means deviation 0.
pub fn deviation_percent(declared: &DeclaredCapabilities, result: &BenchmarkResult) -> f64 {
    let mut ratios = Vec::with_capacity(3);

    if declared.iops > 0.0 {
        ratios.push((declared.iops - result.iops.mixed_iops).abs() / declared.iops);
    }
    if declared.throughput_mbps > 0.0 {
        ratios.push(
            (declared.throughput_mbps - result.measured_throughput_mbps()).abs()
                / declared.throughput_mbps,
        );
    }
    if declared.capacity_gb > 0.0 && result.storage.usable_capacity_gb > 0.0 {
        ratios.push(
            (declared.capacity_gb - result.storage.usable_capacity_gb).abs()
                / declared.capacity_gb,
        );
    }

    if ratios.is_empty() {
        return 0.0;
    }
    ratios.iter().sum::<f64>() / ratios.len() as f64 * 100.0
}

/// Apply the reputation transition for one completed benchmark.
///
/// Counters always advance. Deviation below the warn threshold is a pass
/// (+5, saturating at 100); between warn and fail costs 2 points; at or
/// above the fail threshold costs 15 points and appends a flag. The slash
/// threshold is deliberately not consulted here.
pub fn apply_benchmark(
    reputation: &mut Reputation,
    deviation: f64,
    now: DateTime<Utc>,
    config: &DeviationConfig,
) {
    reputation.benchmark_count += 1;
    reputation.last_benchmark_at = Some(now);
    reputation.last_deviation_percent = deviation;

    if deviation < config.warn_threshold_percent {
        reputation.pass_count += 1;
        reputation.score = (reputation.score + 5.0).min(100.0);
        debug!(
            provider_id = %reputation.provider_id,
            deviation = deviation,
            score = reputation.score,
            "Benchmark passed"
        );
    } else if deviation < config.fail_threshold_percent {
        reputation.score = (reputation.score - 2.0).max(0.0);
        info!(
            provider_id = %reputation.provider_id,
            deviation = deviation,
            score = reputation.score,
            "Benchmark deviation in warning band"
        );
    } else {
        reputation.fail_count += 1;
        reputation.score = (reputation.score - 15.0).max(0.0);
        let flag = format!("deviation_{:.1}%_at_{}", deviation, now.to_rfc3339());
        reputation.flags.push(flag);
        warn!(
            provider_id = %reputation.provider_id,
            deviation = deviation,
            score = reputation.score,
            "Benchmark failed deviation check, provider flagged"
        );
    }
}

/// Decide whether a provider is due for a benchmark.
///
/// Never-benchmarked providers are due immediately. Otherwise the tier
/// interval is mandatory, and any provider at least one day past its last
/// check has a small daily chance of an unscheduled spot audit.
pub fn should_benchmark(
    reputation: &Reputation,
    now: DateTime<Utc>,
    schedule: &ScheduleConfig,
) -> BenchmarkDue {
    let roll = rand::thread_rng().gen_range(0.0..100.0);
    should_benchmark_with_roll(reputation, now, schedule, roll)
}

/// Deterministic core of the due-check; the spot-check roll is injected so
/// the decision is testable
pub fn should_benchmark_with_roll(
    reputation: &Reputation,
    now: DateTime<Utc>,
    schedule: &ScheduleConfig,
    roll: f64,
) -> BenchmarkDue {
    if reputation.benchmark_count == 0 {
        return BenchmarkDue::Scheduled;
    }

    let last = match reputation.last_benchmark_at {
        Some(last) => last,
        // Counters say benchmarked but no timestamp: treat as overdue
        None => return BenchmarkDue::Scheduled,
    };

    let days_since_last = (now - last).num_days();
    let interval = reputation.tier().reverify_interval_days(schedule);

    if days_since_last >= interval {
        return BenchmarkDue::Scheduled;
    }
    if days_since_last >= 1 && roll < schedule.random_spot_check_percent {
        return BenchmarkDue::RandomSpotCheck;
    }
    BenchmarkDue::NotDue
}
