//! Reputation Score Types and Tiers
//!
//! Every provider carries a score bounded to [0, 100], starting at 50 for
//! unseen providers. The score bands into tiers that govern how often the
//! scheduler re-verifies the provider: the lower the reputation, the more
//! aggressive the audit cadence.

use crate::config::ScheduleConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Score assigned to a provider that has never been benchmarked
pub const DEFAULT_SCORE: f64 = 50.0;

/// Per-provider reputation state, mutated only by the deviation engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reputation {
    pub provider_id: String,

    /// Bounded to [0, 100]
    pub score: f64,

    /// Cumulative counters, always advanced once per completed benchmark
    pub benchmark_count: u64,
    pub pass_count: u64,
    pub fail_count: u64,

    /// When the last benchmark completed
    pub last_benchmark_at: Option<DateTime<Utc>>,

    /// Deviation percentage from the last completed benchmark
    pub last_deviation_percent: f64,

    /// Tracked but never mutated by this engine; fed by an external
    /// uptime monitor
    pub uptime_percent: f64,

    /// Append-only human-readable flag log
    pub flags: Vec<String>,
}

impl Reputation {
    pub fn new(provider_id: String) -> Self {
        Self {
            provider_id,
            score: DEFAULT_SCORE,
            benchmark_count: 0,
            pass_count: 0,
            fail_count: 0,
            last_benchmark_at: None,
            last_deviation_percent: 0.0,
            uptime_percent: 100.0,
            flags: Vec::new(),
        }
    }

    pub fn tier(&self) -> ReputationTier {
        ReputationTier::for_score(self.score)
    }
}

/// Banding of the 0-100 score, governing the mandatory re-check interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReputationTier {
    /// score < 30: re-verify aggressively
    Low,
    /// 30 <= score < 70
    Medium,
    /// score >= 70: trusted, re-verify rarely
    High,
}

impl ReputationTier {
    pub fn for_score(score: f64) -> Self {
        if score < 30.0 {
            ReputationTier::Low
        } else if score < 70.0 {
            ReputationTier::Medium
        } else {
            ReputationTier::High
        }
    }

    /// Mandatory re-verification interval for this tier, in days
    pub fn reverify_interval_days(&self, schedule: &ScheduleConfig) -> i64 {
        match self {
            ReputationTier::Low => schedule.low_tier_interval_days,
            ReputationTier::Medium => schedule.medium_tier_interval_days,
            ReputationTier::High => schedule.high_tier_interval_days,
        }
    }
}
