use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Configuration for the storage auditor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditorConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Probe tunables
    pub probe: ProbeConfig,
    /// Deviation thresholds
    pub deviation: DeviationConfig,
    /// Scheduling / reputation-tier configuration
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
    /// Arm the periodic scheduling driver at startup
    pub auto_start: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Enable request/response logging spans
    pub log_requests: bool,
}

/// Tunables for the metric probes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Wall-clock budget for the paced IOPS loop, in milliseconds
    pub iops_test_duration_ms: u64,
    /// Pacing delay between IOPS iterations, in milliseconds
    pub iops_pacing_delay_ms: u64,
    /// Payload size for the sequential/parallel throughput probe, in bytes
    pub throughput_payload_bytes: usize,
    /// Number of paired write+read latency samples
    pub latency_test_samples: usize,
    /// Per-call timeout for latency samples, in seconds
    pub latency_timeout_secs: u64,
    /// Default per-call timeout for small probe requests, in seconds
    pub probe_timeout_secs: u64,
    /// Per-call timeout for large transfers (throughput/bandwidth), in seconds
    pub large_transfer_timeout_secs: u64,
}

/// Thresholds applied to the claim-vs-measurement deviation percentage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviationConfig {
    /// Below this, a benchmark counts as a pass
    pub warn_threshold_percent: f64,
    /// At or above this, a benchmark counts as a failure and is flagged
    pub fail_threshold_percent: f64,
    /// Carried for a downstream slashing collaborator; the reputation
    /// transition never reads it
    pub slash_threshold_percent: f64,
}

/// Reputation-tier re-verification intervals and scheduling knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Mandatory re-check interval for low-reputation providers (score < 30)
    pub low_tier_interval_days: i64,
    /// Mandatory re-check interval for medium-reputation providers (score < 70)
    pub medium_tier_interval_days: i64,
    /// Mandatory re-check interval for high-reputation providers
    pub high_tier_interval_days: i64,
    /// Daily probability (0-100) of an unscheduled spot audit once a
    /// provider is at least one day past its last check
    pub random_spot_check_percent: f64,
    /// Cap on concurrently running benchmarks queued by the scheduler
    pub max_concurrent_benchmarks: usize,
    /// Period of the scheduling pass, in seconds
    pub scheduler_interval_secs: u64,
}

impl Default for AuditorConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8790,
                auto_start: true,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                log_requests: false,
            },
            probe: ProbeConfig::default(),
            deviation: DeviationConfig::default(),
            schedule: ScheduleConfig::default(),
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            iops_test_duration_ms: 30_000,
            iops_pacing_delay_ms: 10,
            throughput_payload_bytes: 1024 * 1024, // 1MB
            latency_test_samples: 100,
            latency_timeout_secs: 5,
            probe_timeout_secs: 30,
            large_transfer_timeout_secs: 300,
        }
    }
}

impl Default for DeviationConfig {
    fn default() -> Self {
        Self {
            warn_threshold_percent: 15.0,
            fail_threshold_percent: 30.0,
            slash_threshold_percent: 50.0,
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            low_tier_interval_days: 7,
            medium_tier_interval_days: 30,
            high_tier_interval_days: 90,
            random_spot_check_percent: 1.0,
            max_concurrent_benchmarks: 3,
            scheduler_interval_secs: 2 * 60 * 60, // every 2 hours
        }
    }
}

impl AuditorConfig {
    /// Load configuration from environment variables and validate it
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        // Server configuration
        if let Ok(host) = env::var("AUDITOR_HOST") {
            config.server.host = host;
        }
        if let Ok(port) = env::var("AUDITOR_PORT") {
            config.server.port = port.parse().context("Invalid AUDITOR_PORT value")?;
        }
        if let Ok(auto_start) = env::var("AUDITOR_AUTO_START") {
            config.server.auto_start = auto_start
                .parse()
                .context("Invalid AUDITOR_AUTO_START value")?;
        }

        // Logging configuration
        if let Ok(level) = env::var("AUDITOR_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(log_requests) = env::var("AUDITOR_LOG_REQUESTS") {
            config.logging.log_requests = log_requests
                .parse()
                .context("Invalid AUDITOR_LOG_REQUESTS value")?;
        }

        // Probe configuration
        if let Ok(v) = env::var("AUDITOR_IOPS_TEST_DURATION_MS") {
            config.probe.iops_test_duration_ms = v
                .parse()
                .context("Invalid AUDITOR_IOPS_TEST_DURATION_MS value")?;
        }
        if let Ok(v) = env::var("AUDITOR_IOPS_PACING_DELAY_MS") {
            config.probe.iops_pacing_delay_ms = v
                .parse()
                .context("Invalid AUDITOR_IOPS_PACING_DELAY_MS value")?;
        }
        if let Ok(v) = env::var("AUDITOR_THROUGHPUT_PAYLOAD_BYTES") {
            config.probe.throughput_payload_bytes = v
                .parse()
                .context("Invalid AUDITOR_THROUGHPUT_PAYLOAD_BYTES value")?;
        }
        if let Ok(v) = env::var("AUDITOR_LATENCY_TEST_SAMPLES") {
            config.probe.latency_test_samples = v
                .parse()
                .context("Invalid AUDITOR_LATENCY_TEST_SAMPLES value")?;
        }
        if let Ok(v) = env::var("AUDITOR_LATENCY_TIMEOUT_SECS") {
            config.probe.latency_timeout_secs = v
                .parse()
                .context("Invalid AUDITOR_LATENCY_TIMEOUT_SECS value")?;
        }
        if let Ok(v) = env::var("AUDITOR_PROBE_TIMEOUT_SECS") {
            config.probe.probe_timeout_secs = v
                .parse()
                .context("Invalid AUDITOR_PROBE_TIMEOUT_SECS value")?;
        }
        if let Ok(v) = env::var("AUDITOR_LARGE_TRANSFER_TIMEOUT_SECS") {
            config.probe.large_transfer_timeout_secs = v
                .parse()
                .context("Invalid AUDITOR_LARGE_TRANSFER_TIMEOUT_SECS value")?;
        }

        // Deviation thresholds
        if let Ok(v) = env::var("AUDITOR_DEVIATION_WARN_PERCENT") {
            config.deviation.warn_threshold_percent = v
                .parse()
                .context("Invalid AUDITOR_DEVIATION_WARN_PERCENT value")?;
        }
        if let Ok(v) = env::var("AUDITOR_DEVIATION_FAIL_PERCENT") {
            config.deviation.fail_threshold_percent = v
                .parse()
                .context("Invalid AUDITOR_DEVIATION_FAIL_PERCENT value")?;
        }
        if let Ok(v) = env::var("AUDITOR_DEVIATION_SLASH_PERCENT") {
            config.deviation.slash_threshold_percent = v
                .parse()
                .context("Invalid AUDITOR_DEVIATION_SLASH_PERCENT value")?;
        }

        // Scheduling configuration
        if let Ok(v) = env::var("AUDITOR_LOW_TIER_INTERVAL_DAYS") {
            config.schedule.low_tier_interval_days = v
                .parse()
                .context("Invalid AUDITOR_LOW_TIER_INTERVAL_DAYS value")?;
        }
        if let Ok(v) = env::var("AUDITOR_MEDIUM_TIER_INTERVAL_DAYS") {
            config.schedule.medium_tier_interval_days = v
                .parse()
                .context("Invalid AUDITOR_MEDIUM_TIER_INTERVAL_DAYS value")?;
        }
        if let Ok(v) = env::var("AUDITOR_HIGH_TIER_INTERVAL_DAYS") {
            config.schedule.high_tier_interval_days = v
                .parse()
                .context("Invalid AUDITOR_HIGH_TIER_INTERVAL_DAYS value")?;
        }
        if let Ok(v) = env::var("AUDITOR_SPOT_CHECK_PERCENT") {
            config.schedule.random_spot_check_percent = v
                .parse()
                .context("Invalid AUDITOR_SPOT_CHECK_PERCENT value")?;
        }
        if let Ok(v) = env::var("AUDITOR_MAX_CONCURRENT_BENCHMARKS") {
            config.schedule.max_concurrent_benchmarks = v
                .parse()
                .context("Invalid AUDITOR_MAX_CONCURRENT_BENCHMARKS value")?;
        }
        if let Ok(v) = env::var("AUDITOR_SCHEDULER_INTERVAL_SECS") {
            config.schedule.scheduler_interval_secs = v
                .parse()
                .context("Invalid AUDITOR_SCHEDULER_INTERVAL_SECS value")?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for consistency
    pub fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            return Err(anyhow::anyhow!("Server host cannot be empty"));
        }
        if self.server.port == 0 {
            return Err(anyhow::anyhow!("Server port must be non-zero"));
        }

        if self.probe.iops_test_duration_ms == 0 {
            return Err(anyhow::anyhow!("IOPS test duration must be non-zero"));
        }
        if self.probe.throughput_payload_bytes == 0 {
            return Err(anyhow::anyhow!("Throughput payload size must be non-zero"));
        }
        if self.probe.latency_test_samples == 0 {
            return Err(anyhow::anyhow!("Latency sample count must be non-zero"));
        }
        if self.probe.probe_timeout_secs == 0 || self.probe.large_transfer_timeout_secs == 0 {
            return Err(anyhow::anyhow!("Probe timeouts must be non-zero"));
        }

        if self.deviation.warn_threshold_percent >= self.deviation.fail_threshold_percent {
            return Err(anyhow::anyhow!(
                "Deviation warn threshold ({}) must be below fail threshold ({})",
                self.deviation.warn_threshold_percent,
                self.deviation.fail_threshold_percent
            ));
        }
        if self.deviation.fail_threshold_percent > self.deviation.slash_threshold_percent {
            return Err(anyhow::anyhow!(
                "Deviation fail threshold ({}) must not exceed slash threshold ({})",
                self.deviation.fail_threshold_percent,
                self.deviation.slash_threshold_percent
            ));
        }

        if !(0.0..=100.0).contains(&self.schedule.random_spot_check_percent) {
            return Err(anyhow::anyhow!(
                "Spot check percentage must be within 0-100, got {}",
                self.schedule.random_spot_check_percent
            ));
        }
        if self.schedule.max_concurrent_benchmarks == 0 {
            return Err(anyhow::anyhow!(
                "Max concurrent benchmarks must be at least 1"
            ));
        }
        if self.schedule.low_tier_interval_days > self.schedule.medium_tier_interval_days
            || self.schedule.medium_tier_interval_days > self.schedule.high_tier_interval_days
        {
            return Err(anyhow::anyhow!(
                "Tier intervals must be ordered low <= medium <= high"
            ));
        }
        if self.schedule.scheduler_interval_secs == 0 {
            return Err(anyhow::anyhow!("Scheduler interval must be non-zero"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AuditorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_threshold_ordering_enforced() {
        let mut config = AuditorConfig::default();
        config.deviation.warn_threshold_percent = 40.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let mut config = AuditorConfig::default();
        config.schedule.max_concurrent_benchmarks = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_spot_check_bounds() {
        let mut config = AuditorConfig::default();
        config.schedule.random_spot_check_percent = 150.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tier_interval_ordering() {
        let mut config = AuditorConfig::default();
        config.schedule.low_tier_interval_days = 120;
        assert!(config.validate().is_err());
    }
}
