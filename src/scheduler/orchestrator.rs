//! Scheduler / Orchestrator
//!
//! Top-level control loop. Owns the provider registry, the job table, the
//! bounded per-provider result history, the reputation table, and the
//! in-flight set, all behind explicit locks so executor and reputation
//! updates never race. A periodic driver queues benchmarks for providers
//! that are due, up to the concurrency cap; manual and on-registration
//! triggers bypass both the in-flight guard and the cap so operator checks
//! are never starved by background scheduling.

use crate::bench::result::BenchmarkResult;
use crate::bench::BenchmarkExecutor;
use crate::config::AuditorConfig;
use crate::probes::ProbeClient;
use crate::provider::ProviderInfo;
use crate::reputation::{
    apply_benchmark, deviation_percent, should_benchmark, BenchmarkDue, Reputation,
};
use crate::scheduler::jobs::{BenchmarkJob, JobStatus, TriggerKind};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Most recent results retained per provider; oldest evicted first
pub const HISTORY_LIMIT: usize = 10;

/// One leaderboard row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedProvider {
    pub provider_id: String,
    pub name: String,
    pub endpoint: String,
    pub score: f64,
    pub benchmark_count: u64,
    pub last_benchmark_at: Option<DateTime<Utc>>,
}

/// Aggregate counters for the stats accessor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditorStats {
    pub provider_count: usize,
    pub average_reputation_score: f64,
    pub in_flight_count: usize,
    pub total_jobs: usize,
}

/// The orchestrator. Cheap to clone: all state is shared behind locks,
/// which is what lets queued benchmarks run as spawned tasks.
#[derive(Clone)]
pub struct AuditOrchestrator {
    config: Arc<AuditorConfig>,
    executor: Arc<BenchmarkExecutor>,

    providers: Arc<RwLock<HashMap<String, ProviderInfo>>>,
    /// Provider ids in registration order, which fixes the iteration order
    /// of the scheduling pass
    registration_order: Arc<RwLock<Vec<String>>>,
    jobs: Arc<RwLock<HashMap<String, BenchmarkJob>>>,
    histories: Arc<RwLock<HashMap<String, Vec<BenchmarkResult>>>>,
    reputations: Arc<RwLock<HashMap<String, Reputation>>>,
    in_flight: Arc<RwLock<HashSet<String>>>,

    driver: Arc<RwLock<Option<JoinHandle<()>>>>,
}

impl AuditOrchestrator {
    pub fn new(config: Arc<AuditorConfig>) -> Result<Self> {
        let executor = Arc::new(BenchmarkExecutor::new(config.clone())?);
        Ok(Self {
            config,
            executor,
            providers: Arc::new(RwLock::new(HashMap::new())),
            registration_order: Arc::new(RwLock::new(Vec::new())),
            jobs: Arc::new(RwLock::new(HashMap::new())),
            histories: Arc::new(RwLock::new(HashMap::new())),
            reputations: Arc::new(RwLock::new(HashMap::new())),
            in_flight: Arc::new(RwLock::new(HashSet::new())),
            driver: Arc::new(RwLock::new(None)),
        })
    }

    // Registry

    /// Register a provider, or replace its record on re-registration.
    /// Re-registration keeps reputation, history and queue position.
    pub async fn register_provider(&self, info: ProviderInfo) -> Result<()> {
        ProbeClient::probe_url(&info.endpoint, "/health")?;

        let mut providers = self.providers.write().await;
        let replacing = providers.contains_key(&info.id);
        if !replacing {
            self.registration_order.write().await.push(info.id.clone());
        }

        info!(
            provider_id = %info.id,
            endpoint = %info.endpoint,
            kind = ?info.kind,
            replacing = replacing,
            "Provider registered"
        );
        providers.insert(info.id.clone(), info);
        Ok(())
    }

    /// Remove a provider and its reputation/history. Job records are
    /// retained for audit purposes.
    pub async fn unregister_provider(&self, provider_id: &str) -> Result<()> {
        let removed = self.providers.write().await.remove(provider_id);
        if removed.is_none() {
            return Err(anyhow::anyhow!("Provider not registered: {}", provider_id));
        }

        self.registration_order
            .write()
            .await
            .retain(|id| id != provider_id);
        self.reputations.write().await.remove(provider_id);
        self.histories.write().await.remove(provider_id);
        self.in_flight.write().await.remove(provider_id);

        info!(provider_id = %provider_id, "Provider unregistered");
        Ok(())
    }

    // Trigger paths

    /// Benchmark a freshly registered provider. Awaited by the caller and
    /// exempt from the concurrency budget.
    pub async fn benchmark_on_registration(&self, provider_id: &str) -> Result<BenchmarkResult> {
        self.run_immediate(provider_id, TriggerKind::Initial).await
    }

    /// Operator-triggered benchmark. Runs immediately regardless of the
    /// in-flight guard or current load; errors propagate to the caller.
    pub async fn trigger_benchmark(&self, provider_id: &str) -> Result<BenchmarkResult> {
        self.run_immediate(provider_id, TriggerKind::Manual).await
    }

    async fn run_immediate(
        &self,
        provider_id: &str,
        trigger: TriggerKind,
    ) -> Result<BenchmarkResult> {
        let provider = self
            .providers
            .read()
            .await
            .get(provider_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Provider not registered: {}", provider_id))?;

        let mut job = BenchmarkJob::new(provider.id.clone(), trigger);
        let job_id = job.id.clone();
        job.mark_running(Utc::now());
        self.jobs.write().await.insert(job_id.clone(), job);

        match self.executor.run(&provider).await {
            Ok(result) => {
                self.complete_job(&job_id, &provider, result.clone()).await;
                Ok(result)
            }
            Err(e) => {
                if let Some(job) = self.jobs.write().await.get_mut(&job_id) {
                    job.fail(e.to_string(), Utc::now());
                }
                Err(e)
            }
        }
    }

    // Periodic driver

    /// Arm the periodic scheduling driver. Idempotent: a second call while
    /// armed is a no-op.
    pub async fn start(&self) {
        let mut driver = self.driver.write().await;
        if driver.is_some() {
            warn!("Scheduling driver already armed");
            return;
        }

        let interval_secs = self.config.schedule.scheduler_interval_secs;
        let this = self.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
            loop {
                interval.tick().await;
                this.run_scheduling_pass().await;
            }
        });

        *driver = Some(handle);
        info!(interval_secs = interval_secs, "Scheduling driver armed");
    }

    /// Disarm the periodic driver. In-flight benchmarks are not cancelled.
    pub async fn stop(&self) {
        if let Some(handle) = self.driver.write().await.take() {
            handle.abort();
            info!("Scheduling driver disarmed");
        }
    }

    /// One scheduling pass: providers in registration order, skipping any
    /// already in flight, queuing due benchmarks until the concurrency
    /// budget for this pass is spent.
    pub async fn run_scheduling_pass(&self) {
        let in_flight_count = self.in_flight.read().await.len();
        let budget = self
            .config
            .schedule
            .max_concurrent_benchmarks
            .saturating_sub(in_flight_count);
        if budget == 0 {
            debug!(
                in_flight = in_flight_count,
                "Concurrency budget exhausted, skipping scheduling pass"
            );
            return;
        }

        let order = self.registration_order.read().await.clone();
        let mut queued = 0usize;

        for provider_id in order {
            if queued >= budget {
                break;
            }
            if self.in_flight.read().await.contains(&provider_id) {
                continue;
            }

            let reputation = self
                .reputations
                .read()
                .await
                .get(&provider_id)
                .cloned()
                .unwrap_or_else(|| Reputation::new(provider_id.clone()));

            let trigger = match should_benchmark(&reputation, Utc::now(), &self.config.schedule) {
                BenchmarkDue::NotDue => continue,
                BenchmarkDue::Scheduled => TriggerKind::Scheduled,
                BenchmarkDue::RandomSpotCheck => TriggerKind::Random,
            };

            if self.queue_benchmark(provider_id, trigger).await {
                queued += 1;
            }
        }

        if queued > 0 {
            info!(queued = queued, "Scheduling pass queued benchmarks");
        }
    }

    /// Queue one fire-and-forget benchmark, claiming the in-flight slot
    /// before the task spawns
    async fn queue_benchmark(&self, provider_id: String, trigger: TriggerKind) -> bool {
        let provider = match self.providers.read().await.get(&provider_id).cloned() {
            Some(provider) => provider,
            None => return false,
        };

        self.in_flight.write().await.insert(provider_id.clone());

        let job = BenchmarkJob::new(provider_id.clone(), trigger);
        let job_id = job.id.clone();
        self.jobs.write().await.insert(job_id.clone(), job);

        debug!(
            provider_id = %provider_id,
            job_id = %job_id,
            trigger = ?trigger,
            "Benchmark queued"
        );

        let this = self.clone();
        tokio::spawn(async move {
            this.run_queued_job(job_id, provider).await;
        });
        true
    }

    /// Body of a queued benchmark task. Failures transition the job to
    /// `failed`; the in-flight slot is always released.
    async fn run_queued_job(&self, job_id: String, provider: ProviderInfo) {
        if let Some(job) = self.jobs.write().await.get_mut(&job_id) {
            job.mark_running(Utc::now());
        }

        match self.executor.run(&provider).await {
            Ok(result) => {
                self.complete_job(&job_id, &provider, result).await;
            }
            Err(e) => {
                error!(
                    provider_id = %provider.id,
                    job_id = %job_id,
                    error = %e,
                    "Queued benchmark failed"
                );
                if let Some(job) = self.jobs.write().await.get_mut(&job_id) {
                    job.fail(e.to_string(), Utc::now());
                }
            }
        }

        self.in_flight.write().await.remove(&provider.id);
    }

    /// Attach the result to the job, append it to the bounded history, and
    /// apply the reputation transition synchronously, so the job only
    /// reads as completed once the score has moved.
    async fn complete_job(&self, job_id: &str, provider: &ProviderInfo, result: BenchmarkResult) {
        let now = Utc::now();

        if let Some(job) = self.jobs.write().await.get_mut(job_id) {
            job.complete(result.clone(), now);
        }

        // Provider may have been unregistered while the benchmark ran;
        // keep the job record but do not resurrect reputation state
        if !self.providers.read().await.contains_key(&provider.id) {
            debug!(
                provider_id = %provider.id,
                "Provider unregistered mid-benchmark, skipping reputation update"
            );
            return;
        }

        {
            let mut histories = self.histories.write().await;
            let history = histories.entry(provider.id.clone()).or_default();
            history.push(result.clone());
            if history.len() > HISTORY_LIMIT {
                let excess = history.len() - HISTORY_LIMIT;
                history.drain(0..excess);
            }
        }

        let deviation = deviation_percent(&provider.declared, &result);
        let mut reputations = self.reputations.write().await;
        let reputation = reputations
            .entry(provider.id.clone())
            .or_insert_with(|| Reputation::new(provider.id.clone()));
        apply_benchmark(reputation, deviation, now, &self.config.deviation);

        info!(
            provider_id = %provider.id,
            score = result.overall_score,
            deviation = deviation,
            reputation = reputation.score,
            "Benchmark recorded"
        );
    }

    // Query surface

    /// Current reputation; registered-but-unseen providers report the
    /// default score
    pub async fn get_reputation(&self, provider_id: &str) -> Option<Reputation> {
        if !self.providers.read().await.contains_key(provider_id) {
            return None;
        }
        Some(
            self.reputations
                .read()
                .await
                .get(provider_id)
                .cloned()
                .unwrap_or_else(|| Reputation::new(provider_id.to_string())),
        )
    }

    /// Most recent results for a provider, oldest first, at most
    /// `HISTORY_LIMIT` entries
    pub async fn get_benchmark_history(&self, provider_id: &str) -> Vec<BenchmarkResult> {
        self.histories
            .read()
            .await
            .get(provider_id)
            .cloned()
            .unwrap_or_default()
    }

    /// All job records, oldest first
    pub async fn get_jobs(&self) -> Vec<BenchmarkJob> {
        let mut jobs: Vec<BenchmarkJob> = self.jobs.read().await.values().cloned().collect();
        jobs.sort_by_key(|job| job.created_at);
        jobs
    }

    /// Job records currently in the running state
    pub async fn get_running_jobs(&self) -> Vec<BenchmarkJob> {
        let mut jobs: Vec<BenchmarkJob> = self
            .jobs
            .read()
            .await
            .values()
            .filter(|job| job.status == JobStatus::Running)
            .cloned()
            .collect();
        jobs.sort_by_key(|job| job.created_at);
        jobs
    }

    /// Providers ranked by reputation score, descending
    pub async fn get_ranked_providers(&self, limit: usize) -> Vec<RankedProvider> {
        let providers = self.providers.read().await;
        let reputations = self.reputations.read().await;

        let mut ranked: Vec<RankedProvider> = providers
            .values()
            .map(|provider| {
                let reputation = reputations.get(&provider.id);
                RankedProvider {
                    provider_id: provider.id.clone(),
                    name: provider.name.clone(),
                    endpoint: provider.endpoint.clone(),
                    score: reputation
                        .map(|r| r.score)
                        .unwrap_or(crate::reputation::DEFAULT_SCORE),
                    benchmark_count: reputation.map(|r| r.benchmark_count).unwrap_or(0),
                    last_benchmark_at: reputation.and_then(|r| r.last_benchmark_at),
                }
            })
            .collect();

        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked.truncate(limit);
        ranked
    }

    pub async fn get_stats(&self) -> AuditorStats {
        let providers = self.providers.read().await;
        let reputations = self.reputations.read().await;

        let provider_count = providers.len();
        let average_reputation_score = if provider_count > 0 {
            providers
                .keys()
                .map(|id| {
                    reputations
                        .get(id)
                        .map(|r| r.score)
                        .unwrap_or(crate::reputation::DEFAULT_SCORE)
                })
                .sum::<f64>()
                / provider_count as f64
        } else {
            0.0
        };

        AuditorStats {
            provider_count,
            average_reputation_score,
            in_flight_count: self.in_flight.read().await.len(),
            total_jobs: self.jobs.read().await.len(),
        }
    }

    /// Feed an externally measured uptime percentage into the reputation
    /// record. This engine never derives uptime itself.
    pub async fn set_uptime(&self, provider_id: &str, uptime_percent: f64) -> Result<()> {
        if !self.providers.read().await.contains_key(provider_id) {
            return Err(anyhow::anyhow!("Provider not registered: {}", provider_id));
        }

        let mut reputations = self.reputations.write().await;
        let reputation = reputations
            .entry(provider_id.to_string())
            .or_insert_with(|| Reputation::new(provider_id.to_string()));
        reputation.uptime_percent = uptime_percent.clamp(0.0, 100.0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bench::result::{
        DurabilityMetrics, IopsMetrics, LatencyMetrics, NetworkMetrics, StorageMetrics,
        ThroughputMetrics,
    };
    use crate::provider::{DeclaredCapabilities, StorageKind};

    fn test_provider(id: &str) -> ProviderInfo {
        ProviderInfo {
            id: id.to_string(),
            name: format!("Provider {}", id),
            endpoint: "http://127.0.0.1:9".to_string(),
            kind: StorageKind::Object,
            declared: DeclaredCapabilities {
                capacity_gb: 0.0,
                iops: 1000.0,
                throughput_mbps: 0.0,
            },
            region: "eu-west".to_string(),
            registered_at: Utc::now(),
        }
    }

    fn test_result(provider_id: &str, mixed_iops: f64) -> BenchmarkResult {
        BenchmarkResult {
            provider_id: provider_id.to_string(),
            timestamp: Utc::now(),
            storage: StorageMetrics::default(),
            iops: IopsMetrics {
                mixed_iops,
                ..Default::default()
            },
            throughput: ThroughputMetrics::default(),
            latency: LatencyMetrics::default(),
            durability: DurabilityMetrics::default(),
            network: NetworkMetrics::default(),
            content: None,
            overall_score: 100,
            attestation: "test".to_string(),
        }
    }

    fn orchestrator() -> AuditOrchestrator {
        AuditOrchestrator::new(Arc::new(AuditorConfig::default())).unwrap()
    }

    #[tokio::test]
    async fn test_register_and_default_reputation() {
        let orch = orchestrator();
        orch.register_provider(test_provider("prov_1")).await.unwrap();

        let reputation = orch.get_reputation("prov_1").await.unwrap();
        assert_eq!(reputation.score, 50.0);
        assert_eq!(reputation.benchmark_count, 0);
        assert!(orch.get_reputation("unknown").await.is_none());
    }

    #[tokio::test]
    async fn test_register_rejects_bad_endpoint() {
        let orch = orchestrator();
        let mut provider = test_provider("prov_1");
        provider.endpoint = "not-a-url".to_string();
        assert!(orch.register_provider(provider).await.is_err());
    }

    #[tokio::test]
    async fn test_reregistration_keeps_reputation_and_order() {
        let orch = orchestrator();
        orch.register_provider(test_provider("prov_1")).await.unwrap();
        orch.register_provider(test_provider("prov_2")).await.unwrap();

        // A completed benchmark moves prov_1's reputation
        let provider = test_provider("prov_1");
        let job = BenchmarkJob::new("prov_1".to_string(), TriggerKind::Manual);
        let job_id = job.id.clone();
        orch.jobs.write().await.insert(job_id.clone(), job);
        orch.complete_job(&job_id, &provider, test_result("prov_1", 1000.0))
            .await;

        let mut updated = test_provider("prov_1");
        updated.region = "us-east".to_string();
        orch.register_provider(updated).await.unwrap();

        let reputation = orch.get_reputation("prov_1").await.unwrap();
        assert_eq!(reputation.benchmark_count, 1);

        let order = orch.registration_order.read().await.clone();
        assert_eq!(order, vec!["prov_1".to_string(), "prov_2".to_string()]);
    }

    #[tokio::test]
    async fn test_unregister_drops_state_but_keeps_jobs() {
        let orch = orchestrator();
        orch.register_provider(test_provider("prov_1")).await.unwrap();

        let job = BenchmarkJob::new("prov_1".to_string(), TriggerKind::Scheduled);
        orch.jobs.write().await.insert(job.id.clone(), job);

        orch.unregister_provider("prov_1").await.unwrap();
        assert!(orch.get_reputation("prov_1").await.is_none());
        assert_eq!(orch.get_jobs().await.len(), 1);

        assert!(orch.unregister_provider("prov_1").await.is_err());
    }

    #[tokio::test]
    async fn test_trigger_unknown_provider_errors() {
        let orch = orchestrator();
        assert!(orch.trigger_benchmark("ghost").await.is_err());
    }

    #[tokio::test]
    async fn test_history_capped_at_ten_most_recent() {
        let orch = orchestrator();
        orch.register_provider(test_provider("prov_1")).await.unwrap();
        let provider = test_provider("prov_1");

        for i in 0..15 {
            let job = BenchmarkJob::new("prov_1".to_string(), TriggerKind::Scheduled);
            let job_id = job.id.clone();
            orch.jobs.write().await.insert(job_id.clone(), job);
            orch.complete_job(&job_id, &provider, test_result("prov_1", i as f64))
                .await;
        }

        let history = orch.get_benchmark_history("prov_1").await;
        assert_eq!(history.len(), HISTORY_LIMIT);
        // Oldest five were evicted; completion order preserved
        assert_eq!(history[0].iops.mixed_iops, 5.0);
        assert_eq!(history[9].iops.mixed_iops, 14.0);
    }

    #[tokio::test]
    async fn test_completion_applies_reputation_transition() {
        let orch = orchestrator();
        orch.register_provider(test_provider("prov_1")).await.unwrap();
        let provider = test_provider("prov_1");

        // Measured IOPS matches the 1000 claim exactly: a pass
        let job = BenchmarkJob::new("prov_1".to_string(), TriggerKind::Scheduled);
        let job_id = job.id.clone();
        orch.jobs.write().await.insert(job_id.clone(), job);
        orch.complete_job(&job_id, &provider, test_result("prov_1", 1000.0))
            .await;

        let reputation = orch.get_reputation("prov_1").await.unwrap();
        assert_eq!(reputation.score, 55.0);
        assert_eq!(reputation.pass_count, 1);

        let jobs = orch.get_jobs().await;
        assert_eq!(jobs[0].status, JobStatus::Completed);
        assert!(jobs[0].result.is_some());
    }

    #[tokio::test]
    async fn test_completion_after_unregister_skips_reputation() {
        let orch = orchestrator();
        orch.register_provider(test_provider("prov_1")).await.unwrap();
        let provider = test_provider("prov_1");

        let job = BenchmarkJob::new("prov_1".to_string(), TriggerKind::Scheduled);
        let job_id = job.id.clone();
        orch.jobs.write().await.insert(job_id.clone(), job);

        orch.unregister_provider("prov_1").await.unwrap();
        orch.complete_job(&job_id, &provider, test_result("prov_1", 1000.0))
            .await;

        assert!(orch.reputations.read().await.get("prov_1").is_none());
        // The job record itself still completes
        assert_eq!(orch.get_jobs().await[0].status, JobStatus::Completed);
    }

    #[tokio::test]
    async fn test_queued_job_failure_marks_failed_and_releases_slot() {
        let orch = orchestrator();
        let mut provider = test_provider("prov_1");
        provider.endpoint = "not-a-url".to_string();

        // Seed the tables directly: registration would reject the endpoint,
        // but a provider can go bad between registration and execution
        orch.providers
            .write()
            .await
            .insert("prov_1".to_string(), provider.clone());
        orch.registration_order
            .write()
            .await
            .push("prov_1".to_string());
        orch.in_flight.write().await.insert("prov_1".to_string());
        let job = BenchmarkJob::new("prov_1".to_string(), TriggerKind::Scheduled);
        let job_id = job.id.clone();
        orch.jobs.write().await.insert(job_id.clone(), job);

        orch.run_queued_job(job_id.clone(), provider).await;

        let jobs = orch.jobs.read().await;
        let job = jobs.get(&job_id).unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.error.is_some());
        assert!(job.result.is_none());
        drop(jobs);

        // The slot is released even though the run errored
        assert!(orch.in_flight.read().await.is_empty());
        assert!(orch.get_benchmark_history("prov_1").await.is_empty());
    }

    #[tokio::test]
    async fn test_immediate_failure_propagates_and_fails_job() {
        let orch = orchestrator();
        let mut provider = test_provider("prov_1");
        provider.endpoint = "not-a-url".to_string();
        orch.providers
            .write()
            .await
            .insert("prov_1".to_string(), provider);
        orch.registration_order
            .write()
            .await
            .push("prov_1".to_string());

        assert!(orch.trigger_benchmark("prov_1").await.is_err());

        let jobs = orch.get_jobs().await;
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].status, JobStatus::Failed);
        assert!(jobs[0].error.is_some());
    }

    #[tokio::test]
    async fn test_running_jobs_filter() {
        let orch = orchestrator();
        let mut running = BenchmarkJob::new("prov_1".to_string(), TriggerKind::Scheduled);
        running.mark_running(Utc::now());
        let pending = BenchmarkJob::new("prov_2".to_string(), TriggerKind::Scheduled);

        orch.jobs.write().await.insert(running.id.clone(), running);
        orch.jobs.write().await.insert(pending.id.clone(), pending);

        let running_jobs = orch.get_running_jobs().await;
        assert_eq!(running_jobs.len(), 1);
        assert_eq!(running_jobs[0].provider_id, "prov_1");
    }

    #[tokio::test]
    async fn test_leaderboard_ranked_descending() {
        let orch = orchestrator();
        for id in ["prov_a", "prov_b", "prov_c"] {
            orch.register_provider(test_provider(id)).await.unwrap();
        }

        {
            let mut reputations = orch.reputations.write().await;
            let mut high = Reputation::new("prov_b".to_string());
            high.score = 90.0;
            reputations.insert("prov_b".to_string(), high);
            let mut low = Reputation::new("prov_c".to_string());
            low.score = 10.0;
            reputations.insert("prov_c".to_string(), low);
        }

        let ranked = orch.get_ranked_providers(10).await;
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].provider_id, "prov_b");
        // prov_a has no reputation yet and ranks at the default 50
        assert_eq!(ranked[1].provider_id, "prov_a");
        assert_eq!(ranked[2].provider_id, "prov_c");

        let top = orch.get_ranked_providers(1).await;
        assert_eq!(top.len(), 1);
    }

    #[tokio::test]
    async fn test_stats_average_uses_default_for_unseen() {
        let orch = orchestrator();
        orch.register_provider(test_provider("prov_1")).await.unwrap();
        orch.register_provider(test_provider("prov_2")).await.unwrap();

        {
            let mut reputations = orch.reputations.write().await;
            let mut rep = Reputation::new("prov_1".to_string());
            rep.score = 100.0;
            reputations.insert("prov_1".to_string(), rep);
        }

        let stats = orch.get_stats().await;
        assert_eq!(stats.provider_count, 2);
        assert!((stats.average_reputation_score - 75.0).abs() < 1e-9);
        assert_eq!(stats.in_flight_count, 0);
    }

    #[tokio::test]
    async fn test_set_uptime_clamped_and_guarded() {
        let orch = orchestrator();
        orch.register_provider(test_provider("prov_1")).await.unwrap();

        orch.set_uptime("prov_1", 120.0).await.unwrap();
        let reputation = orch.get_reputation("prov_1").await.unwrap();
        assert_eq!(reputation.uptime_percent, 100.0);

        assert!(orch.set_uptime("ghost", 50.0).await.is_err());
    }

    #[tokio::test]
    async fn test_scheduling_pass_skips_in_flight_providers() {
        let orch = orchestrator();
        orch.register_provider(test_provider("prov_1")).await.unwrap();
        orch.in_flight.write().await.insert("prov_1".to_string());

        orch.run_scheduling_pass().await;

        // prov_1 was due (never benchmarked) but in flight, so no new job
        assert!(orch.get_jobs().await.is_empty());
    }

    #[tokio::test]
    async fn test_scheduling_pass_respects_budget() {
        let mut config = AuditorConfig::default();
        config.schedule.max_concurrent_benchmarks = 2;
        let orch = AuditOrchestrator::new(Arc::new(config)).unwrap();

        // All four never benchmarked, so all due; only two may queue
        for id in ["prov_a", "prov_b", "prov_c", "prov_d"] {
            orch.register_provider(test_provider(id)).await.unwrap();
        }

        orch.run_scheduling_pass().await;
        assert_eq!(orch.get_jobs().await.len(), 2);
    }

    #[tokio::test]
    async fn test_start_is_idempotent_and_stop_disarms() {
        let orch = orchestrator();
        orch.start().await;
        orch.start().await;
        assert!(orch.driver.read().await.is_some());
        orch.stop().await;
        assert!(orch.driver.read().await.is_none());
    }
}
