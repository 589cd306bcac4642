//! Auditor API Endpoints
//!
//! HTTP surface over the orchestrator: provider registry, benchmark
//! triggers, reputation and history queries, the job table, the
//! leaderboard, and aggregate stats.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::bench::result::BenchmarkResult;
use crate::provider::{DeclaredCapabilities, ProviderInfo, StorageKind};
use crate::reputation::ReputationTier;
use crate::scheduler::{AuditOrchestrator, AuditorStats, BenchmarkJob, RankedProvider};

/// API state for auditor endpoints
#[derive(Clone)]
pub struct AuditorApiState {
    pub orchestrator: AuditOrchestrator,
}

// Request types

#[derive(Debug, Deserialize)]
pub struct RegisterProviderRequest {
    pub id: String,
    pub name: String,
    pub endpoint: String,
    pub kind: StorageKind,
    #[serde(default)]
    pub declared: DeclaredCapabilities,
    #[serde(default)]
    pub region: String,
    /// Run the initial benchmark inline before responding. Defaults to true.
    pub run_initial_benchmark: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct UptimeRequest {
    pub uptime_percent: f64,
}

// Response types

#[derive(Debug, Serialize)]
pub struct RegisterProviderResponse {
    pub provider_id: String,
    pub registered_at: String,
    pub initial_benchmark: Option<BenchmarkSummary>,
}

#[derive(Debug, Serialize)]
pub struct BenchmarkSummary {
    pub provider_id: String,
    pub timestamp: String,
    pub overall_score: u32,
    pub mixed_iops: f64,
    pub sequential_read_mbps: f64,
    pub sequential_write_mbps: f64,
    pub p99_latency_ms: f64,
    pub durability_score: u32,
    pub attestation: String,
}

impl BenchmarkSummary {
    fn from_result(result: &BenchmarkResult) -> Self {
        Self {
            provider_id: result.provider_id.clone(),
            timestamp: result.timestamp.to_rfc3339(),
            overall_score: result.overall_score,
            mixed_iops: result.iops.mixed_iops,
            sequential_read_mbps: result.throughput.sequential_read_mbps,
            sequential_write_mbps: result.throughput.sequential_write_mbps,
            p99_latency_ms: result.latency.p99_ms,
            durability_score: result.durability.integrity_score,
            attestation: result.attestation.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReputationResponse {
    pub provider_id: String,
    pub score: f64,
    pub tier: ReputationTier,
    pub benchmark_count: u64,
    pub pass_count: u64,
    pub fail_count: u64,
    pub last_benchmark_at: Option<String>,
    pub last_deviation_percent: f64,
    pub uptime_percent: f64,
    pub flags: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub provider_id: String,
    pub total: usize,
    pub results: Vec<BenchmarkResult>,
}

#[derive(Debug, Serialize)]
pub struct JobsResponse {
    pub total: usize,
    pub jobs: Vec<BenchmarkJob>,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub total: usize,
    pub providers: Vec<RankedProvider>,
}

// Endpoints

/// POST /providers - Register a provider, optionally benchmarking it inline
pub async fn register_provider(
    State(state): State<AuditorApiState>,
    Json(payload): Json<RegisterProviderRequest>,
) -> Result<Json<RegisterProviderResponse>, (StatusCode, String)> {
    if payload.id.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Provider id required".to_string()));
    }

    let info = ProviderInfo {
        id: payload.id.clone(),
        name: payload.name,
        endpoint: payload.endpoint,
        kind: payload.kind,
        declared: payload.declared,
        region: payload.region,
        registered_at: chrono::Utc::now(),
    };
    let registered_at = info.registered_at.to_rfc3339();

    state
        .orchestrator
        .register_provider(info)
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let initial_benchmark = if payload.run_initial_benchmark.unwrap_or(true) {
        let result = state
            .orchestrator
            .benchmark_on_registration(&payload.id)
            .await
            .map_err(|e| (StatusCode::BAD_GATEWAY, e.to_string()))?;
        Some(BenchmarkSummary::from_result(&result))
    } else {
        None
    };

    Ok(Json(RegisterProviderResponse {
        provider_id: payload.id,
        registered_at,
        initial_benchmark,
    }))
}

/// DELETE /providers/{provider_id} - Remove a provider
pub async fn unregister_provider(
    State(state): State<AuditorApiState>,
    Path(provider_id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .orchestrator
        .unregister_provider(&provider_id)
        .await
        .map_err(|e| (StatusCode::NOT_FOUND, e.to_string()))?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /providers/{provider_id}/benchmark - Trigger a benchmark now
pub async fn trigger_benchmark(
    State(state): State<AuditorApiState>,
    Path(provider_id): Path<String>,
) -> Result<Json<BenchmarkSummary>, (StatusCode, String)> {
    let result = state
        .orchestrator
        .trigger_benchmark(&provider_id)
        .await
        .map_err(|e| (StatusCode::BAD_GATEWAY, e.to_string()))?;
    Ok(Json(BenchmarkSummary::from_result(&result)))
}

/// GET /providers/{provider_id}/reputation - Current reputation
pub async fn get_reputation(
    State(state): State<AuditorApiState>,
    Path(provider_id): Path<String>,
) -> Result<Json<ReputationResponse>, (StatusCode, String)> {
    let reputation = state
        .orchestrator
        .get_reputation(&provider_id)
        .await
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                format!("Provider not registered: {}", provider_id),
            )
        })?;

    Ok(Json(ReputationResponse {
        provider_id: reputation.provider_id.clone(),
        score: reputation.score,
        tier: reputation.tier(),
        benchmark_count: reputation.benchmark_count,
        pass_count: reputation.pass_count,
        fail_count: reputation.fail_count,
        last_benchmark_at: reputation.last_benchmark_at.map(|t| t.to_rfc3339()),
        last_deviation_percent: reputation.last_deviation_percent,
        uptime_percent: reputation.uptime_percent,
        flags: reputation.flags,
    }))
}

/// PUT /providers/{provider_id}/uptime - Feed externally measured uptime
pub async fn set_uptime(
    State(state): State<AuditorApiState>,
    Path(provider_id): Path<String>,
    Json(payload): Json<UptimeRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .orchestrator
        .set_uptime(&provider_id, payload.uptime_percent)
        .await
        .map_err(|e| (StatusCode::NOT_FOUND, e.to_string()))?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /providers/{provider_id}/history - Recent benchmark results
pub async fn get_history(
    State(state): State<AuditorApiState>,
    Path(provider_id): Path<String>,
) -> Json<HistoryResponse> {
    let results = state.orchestrator.get_benchmark_history(&provider_id).await;
    Json(HistoryResponse {
        provider_id,
        total: results.len(),
        results,
    })
}

/// GET /jobs - All job records, oldest first
pub async fn get_jobs(State(state): State<AuditorApiState>) -> Json<JobsResponse> {
    let jobs = state.orchestrator.get_jobs().await;
    Json(JobsResponse {
        total: jobs.len(),
        jobs,
    })
}

/// GET /leaderboard - Providers ranked by reputation score
pub async fn get_leaderboard(
    State(state): State<AuditorApiState>,
    Query(query): Query<LeaderboardQuery>,
) -> Json<LeaderboardResponse> {
    let limit = query.limit.unwrap_or(100);
    let providers = state.orchestrator.get_ranked_providers(limit).await;
    Json(LeaderboardResponse {
        total: providers.len(),
        providers,
    })
}

/// GET /stats - Aggregate engine counters
pub async fn get_stats(State(state): State<AuditorApiState>) -> Json<AuditorStats> {
    Json(state.orchestrator.get_stats().await)
}

/// Create the auditor API router
pub fn create_audit_router(state: AuditorApiState) -> Router {
    Router::new()
        .route("/providers", post(register_provider))
        .route("/providers/{provider_id}", delete(unregister_provider))
        .route(
            "/providers/{provider_id}/benchmark",
            post(trigger_benchmark),
        )
        .route("/providers/{provider_id}/reputation", get(get_reputation))
        .route(
            "/providers/{provider_id}/uptime",
            axum::routing::put(set_uptime),
        )
        .route("/providers/{provider_id}/history", get(get_history))
        .route("/jobs", get(get_jobs))
        .route("/leaderboard", get(get_leaderboard))
        .route("/stats", get(get_stats))
        .with_state(state)
}
