use anyhow::Result;
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::fmt::format::FmtSpan;

use storage_auditor::{
    api::{create_audit_router, AuditorApiState},
    AuditOrchestrator, AuditorConfig,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load and validate configuration before anything else
    let config = Arc::new(AuditorConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        e
    })?);

    init_logging(&config)?;

    info!("Starting storage auditor server");
    info!(
        "Deviation thresholds: warn={}%, fail={}%, slash={}%",
        config.deviation.warn_threshold_percent,
        config.deviation.fail_threshold_percent,
        config.deviation.slash_threshold_percent
    );

    let orchestrator = AuditOrchestrator::new(config.clone())?;

    if config.server.auto_start {
        orchestrator.start().await;
    } else {
        info!("Scheduling driver disabled (AUDITOR_AUTO_START=false)");
    }

    let app = Router::new()
        .nest(
            "/audit",
            create_audit_router(AuditorApiState {
                orchestrator: orchestrator.clone(),
            }),
        )
        .route("/health", get(|| async { "OK" }))
        .layer(TraceLayer::new_for_http());

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", bind_addr, e))?;

    info!("Storage auditor listening on {}", bind_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Initialize tracing from the logging configuration
fn init_logging(config: &AuditorConfig) -> Result<()> {
    let log_level = match config.logging.level.to_lowercase().as_str() {
        "error" => Level::ERROR,
        "warn" => Level::WARN,
        "info" => Level::INFO,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(if config.logging.log_requests {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        })
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set logging subscriber: {}", e))?;

    Ok(())
}
