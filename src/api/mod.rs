//! HTTP API
//!
//! Axum routers exposing the orchestrator over HTTP.

pub mod routes;

pub use routes::{create_audit_router, AuditorApiState};
