//! 健康检查接口

use std::sync::OnceLock;
use std::time::Instant;

use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::core::ServerState;

static STARTED_AT: OnceLock<Instant> = OnceLock::new();

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
}

pub fn router() -> Router<ServerState> {
    STARTED_AT.get_or_init(Instant::now);
    Router::new().route("/health", get(health))
}

/// GET /health - 服务状态 (公开)
async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: STARTED_AT.get_or_init(Instant::now).elapsed().as_secs(),
    })
}
