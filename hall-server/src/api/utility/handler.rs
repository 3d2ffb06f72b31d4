//! Utility API Handlers

use axum::{Json, extract::State};

use crate::core::ServerState;
use crate::settlement::{ReconcileReport, SweepReport};
use crate::utils::time::now_millis;
use crate::utils::{AppResponse, AppResult, ok};

/// POST /api/utility/create-missing-commissions - 补建遗漏的佣金账单
///
/// 幂等：重复调用只会 skip。
pub async fn create_missing_commissions(
    State(state): State<ServerState>,
) -> AppResult<Json<AppResponse<ReconcileReport>>> {
    let report = state.settlement_engine.reconcile_missing(now_millis()).await?;
    Ok(ok(report))
}

/// POST /api/utility/run-overdue-sweep - 手动触发逾期清扫
pub async fn run_overdue_sweep(
    State(state): State<ServerState>,
) -> AppResult<Json<AppResponse<SweepReport>>> {
    let report = state.settlement_engine.overdue_sweep(now_millis()).await;
    Ok(ok(report))
}
