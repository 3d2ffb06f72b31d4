//! Commission API Handlers

use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::CommissionPayment;
use crate::utils::time::now_millis;
use crate::utils::{AppError, AppResponse, AppResult, ok};

#[derive(Debug, Deserialize)]
pub struct RejectCommissionRequest {
    pub reason: String,
}

/// POST /api/commissions/upload-proof/{id} - 经理上传转账凭证
///
/// multipart 字段：`file`。被拒后可重新上传；已核实的账单拒绝覆盖。
pub async fn upload_proof(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> AppResult<Json<AppResponse<CommissionPayment>>> {
    let mut proof_path: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let filename = field.file_name().unwrap_or("proof.png").to_string();
            let data = field.bytes().await?;
            proof_path = Some(state.storage.store(&data, &filename)?);
        }
    }

    let proof_path = proof_path
        .ok_or_else(|| AppError::validation("Please upload a payment proof image"))?;

    let payment = state
        .settlement_engine
        .upload_proof(&current_user, &id, proof_path)
        .await?;
    Ok(ok(payment))
}

/// GET /api/commissions/my-payments - 当前经理的佣金账单
pub async fn my_payments(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<AppResponse<Vec<CommissionPayment>>>> {
    Ok(ok(state
        .settlement_engine
        .list_for_manager(&current_user)
        .await?))
}

/// GET /api/commissions - 全量账单 (管理员)
pub async fn list(
    State(state): State<ServerState>,
) -> AppResult<Json<AppResponse<Vec<CommissionPayment>>>> {
    Ok(ok(state.settlement_engine.list_all().await?))
}

/// GET /api/commissions/pending - 待审核队列 (已提交凭证的 pending 账单)
pub async fn pending(
    State(state): State<ServerState>,
) -> AppResult<Json<AppResponse<Vec<CommissionPayment>>>> {
    Ok(ok(state
        .settlement_engine
        .list_pending_with_proof()
        .await?))
}

/// PUT /api/commissions/verify/{id} - 管理员核实凭证
pub async fn verify(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<CommissionPayment>>> {
    let payment = state
        .settlement_engine
        .verify(&current_user, &id, now_millis())
        .await?;
    Ok(ok(payment))
}

/// PUT /api/commissions/reject/{id} - 管理员驳回凭证 (清空待重传)
pub async fn reject(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<RejectCommissionRequest>,
) -> AppResult<Json<AppResponse<CommissionPayment>>> {
    let payment = state
        .settlement_engine
        .reject(&id, payload.reason)
        .await?;
    Ok(ok(payment))
}
