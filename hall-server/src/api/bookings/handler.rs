//! Booking API Handlers
//!
//! 只负责 HTTP ↔ 引擎的转换；所有权检查和状态机约束都在
//! [`BookingEngine`](crate::booking::BookingEngine) 内。

use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::booking::CreateBookingRequest;
use crate::booking::food::FoodItemRequest;
use crate::core::ServerState;
use crate::db::models::Booking;
use crate::utils::time::now_millis;
use crate::utils::{AppError, AppResponse, AppResult, ok, ok_with_message};

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct RejectPaymentRequest {
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct CustomFoodRequest {
    pub items: Vec<FoodItemRequest>,
}

#[derive(Debug, Deserialize)]
pub struct CustomFoodStatusRequest {
    pub status: String,
}

/// POST /api/bookings - 创建预订 (顾客)
pub async fn create(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(payload): Json<CreateBookingRequest>,
) -> AppResult<Json<AppResponse<Booking>>> {
    let booking = state
        .booking_engine
        .create_booking(&current_user, payload, now_millis())
        .await?;
    Ok(ok(booking))
}

/// GET /api/bookings - 全量列表 (管理员) / 经理名下场馆的预订 (经理)
pub async fn list(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<AppResponse<Vec<Booking>>>> {
    let bookings = if current_user.is_admin() {
        state.booking_engine.list_all().await?
    } else if current_user.is_manager() {
        state.booking_engine.list_for_manager(&current_user).await?
    } else {
        return Err(AppError::forbidden("Requires manager role"));
    };
    Ok(ok(bookings))
}

/// GET /api/bookings/my - 当前顾客的预订
pub async fn my_bookings(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<AppResponse<Vec<Booking>>>> {
    Ok(ok(state
        .booking_engine
        .list_for_customer(&current_user)
        .await?))
}

/// GET /api/bookings/manager - 经理名下场馆的预订
pub async fn manager_bookings(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<AppResponse<Vec<Booking>>>> {
    Ok(ok(state
        .booking_engine
        .list_for_manager(&current_user)
        .await?))
}

/// GET /api/bookings/{id} - 预订详情 (顾客本人/场馆经理/管理员)
pub async fn get_by_id(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Booking>>> {
    Ok(ok(state
        .booking_engine
        .get_booking(&current_user, &id)
        .await?))
}

/// PUT /api/bookings/{id}/status - 状态流转 (经理/管理员)
///
/// `completed` 触发佣金结算。
pub async fn update_status(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<AppResponse<Booking>>> {
    let booking = state
        .booking_engine
        .update_status(&current_user, &id, &payload.status, now_millis())
        .await?;
    Ok(ok(booking))
}

/// PUT /api/bookings/{id}/payment-proof - 提交支付凭证 (顾客)
///
/// multipart 字段：`transaction_id` (文本) + `file` (凭证文件)。
/// 被拒后重新提交会重新抢占日期，失败返回撞期冲突。
pub async fn submit_payment_proof(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> AppResult<Json<AppResponse<Booking>>> {
    let mut transaction_id: Option<String> = None;
    let mut proof_path: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "transaction_id" => transaction_id = Some(field.text().await?),
            "file" => {
                let filename = field.file_name().unwrap_or("proof.png").to_string();
                let data = field.bytes().await?;
                proof_path = Some(state.storage.store(&data, &filename)?);
            }
            _ => {}
        }
    }

    let transaction_id = transaction_id
        .ok_or_else(|| AppError::validation("transaction_id field is required"))?;
    let proof_path =
        proof_path.ok_or_else(|| AppError::validation("file field is required"))?;

    let booking = state
        .booking_engine
        .submit_payment_proof(&current_user, &id, transaction_id, proof_path, now_millis())
        .await?;
    Ok(ok(booking))
}

/// PUT /api/bookings/{id}/verify-payment - 核实支付 (场馆经理)
pub async fn verify_payment(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Booking>>> {
    let booking = state
        .booking_engine
        .verify_payment(&current_user, &id, now_millis())
        .await?;
    Ok(ok(booking))
}

/// PUT /api/bookings/{id}/reject-payment - 拒绝支付 (场馆经理)
///
/// 释放日期占位，顾客可重新提交。
pub async fn reject_payment(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<RejectPaymentRequest>,
) -> AppResult<Json<AppResponse<Booking>>> {
    let booking = state
        .booking_engine
        .reject_payment(&current_user, &id, payload.reason, now_millis())
        .await?;
    Ok(ok(booking))
}

/// POST /api/bookings/{id}/custom-food - 顾客提交点菜请求
pub async fn add_custom_food(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<CustomFoodRequest>,
) -> AppResult<Json<AppResponse<Booking>>> {
    let booking = state
        .booking_engine
        .add_custom_food(&current_user, &id, payload.items, now_millis())
        .await?;
    Ok(ok(booking))
}

/// PATCH /api/bookings/{id}/custom-food-status - 经理批复点菜
pub async fn set_custom_food_status(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<CustomFoodStatusRequest>,
) -> AppResult<Json<AppResponse<Booking>>> {
    let booking = state
        .booking_engine
        .set_custom_food_status(&current_user, &id, &payload.status, now_millis())
        .await?;
    Ok(ok(booking))
}

/// DELETE /api/bookings/{id} - 删除预订 (经理/管理员)，日期占位同事务释放
pub async fn delete(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<bool>>> {
    state
        .booking_engine
        .delete_booking(&current_user, &id)
        .await?;
    Ok(ok_with_message(true, "Booking deleted"))
}
