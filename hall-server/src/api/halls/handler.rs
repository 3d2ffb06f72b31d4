//! Hall API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use surrealdb::RecordId;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Hall, HallCreate, HallUpdate, MenuItem, UserRole};
use crate::utils::money;
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_MENU_ITEMS, MAX_NAME_LEN, MAX_NOTE_LEN, MAX_URL_LEN,
    validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResponse, AppResult, ok, ok_with_message};

/// GET /api/halls - 所有场馆 (公开)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<AppResponse<Vec<Hall>>>> {
    Ok(ok(state.halls.find_all().await?))
}

/// GET /api/halls/{id} - 单个场馆 (公开)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Hall>>> {
    let hall = state
        .halls
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Hall {} not found", id)))?;
    Ok(ok(hall))
}

/// GET /api/halls/manager - 当前经理名下的场馆
pub async fn my_halls(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<AppResponse<Vec<Hall>>>> {
    let halls = state
        .halls
        .find_by_manager(&current_user.record_id()?)
        .await?;
    Ok(ok(halls))
}

/// POST /api/halls - 创建场馆
///
/// 管理员可通过 `manager` 字段代经理创建；经理本人创建时忽略该字段。
pub async fn create(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(payload): Json<HallCreate>,
) -> AppResult<Json<AppResponse<Hall>>> {
    validate_required_text(&payload.name, "Hall name", MAX_NAME_LEN)?;
    validate_required_text(&payload.location, "Location", MAX_ADDRESS_LEN)?;
    validate_optional_text(&payload.description, "Description", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.image, "Image", MAX_URL_LEN)?;
    if payload.capacity < 1 {
        return Err(AppError::validation("Capacity must be at least 1"));
    }
    money::validate_amount(payload.price, "price", money::MAX_PRICE)?;
    validate_menu(&payload.menu)?;

    let manager = resolve_manager(&state, &current_user, payload.manager.as_deref()).await?;
    let hall = state.halls.create(payload, manager).await?;
    Ok(ok(hall))
}

/// PUT /api/halls/{id} - 更新场馆
///
/// 覆盖 `booked_dates` 即经理手动锁定/释放日期；与预订占位互相独立。
pub async fn update(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<HallUpdate>,
) -> AppResult<Json<AppResponse<Hall>>> {
    ensure_owner(&state, &current_user, &id).await?;

    if let Some(name) = &payload.name {
        validate_required_text(name, "Hall name", MAX_NAME_LEN)?;
    }
    if let Some(location) = &payload.location {
        validate_required_text(location, "Location", MAX_ADDRESS_LEN)?;
    }
    validate_optional_text(&payload.description, "Description", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.image, "Image", MAX_URL_LEN)?;
    if let Some(capacity) = payload.capacity
        && capacity < 1
    {
        return Err(AppError::validation("Capacity must be at least 1"));
    }
    if let Some(price) = payload.price {
        money::validate_amount(price, "price", money::MAX_PRICE)?;
    }
    if let Some(menu) = &payload.menu {
        validate_menu(menu)?;
    }

    let hall = state.halls.update(&id, payload).await?;
    Ok(ok(hall))
}

/// DELETE /api/halls/{id} - 删除场馆
pub async fn delete(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<bool>>> {
    ensure_owner(&state, &current_user, &id).await?;
    let deleted = state.halls.delete(&id).await?;
    Ok(ok_with_message(deleted, "Hall deleted"))
}

fn validate_menu(menu: &[MenuItem]) -> AppResult<()> {
    if menu.len() > MAX_MENU_ITEMS {
        return Err(AppError::validation(format!(
            "Too many menu items (max {MAX_MENU_ITEMS})"
        )));
    }
    for item in menu {
        validate_required_text(&item.name, "Menu item name", MAX_NAME_LEN)?;
        money::validate_amount(item.price, "menu item price", money::MAX_PRICE)?;
    }
    Ok(())
}

/// 场馆归属经理：管理员可指定，经理只能是自己
async fn resolve_manager(
    state: &ServerState,
    current_user: &CurrentUser,
    requested: Option<&str>,
) -> AppResult<RecordId> {
    let Some(requested) = requested else {
        return current_user.record_id();
    };

    if !current_user.is_admin() {
        if requested == current_user.id {
            return current_user.record_id();
        }
        return Err(AppError::forbidden(
            "Only admin may create a hall for another manager",
        ));
    }

    let user = state
        .users
        .find_by_id(requested)
        .await?
        .ok_or_else(|| AppError::validation(format!("Manager {} not found", requested)))?;
    if user.role != UserRole::Manager {
        return Err(AppError::validation("Hall owner must have the manager role"));
    }
    user.id
        .ok_or_else(|| AppError::internal("User record without id"))
}

/// 经理只能操作自己名下的场馆 (管理员通行)
async fn ensure_owner(state: &ServerState, current_user: &CurrentUser, id: &str) -> AppResult<Hall> {
    let hall = state
        .halls
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Hall {} not found", id)))?;
    if !current_user.is_admin() && hall.manager != current_user.record_id()? {
        return Err(AppError::forbidden("Not the manager of this hall"));
    }
    Ok(hall)
}
