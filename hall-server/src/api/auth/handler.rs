//! Auth API Handlers

use std::time::Duration;

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{User, UserCreate, UserRole};
use crate::security_log;
use crate::utils::validation::{
    MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_PASSWORD_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text,
    validate_required_text,
};
use crate::utils::{AppError, AppResponse, AppResult, ok};

/// 登录失败统一延迟，抹平存在/不存在账号的时间差
const LOGIN_FAILURE_DELAY_MS: u64 = 150;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// POST /api/auth/register - 注册账号 (customer/manager)
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<UserCreate>,
) -> AppResult<Json<AppResponse<AuthResponse>>> {
    validate_required_text(&payload.name, "Name", MAX_NAME_LEN)?;
    validate_required_text(&payload.email, "Email", MAX_EMAIL_LEN)?;
    validate_optional_text(&payload.phone, "Phone", MAX_SHORT_TEXT_LEN)?;

    if !payload.email.contains('@') || payload.email.starts_with('@') || payload.email.ends_with('@')
    {
        return Err(AppError::validation("Invalid email address"));
    }
    if payload.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    if payload.password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::validation("Password is too long"));
    }
    if payload.role == Some(UserRole::Admin) {
        // 管理员账号由启动播种产生
        return Err(AppError::validation("Admin accounts cannot be self-registered"));
    }

    let user = state.users.create(payload).await?;
    respond_with_token(&state, user)
}

/// POST /api/auth/login - 登录
///
/// 账号不存在与密码错误返回相同的消息和相近的耗时，
/// 防止邮箱枚举。
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AppResponse<AuthResponse>>> {
    let user = state.users.find_by_email(&payload.email).await?;

    let verified = match &user {
        Some(u) => u.verify_password(&payload.password).unwrap_or(false),
        None => false,
    };

    if !verified {
        security_log!("WARN", "login_failed", email = payload.email.clone());
        tokio::time::sleep(Duration::from_millis(LOGIN_FAILURE_DELAY_MS)).await;
        return Err(AppError::invalid_credentials());
    }

    let user = user.ok_or_else(AppError::invalid_credentials)?;
    security_log!("INFO", "login_success", email = payload.email);
    respond_with_token(&state, user)
}

/// GET /api/auth/me - 当前账号信息
///
/// 从数据库重新读取，令牌有效但账号已被删除 (逾期清扫) 时返回 404。
pub async fn me(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<AppResponse<User>>> {
    let user = state
        .users
        .find_by_id(&current_user.id)
        .await?
        .ok_or_else(|| AppError::not_found("Account no longer exists"))?;
    Ok(ok(user))
}

fn respond_with_token(
    state: &ServerState,
    user: User,
) -> AppResult<Json<AppResponse<AuthResponse>>> {
    let user_id = user
        .id
        .as_ref()
        .map(|id| id.to_string())
        .ok_or_else(|| AppError::internal("User record without id"))?;

    let token = state
        .jwt_service
        .generate_token(&user_id, &user.name, user.role)
        .map_err(|e| AppError::internal(format!("Token generation failed: {}", e)))?;

    Ok(ok(AuthResponse { token, user }))
}
