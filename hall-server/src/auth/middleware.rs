//! 认证中间件
//!
//! 为 JWT 认证和角色授权提供 Axum 中间件

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::{CurrentUser, JwtService};
use crate::core::ServerState;
use crate::db::models::UserRole;
use crate::security_log;
use crate::utils::AppError;

/// 公共路由判定 (跳过认证)
///
/// - `OPTIONS *` (CORS 预检)
/// - 非 `/api/` 路径 (含 `/health`)
/// - `/api/auth/register`, `/api/auth/login`
/// - 场馆公开浏览: `GET /api/halls`, `GET /api/halls/{id}`
///   (`/api/halls/manager` 除外)
/// - 上传文件读取: `GET /api/upload/{filename}`
fn is_public_route(method: &http::Method, path: &str) -> bool {
    if method == http::Method::OPTIONS {
        return true;
    }
    if !path.starts_with("/api/") {
        return true;
    }
    if path == "/api/auth/register" || path == "/api/auth/login" {
        return true;
    }
    if method == http::Method::GET {
        if path == "/api/halls" {
            return true;
        }
        if let Some(rest) = path.strip_prefix("/api/halls/") {
            return rest != "manager" && !rest.contains('/');
        }
        if let Some(rest) = path.strip_prefix("/api/upload/") {
            return !rest.is_empty();
        }
    }
    false
}

/// 认证中间件 - 要求用户登录
///
/// 从 `Authorization: Bearer <token>` 头提取并验证 JWT。
/// 验证成功后将 [`CurrentUser`] 注入请求扩展。
///
/// | 错误 | HTTP 状态码 |
/// |------|------------|
/// | 无 Authorization 头 | 401 Unauthorized |
/// | 令牌过期 | 401 TokenExpired |
/// | 无效令牌 | 401 InvalidToken |
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path().to_string();

    if is_public_route(req.method(), &path) {
        return Ok(next.run(req).await);
    }

    let jwt_service = state.get_jwt_service();
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header).ok_or(AppError::InvalidToken)?,
        None => {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
            return Err(AppError::Unauthorized);
        }
    };

    match jwt_service.validate_token(token) {
        Ok(claims) => {
            let user = CurrentUser::try_from(claims).map_err(|_| AppError::InvalidToken)?;
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = format!("{}", e),
                uri = format!("{:?}", req.uri())
            );

            match e {
                crate::auth::JwtError::ExpiredToken => Err(AppError::TokenExpired),
                _ => Err(AppError::InvalidToken),
            }
        }
    }
}

/// 角色检查中间件 - 要求特定角色
///
/// 管理员通过所有角色检查。无权限返回 403 Forbidden。
///
/// # 用法
///
/// ```ignore
/// use axum::middleware;
/// Router::new()
///     .route("/api/bookings", post(handler::create))
///     .layer(middleware::from_fn(require_role(UserRole::Customer)));
/// ```
pub fn require_role(
    role: UserRole,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .ok_or(AppError::Unauthorized)?;

            if user.role != role && !user.is_admin() {
                security_log!(
                    "WARN",
                    "role_denied",
                    user_id = user.id.clone(),
                    required_role = role.as_str()
                );
                return Err(AppError::forbidden(format!(
                    "Requires {} role",
                    role.as_str()
                )));
            }

            Ok(next.run(req).await)
        })
    }
}

/// 管理员检查中间件
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AppError::Unauthorized)?;

    if !user.is_admin() {
        security_log!("WARN", "admin_denied", user_id = user.id.clone());
        return Err(AppError::forbidden("Requires admin role"));
    }

    Ok(next.run(req).await)
}
