//! 认证接口模块
//!
//! `/register` 和 `/login` 为公开路由 (见 `auth::middleware::is_public_route`)，
//! `/me` 需要有效令牌。

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/auth", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/register", post(handler::register))
        .route("/login", post(handler::login))
        .route("/me", get(handler::me))
}
