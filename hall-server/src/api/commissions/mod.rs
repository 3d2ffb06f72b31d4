//! 佣金接口模块
//!
//! 经理上传凭证/查看自己的账单，管理员审核与总览。

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::{require_admin, require_role};
use crate::core::ServerState;
use crate::db::models::UserRole;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/commissions", routes())
}

fn routes() -> Router<ServerState> {
    let manager_routes = Router::new()
        .route("/upload-proof/{id}", post(handler::upload_proof))
        .route("/my-payments", get(handler::my_payments))
        .layer(middleware::from_fn(require_role(UserRole::Manager)));

    let admin_routes = Router::new()
        .route("/", get(handler::list))
        .route("/pending", get(handler::pending))
        .route("/verify/{id}", put(handler::verify))
        .route("/reject/{id}", put(handler::reject))
        .layer(middleware::from_fn(require_admin));

    manager_routes.merge(admin_routes)
}
