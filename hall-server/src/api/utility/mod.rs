//! 管理员维护接口
//!
//! 对账与清扫本由定时任务驱动；这里提供手动触发入口。

mod handler;

use axum::{Router, middleware, routing::post};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/utility", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route(
            "/create-missing-commissions",
            post(handler::create_missing_commissions),
        )
        .route("/run-overdue-sweep", post(handler::run_overdue_sweep))
        .layer(middleware::from_fn(require_admin))
}
