//! 预订接口模块
//!
//! 路由按角色分组：顾客创建/提交凭证/点菜，经理审核/状态流转，
//! 列表与详情由 handler 内部按身份裁剪。

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, patch, post, put},
};

use crate::auth::require_role;
use crate::core::ServerState;
use crate::db::models::UserRole;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/bookings", routes())
}

fn routes() -> Router<ServerState> {
    let customer_routes = Router::new()
        .route("/", post(handler::create))
        .route("/my", get(handler::my_bookings))
        .route("/{id}/payment-proof", put(handler::submit_payment_proof))
        .route("/{id}/custom-food", post(handler::add_custom_food))
        .layer(middleware::from_fn(require_role(UserRole::Customer)));

    let manager_routes = Router::new()
        .route("/manager", get(handler::manager_bookings))
        .route("/{id}/status", put(handler::update_status))
        .route("/{id}/verify-payment", put(handler::verify_payment))
        .route("/{id}/reject-payment", put(handler::reject_payment))
        .route("/{id}/custom-food-status", patch(handler::set_custom_food_status))
        .route("/{id}", delete(handler::delete))
        .layer(middleware::from_fn(require_role(UserRole::Manager)));

    let shared_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id));

    customer_routes.merge(manager_routes).merge(shared_routes)
}
