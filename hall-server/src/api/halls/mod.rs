//! 场馆接口模块
//!
//! 浏览为公开路由；创建/修改/删除要求经理角色 (管理员通行)。

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::auth::require_role;
use crate::core::ServerState;
use crate::db::models::UserRole;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/halls", routes())
}

fn routes() -> Router<ServerState> {
    let public_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id));

    let manager_routes = Router::new()
        .route("/manager", get(handler::my_halls))
        .route("/", post(handler::create))
        .route("/{id}", put(handler::update))
        .route("/{id}", delete(handler::delete))
        .layer(middleware::from_fn(require_role(UserRole::Manager)));

    public_routes.merge(manager_routes)
}
