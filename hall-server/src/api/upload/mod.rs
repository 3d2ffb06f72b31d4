//! 文件上传接口模块
//!
//! 上传需要登录；按文件名读取为公开路由 (文件名是内容哈希，不可枚举)。

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/upload", post(handler::upload))
        .route("/api/upload/{filename}", get(handler::serve))
}
