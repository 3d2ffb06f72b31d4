//! 启动与运行期错误
//!
//! API 层的错误在 [`crate::utils::AppError`]；这里只覆盖服务器
//! 生命周期：绑定端口、打开数据库、播种账号。

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("数据库初始化失败: {0}")]
    Database(String),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("服务器绑定失败: {0}")]
    Bind(#[from] std::io::Error),

    #[error("内部错误: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<crate::utils::AppError> for ServerError {
    fn from(e: crate::utils::AppError) -> Self {
        ServerError::Database(e.to_string())
    }
}

/// 服务器生命周期的 Result 类型别名
pub type Result<T> = std::result::Result<T, ServerError>;
