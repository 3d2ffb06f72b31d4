//! 服务模块
//!
//! - [`https`] - HTTP 应用装配 (路由 + 中间件栈)
//! - [`StorageService`] - 上传文件存储

pub mod https;
pub mod storage;

pub use storage::StorageService;
