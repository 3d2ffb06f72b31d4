//! 工具模块 - 通用工具函数和类型
//!
//! # 内容
//!
//! - [`AppError`] / [`AppResponse`] - 应用错误类型和响应结构
//! - [`AppResult`] - handler 层 Result 别名
//! - 日志、金额、时间、输入校验工具

pub mod error;
pub mod logger;
pub mod money;
pub mod result;
pub mod time;
pub mod validation;

pub use error::{AppError, AppResponse};
pub use error::{ok, ok_with_message};
pub use result::AppResult;
