//! 核心模块 - 配置、状态、服务器生命周期
//!
//! - [`Config`] - 环境变量配置
//! - [`ServerState`] - 共享状态 (数据库、仓储、引擎)
//! - [`Server`] - HTTP 服务器启动
//! - [`BackgroundTasks`] - 后台任务管理

pub mod config;
pub mod error;
pub mod server;
pub mod state;
pub mod tasks;

pub use config::Config;
pub use error::{Result, ServerError};
pub use server::Server;
pub use state::ServerState;
pub use tasks::{BackgroundTasks, TaskKind};
