//! Hall Server - 场馆预订与佣金结算服务
//!
//! # 架构概述
//!
//! 单体 HTTP 服务，嵌入式 SurrealDB 存储：
//!
//! - **预订引擎** (`booking`): 预订状态机、日期占位、服务端定价
//! - **结算引擎** (`settlement`): 5% 平台佣金、逾期清扫、补建对账
//! - **认证** (`auth`): JWT + Argon2 + 角色中间件
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! hall-server/src/
//! ├── core/          # 配置、状态、服务器、后台任务
//! ├── auth/          # JWT 认证、角色授权
//! ├── api/           # HTTP 路由和处理器
//! ├── booking/       # 预订生命周期引擎
//! ├── settlement/    # 佣金结算引擎 + 定时任务
//! ├── services/      # 应用装配、上传存储
//! ├── db/            # 模型与仓储
//! └── utils/         # 错误、金额、时间、校验
//! ```

pub mod api;
pub mod auth;
pub mod booking;
pub mod core;
pub mod db;
pub mod services;
pub mod settlement;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use booking::BookingEngine;
pub use core::{Config, Server, ServerState};
pub use settlement::SettlementEngine;
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 设置运行环境：加载 .env 并初始化日志
pub fn setup_environment() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    __  __      ____
   / / / /___ _/ / /
  / /_/ / __ `/ / /
 / __  / /_/ / / /
/_/ /_/\__,_/_/_/
    ____              __
   / __ )____  ____  / /__
  / __  / __ \/ __ \/ //_/
 / /_/ / /_/ / /_/ / ,<
/_____/\____/\____/_/|_|
    "#
    );
}
