use crate::auth::JwtConfig;

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | HTTP_HOST | 0.0.0.0 | 监听地址 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | DATA_DIR | ./data | 数据库目录 |
/// | UPLOAD_DIR | ./data/uploads | 上传文件目录 |
/// | ENVIRONMENT | development | 运行环境 |
/// | SWEEP_INTERVAL_SECS | 3600 | 结算定时任务间隔(秒) |
/// | SWEEP_ENABLED | true | 是否启用结算定时任务 |
/// | ADMIN_NAME / ADMIN_EMAIL / ADMIN_PASSWORD | — | 初始管理员 |
/// | LOG_LEVEL / LOG_DIR | info / — | 日志级别和滚动文件目录 |
#[derive(Debug, Clone)]
pub struct Config {
    /// 监听地址
    pub http_host: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 数据库目录
    pub data_dir: String,
    /// 上传文件目录
    pub upload_dir: String,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 结算定时任务 (佣金逾期清扫 + 缺失记录补建) 间隔
    pub sweep_interval_secs: u64,
    /// 是否启用结算定时任务
    pub sweep_enabled: bool,
    /// 初始管理员账号
    pub admin_name: String,
    pub admin_email: String,
    pub admin_password: String,
    /// 日志配置
    pub log_level: String,
    pub log_dir: Option<String>,
}

impl Config {
    /// 从环境变量加载配置，未设置的项使用默认值
    pub fn from_env() -> Self {
        Self {
            http_host: std::env::var("HTTP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".into()),
            upload_dir: std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "./data/uploads".into()),
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            sweep_interval_secs: std::env::var("SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3600),
            sweep_enabled: std::env::var("SWEEP_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            admin_name: std::env::var("ADMIN_NAME").unwrap_or_else(|_| "Administrator".into()),
            admin_email: std::env::var("ADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@hallbook.local".into()),
            admin_password: std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
        }
    }

    /// 数据库文件路径
    pub fn database_path(&self) -> String {
        format!("{}/hallbook.db", self.data_dir)
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
