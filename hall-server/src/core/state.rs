use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::JwtService;
use crate::booking::BookingEngine;
use crate::core::Config;
use crate::core::error::{Result, ServerError};
use crate::db::DbService;
use crate::db::repository::{
    BookingRepository, CommissionRepository, HallRepository, UserRepository,
};
use crate::services::StorageService;
use crate::settlement::SettlementEngine;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc/克隆句柄实现浅拷贝，所有权成本极低。
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | db | 嵌入式数据库 |
/// | jwt_service | JWT 认证服务 |
/// | storage | 上传文件存储 |
/// | users/halls/bookings/commissions | 各表仓储 |
/// | booking_engine | 预订生命周期引擎 |
/// | settlement_engine | 佣金结算引擎 |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: Surreal<Db>,
    pub jwt_service: Arc<JwtService>,
    pub storage: StorageService,
    pub users: UserRepository,
    pub halls: HallRepository,
    pub bookings: BookingRepository,
    pub commissions: CommissionRepository,
    pub booking_engine: BookingEngine,
    pub settlement_engine: SettlementEngine,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：数据目录 → 数据库 (含索引) → 仓储/引擎 → 管理员播种
    pub async fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)
            .map_err(|e| ServerError::Config(format!("Failed to create data dir: {e}")))?;

        let db_service = DbService::new(&config.database_path()).await?;
        let db = db_service.db;

        let users = UserRepository::new(db.clone());
        let halls = HallRepository::new(db.clone());
        let bookings = BookingRepository::new(db.clone());
        let commissions = CommissionRepository::new(db.clone());

        let settlement_engine = SettlementEngine::new(
            commissions.clone(),
            bookings.clone(),
            halls.clone(),
            users.clone(),
        );
        let booking_engine = BookingEngine::new(
            bookings.clone(),
            halls.clone(),
            settlement_engine.clone(),
        );

        let storage = StorageService::new(&config.upload_dir)
            .map_err(|e| ServerError::Config(format!("Failed to init upload storage: {e}")))?;

        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        crate::db::seed_admin(
            &users,
            &config.admin_name,
            &config.admin_email,
            &config.admin_password,
        )
        .await?;

        Ok(Self {
            config: config.clone(),
            db,
            jwt_service,
            storage,
            users,
            halls,
            bookings,
            commissions,
            booking_engine,
            settlement_engine,
        })
    }

    /// 获取数据库实例
    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}
