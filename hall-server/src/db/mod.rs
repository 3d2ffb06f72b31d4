//! Database Module
//!
//! 嵌入式 SurrealDB (RocksDB 引擎)。启动时定义索引并播种管理员账号。

pub mod models;
pub mod repository;

use crate::utils::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

use repository::UserRepository;

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the database at the given path and apply schema
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let db: Surreal<Db> = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        db.use_ns("hallbook")
            .use_db("venue")
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        define_schema(&db).await?;

        tracing::info!("Database ready at {} (SurrealDB embedded, RocksDB)", db_path);

        Ok(Self { db })
    }
}

/// Indexes the engines rely on.
///
/// - `user.email` unique — one account per email
/// - `commission_payment.booking` unique — exactly-once commission per
///   booking; the settlement engine's idempotent create depends on it
///
/// `date_claim` uniqueness needs no index: claim ids are deterministic
/// (`hall-key_yyyymmdd`), so a duplicate CREATE fails on the record id.
async fn define_schema(db: &Surreal<Db>) -> Result<(), AppError> {
    db.query(
        r#"
        DEFINE INDEX IF NOT EXISTS idx_user_email ON TABLE user COLUMNS email UNIQUE;
        DEFINE INDEX IF NOT EXISTS idx_commission_booking ON TABLE commission_payment COLUMNS booking UNIQUE;
        DEFINE INDEX IF NOT EXISTS idx_booking_hall ON TABLE booking COLUMNS hall;
        DEFINE INDEX IF NOT EXISTS idx_booking_customer ON TABLE booking COLUMNS customer;
        DEFINE INDEX IF NOT EXISTS idx_hall_manager ON TABLE hall COLUMNS manager;
        "#,
    )
    .await
    .map_err(|e| AppError::database(format!("Failed to define schema: {e}")))?
    .check()
    .map_err(|e| AppError::database(format!("Failed to define schema: {e}")))?;
    Ok(())
}

/// Seed the admin account on first startup.
///
/// Skipped when any admin already exists, so deleting and recreating the
/// seeded account does not resurrect the default credentials.
pub async fn seed_admin(
    users: &UserRepository,
    name: &str,
    email: &str,
    password: &str,
) -> Result<(), AppError> {
    use crate::db::models::{UserCreate, UserRole};

    let admins = users.count_by_role(UserRole::Admin).await?;
    if admins > 0 {
        return Ok(());
    }

    users
        .create(UserCreate {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            phone: None,
            role: Some(UserRole::Admin),
        })
        .await?;

    tracing::info!(email = %email, "Seeded initial admin account");
    Ok(())
}
