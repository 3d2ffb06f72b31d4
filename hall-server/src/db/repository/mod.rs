//! Repository Module
//!
//! Provides CRUD operations and the booking/settlement queries for SurrealDB
//! tables. All SurrealQL lives here; engines and handlers never touch the
//! database directly.

// Accounts
pub mod user;

// Venues
pub mod hall;

// Booking lifecycle
pub mod booking;

// Commission settlement
pub mod commission;

// Re-exports
pub use booking::BookingRepository;
pub use commission::CommissionRepository;
pub use hall::HallRepository;
pub use user::UserRepository;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// ID Convention: 全栈统一使用 "table:id" 格式
// =============================================================================
//
// 使用 surrealdb::RecordId 处理所有 ID：
//   - 解析: let id: RecordId = "booking:abc".parse()?;
//   - 创建: let id = RecordId::from_table_key("booking", "abc");
//   - CRUD: db.select(id) / db.delete(id) 直接使用 RecordId

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}

// =============================================================================
// SurrealDB error classification
// =============================================================================
//
// 嵌入式引擎不暴露结构化错误码，只能按错误文本分类：
//   - 记录主键冲突:  "... already exists"
//   - 唯一索引冲突:  "... already contains ..."
//   - 乐观事务冲突:  "... read or write conflict ..." (可重试)

/// Duplicate record id (CREATE on an existing deterministic id)
pub(crate) fn is_record_exists(err: &RepoError) -> bool {
    matches!(err, RepoError::Database(msg) if msg.contains("already exists"))
}

/// Unique index violation
pub(crate) fn is_index_conflict(err: &RepoError) -> bool {
    matches!(err, RepoError::Database(msg) if msg.contains("already contains"))
}

/// Optimistic transaction conflict; the transaction can be retried
pub(crate) fn is_txn_conflict(err: &RepoError) -> bool {
    matches!(err, RepoError::Database(msg) if msg.contains("read or write conflict"))
}

/// Bounded retries for optimistic transaction conflicts
pub(crate) const TXN_RETRIES: usize = 3;
