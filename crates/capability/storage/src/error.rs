//! 存储层错误类型
//!
//! 统一封装底层错误：
//! - 唯一约束冲突（编号、编码重复）
//! - 删除被引用的实体
//! - 存储中的数据无法映射回领域类型
//! - SQL 执行 / 连接错误

use thiserror::Error;

/// Postgres 唯一约束冲突。
const UNIQUE_VIOLATION: &str = "23505";
/// Postgres 外键约束冲突。
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("still referenced: {0}")]
    Referenced(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid stored data: {0}")]
    Invalid(String),
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StorageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, StorageError::Conflict(_))
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            match db.code().as_deref() {
                Some(UNIQUE_VIOLATION) => return Self::Conflict(db.message().to_string()),
                Some(FOREIGN_KEY_VIOLATION) => return Self::Referenced(db.message().to_string()),
                _ => {}
            }
        }
        Self::Backend(err.to_string())
    }
}

impl From<domain::UnknownCode> for StorageError {
    fn from(err: domain::UnknownCode) -> Self {
        Self::Invalid(err.to_string())
    }
}
