//! 数据库连接管理
//!
//! - connect_pool：建立 Postgres 连接池（默认最大连接数 8）
//! - connect_pool_with：指定最大连接数
//! - apply_schema：执行随 crate 发布的建表脚本

use crate::error::StorageError;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// 默认最大连接数。
pub const DEFAULT_MAX_CONNECTIONS: u32 = 8;

/// 建表脚本（幂等，可重复执行）。
pub const SCHEMA_SQL: &str = include_str!("../migrations/0001_init.sql");

/// 建立 Postgres 连接池，最大连接数为 8。
pub async fn connect_pool(database_url: &str) -> Result<PgPool, StorageError> {
    connect_pool_with(database_url, DEFAULT_MAX_CONNECTIONS).await
}

/// 建立 Postgres 连接池。
///
/// # 参数
/// - `database_url`：Postgres 连接字符串
/// - `max_connections`：最大连接数（0 按 1 处理）
pub async fn connect_pool_with(
    database_url: &str,
    max_connections: u32,
) -> Result<PgPool, StorageError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// 执行 `migrations/0001_init.sql`。
pub async fn apply_schema(pool: &PgPool) -> Result<(), StorageError> {
    sqlx::raw_sql(SCHEMA_SQL).execute(pool).await?;
    Ok(())
}
