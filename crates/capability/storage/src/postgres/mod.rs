//! # PostgreSQL 存储实现模块
//!
//! 所有存储接口的 PostgreSQL 实现，表结构见 `migrations/0001_init.sql`。
//!
//! ## 设计原则
//!
//! 1. **参数化查询**：所有 SQL 使用 `$1`, `$2` 参数绑定
//! 2. **约束在库内**：唯一键与外键由数据库保证，冲突经 `StorageError` 转换为
//!    `Conflict` / `Referenced`
//! 3. **类型扩展同事务写入**：维修单元与其扩展行在一个事务中插入，删除依赖
//!    `on delete cascade`
//!
//! ## 包含的实现
//!
//! - `reference.rs`：品牌、车型/车厢类别、故障目录、GOP、人员、车次
//! - `legacy.rs`：干预类型、地点（`on conflict ... do update` 实现 upsert）
//! - `unit.rs`：维修单元（left join 三张扩展表）
//! - `ticket.rs`：工单（可选过滤条件以 `$n is null or ...` 表达）
//! - `event.rs`：历史维修事件（`QueryBuilder::push_values` 批量插入）

mod event;
mod legacy;
mod reference;
mod ticket;
mod unit;

use crate::error::StorageError;
use sqlx::PgPool;
use std::str::FromStr;

pub struct PgStore {
    pub pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = crate::connection::connect_pool(database_url).await?;
        Ok(Self { pool })
    }
}

/// 解析以文本列保存的枚举值。
pub(crate) fn parse_code<T>(value: &str) -> Result<T, StorageError>
where
    T: FromStr<Err = domain::UnknownCode>,
{
    Ok(value.parse()?)
}

/// 解析可空文本列中的枚举值；库中出现未知值时按空处理。
pub(crate) fn parse_optional_code<T: FromStr>(value: Option<String>) -> Option<T> {
    value.and_then(|value| value.parse().ok())
}
