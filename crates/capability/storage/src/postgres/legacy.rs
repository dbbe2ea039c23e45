//! Postgres 遗留参考表（干预类型、地点）存储实现
//!
//! upsert 使用 `on conflict (code) do update`，
//! 通过 `xmax = 0` 区分插入与更新。

use super::{PgStore, parse_code, parse_optional_code};
use crate::error::StorageError;
use crate::models::UpsertOutcome;
use crate::traits::{InterventionTypeStore, LocationStore};
use domain::{InterventionType, Location};
use sqlx::Row;
use sqlx::postgres::PgRow;

const INTERVENTION_COLUMNS: &str = "id, code, description, class, is_active";
const LOCATION_COLUMNS: &str =
    "id, code, description, short_code, kind, revision, is_active";

fn intervention_from_row(row: &PgRow) -> Result<InterventionType, StorageError> {
    let class: String = row.try_get("class")?;
    Ok(InterventionType {
        id: row.try_get("id")?,
        code: row.try_get("code")?,
        description: row.try_get("description")?,
        class: parse_code(&class)?,
        is_active: row.try_get("is_active")?,
    })
}

fn location_from_row(row: &PgRow) -> Result<Location, StorageError> {
    Ok(Location {
        id: row.try_get("id")?,
        code: row.try_get("code")?,
        description: row.try_get("description")?,
        short_code: row.try_get("short_code")?,
        kind: parse_optional_code(row.try_get("kind")?),
        revision: parse_optional_code(row.try_get("revision")?),
        is_active: row.try_get("is_active")?,
    })
}

fn outcome_from_row(row: &PgRow) -> Result<UpsertOutcome, StorageError> {
    let inserted: bool = row.try_get("inserted")?;
    Ok(if inserted {
        UpsertOutcome::Created
    } else {
        UpsertOutcome::Updated
    })
}

#[async_trait::async_trait]
impl InterventionTypeStore for PgStore {
    async fn list_intervention_types(&self) -> Result<Vec<InterventionType>, StorageError> {
        let rows = sqlx::query(&format!(
            "select {INTERVENTION_COLUMNS} from intervention_types order by code"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(intervention_from_row).collect()
    }

    async fn find_intervention_type_by_code(
        &self,
        code: &str,
    ) -> Result<Option<InterventionType>, StorageError> {
        let row = sqlx::query(&format!(
            "select {INTERVENTION_COLUMNS} from intervention_types where code = $1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(intervention_from_row).transpose()
    }

    async fn upsert_intervention_type(
        &self,
        record: InterventionType,
    ) -> Result<(InterventionType, UpsertOutcome), StorageError> {
        let row = sqlx::query(&format!(
            "insert into intervention_types (id, code, description, class, is_active) \
             values ($1, $2, $3, $4, $5) \
             on conflict (code) do update set \
             description = excluded.description, \
             class = excluded.class \
             returning {INTERVENTION_COLUMNS}, (xmax = 0) as inserted"
        ))
        .bind(record.id)
        .bind(&record.code)
        .bind(&record.description)
        .bind(record.class.as_str())
        .bind(record.is_active)
        .fetch_one(&self.pool)
        .await?;
        Ok((intervention_from_row(&row)?, outcome_from_row(&row)?))
    }
}

#[async_trait::async_trait]
impl LocationStore for PgStore {
    async fn list_locations(&self) -> Result<Vec<Location>, StorageError> {
        let rows = sqlx::query(&format!("select {LOCATION_COLUMNS} from locations order by code"))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(location_from_row).collect()
    }

    async fn find_location_by_code(&self, code: i32) -> Result<Option<Location>, StorageError> {
        let row = sqlx::query(&format!(
            "select {LOCATION_COLUMNS} from locations where code = $1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(location_from_row).transpose()
    }

    async fn upsert_location(
        &self,
        record: Location,
    ) -> Result<(Location, UpsertOutcome), StorageError> {
        let row = sqlx::query(&format!(
            "insert into locations \
             (id, code, description, short_code, kind, revision, is_active) \
             values ($1, $2, $3, $4, $5, $6, $7) \
             on conflict (code) do update set \
             description = excluded.description, \
             short_code = excluded.short_code, \
             kind = excluded.kind, \
             revision = excluded.revision \
             returning {LOCATION_COLUMNS}, (xmax = 0) as inserted"
        ))
        .bind(record.id)
        .bind(record.code)
        .bind(&record.description)
        .bind(&record.short_code)
        .bind(record.kind.map(|kind| kind.as_str()))
        .bind(record.revision.map(|revision| revision.as_str()))
        .bind(record.is_active)
        .fetch_one(&self.pool)
        .await?;
        Ok((location_from_row(&row)?, outcome_from_row(&row)?))
    }
}
