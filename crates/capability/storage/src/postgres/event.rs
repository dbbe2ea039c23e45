//! Postgres 历史维修事件存储实现
//!
//! 每个 `LegacyRef` 落在两列：解析成功时写外键列，否则写 `legacy_*` 列。
//! 批量写入按绑定参数上限拆成多条语句，在同一事务中提交。

use super::PgStore;
use crate::error::StorageError;
use crate::traits::MaintenanceEventStore;
use domain::{LegacyRef, MaintenanceEvent};
use sqlx::postgres::PgRow;
use sqlx::{Postgres, QueryBuilder, Row};
use uuid::Uuid;

const EVENT_COLUMNS: &str = "id, unit_id, legacy_unit_code, date_from, date_to, \
     estimated_date, intervention_id, legacy_intervention_code, location_id, \
     legacy_location_code, observations, is_legacy";

/// 每行事件绑定的参数个数。
const BINDS_PER_EVENT: usize = 12;
/// Postgres 单条语句的绑定参数上限。
const MAX_BIND_PARAMS: usize = 65_535;
const EVENTS_PER_STATEMENT: usize = MAX_BIND_PARAMS / BINDS_PER_EVENT;

/// 按单条语句可容纳的行数切分，保持原有顺序。
fn statement_chunks<T>(items: Vec<T>, per_statement: usize) -> Vec<Vec<T>> {
    let per_statement = per_statement.max(1);
    let mut chunks = Vec::with_capacity(items.len().div_ceil(per_statement));
    let mut items = items.into_iter().peekable();
    while items.peek().is_some() {
        chunks.push(items.by_ref().take(per_statement).collect());
    }
    chunks
}

fn legacy_ref<L>(resolved: Option<Uuid>, legacy: Option<L>) -> LegacyRef<L> {
    match (resolved, legacy) {
        (Some(id), _) => LegacyRef::Resolved(id),
        (None, Some(code)) => LegacyRef::Legacy(code),
        (None, None) => LegacyRef::Absent,
    }
}

fn event_from_row(row: &PgRow) -> Result<MaintenanceEvent, StorageError> {
    Ok(MaintenanceEvent {
        id: row.try_get("id")?,
        unit: legacy_ref(row.try_get("unit_id")?, row.try_get("legacy_unit_code")?),
        date_from: row.try_get("date_from")?,
        date_to: row.try_get("date_to")?,
        estimated_date: row.try_get("estimated_date")?,
        intervention: legacy_ref(
            row.try_get("intervention_id")?,
            row.try_get("legacy_intervention_code")?,
        ),
        location: legacy_ref(
            row.try_get("location_id")?,
            row.try_get("legacy_location_code")?,
        ),
        observations: row.try_get("observations")?,
        is_legacy: row.try_get("is_legacy")?,
    })
}

#[async_trait::async_trait]
impl MaintenanceEventStore for PgStore {
    async fn insert_events(&self, events: Vec<MaintenanceEvent>) -> Result<u64, StorageError> {
        if events.is_empty() {
            return Ok(0);
        }
        let mut tx = self.pool.begin().await?;
        let mut written = 0;
        for chunk in statement_chunks(events, EVENTS_PER_STATEMENT) {
            let mut builder: QueryBuilder<Postgres> =
                QueryBuilder::new(format!("insert into maintenance_events ({EVENT_COLUMNS}) "));
            builder.push_values(chunk, |mut row, event| {
                row.push_bind(event.id)
                    .push_bind(event.unit.resolved())
                    .push_bind(event.unit.legacy().cloned())
                    .push_bind(event.date_from)
                    .push_bind(event.date_to)
                    .push_bind(event.estimated_date)
                    .push_bind(event.intervention.resolved())
                    .push_bind(event.intervention.legacy().cloned())
                    .push_bind(event.location.resolved())
                    .push_bind(event.location.legacy().copied())
                    .push_bind(event.observations)
                    .push_bind(event.is_legacy);
            });
            written += builder.build().execute(&mut *tx).await?.rows_affected();
        }
        tx.commit().await?;
        Ok(written)
    }

    async fn list_legacy_events(&self) -> Result<Vec<MaintenanceEvent>, StorageError> {
        let rows = sqlx::query(&format!(
            "select {EVENT_COLUMNS} from maintenance_events where is_legacy"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(event_from_row).collect()
    }

    async fn list_events_for_unit(
        &self,
        unit_id: Uuid,
    ) -> Result<Vec<MaintenanceEvent>, StorageError> {
        let rows = sqlx::query(&format!(
            "select {EVENT_COLUMNS} from maintenance_events \
             where unit_id = $1 order by date_from desc"
        ))
        .bind(unit_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(event_from_row).collect()
    }

    async fn count_events(&self) -> Result<u64, StorageError> {
        let total: i64 = sqlx::query_scalar("select count(*) from maintenance_events")
            .fetch_one(&self.pool)
            .await?;
        Ok(u64::try_from(total).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statement_stays_under_bind_limit() {
        assert_eq!(EVENTS_PER_STATEMENT, 5461);
        assert!(EVENTS_PER_STATEMENT * BINDS_PER_EVENT <= MAX_BIND_PARAMS);
    }

    #[test]
    fn oversized_batch_splits_in_order() {
        let chunks = statement_chunks((0..12_000).collect::<Vec<u32>>(), EVENTS_PER_STATEMENT);
        let sizes: Vec<usize> = chunks.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![5461, 5461, 1078]);
        assert_eq!(chunks[1][0], 5461);
        assert_eq!(chunks[2].last(), Some(&11_999));
        assert!(statement_chunks(Vec::<u32>::new(), EVENTS_PER_STATEMENT).is_empty());
    }
}
