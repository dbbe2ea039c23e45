//! Postgres 工单存储实现

use super::{PgStore, parse_code};
use crate::error::StorageError;
use crate::models::{TicketCounts, TicketFilter, TicketUpdate};
use crate::traits::TicketStore;
use domain::{Ticket, TicketStatus};
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

const TICKET_COLUMNS: &str = "t.id, t.number, t.date, t.unit_id, t.gop_id, t.entry_type, \
     t.status, t.failure_description, t.work_order, t.personnel_id, t.train_number_id, \
     t.failure_type_id, t.affected_system_id, t.notified_at, t.intervened_at, \
     t.delivered_at, t.observations";

fn ticket_from_row(row: &PgRow) -> Result<Ticket, StorageError> {
    let entry_type: String = row.try_get("entry_type")?;
    let status: String = row.try_get("status")?;
    Ok(Ticket {
        id: row.try_get("id")?,
        number: row.try_get("number")?,
        date: row.try_get("date")?,
        unit_id: row.try_get("unit_id")?,
        gop_id: row.try_get("gop_id")?,
        entry_type: parse_code(&entry_type)?,
        status: parse_code(&status)?,
        failure_description: row.try_get("failure_description")?,
        work_order: row.try_get("work_order")?,
        personnel_id: row.try_get("personnel_id")?,
        train_number_id: row.try_get("train_number_id")?,
        failure_type_id: row.try_get("failure_type_id")?,
        affected_system_id: row.try_get("affected_system_id")?,
        notified_at: row.try_get("notified_at")?,
        intervened_at: row.try_get("intervened_at")?,
        delivered_at: row.try_get("delivered_at")?,
        observations: row.try_get("observations")?,
    })
}

#[async_trait::async_trait]
impl TicketStore for PgStore {
    async fn list_tickets(&self, filter: TicketFilter) -> Result<Vec<Ticket>, StorageError> {
        let rows = sqlx::query(&format!(
            "select {TICKET_COLUMNS} from tickets t \
             join maintenance_units u on u.id = t.unit_id \
             where ($1::text is null or t.status = $1) \
             and ($2::text is null or t.entry_type = $2) \
             and ($3::uuid is null or t.gop_id = $3) \
             and ($4::text is null or u.unit_type = $4) \
             and ($5::date is null or t.date >= $5) \
             and ($6::date is null or t.date <= $6) \
             order by t.date desc, t.number desc"
        ))
        .bind(filter.status.map(|status| status.as_str()))
        .bind(filter.entry_type.map(|entry| entry.as_str()))
        .bind(filter.gop_id)
        .bind(filter.unit_type.map(|unit_type| unit_type.as_str()))
        .bind(filter.date_from)
        .bind(filter.date_to)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(ticket_from_row).collect()
    }

    async fn count_tickets_by_status(&self) -> Result<TicketCounts, StorageError> {
        let rows = sqlx::query("select status, count(*) as total from tickets group by status")
            .fetch_all(&self.pool)
            .await?;
        let mut counts = TicketCounts::default();
        for row in rows {
            let status: String = row.try_get("status")?;
            let total: i64 = row.try_get("total")?;
            let total = u64::try_from(total).unwrap_or_default();
            match parse_code::<TicketStatus>(&status)? {
                TicketStatus::Pending => counts.pending = total,
                TicketStatus::Completed => counts.completed = total,
            }
        }
        Ok(counts)
    }

    async fn find_ticket(&self, ticket_id: Uuid) -> Result<Option<Ticket>, StorageError> {
        let row = sqlx::query(&format!("select {TICKET_COLUMNS} from tickets t where t.id = $1"))
            .bind(ticket_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(ticket_from_row).transpose()
    }

    async fn find_ticket_by_number(&self, number: &str) -> Result<Option<Ticket>, StorageError> {
        let row = sqlx::query(&format!(
            "select {TICKET_COLUMNS} from tickets t where t.number = $1"
        ))
        .bind(number)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(ticket_from_row).transpose()
    }

    async fn list_ticket_numbers(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let rows = sqlx::query("select number from tickets where starts_with(number, $1)")
            .bind(prefix)
            .fetch_all(&self.pool)
            .await?;
        let mut numbers = Vec::with_capacity(rows.len());
        for row in rows {
            numbers.push(row.try_get("number")?);
        }
        Ok(numbers)
    }

    async fn create_ticket(&self, ticket: Ticket) -> Result<Ticket, StorageError> {
        sqlx::query(
            "insert into tickets (id, number, date, unit_id, gop_id, entry_type, status, \
             failure_description, work_order, personnel_id, train_number_id, failure_type_id, \
             affected_system_id, notified_at, intervened_at, delivered_at, observations) \
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)",
        )
        .bind(ticket.id)
        .bind(&ticket.number)
        .bind(ticket.date)
        .bind(ticket.unit_id)
        .bind(ticket.gop_id)
        .bind(ticket.entry_type.as_str())
        .bind(ticket.status.as_str())
        .bind(&ticket.failure_description)
        .bind(&ticket.work_order)
        .bind(ticket.personnel_id)
        .bind(ticket.train_number_id)
        .bind(ticket.failure_type_id)
        .bind(ticket.affected_system_id)
        .bind(ticket.notified_at)
        .bind(ticket.intervened_at)
        .bind(ticket.delivered_at)
        .bind(&ticket.observations)
        .execute(&self.pool)
        .await?;
        Ok(ticket)
    }

    async fn update_ticket(
        &self,
        ticket_id: Uuid,
        update: TicketUpdate,
    ) -> Result<Option<Ticket>, StorageError> {
        // 可空列按 (是否修改, 新值) 成对绑定，新值可为 null
        let row = sqlx::query(&format!(
            "update tickets t set \
             date = coalesce($1, t.date), \
             unit_id = coalesce($2, t.unit_id), \
             gop_id = coalesce($3, t.gop_id), \
             entry_type = coalesce($4, t.entry_type), \
             failure_description = coalesce($5, t.failure_description), \
             work_order = case when $6 then $7 else t.work_order end, \
             personnel_id = case when $8 then $9 else t.personnel_id end, \
             train_number_id = case when $10 then $11 else t.train_number_id end, \
             failure_type_id = case when $12 then $13 else t.failure_type_id end, \
             affected_system_id = case when $14 then $15 else t.affected_system_id end, \
             notified_at = case when $16 then $17 else t.notified_at end, \
             intervened_at = case when $18 then $19 else t.intervened_at end, \
             delivered_at = case when $20 then $21 else t.delivered_at end, \
             observations = case when $22 then $23 else t.observations end \
             where t.id = $24 \
             returning {TICKET_COLUMNS}"
        ))
        .bind(update.date)
        .bind(update.unit_id)
        .bind(update.gop_id)
        .bind(update.entry_type.map(|entry| entry.as_str()))
        .bind(update.failure_description)
        .bind(update.work_order.is_some())
        .bind(update.work_order.flatten())
        .bind(update.personnel_id.is_some())
        .bind(update.personnel_id.flatten())
        .bind(update.train_number_id.is_some())
        .bind(update.train_number_id.flatten())
        .bind(update.failure_type_id.is_some())
        .bind(update.failure_type_id.flatten())
        .bind(update.affected_system_id.is_some())
        .bind(update.affected_system_id.flatten())
        .bind(update.notified_at.is_some())
        .bind(update.notified_at.flatten())
        .bind(update.intervened_at.is_some())
        .bind(update.intervened_at.flatten())
        .bind(update.delivered_at.is_some())
        .bind(update.delivered_at.flatten())
        .bind(update.observations.is_some())
        .bind(update.observations.flatten())
        .bind(ticket_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(ticket_from_row).transpose()
    }

    async fn save_ticket_status(
        &self,
        ticket_id: Uuid,
        status: TicketStatus,
    ) -> Result<bool, StorageError> {
        let result = sqlx::query("update tickets set status = $1 where id = $2")
            .bind(status.as_str())
            .bind(ticket_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
