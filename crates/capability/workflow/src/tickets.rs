//! 工单服务
//!
//! 编号规则：`<年份>-<4 位序号>`，取当年已有编号的最大序号加一。
//! 同一服务实例内，分配编号与写入在一把异步锁内完成；
//! 多进程并发时由存储层唯一约束兜底，返回 `StorageError::Conflict`。

use crate::WorkflowError;
use chrono::{Datelike, Local};
use domain::{Ticket, TicketDraft, TicketNumber, TicketStatus};
use sigma_storage::{SigmaStore, TicketCounts, TicketFilter, TicketUpdate};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

pub struct TicketService {
    store: Arc<dyn SigmaStore>,
    allocation: Mutex<()>,
}

impl TicketService {
    pub fn new(store: Arc<dyn SigmaStore>) -> Self {
        Self {
            store,
            allocation: Mutex::new(()),
        }
    }

    /// 指定年份的下一个工单编号（不占用）。
    pub async fn next_ticket_number(&self, year: i32) -> Result<TicketNumber, WorkflowError> {
        let numbers = self
            .store
            .list_ticket_numbers(&TicketNumber::year_prefix(year))
            .await?;
        TicketNumber::next_for_year(year, numbers.iter().map(String::as_str)).ok_or_else(|| {
            WorkflowError::Invalid(format!("ticket sequence exhausted for year {year}"))
        })
    }

    /// 创建工单，编号缺省时按本地当前年份生成。
    pub async fn create_ticket(&self, draft: TicketDraft) -> Result<Ticket, WorkflowError> {
        self.create_ticket_for_year(draft, Local::now().year()).await
    }

    /// 创建工单，编号缺省时按 `year` 生成。
    pub async fn create_ticket_for_year(
        &self,
        draft: TicketDraft,
        year: i32,
    ) -> Result<Ticket, WorkflowError> {
        if draft.failure_description.trim().is_empty() {
            return Err(WorkflowError::Invalid(
                "failure description is empty".to_string(),
            ));
        }
        self.require_active_unit(draft.unit_id).await?;
        self.require_active_gop(draft.gop_id).await?;
        self.check_optional_references(draft.personnel_id, draft.train_number_id)
            .await?;

        let _guard = self.allocation.lock().await;
        let number = match draft.number.as_deref().map(str::trim) {
            Some(number) if !number.is_empty() => number.to_string(),
            _ => self.next_ticket_number(year).await?.to_string(),
        };
        let ticket = self
            .store
            .create_ticket(Ticket::from_draft(draft, number))
            .await?;
        info!(ticket = %ticket.number, unit_id = %ticket.unit_id, "ticket created");
        Ok(ticket)
    }

    /// 待处理 → 已完成。
    pub async fn complete_ticket(&self, number: &str) -> Result<Ticket, WorkflowError> {
        let mut ticket = self.require_ticket(number).await?;
        if !ticket.complete() {
            return Err(WorkflowError::AlreadyCompleted(ticket.number));
        }
        if !self
            .store
            .save_ticket_status(ticket.id, TicketStatus::Completed)
            .await?
        {
            return Err(WorkflowError::TicketNotFound(number.to_string()));
        }
        info!(ticket = %ticket.number, "ticket completed");
        Ok(ticket)
    }

    /// 更新非状态字段；已完成的工单同样可编辑。
    pub async fn update_ticket(
        &self,
        number: &str,
        update: TicketUpdate,
    ) -> Result<Ticket, WorkflowError> {
        let ticket = self.require_ticket(number).await?;
        if let Some(unit_id) = update.unit_id {
            self.require_active_unit(unit_id).await?;
        }
        if let Some(gop_id) = update.gop_id {
            self.require_active_gop(gop_id).await?;
        }
        self.check_optional_references(
            update.personnel_id.flatten(),
            update.train_number_id.flatten(),
        )
        .await?;
        let ticket = self
            .store
            .update_ticket(ticket.id, update)
            .await?
            .ok_or_else(|| WorkflowError::TicketNotFound(number.to_string()))?;
        info!(ticket = %ticket.number, "ticket updated");
        Ok(ticket)
    }

    pub async fn find_ticket(&self, number: &str) -> Result<Option<Ticket>, WorkflowError> {
        Ok(self.store.find_ticket_by_number(number.trim()).await?)
    }

    pub async fn list_tickets(&self, filter: TicketFilter) -> Result<Vec<Ticket>, WorkflowError> {
        Ok(self.store.list_tickets(filter).await?)
    }

    pub async fn counts(&self) -> Result<TicketCounts, WorkflowError> {
        Ok(self.store.count_tickets_by_status().await?)
    }

    async fn require_ticket(&self, number: &str) -> Result<Ticket, WorkflowError> {
        self.store
            .find_ticket_by_number(number.trim())
            .await?
            .ok_or_else(|| WorkflowError::TicketNotFound(number.to_string()))
    }

    async fn require_active_unit(&self, unit_id: Uuid) -> Result<(), WorkflowError> {
        let unit = self
            .store
            .find_unit(unit_id)
            .await?
            .ok_or_else(|| WorkflowError::UnitNotFound(unit_id.to_string()))?;
        if !unit.is_active {
            return Err(WorkflowError::UnitInactive(unit.number));
        }
        Ok(())
    }

    async fn require_active_gop(&self, gop_id: Uuid) -> Result<(), WorkflowError> {
        let gop = self
            .store
            .find_gop(gop_id)
            .await?
            .ok_or_else(|| WorkflowError::GopNotFound(gop_id.to_string()))?;
        if !gop.is_active {
            return Err(WorkflowError::GopInactive(gop.code));
        }
        Ok(())
    }

    async fn check_optional_references(
        &self,
        personnel_id: Option<Uuid>,
        train_number_id: Option<Uuid>,
    ) -> Result<(), WorkflowError> {
        if let Some(personnel_id) = personnel_id {
            if self.store.find_personnel(personnel_id).await?.is_none() {
                return Err(WorkflowError::Invalid(format!(
                    "personnel {personnel_id} not found"
                )));
            }
        }
        if let Some(train_number_id) = train_number_id {
            if self.store.find_train_number(train_number_id).await?.is_none() {
                return Err(WorkflowError::Invalid(format!(
                    "train number {train_number_id} not found"
                )));
            }
        }
        Ok(())
    }
}
