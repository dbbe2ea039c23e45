//! 数据模型
//!
//! 实体本身定义在 `domain` crate，这里只放存储接口使用的辅助结构：
//! - 更新输入：TicketUpdate
//! - 查询过滤：UnitFilter, TicketFilter
//! - 结果：UpsertOutcome, TicketCounts

use chrono::{NaiveDate, NaiveTime};
use domain::{EntryType, Ticket, TicketStatus, UnitType};
use serde::Serialize;
use uuid::Uuid;

/// 按自然键写入时的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// 维修单元列表过滤。
#[derive(Debug, Clone, Default)]
pub struct UnitFilter {
    pub unit_type: Option<UnitType>,
    pub active_only: bool,
}

impl UnitFilter {
    pub fn matches(&self, unit_type: UnitType, is_active: bool) -> bool {
        if self.active_only && !is_active {
            return false;
        }
        self.unit_type.is_none_or(|wanted| wanted == unit_type)
    }
}

/// 工单列表过滤。日期区间两端均包含。
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    pub status: Option<TicketStatus>,
    pub entry_type: Option<EntryType>,
    pub gop_id: Option<Uuid>,
    pub unit_type: Option<UnitType>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

/// 按状态统计的工单数量。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TicketCounts {
    pub pending: u64,
    pub completed: u64,
}

impl TicketCounts {
    pub fn total(&self) -> u64 {
        self.pending + self.completed
    }
}

/// 工单更新（不含状态；状态只能通过完成操作改变）。
///
/// 可空字段为两层 `Option`：外层 `None` 不修改，`Some(None)` 清空，`Some(Some(v))` 写入。
#[derive(Debug, Clone, Default)]
pub struct TicketUpdate {
    pub date: Option<NaiveDate>,
    pub unit_id: Option<Uuid>,
    pub gop_id: Option<Uuid>,
    pub entry_type: Option<EntryType>,
    pub failure_description: Option<String>,
    pub work_order: Option<Option<String>>,
    pub personnel_id: Option<Option<Uuid>>,
    pub train_number_id: Option<Option<Uuid>>,
    pub failure_type_id: Option<Option<Uuid>>,
    pub affected_system_id: Option<Option<Uuid>>,
    pub notified_at: Option<Option<NaiveTime>>,
    pub intervened_at: Option<Option<NaiveTime>>,
    pub delivered_at: Option<Option<NaiveTime>>,
    pub observations: Option<Option<String>>,
}

impl TicketUpdate {
    /// 将给出的字段写入工单。
    pub fn apply_to(self, ticket: &mut Ticket) {
        if let Some(date) = self.date {
            ticket.date = date;
        }
        if let Some(unit_id) = self.unit_id {
            ticket.unit_id = unit_id;
        }
        if let Some(gop_id) = self.gop_id {
            ticket.gop_id = gop_id;
        }
        if let Some(entry_type) = self.entry_type {
            ticket.entry_type = entry_type;
        }
        if let Some(failure_description) = self.failure_description {
            ticket.failure_description = failure_description;
        }
        if let Some(work_order) = self.work_order {
            ticket.work_order = work_order;
        }
        if let Some(personnel_id) = self.personnel_id {
            ticket.personnel_id = personnel_id;
        }
        if let Some(train_number_id) = self.train_number_id {
            ticket.train_number_id = train_number_id;
        }
        if let Some(failure_type_id) = self.failure_type_id {
            ticket.failure_type_id = failure_type_id;
        }
        if let Some(affected_system_id) = self.affected_system_id {
            ticket.affected_system_id = affected_system_id;
        }
        if let Some(notified_at) = self.notified_at {
            ticket.notified_at = notified_at;
        }
        if let Some(intervened_at) = self.intervened_at {
            ticket.intervened_at = intervened_at;
        }
        if let Some(delivered_at) = self.delivered_at {
            ticket.delivered_at = delivered_at;
        }
        if let Some(observations) = self.observations {
            ticket.observations = observations;
        }
    }
}
