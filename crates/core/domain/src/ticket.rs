//! 工单（Avería）
//!
//! 生命周期：创建时为 `pendiente`，通过 [`Ticket::complete`] 单向转为 `finalizado`。

use crate::UnknownCode;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 工单状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TicketStatus {
    #[default]
    #[serde(rename = "pendiente")]
    Pending,
    #[serde(rename = "finalizado")]
    Completed,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Pending => "pendiente",
            TicketStatus::Completed => "finalizado",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = UnknownCode;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pendiente" => Ok(TicketStatus::Pending),
            "finalizado" => Ok(TicketStatus::Completed),
            other => Err(UnknownCode::new("ticket status", other)),
        }
    }
}

/// 入库类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryType {
    #[serde(rename = "inmediato")]
    Immediate,
    #[serde(rename = "programado")]
    Scheduled,
    #[serde(rename = "no")]
    NoEntry,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Immediate => "inmediato",
            EntryType::Scheduled => "programado",
            EntryType::NoEntry => "no",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryType {
    type Err = UnknownCode;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "inmediato" => Ok(EntryType::Immediate),
            "programado" => Ok(EntryType::Scheduled),
            "no" => Ok(EntryType::NoEntry),
            other => Err(UnknownCode::new("entry type", other)),
        }
    }
}

/// 工单编号 `<年份>-<4 位序号>`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TicketNumber {
    pub year: i32,
    pub sequence: u32,
}

impl TicketNumber {
    pub fn new(year: i32, sequence: u32) -> Self {
        Self { year, sequence }
    }

    /// 解析 `YYYY-NNNN`；格式不符时返回 `None`（手工录入的编号不参与序号计算）。
    pub fn parse(value: &str) -> Option<Self> {
        let (year, sequence) = value.split_once('-')?;
        if year.len() != 4 || sequence.is_empty() {
            return None;
        }
        let all_digits = |text: &str| text.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(year) || !all_digits(sequence) {
            return None;
        }
        Some(Self {
            year: year.parse().ok()?,
            sequence: sequence.parse().ok()?,
        })
    }

    /// 给定年份已有编号，返回下一个编号：该年份最大序号 + 1，无记录时为 1。
    ///
    /// 最大序号已到 `u32::MAX` 时返回 `None`。
    pub fn next_for_year<'a, I>(year: i32, existing: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let max = existing
            .into_iter()
            .filter_map(Self::parse)
            .filter(|number| number.year == year)
            .map(|number| number.sequence)
            .max()
            .unwrap_or(0);
        max.checked_add(1).map(|sequence| Self::new(year, sequence))
    }

    /// 当年编号的公共前缀，如 `2025-`。
    pub fn year_prefix(year: i32) -> String {
        format!("{year}-")
    }
}

impl fmt::Display for TicketNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:04}", self.year, self.sequence)
    }
}

/// 创建工单时由调用方提供的字段。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketDraft {
    /// 为空时按当年序号自动生成。
    pub number: Option<String>,
    pub date: NaiveDate,
    pub unit_id: Uuid,
    pub gop_id: Uuid,
    pub entry_type: EntryType,
    pub failure_description: String,
    pub work_order: Option<String>,
    pub personnel_id: Option<Uuid>,
    pub train_number_id: Option<Uuid>,
    pub failure_type_id: Option<Uuid>,
    pub affected_system_id: Option<Uuid>,
    pub notified_at: Option<NaiveTime>,
    pub intervened_at: Option<NaiveTime>,
    pub delivered_at: Option<NaiveTime>,
    pub observations: Option<String>,
}

impl TicketDraft {
    pub fn new(
        date: NaiveDate,
        unit_id: Uuid,
        gop_id: Uuid,
        entry_type: EntryType,
        failure_description: impl Into<String>,
    ) -> Self {
        Self {
            number: None,
            date,
            unit_id,
            gop_id,
            entry_type,
            failure_description: failure_description.into(),
            work_order: None,
            personnel_id: None,
            train_number_id: None,
            failure_type_id: None,
            affected_system_id: None,
            notified_at: None,
            intervened_at: None,
            delivered_at: None,
            observations: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: Uuid,
    pub number: String,
    pub date: NaiveDate,
    pub unit_id: Uuid,
    pub gop_id: Uuid,
    pub entry_type: EntryType,
    pub status: TicketStatus,
    pub failure_description: String,
    pub work_order: Option<String>,
    /// 指派人员 / 主管。
    pub personnel_id: Option<Uuid>,
    pub train_number_id: Option<Uuid>,
    pub failure_type_id: Option<Uuid>,
    pub affected_system_id: Option<Uuid>,
    pub notified_at: Option<NaiveTime>,
    pub intervened_at: Option<NaiveTime>,
    pub delivered_at: Option<NaiveTime>,
    pub observations: Option<String>,
}

impl Ticket {
    /// 以给定编号实例化草稿，状态为待处理。
    pub fn from_draft(draft: TicketDraft, number: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            number,
            date: draft.date,
            unit_id: draft.unit_id,
            gop_id: draft.gop_id,
            entry_type: draft.entry_type,
            status: TicketStatus::Pending,
            failure_description: draft.failure_description,
            work_order: draft.work_order,
            personnel_id: draft.personnel_id,
            train_number_id: draft.train_number_id,
            failure_type_id: draft.failure_type_id,
            affected_system_id: draft.affected_system_id,
            notified_at: draft.notified_at,
            intervened_at: draft.intervened_at,
            delivered_at: draft.delivered_at,
            observations: draft.observations,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == TicketStatus::Pending
    }

    pub fn is_completed(&self) -> bool {
        self.status == TicketStatus::Completed
    }

    /// 待处理 → 已完成。已完成时不变并返回 `false`。
    pub fn complete(&mut self) -> bool {
        if self.is_pending() {
            self.status = TicketStatus::Completed;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TicketNumber;

    #[test]
    fn parse_rejects_free_form_numbers() {
        assert_eq!(TicketNumber::parse("2025-0012"), Some(TicketNumber::new(2025, 12)));
        assert_eq!(TicketNumber::parse("2025-12345"), Some(TicketNumber::new(2025, 12345)));
        assert_eq!(TicketNumber::parse("AV-0001"), None);
        assert_eq!(TicketNumber::parse("25-0001"), None);
        assert_eq!(TicketNumber::parse("2025-"), None);
        assert_eq!(TicketNumber::parse("2025-00a1"), None);
    }

    #[test]
    fn display_pads_to_four_digits() {
        assert_eq!(TicketNumber::new(2025, 7).to_string(), "2025-0007");
        assert_eq!(TicketNumber::new(2025, 10000).to_string(), "2025-10000");
    }
}
