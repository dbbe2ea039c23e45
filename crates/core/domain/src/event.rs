//! 历史维修事件（Novedad）
//!
//! 事件来自遗留数据库，引用的单元、干预类型、地点可能无法匹配到规范化实体，
//! 此时保留原始遗留编码，而不是创建新的参考数据。

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 指向规范化实体或保留遗留编码的引用。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "ref", content = "value", rename_all = "snake_case")]
pub enum LegacyRef<L> {
    Resolved(Uuid),
    Legacy(L),
    Absent,
}

impl<L> LegacyRef<L> {
    pub fn resolved(&self) -> Option<Uuid> {
        match self {
            LegacyRef::Resolved(id) => Some(*id),
            _ => None,
        }
    }

    pub fn legacy(&self) -> Option<&L> {
        match self {
            LegacyRef::Legacy(code) => Some(code),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, LegacyRef::Resolved(_))
    }
}

impl<L> Default for LegacyRef<L> {
    fn default() -> Self {
        LegacyRef::Absent
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceEvent {
    pub id: Uuid,
    pub unit: LegacyRef<String>,
    pub date_from: NaiveDate,
    pub date_to: Option<NaiveDate>,
    pub estimated_date: Option<NaiveDate>,
    pub intervention: LegacyRef<String>,
    pub location: LegacyRef<i32>,
    pub observations: Option<String>,
    /// 来自遗留导入。
    pub is_legacy: bool,
}

impl MaintenanceEvent {
    pub fn new(unit: LegacyRef<String>, date_from: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            unit,
            date_from,
            date_to: None,
            estimated_date: None,
            intervention: LegacyRef::Absent,
            location: LegacyRef::Absent,
            observations: None,
            is_legacy: false,
        }
    }
}
