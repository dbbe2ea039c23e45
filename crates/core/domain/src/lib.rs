//! SIGMA-RS 领域模型。
//!
//! - [`reference`]：参考数据（品牌、车型、车厢类别、故障类型、GOP、人员、车次、地点、干预类型）
//! - [`rolling_stock`]：维修单元（机车 / 客车车厢 / 动车组）及其类型扩展
//! - [`ticket`]：工单（Avería）、状态、入库类型与工单编号
//! - [`event`]：历史维修事件（Novedad），允许保留未解析的遗留编码
//!
//! 所有实体以 `id` 作为身份标识；需要集合/映射时显式以 `id` 作为键，
//! 实体本身不实现基于值的相等性。

pub mod event;
pub mod reference;
pub mod rolling_stock;
pub mod ticket;

pub use event::{LegacyRef, MaintenanceEvent};
pub use reference::{
    AffectedSystem, Brand, FailureType, Gop, InterventionClass, InterventionType, Location,
    LocationKind, LocationRevision, LocomotiveModel, Personnel, RailcarClass, Sector, TrainNumber,
};
pub use rolling_stock::{MaintenanceUnit, UnitKind, UnitType};
pub use ticket::{EntryType, Ticket, TicketDraft, TicketNumber, TicketStatus};

/// 枚举值解析失败（未知编码）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCode {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownCode {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

impl std::fmt::Display for UnknownCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown {}: {:?}", self.kind, self.value)
    }
}

impl std::error::Error for UnknownCode {}
