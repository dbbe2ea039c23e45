//! 业务流程能力：车辆登记与工单流转。
//!
//! - [`RollingStockRegistry`]：按编号登记、查询、启停、删除维修单元
//! - [`TicketService`]：工单创建（含按年编号）、更新、完成、列表与统计

mod registry;
mod tickets;

pub use registry::RollingStockRegistry;
pub use tickets::TicketService;

use sigma_storage::StorageError;

/// 业务流程错误。
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("unit number already exists: {0}")]
    DuplicateUnitNumber(String),
    #[error("unit not found: {0}")]
    UnitNotFound(String),
    #[error("unit is inactive: {0}")]
    UnitInactive(String),
    #[error("unit is still referenced: {0}")]
    UnitReferenced(String),
    #[error("gop not found: {0}")]
    GopNotFound(String),
    #[error("gop is inactive: {0}")]
    GopInactive(String),
    #[error("ticket not found: {0}")]
    TicketNotFound(String),
    #[error("ticket already completed: {0}")]
    AlreadyCompleted(String),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
