//! 存储接口 Trait 定义
//!
//! 每个聚合一个异步接口：
//! - BrandStore：品牌
//! - RollingStockModelStore：机车车型、客车车厢类别
//! - FailureCatalogStore：故障类型、受影响系统
//! - GopStore / PersonnelStore / TrainNumberStore
//! - InterventionTypeStore / LocationStore：遗留参考表（按自然键 upsert）
//! - MaintenanceUnitStore：维修单元及其类型扩展
//! - TicketStore：工单
//! - MaintenanceEventStore：历史维修事件
//!
//! 约定：
//! - 查找返回 `Option`，删除返回 `bool`（不存在时为 `false`）
//! - 唯一键重复返回 `StorageError::Conflict`
//! - 删除仍被引用的实体返回 `StorageError::Referenced`

use crate::error::StorageError;
use crate::models::{TicketCounts, TicketFilter, TicketUpdate, UnitFilter, UpsertOutcome};
use async_trait::async_trait;
use domain::{
    AffectedSystem, Brand, FailureType, Gop, InterventionType, Location, LocomotiveModel,
    MaintenanceEvent, MaintenanceUnit, Personnel, RailcarClass, Sector, Ticket, TicketStatus,
    TrainNumber,
};
use uuid::Uuid;

/// 品牌存储接口
#[async_trait]
pub trait BrandStore: Send + Sync {
    async fn list_brands(&self) -> Result<Vec<Brand>, StorageError>;

    async fn find_brand(&self, brand_id: Uuid) -> Result<Option<Brand>, StorageError>;

    async fn find_brand_by_code(&self, code: &str) -> Result<Option<Brand>, StorageError>;

    async fn create_brand(&self, brand: Brand) -> Result<Brand, StorageError>;

    /// 车型、车厢类别或维修单元仍引用该品牌时拒绝删除。
    async fn delete_brand(&self, brand_id: Uuid) -> Result<bool, StorageError>;
}

/// 机车车型与客车车厢类别存储接口
#[async_trait]
pub trait RollingStockModelStore: Send + Sync {
    async fn list_locomotive_models(
        &self,
        brand_id: Option<Uuid>,
    ) -> Result<Vec<LocomotiveModel>, StorageError>;

    async fn find_locomotive_model_by_code(
        &self,
        code: &str,
    ) -> Result<Option<LocomotiveModel>, StorageError>;

    async fn create_locomotive_model(
        &self,
        model: LocomotiveModel,
    ) -> Result<LocomotiveModel, StorageError>;

    async fn list_railcar_classes(
        &self,
        brand_id: Option<Uuid>,
    ) -> Result<Vec<RailcarClass>, StorageError>;

    async fn find_railcar_class_by_code(
        &self,
        code: &str,
    ) -> Result<Option<RailcarClass>, StorageError>;

    async fn create_railcar_class(&self, class: RailcarClass)
    -> Result<RailcarClass, StorageError>;
}

/// 故障类型与受影响系统存储接口
#[async_trait]
pub trait FailureCatalogStore: Send + Sync {
    async fn list_failure_types(&self) -> Result<Vec<FailureType>, StorageError>;

    async fn find_failure_type_by_code(
        &self,
        code: &str,
    ) -> Result<Option<FailureType>, StorageError>;

    async fn create_failure_type(&self, failure_type: FailureType)
    -> Result<FailureType, StorageError>;

    async fn list_affected_systems(
        &self,
        failure_type_id: Option<Uuid>,
    ) -> Result<Vec<AffectedSystem>, StorageError>;

    async fn find_affected_system_by_code(
        &self,
        code: &str,
    ) -> Result<Option<AffectedSystem>, StorageError>;

    async fn create_affected_system(
        &self,
        system: AffectedSystem,
    ) -> Result<AffectedSystem, StorageError>;
}

/// 运营班组存储接口
#[async_trait]
pub trait GopStore: Send + Sync {
    async fn list_gops(&self, active_only: bool) -> Result<Vec<Gop>, StorageError>;

    async fn find_gop(&self, gop_id: Uuid) -> Result<Option<Gop>, StorageError>;

    async fn find_gop_by_code(&self, code: &str) -> Result<Option<Gop>, StorageError>;

    async fn create_gop(&self, gop: Gop) -> Result<Gop, StorageError>;

    /// 工单仍引用该班组时拒绝删除。
    async fn delete_gop(&self, gop_id: Uuid) -> Result<bool, StorageError>;
}

/// 人员存储接口
#[async_trait]
pub trait PersonnelStore: Send + Sync {
    async fn list_personnel(&self, sector: Option<Sector>)
    -> Result<Vec<Personnel>, StorageError>;

    async fn find_personnel(&self, personnel_id: Uuid) -> Result<Option<Personnel>, StorageError>;

    /// 按自然键 (employee_number, sector) 查找。
    async fn find_personnel_by_employee(
        &self,
        employee_number: &str,
        sector: Sector,
    ) -> Result<Option<Personnel>, StorageError>;

    async fn create_personnel(&self, personnel: Personnel) -> Result<Personnel, StorageError>;
}

/// 车次存储接口
#[async_trait]
pub trait TrainNumberStore: Send + Sync {
    async fn list_train_numbers(&self) -> Result<Vec<TrainNumber>, StorageError>;

    async fn find_train_number(
        &self,
        train_number_id: Uuid,
    ) -> Result<Option<TrainNumber>, StorageError>;

    async fn find_train_number_by_number(
        &self,
        number: &str,
    ) -> Result<Option<TrainNumber>, StorageError>;

    async fn create_train_number(&self, train: TrainNumber) -> Result<TrainNumber, StorageError>;
}

/// 干预类型存储接口（遗留表）
#[async_trait]
pub trait InterventionTypeStore: Send + Sync {
    async fn list_intervention_types(&self) -> Result<Vec<InterventionType>, StorageError>;

    async fn find_intervention_type_by_code(
        &self,
        code: &str,
    ) -> Result<Option<InterventionType>, StorageError>;

    /// 按 `code` upsert：已存在时更新描述与分类并保留原 id。
    async fn upsert_intervention_type(
        &self,
        record: InterventionType,
    ) -> Result<(InterventionType, UpsertOutcome), StorageError>;
}

/// 地点存储接口（遗留表）
#[async_trait]
pub trait LocationStore: Send + Sync {
    async fn list_locations(&self) -> Result<Vec<Location>, StorageError>;

    async fn find_location_by_code(&self, code: i32) -> Result<Option<Location>, StorageError>;

    /// 按数字 `code` upsert：已存在时更新其余字段并保留原 id。
    async fn upsert_location(
        &self,
        record: Location,
    ) -> Result<(Location, UpsertOutcome), StorageError>;
}

/// 维修单元存储接口
///
/// 单元与其类型扩展一起写入、一起删除。
#[async_trait]
pub trait MaintenanceUnitStore: Send + Sync {
    async fn list_units(&self, filter: UnitFilter) -> Result<Vec<MaintenanceUnit>, StorageError>;

    async fn find_unit(&self, unit_id: Uuid) -> Result<Option<MaintenanceUnit>, StorageError>;

    async fn find_unit_by_number(
        &self,
        number: &str,
    ) -> Result<Option<MaintenanceUnit>, StorageError>;

    /// 编号已存在时返回 `Conflict`。
    async fn create_unit(&self, unit: MaintenanceUnit) -> Result<MaintenanceUnit, StorageError>;

    async fn set_unit_active(
        &self,
        unit_id: Uuid,
        is_active: bool,
    ) -> Result<Option<MaintenanceUnit>, StorageError>;

    /// 工单或事件仍引用该单元时拒绝删除。
    async fn delete_unit(&self, unit_id: Uuid) -> Result<bool, StorageError>;
}

/// 工单存储接口
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// 按日期倒序、编号倒序返回。
    async fn list_tickets(&self, filter: TicketFilter) -> Result<Vec<Ticket>, StorageError>;

    async fn count_tickets_by_status(&self) -> Result<TicketCounts, StorageError>;

    async fn find_ticket(&self, ticket_id: Uuid) -> Result<Option<Ticket>, StorageError>;

    async fn find_ticket_by_number(&self, number: &str) -> Result<Option<Ticket>, StorageError>;

    /// 返回以 `prefix` 开头的所有工单编号。
    async fn list_ticket_numbers(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

    /// 编号已存在时返回 `Conflict`。
    async fn create_ticket(&self, ticket: Ticket) -> Result<Ticket, StorageError>;

    async fn update_ticket(
        &self,
        ticket_id: Uuid,
        update: TicketUpdate,
    ) -> Result<Option<Ticket>, StorageError>;

    async fn save_ticket_status(
        &self,
        ticket_id: Uuid,
        status: TicketStatus,
    ) -> Result<bool, StorageError>;
}

/// 历史维修事件存储接口
#[async_trait]
pub trait MaintenanceEventStore: Send + Sync {
    /// 批量写入，返回写入条数。
    async fn insert_events(&self, events: Vec<MaintenanceEvent>) -> Result<u64, StorageError>;

    /// 所有遗留导入的事件（用于去重键）。
    async fn list_legacy_events(&self) -> Result<Vec<MaintenanceEvent>, StorageError>;

    async fn list_events_for_unit(
        &self,
        unit_id: Uuid,
    ) -> Result<Vec<MaintenanceEvent>, StorageError>;

    async fn count_events(&self) -> Result<u64, StorageError>;
}

/// 全部存储接口的组合，便于以 `Arc<dyn SigmaStore>` 注入。
pub trait SigmaStore:
    BrandStore
    + RollingStockModelStore
    + FailureCatalogStore
    + GopStore
    + PersonnelStore
    + TrainNumberStore
    + InterventionTypeStore
    + LocationStore
    + MaintenanceUnitStore
    + TicketStore
    + MaintenanceEventStore
{
}

impl<T> SigmaStore for T where
    T: BrandStore
        + RollingStockModelStore
        + FailureCatalogStore
        + GopStore
        + PersonnelStore
        + TrainNumberStore
        + InterventionTypeStore
        + LocationStore
        + MaintenanceUnitStore
        + TicketStore
        + MaintenanceEventStore
{
}
