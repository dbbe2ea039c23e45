//! 内存存储实现模块
//!
//! 用于测试与 dry-run 演示。所有聚合共享同一份状态，
//! 以便删除时检查跨表引用。
//!
//! 各接口实现按聚合拆分：
//! - reference.rs：品牌、车型/车厢类别、故障目录、GOP、人员、车次
//! - legacy.rs：干预类型、地点
//! - unit.rs：维修单元
//! - ticket.rs：工单
//! - event.rs：历史维修事件

mod event;
mod legacy;
mod reference;
mod ticket;
mod unit;

use crate::error::StorageError;
use domain::{
    AffectedSystem, Brand, FailureType, Gop, InterventionType, Location, LocomotiveModel,
    MaintenanceEvent, MaintenanceUnit, Personnel, RailcarClass, Ticket, TrainNumber,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

#[derive(Default)]
pub(crate) struct MemoryState {
    pub brands: HashMap<Uuid, Brand>,
    pub locomotive_models: HashMap<Uuid, LocomotiveModel>,
    pub railcar_classes: HashMap<Uuid, RailcarClass>,
    pub failure_types: HashMap<Uuid, FailureType>,
    pub affected_systems: HashMap<Uuid, AffectedSystem>,
    pub gops: HashMap<Uuid, Gop>,
    pub personnel: HashMap<Uuid, Personnel>,
    pub train_numbers: HashMap<Uuid, TrainNumber>,
    pub intervention_types: HashMap<Uuid, InterventionType>,
    pub locations: HashMap<Uuid, Location>,
    pub units: HashMap<Uuid, MaintenanceUnit>,
    pub tickets: HashMap<Uuid, Ticket>,
    pub events: Vec<MaintenanceEvent>,
}

/// 内存存储
///
/// 使用 RwLock 提供线程安全访问，并统计写操作次数。
#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<MemoryState>,
    writes: AtomicU64,
}

impl InMemoryStore {
    /// 创建空存储
    pub fn new() -> Self {
        Self::default()
    }

    /// 自创建以来执行过的写操作次数（含失败的写尝试）。
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    pub(crate) fn read(&self) -> Result<RwLockReadGuard<'_, MemoryState>, StorageError> {
        self.state
            .read()
            .map_err(|_| StorageError::new("lock failed"))
    }

    pub(crate) fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryState>, StorageError> {
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.state
            .write()
            .map_err(|_| StorageError::new("lock failed"))
    }
}

/// 按名称排序后返回，与 Postgres 实现的 `order by` 保持一致。
pub(crate) fn sorted_by<T, K: Ord>(mut items: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    items.sort_by_key(|item| key(item));
    items
}
