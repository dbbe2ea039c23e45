//! 维修单元内存存储实现
//!
//! 类型扩展保存在单元记录内，删除单元即删除扩展。

use super::{InMemoryStore, sorted_by};
use crate::error::StorageError;
use crate::models::UnitFilter;
use crate::traits::MaintenanceUnitStore;
use domain::MaintenanceUnit;
use uuid::Uuid;

#[async_trait::async_trait]
impl MaintenanceUnitStore for InMemoryStore {
    async fn list_units(&self, filter: UnitFilter) -> Result<Vec<MaintenanceUnit>, StorageError> {
        let state = self.read()?;
        let items = state
            .units
            .values()
            .filter(|unit| filter.matches(unit.unit_type(), unit.is_active))
            .cloned()
            .collect();
        Ok(sorted_by(items, |unit: &MaintenanceUnit| unit.number.clone()))
    }

    async fn find_unit(&self, unit_id: Uuid) -> Result<Option<MaintenanceUnit>, StorageError> {
        Ok(self.read()?.units.get(&unit_id).cloned())
    }

    async fn find_unit_by_number(
        &self,
        number: &str,
    ) -> Result<Option<MaintenanceUnit>, StorageError> {
        let state = self.read()?;
        Ok(state
            .units
            .values()
            .find(|unit| unit.number == number)
            .cloned())
    }

    async fn create_unit(&self, unit: MaintenanceUnit) -> Result<MaintenanceUnit, StorageError> {
        let mut state = self.write()?;
        if state.units.values().any(|item| item.number == unit.number) {
            return Err(StorageError::Conflict(format!("unit number {}", unit.number)));
        }
        state.units.insert(unit.id, unit.clone());
        Ok(unit)
    }

    async fn set_unit_active(
        &self,
        unit_id: Uuid,
        is_active: bool,
    ) -> Result<Option<MaintenanceUnit>, StorageError> {
        let mut state = self.write()?;
        let unit = match state.units.get_mut(&unit_id) {
            Some(unit) => unit,
            None => return Ok(None),
        };
        unit.is_active = is_active;
        Ok(Some(unit.clone()))
    }

    async fn delete_unit(&self, unit_id: Uuid) -> Result<bool, StorageError> {
        let mut state = self.write()?;
        let referenced = state.tickets.values().any(|ticket| ticket.unit_id == unit_id)
            || state
                .events
                .iter()
                .any(|event| event.unit.resolved() == Some(unit_id));
        if referenced {
            return Err(StorageError::Referenced(format!("unit {unit_id}")));
        }
        Ok(state.units.remove(&unit_id).is_some())
    }
}
