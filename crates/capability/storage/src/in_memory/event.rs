//! 历史维修事件内存存储实现

use super::InMemoryStore;
use crate::error::StorageError;
use crate::traits::MaintenanceEventStore;
use domain::MaintenanceEvent;
use std::cmp::Reverse;
use uuid::Uuid;

#[async_trait::async_trait]
impl MaintenanceEventStore for InMemoryStore {
    async fn insert_events(&self, events: Vec<MaintenanceEvent>) -> Result<u64, StorageError> {
        let mut state = self.write()?;
        let count = events.len() as u64;
        state.events.extend(events);
        Ok(count)
    }

    async fn list_legacy_events(&self) -> Result<Vec<MaintenanceEvent>, StorageError> {
        let state = self.read()?;
        Ok(state
            .events
            .iter()
            .filter(|event| event.is_legacy)
            .cloned()
            .collect())
    }

    async fn list_events_for_unit(
        &self,
        unit_id: Uuid,
    ) -> Result<Vec<MaintenanceEvent>, StorageError> {
        let state = self.read()?;
        let mut items: Vec<MaintenanceEvent> = state
            .events
            .iter()
            .filter(|event| event.unit.resolved() == Some(unit_id))
            .cloned()
            .collect();
        items.sort_by_key(|event| Reverse(event.date_from));
        Ok(items)
    }

    async fn count_events(&self) -> Result<u64, StorageError> {
        Ok(self.read()?.events.len() as u64)
    }
}
