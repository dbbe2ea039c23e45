//! 遗留参考表（干预类型、地点）内存存储实现

use super::{InMemoryStore, sorted_by};
use crate::error::StorageError;
use crate::models::UpsertOutcome;
use crate::traits::{InterventionTypeStore, LocationStore};
use domain::{InterventionType, Location};

#[async_trait::async_trait]
impl InterventionTypeStore for InMemoryStore {
    async fn list_intervention_types(&self) -> Result<Vec<InterventionType>, StorageError> {
        let state = self.read()?;
        let items = state.intervention_types.values().cloned().collect();
        Ok(sorted_by(items, |item: &InterventionType| item.code.clone()))
    }

    async fn find_intervention_type_by_code(
        &self,
        code: &str,
    ) -> Result<Option<InterventionType>, StorageError> {
        let state = self.read()?;
        Ok(state
            .intervention_types
            .values()
            .find(|item| item.code == code)
            .cloned())
    }

    async fn upsert_intervention_type(
        &self,
        record: InterventionType,
    ) -> Result<(InterventionType, UpsertOutcome), StorageError> {
        let mut state = self.write()?;
        if let Some(existing) = state
            .intervention_types
            .values_mut()
            .find(|item| item.code == record.code)
        {
            existing.description = record.description;
            existing.class = record.class;
            return Ok((existing.clone(), UpsertOutcome::Updated));
        }
        state.intervention_types.insert(record.id, record.clone());
        Ok((record, UpsertOutcome::Created))
    }
}

#[async_trait::async_trait]
impl LocationStore for InMemoryStore {
    async fn list_locations(&self) -> Result<Vec<Location>, StorageError> {
        let state = self.read()?;
        let items = state.locations.values().cloned().collect();
        Ok(sorted_by(items, |item: &Location| item.code))
    }

    async fn find_location_by_code(&self, code: i32) -> Result<Option<Location>, StorageError> {
        let state = self.read()?;
        Ok(state
            .locations
            .values()
            .find(|item| item.code == code)
            .cloned())
    }

    async fn upsert_location(
        &self,
        record: Location,
    ) -> Result<(Location, UpsertOutcome), StorageError> {
        let mut state = self.write()?;
        if let Some(existing) = state
            .locations
            .values_mut()
            .find(|item| item.code == record.code)
        {
            existing.description = record.description;
            existing.short_code = record.short_code;
            existing.kind = record.kind;
            existing.revision = record.revision;
            return Ok((existing.clone(), UpsertOutcome::Updated));
        }
        state.locations.insert(record.id, record.clone());
        Ok((record, UpsertOutcome::Created))
    }
}
