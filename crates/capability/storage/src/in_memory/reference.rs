//! 参考数据内存存储实现

use super::{InMemoryStore, sorted_by};
use crate::error::StorageError;
use crate::traits::{
    BrandStore, FailureCatalogStore, GopStore, PersonnelStore, RollingStockModelStore,
    TrainNumberStore,
};
use domain::{
    AffectedSystem, Brand, FailureType, Gop, LocomotiveModel, Personnel, RailcarClass, Sector,
    TrainNumber,
};
use uuid::Uuid;

#[async_trait::async_trait]
impl BrandStore for InMemoryStore {
    async fn list_brands(&self) -> Result<Vec<Brand>, StorageError> {
        let state = self.read()?;
        let items = state.brands.values().cloned().collect();
        Ok(sorted_by(items, |brand: &Brand| brand.name.clone()))
    }

    async fn find_brand(&self, brand_id: Uuid) -> Result<Option<Brand>, StorageError> {
        Ok(self.read()?.brands.get(&brand_id).cloned())
    }

    async fn find_brand_by_code(&self, code: &str) -> Result<Option<Brand>, StorageError> {
        let state = self.read()?;
        Ok(state.brands.values().find(|brand| brand.code == code).cloned())
    }

    async fn create_brand(&self, brand: Brand) -> Result<Brand, StorageError> {
        let mut state = self.write()?;
        if state.brands.values().any(|item| item.code == brand.code) {
            return Err(StorageError::Conflict(format!("brand code {}", brand.code)));
        }
        state.brands.insert(brand.id, brand.clone());
        Ok(brand)
    }

    async fn delete_brand(&self, brand_id: Uuid) -> Result<bool, StorageError> {
        let mut state = self.write()?;
        if !state.brands.contains_key(&brand_id) {
            return Ok(false);
        }
        let referenced = state
            .locomotive_models
            .values()
            .any(|model| model.brand_id == brand_id)
            || state
                .railcar_classes
                .values()
                .any(|class| class.brand_id == brand_id)
            || state
                .units
                .values()
                .any(|unit| unit.kind.brand_id() == brand_id);
        if referenced {
            return Err(StorageError::Referenced(format!("brand {brand_id}")));
        }
        Ok(state.brands.remove(&brand_id).is_some())
    }
}

#[async_trait::async_trait]
impl RollingStockModelStore for InMemoryStore {
    async fn list_locomotive_models(
        &self,
        brand_id: Option<Uuid>,
    ) -> Result<Vec<LocomotiveModel>, StorageError> {
        let state = self.read()?;
        let items = state
            .locomotive_models
            .values()
            .filter(|model| brand_id.is_none_or(|id| model.brand_id == id))
            .cloned()
            .collect();
        Ok(sorted_by(items, |model: &LocomotiveModel| model.name.clone()))
    }

    async fn find_locomotive_model_by_code(
        &self,
        code: &str,
    ) -> Result<Option<LocomotiveModel>, StorageError> {
        let state = self.read()?;
        Ok(state
            .locomotive_models
            .values()
            .find(|model| model.code == code)
            .cloned())
    }

    async fn create_locomotive_model(
        &self,
        model: LocomotiveModel,
    ) -> Result<LocomotiveModel, StorageError> {
        let mut state = self.write()?;
        if state
            .locomotive_models
            .values()
            .any(|item| item.code == model.code)
        {
            return Err(StorageError::Conflict(format!("locomotive model {}", model.code)));
        }
        state.locomotive_models.insert(model.id, model.clone());
        Ok(model)
    }

    async fn list_railcar_classes(
        &self,
        brand_id: Option<Uuid>,
    ) -> Result<Vec<RailcarClass>, StorageError> {
        let state = self.read()?;
        let items = state
            .railcar_classes
            .values()
            .filter(|class| brand_id.is_none_or(|id| class.brand_id == id))
            .cloned()
            .collect();
        Ok(sorted_by(items, |class: &RailcarClass| class.name.clone()))
    }

    async fn find_railcar_class_by_code(
        &self,
        code: &str,
    ) -> Result<Option<RailcarClass>, StorageError> {
        let state = self.read()?;
        Ok(state
            .railcar_classes
            .values()
            .find(|class| class.code == code)
            .cloned())
    }

    async fn create_railcar_class(
        &self,
        class: RailcarClass,
    ) -> Result<RailcarClass, StorageError> {
        let mut state = self.write()?;
        if state
            .railcar_classes
            .values()
            .any(|item| item.code == class.code)
        {
            return Err(StorageError::Conflict(format!("railcar class {}", class.code)));
        }
        state.railcar_classes.insert(class.id, class.clone());
        Ok(class)
    }
}

#[async_trait::async_trait]
impl FailureCatalogStore for InMemoryStore {
    async fn list_failure_types(&self) -> Result<Vec<FailureType>, StorageError> {
        let state = self.read()?;
        let items = state.failure_types.values().cloned().collect();
        Ok(sorted_by(items, |item: &FailureType| item.name.clone()))
    }

    async fn find_failure_type_by_code(
        &self,
        code: &str,
    ) -> Result<Option<FailureType>, StorageError> {
        let state = self.read()?;
        Ok(state
            .failure_types
            .values()
            .find(|item| item.code == code)
            .cloned())
    }

    async fn create_failure_type(
        &self,
        failure_type: FailureType,
    ) -> Result<FailureType, StorageError> {
        let mut state = self.write()?;
        if state
            .failure_types
            .values()
            .any(|item| item.code == failure_type.code)
        {
            return Err(StorageError::Conflict(format!(
                "failure type {}",
                failure_type.code
            )));
        }
        state
            .failure_types
            .insert(failure_type.id, failure_type.clone());
        Ok(failure_type)
    }

    async fn list_affected_systems(
        &self,
        failure_type_id: Option<Uuid>,
    ) -> Result<Vec<AffectedSystem>, StorageError> {
        let state = self.read()?;
        let items = state
            .affected_systems
            .values()
            .filter(|item| failure_type_id.is_none_or(|id| item.failure_type_id == id))
            .cloned()
            .collect();
        Ok(sorted_by(items, |item: &AffectedSystem| item.name.clone()))
    }

    async fn find_affected_system_by_code(
        &self,
        code: &str,
    ) -> Result<Option<AffectedSystem>, StorageError> {
        let state = self.read()?;
        Ok(state
            .affected_systems
            .values()
            .find(|item| item.code == code)
            .cloned())
    }

    async fn create_affected_system(
        &self,
        system: AffectedSystem,
    ) -> Result<AffectedSystem, StorageError> {
        let mut state = self.write()?;
        if state
            .affected_systems
            .values()
            .any(|item| item.code == system.code)
        {
            return Err(StorageError::Conflict(format!(
                "affected system {}",
                system.code
            )));
        }
        state.affected_systems.insert(system.id, system.clone());
        Ok(system)
    }
}

#[async_trait::async_trait]
impl GopStore for InMemoryStore {
    async fn list_gops(&self, active_only: bool) -> Result<Vec<Gop>, StorageError> {
        let state = self.read()?;
        let items = state
            .gops
            .values()
            .filter(|gop| !active_only || gop.is_active)
            .cloned()
            .collect();
        Ok(sorted_by(items, |gop: &Gop| gop.name.clone()))
    }

    async fn find_gop(&self, gop_id: Uuid) -> Result<Option<Gop>, StorageError> {
        Ok(self.read()?.gops.get(&gop_id).cloned())
    }

    async fn find_gop_by_code(&self, code: &str) -> Result<Option<Gop>, StorageError> {
        let state = self.read()?;
        Ok(state.gops.values().find(|gop| gop.code == code).cloned())
    }

    async fn create_gop(&self, gop: Gop) -> Result<Gop, StorageError> {
        let mut state = self.write()?;
        if state.gops.values().any(|item| item.code == gop.code) {
            return Err(StorageError::Conflict(format!("gop {}", gop.code)));
        }
        state.gops.insert(gop.id, gop.clone());
        Ok(gop)
    }

    async fn delete_gop(&self, gop_id: Uuid) -> Result<bool, StorageError> {
        let mut state = self.write()?;
        if state.tickets.values().any(|ticket| ticket.gop_id == gop_id) {
            return Err(StorageError::Referenced(format!("gop {gop_id}")));
        }
        Ok(state.gops.remove(&gop_id).is_some())
    }
}

#[async_trait::async_trait]
impl PersonnelStore for InMemoryStore {
    async fn list_personnel(
        &self,
        sector: Option<Sector>,
    ) -> Result<Vec<Personnel>, StorageError> {
        let state = self.read()?;
        let items = state
            .personnel
            .values()
            .filter(|person| sector.is_none_or(|wanted| person.sector == wanted))
            .cloned()
            .collect();
        Ok(sorted_by(items, |person: &Personnel| person.full_name.clone()))
    }

    async fn find_personnel(&self, personnel_id: Uuid) -> Result<Option<Personnel>, StorageError> {
        Ok(self.read()?.personnel.get(&personnel_id).cloned())
    }

    async fn find_personnel_by_employee(
        &self,
        employee_number: &str,
        sector: Sector,
    ) -> Result<Option<Personnel>, StorageError> {
        let state = self.read()?;
        Ok(state
            .personnel
            .values()
            .find(|person| person.employee_number == employee_number && person.sector == sector)
            .cloned())
    }

    async fn create_personnel(&self, personnel: Personnel) -> Result<Personnel, StorageError> {
        let mut state = self.write()?;
        if state.personnel.values().any(|item| {
            item.employee_number == personnel.employee_number && item.sector == personnel.sector
        }) {
            return Err(StorageError::Conflict(format!(
                "personnel {} ({})",
                personnel.employee_number,
                personnel.sector.as_str()
            )));
        }
        state.personnel.insert(personnel.id, personnel.clone());
        Ok(personnel)
    }
}

#[async_trait::async_trait]
impl TrainNumberStore for InMemoryStore {
    async fn list_train_numbers(&self) -> Result<Vec<TrainNumber>, StorageError> {
        let state = self.read()?;
        let items = state.train_numbers.values().cloned().collect();
        Ok(sorted_by(items, |train: &TrainNumber| train.number.clone()))
    }

    async fn find_train_number(
        &self,
        train_number_id: Uuid,
    ) -> Result<Option<TrainNumber>, StorageError> {
        Ok(self.read()?.train_numbers.get(&train_number_id).cloned())
    }

    async fn find_train_number_by_number(
        &self,
        number: &str,
    ) -> Result<Option<TrainNumber>, StorageError> {
        let state = self.read()?;
        Ok(state
            .train_numbers
            .values()
            .find(|train| train.number == number)
            .cloned())
    }

    async fn create_train_number(&self, train: TrainNumber) -> Result<TrainNumber, StorageError> {
        let mut state = self.write()?;
        if state
            .train_numbers
            .values()
            .any(|item| item.number == train.number)
        {
            return Err(StorageError::Conflict(format!("train number {}", train.number)));
        }
        state.train_numbers.insert(train.id, train.clone());
        Ok(train)
    }
}
