//! 维修单元登记

use crate::WorkflowError;
use domain::{MaintenanceUnit, UnitKind};
use sigma_storage::{SigmaStore, StorageError, UnitFilter};
use std::sync::Arc;
use tracing::info;

/// 维修单元登记服务。对外以单元编号定位单元。
pub struct RollingStockRegistry {
    store: Arc<dyn SigmaStore>,
}

impl RollingStockRegistry {
    pub fn new(store: Arc<dyn SigmaStore>) -> Self {
        Self { store }
    }

    /// 登记新单元。编号全局唯一；品牌与车型/类别必须存在且互相匹配。
    pub async fn register_unit(
        &self,
        number: &str,
        kind: UnitKind,
    ) -> Result<MaintenanceUnit, WorkflowError> {
        let number = number.trim();
        if number.is_empty() {
            return Err(WorkflowError::Invalid("unit number is empty".to_string()));
        }
        if self.store.find_unit_by_number(number).await?.is_some() {
            return Err(WorkflowError::DuplicateUnitNumber(number.to_string()));
        }
        self.validate_kind(&kind).await?;

        let unit = MaintenanceUnit::new(number, kind);
        let unit = match self.store.create_unit(unit).await {
            Ok(unit) => unit,
            Err(StorageError::Conflict(_)) => {
                return Err(WorkflowError::DuplicateUnitNumber(number.to_string()));
            }
            Err(err) => return Err(err.into()),
        };
        info!(unit = %unit.number, unit_type = unit.unit_type().as_str(), "unit registered");
        Ok(unit)
    }

    async fn validate_kind(&self, kind: &UnitKind) -> Result<(), WorkflowError> {
        let brand_id = kind.brand_id();
        if self.store.find_brand(brand_id).await?.is_none() {
            return Err(WorkflowError::Invalid(format!("brand {brand_id} not found")));
        }
        match kind {
            UnitKind::Locomotive { model_id, .. } => {
                let models = self.store.list_locomotive_models(Some(brand_id)).await?;
                if !models.iter().any(|model| model.id == *model_id) {
                    return Err(WorkflowError::Invalid(format!(
                        "locomotive model {model_id} does not belong to brand {brand_id}"
                    )));
                }
            }
            UnitKind::Railcar { class_id, .. } => {
                let classes = self.store.list_railcar_classes(Some(brand_id)).await?;
                if !classes.iter().any(|class| class.id == *class_id) {
                    return Err(WorkflowError::Invalid(format!(
                        "railcar class {class_id} does not belong to brand {brand_id}"
                    )));
                }
            }
            UnitKind::Motorcoach {
                configuration,
                car_count,
                ..
            } => {
                if configuration.trim().is_empty() {
                    return Err(WorkflowError::Invalid(
                        "motorcoach configuration is empty".to_string(),
                    ));
                }
                if *car_count == 0 {
                    return Err(WorkflowError::Invalid(
                        "motorcoach car count must be positive".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    pub async fn find_unit(&self, number: &str) -> Result<Option<MaintenanceUnit>, WorkflowError> {
        Ok(self.store.find_unit_by_number(number.trim()).await?)
    }

    pub async fn list_units(
        &self,
        filter: UnitFilter,
    ) -> Result<Vec<MaintenanceUnit>, WorkflowError> {
        Ok(self.store.list_units(filter).await?)
    }

    /// 设置启用标志，无审计记录。
    pub async fn set_active(
        &self,
        number: &str,
        is_active: bool,
    ) -> Result<MaintenanceUnit, WorkflowError> {
        let unit = self.require_unit(number).await?;
        let unit = self
            .store
            .set_unit_active(unit.id, is_active)
            .await?
            .ok_or_else(|| WorkflowError::UnitNotFound(number.to_string()))?;
        info!(unit = %unit.number, is_active, "unit active flag changed");
        Ok(unit)
    }

    /// 删除单元及其类型扩展；仍被工单或事件引用时拒绝。
    pub async fn delete_unit(&self, number: &str) -> Result<(), WorkflowError> {
        let unit = self.require_unit(number).await?;
        match self.store.delete_unit(unit.id).await {
            Ok(true) => {
                info!(unit = %unit.number, "unit deleted");
                Ok(())
            }
            Ok(false) => Err(WorkflowError::UnitNotFound(number.to_string())),
            Err(StorageError::Referenced(_)) => {
                Err(WorkflowError::UnitReferenced(unit.number))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn require_unit(&self, number: &str) -> Result<MaintenanceUnit, WorkflowError> {
        self.store
            .find_unit_by_number(number.trim())
            .await?
            .ok_or_else(|| WorkflowError::UnitNotFound(number.to_string()))
    }
}
