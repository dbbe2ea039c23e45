//! Postgres 维修单元存储实现
//!
//! `maintenance_units` 保存共享字段，`locomotives` / `railcars` / `motorcoaches`
//! 各保存一种类型扩展；读取时 left join 三张扩展表，按 `unit_type` 取对应列。

use super::{PgStore, parse_code};
use crate::error::StorageError;
use crate::models::UnitFilter;
use crate::traits::MaintenanceUnitStore;
use domain::{MaintenanceUnit, UnitKind, UnitType};
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

const UNIT_SELECT: &str = "select u.id, u.number, u.unit_type, u.is_active, \
     l.brand_id as locomotive_brand_id, l.model_id, \
     r.brand_id as railcar_brand_id, r.class_id, \
     m.brand_id as motorcoach_brand_id, m.configuration, m.car_count \
     from maintenance_units u \
     left join locomotives l on l.unit_id = u.id \
     left join railcars r on r.unit_id = u.id \
     left join motorcoaches m on m.unit_id = u.id";

fn missing_extension(number: &str, unit_type: UnitType) -> StorageError {
    StorageError::Invalid(format!(
        "unit {number} has no {} extension",
        unit_type.as_str()
    ))
}

fn unit_from_row(row: &PgRow) -> Result<MaintenanceUnit, StorageError> {
    let number: String = row.try_get("number")?;
    let unit_type: String = row.try_get("unit_type")?;
    let unit_type: UnitType = parse_code(&unit_type)?;
    let kind = match unit_type {
        UnitType::Locomotive => {
            let brand_id: Option<Uuid> = row.try_get("locomotive_brand_id")?;
            let model_id: Option<Uuid> = row.try_get("model_id")?;
            match (brand_id, model_id) {
                (Some(brand_id), Some(model_id)) => UnitKind::Locomotive { brand_id, model_id },
                _ => return Err(missing_extension(&number, unit_type)),
            }
        }
        UnitType::Railcar => {
            let brand_id: Option<Uuid> = row.try_get("railcar_brand_id")?;
            let class_id: Option<Uuid> = row.try_get("class_id")?;
            match (brand_id, class_id) {
                (Some(brand_id), Some(class_id)) => UnitKind::Railcar { brand_id, class_id },
                _ => return Err(missing_extension(&number, unit_type)),
            }
        }
        UnitType::Motorcoach => {
            let brand_id: Option<Uuid> = row.try_get("motorcoach_brand_id")?;
            let configuration: Option<String> = row.try_get("configuration")?;
            let car_count: Option<i32> = row.try_get("car_count")?;
            match (brand_id, configuration, car_count) {
                (Some(brand_id), Some(configuration), Some(car_count)) => UnitKind::Motorcoach {
                    brand_id,
                    configuration,
                    car_count: u16::try_from(car_count).map_err(|_| {
                        StorageError::Invalid(format!("unit {number} car count {car_count}"))
                    })?,
                },
                _ => return Err(missing_extension(&number, unit_type)),
            }
        }
    };
    Ok(MaintenanceUnit {
        id: row.try_get("id")?,
        number,
        is_active: row.try_get("is_active")?,
        kind,
    })
}

#[async_trait::async_trait]
impl MaintenanceUnitStore for PgStore {
    async fn list_units(&self, filter: UnitFilter) -> Result<Vec<MaintenanceUnit>, StorageError> {
        let rows = sqlx::query(&format!(
            "{UNIT_SELECT} \
             where ($1::text is null or u.unit_type = $1) and (not $2 or u.is_active) \
             order by u.number"
        ))
        .bind(filter.unit_type.map(|unit_type| unit_type.as_str()))
        .bind(filter.active_only)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(unit_from_row).collect()
    }

    async fn find_unit(&self, unit_id: Uuid) -> Result<Option<MaintenanceUnit>, StorageError> {
        let row = sqlx::query(&format!("{UNIT_SELECT} where u.id = $1"))
            .bind(unit_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(unit_from_row).transpose()
    }

    async fn find_unit_by_number(
        &self,
        number: &str,
    ) -> Result<Option<MaintenanceUnit>, StorageError> {
        let row = sqlx::query(&format!("{UNIT_SELECT} where u.number = $1"))
            .bind(number)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(unit_from_row).transpose()
    }

    async fn create_unit(&self, unit: MaintenanceUnit) -> Result<MaintenanceUnit, StorageError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "insert into maintenance_units (id, number, unit_type, is_active) \
             values ($1, $2, $3, $4)",
        )
        .bind(unit.id)
        .bind(&unit.number)
        .bind(unit.unit_type().as_str())
        .bind(unit.is_active)
        .execute(&mut *tx)
        .await?;
        match &unit.kind {
            UnitKind::Locomotive { brand_id, model_id } => {
                sqlx::query(
                    "insert into locomotives (unit_id, brand_id, model_id) values ($1, $2, $3)",
                )
                .bind(unit.id)
                .bind(brand_id)
                .bind(model_id)
                .execute(&mut *tx)
                .await?;
            }
            UnitKind::Railcar { brand_id, class_id } => {
                sqlx::query(
                    "insert into railcars (unit_id, brand_id, class_id) values ($1, $2, $3)",
                )
                .bind(unit.id)
                .bind(brand_id)
                .bind(class_id)
                .execute(&mut *tx)
                .await?;
            }
            UnitKind::Motorcoach {
                brand_id,
                configuration,
                car_count,
            } => {
                sqlx::query(
                    "insert into motorcoaches (unit_id, brand_id, configuration, car_count) \
                     values ($1, $2, $3, $4)",
                )
                .bind(unit.id)
                .bind(brand_id)
                .bind(configuration)
                .bind(i32::from(*car_count))
                .execute(&mut *tx)
                .await?;
            }
        }
        tx.commit().await?;
        Ok(unit)
    }

    async fn set_unit_active(
        &self,
        unit_id: Uuid,
        is_active: bool,
    ) -> Result<Option<MaintenanceUnit>, StorageError> {
        let result = sqlx::query("update maintenance_units set is_active = $1 where id = $2")
            .bind(is_active)
            .bind(unit_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_unit(unit_id).await
    }

    async fn delete_unit(&self, unit_id: Uuid) -> Result<bool, StorageError> {
        let result = sqlx::query("delete from maintenance_units where id = $1")
            .bind(unit_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
