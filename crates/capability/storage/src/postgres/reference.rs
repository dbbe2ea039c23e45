//! Postgres 参考数据存储实现

use super::{PgStore, parse_code};
use crate::error::StorageError;
use crate::traits::{
    BrandStore, FailureCatalogStore, GopStore, PersonnelStore, RollingStockModelStore,
    TrainNumberStore,
};
use domain::{
    AffectedSystem, Brand, FailureType, Gop, LocomotiveModel, Personnel, RailcarClass, Sector,
    TrainNumber,
};
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

const BRAND_COLUMNS: &str = "id, name, code, full_name, is_active";
const LOCOMOTIVE_MODEL_COLUMNS: &str = "id, name, code, brand_id, description, is_active";
const RAILCAR_CLASS_COLUMNS: &str = "id, code, name, brand_id, description, is_active";
const FAILURE_TYPE_COLUMNS: &str = "id, name, code, description, is_active";
const AFFECTED_SYSTEM_COLUMNS: &str = "id, name, code, failure_type_id, description, is_active";
const GOP_COLUMNS: &str = "id, name, code, description, is_active";
const PERSONNEL_COLUMNS: &str =
    "id, employee_number, full_name, sector, tax_id, simaf_sector, is_active";
const TRAIN_NUMBER_COLUMNS: &str = "id, number, description, route, is_active";

fn brand_from_row(row: &PgRow) -> Result<Brand, StorageError> {
    Ok(Brand {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        code: row.try_get("code")?,
        full_name: row.try_get("full_name")?,
        is_active: row.try_get("is_active")?,
    })
}

fn locomotive_model_from_row(row: &PgRow) -> Result<LocomotiveModel, StorageError> {
    Ok(LocomotiveModel {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        code: row.try_get("code")?,
        brand_id: row.try_get("brand_id")?,
        description: row.try_get("description")?,
        is_active: row.try_get("is_active")?,
    })
}

fn railcar_class_from_row(row: &PgRow) -> Result<RailcarClass, StorageError> {
    Ok(RailcarClass {
        id: row.try_get("id")?,
        code: row.try_get("code")?,
        name: row.try_get("name")?,
        brand_id: row.try_get("brand_id")?,
        description: row.try_get("description")?,
        is_active: row.try_get("is_active")?,
    })
}

fn failure_type_from_row(row: &PgRow) -> Result<FailureType, StorageError> {
    Ok(FailureType {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        code: row.try_get("code")?,
        description: row.try_get("description")?,
        is_active: row.try_get("is_active")?,
    })
}

fn affected_system_from_row(row: &PgRow) -> Result<AffectedSystem, StorageError> {
    Ok(AffectedSystem {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        code: row.try_get("code")?,
        failure_type_id: row.try_get("failure_type_id")?,
        description: row.try_get("description")?,
        is_active: row.try_get("is_active")?,
    })
}

fn gop_from_row(row: &PgRow) -> Result<Gop, StorageError> {
    Ok(Gop {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        code: row.try_get("code")?,
        description: row.try_get("description")?,
        is_active: row.try_get("is_active")?,
    })
}

fn personnel_from_row(row: &PgRow) -> Result<Personnel, StorageError> {
    let sector: String = row.try_get("sector")?;
    Ok(Personnel {
        id: row.try_get("id")?,
        employee_number: row.try_get("employee_number")?,
        full_name: row.try_get("full_name")?,
        sector: parse_code(&sector)?,
        tax_id: row.try_get("tax_id")?,
        simaf_sector: row.try_get("simaf_sector")?,
        is_active: row.try_get("is_active")?,
    })
}

fn train_number_from_row(row: &PgRow) -> Result<TrainNumber, StorageError> {
    Ok(TrainNumber {
        id: row.try_get("id")?,
        number: row.try_get("number")?,
        description: row.try_get("description")?,
        route: row.try_get("route")?,
        is_active: row.try_get("is_active")?,
    })
}

#[async_trait::async_trait]
impl BrandStore for PgStore {
    async fn list_brands(&self) -> Result<Vec<Brand>, StorageError> {
        let rows = sqlx::query(&format!("select {BRAND_COLUMNS} from brands order by name"))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(brand_from_row).collect()
    }

    async fn find_brand(&self, brand_id: Uuid) -> Result<Option<Brand>, StorageError> {
        let row = sqlx::query(&format!("select {BRAND_COLUMNS} from brands where id = $1"))
            .bind(brand_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(brand_from_row).transpose()
    }

    async fn find_brand_by_code(&self, code: &str) -> Result<Option<Brand>, StorageError> {
        let row = sqlx::query(&format!("select {BRAND_COLUMNS} from brands where code = $1"))
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(brand_from_row).transpose()
    }

    async fn create_brand(&self, brand: Brand) -> Result<Brand, StorageError> {
        sqlx::query(
            "insert into brands (id, name, code, full_name, is_active) \
             values ($1, $2, $3, $4, $5)",
        )
        .bind(brand.id)
        .bind(&brand.name)
        .bind(&brand.code)
        .bind(&brand.full_name)
        .bind(brand.is_active)
        .execute(&self.pool)
        .await?;
        Ok(brand)
    }

    async fn delete_brand(&self, brand_id: Uuid) -> Result<bool, StorageError> {
        let result = sqlx::query("delete from brands where id = $1")
            .bind(brand_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait::async_trait]
impl RollingStockModelStore for PgStore {
    async fn list_locomotive_models(
        &self,
        brand_id: Option<Uuid>,
    ) -> Result<Vec<LocomotiveModel>, StorageError> {
        let rows = sqlx::query(&format!(
            "select {LOCOMOTIVE_MODEL_COLUMNS} from locomotive_models \
             where ($1::uuid is null or brand_id = $1) order by name"
        ))
        .bind(brand_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(locomotive_model_from_row).collect()
    }

    async fn find_locomotive_model_by_code(
        &self,
        code: &str,
    ) -> Result<Option<LocomotiveModel>, StorageError> {
        let row = sqlx::query(&format!(
            "select {LOCOMOTIVE_MODEL_COLUMNS} from locomotive_models where code = $1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(locomotive_model_from_row).transpose()
    }

    async fn create_locomotive_model(
        &self,
        model: LocomotiveModel,
    ) -> Result<LocomotiveModel, StorageError> {
        sqlx::query(
            "insert into locomotive_models (id, name, code, brand_id, description, is_active) \
             values ($1, $2, $3, $4, $5, $6)",
        )
        .bind(model.id)
        .bind(&model.name)
        .bind(&model.code)
        .bind(model.brand_id)
        .bind(&model.description)
        .bind(model.is_active)
        .execute(&self.pool)
        .await?;
        Ok(model)
    }

    async fn list_railcar_classes(
        &self,
        brand_id: Option<Uuid>,
    ) -> Result<Vec<RailcarClass>, StorageError> {
        let rows = sqlx::query(&format!(
            "select {RAILCAR_CLASS_COLUMNS} from railcar_classes \
             where ($1::uuid is null or brand_id = $1) order by name"
        ))
        .bind(brand_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(railcar_class_from_row).collect()
    }

    async fn find_railcar_class_by_code(
        &self,
        code: &str,
    ) -> Result<Option<RailcarClass>, StorageError> {
        let row = sqlx::query(&format!(
            "select {RAILCAR_CLASS_COLUMNS} from railcar_classes where code = $1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(railcar_class_from_row).transpose()
    }

    async fn create_railcar_class(
        &self,
        class: RailcarClass,
    ) -> Result<RailcarClass, StorageError> {
        sqlx::query(
            "insert into railcar_classes (id, code, name, brand_id, description, is_active) \
             values ($1, $2, $3, $4, $5, $6)",
        )
        .bind(class.id)
        .bind(&class.code)
        .bind(&class.name)
        .bind(class.brand_id)
        .bind(&class.description)
        .bind(class.is_active)
        .execute(&self.pool)
        .await?;
        Ok(class)
    }
}

#[async_trait::async_trait]
impl FailureCatalogStore for PgStore {
    async fn list_failure_types(&self) -> Result<Vec<FailureType>, StorageError> {
        let rows = sqlx::query(&format!(
            "select {FAILURE_TYPE_COLUMNS} from failure_types order by name"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(failure_type_from_row).collect()
    }

    async fn find_failure_type_by_code(
        &self,
        code: &str,
    ) -> Result<Option<FailureType>, StorageError> {
        let row = sqlx::query(&format!(
            "select {FAILURE_TYPE_COLUMNS} from failure_types where code = $1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(failure_type_from_row).transpose()
    }

    async fn create_failure_type(
        &self,
        failure_type: FailureType,
    ) -> Result<FailureType, StorageError> {
        sqlx::query(
            "insert into failure_types (id, name, code, description, is_active) \
             values ($1, $2, $3, $4, $5)",
        )
        .bind(failure_type.id)
        .bind(&failure_type.name)
        .bind(&failure_type.code)
        .bind(&failure_type.description)
        .bind(failure_type.is_active)
        .execute(&self.pool)
        .await?;
        Ok(failure_type)
    }

    async fn list_affected_systems(
        &self,
        failure_type_id: Option<Uuid>,
    ) -> Result<Vec<AffectedSystem>, StorageError> {
        let rows = sqlx::query(&format!(
            "select {AFFECTED_SYSTEM_COLUMNS} from affected_systems \
             where ($1::uuid is null or failure_type_id = $1) order by name"
        ))
        .bind(failure_type_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(affected_system_from_row).collect()
    }

    async fn find_affected_system_by_code(
        &self,
        code: &str,
    ) -> Result<Option<AffectedSystem>, StorageError> {
        let row = sqlx::query(&format!(
            "select {AFFECTED_SYSTEM_COLUMNS} from affected_systems where code = $1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(affected_system_from_row).transpose()
    }

    async fn create_affected_system(
        &self,
        system: AffectedSystem,
    ) -> Result<AffectedSystem, StorageError> {
        sqlx::query(
            "insert into affected_systems \
             (id, name, code, failure_type_id, description, is_active) \
             values ($1, $2, $3, $4, $5, $6)",
        )
        .bind(system.id)
        .bind(&system.name)
        .bind(&system.code)
        .bind(system.failure_type_id)
        .bind(&system.description)
        .bind(system.is_active)
        .execute(&self.pool)
        .await?;
        Ok(system)
    }
}

#[async_trait::async_trait]
impl GopStore for PgStore {
    async fn list_gops(&self, active_only: bool) -> Result<Vec<Gop>, StorageError> {
        let rows = sqlx::query(&format!(
            "select {GOP_COLUMNS} from gops where (not $1 or is_active) order by name"
        ))
        .bind(active_only)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(gop_from_row).collect()
    }

    async fn find_gop(&self, gop_id: Uuid) -> Result<Option<Gop>, StorageError> {
        let row = sqlx::query(&format!("select {GOP_COLUMNS} from gops where id = $1"))
            .bind(gop_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(gop_from_row).transpose()
    }

    async fn find_gop_by_code(&self, code: &str) -> Result<Option<Gop>, StorageError> {
        let row = sqlx::query(&format!("select {GOP_COLUMNS} from gops where code = $1"))
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(gop_from_row).transpose()
    }

    async fn create_gop(&self, gop: Gop) -> Result<Gop, StorageError> {
        sqlx::query(
            "insert into gops (id, name, code, description, is_active) \
             values ($1, $2, $3, $4, $5)",
        )
        .bind(gop.id)
        .bind(&gop.name)
        .bind(&gop.code)
        .bind(&gop.description)
        .bind(gop.is_active)
        .execute(&self.pool)
        .await?;
        Ok(gop)
    }

    async fn delete_gop(&self, gop_id: Uuid) -> Result<bool, StorageError> {
        let result = sqlx::query("delete from gops where id = $1")
            .bind(gop_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait::async_trait]
impl PersonnelStore for PgStore {
    async fn list_personnel(
        &self,
        sector: Option<Sector>,
    ) -> Result<Vec<Personnel>, StorageError> {
        let rows = sqlx::query(&format!(
            "select {PERSONNEL_COLUMNS} from personnel \
             where ($1::text is null or sector = $1) order by full_name"
        ))
        .bind(sector.map(|sector| sector.as_str()))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(personnel_from_row).collect()
    }

    async fn find_personnel(&self, personnel_id: Uuid) -> Result<Option<Personnel>, StorageError> {
        let row = sqlx::query(&format!("select {PERSONNEL_COLUMNS} from personnel where id = $1"))
            .bind(personnel_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(personnel_from_row).transpose()
    }

    async fn find_personnel_by_employee(
        &self,
        employee_number: &str,
        sector: Sector,
    ) -> Result<Option<Personnel>, StorageError> {
        let row = sqlx::query(&format!(
            "select {PERSONNEL_COLUMNS} from personnel \
             where employee_number = $1 and sector = $2"
        ))
        .bind(employee_number)
        .bind(sector.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(personnel_from_row).transpose()
    }

    async fn create_personnel(&self, personnel: Personnel) -> Result<Personnel, StorageError> {
        sqlx::query(
            "insert into personnel \
             (id, employee_number, full_name, sector, tax_id, simaf_sector, is_active) \
             values ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(personnel.id)
        .bind(&personnel.employee_number)
        .bind(&personnel.full_name)
        .bind(personnel.sector.as_str())
        .bind(&personnel.tax_id)
        .bind(&personnel.simaf_sector)
        .bind(personnel.is_active)
        .execute(&self.pool)
        .await?;
        Ok(personnel)
    }
}

#[async_trait::async_trait]
impl TrainNumberStore for PgStore {
    async fn list_train_numbers(&self) -> Result<Vec<TrainNumber>, StorageError> {
        let rows = sqlx::query(&format!(
            "select {TRAIN_NUMBER_COLUMNS} from train_numbers order by number"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(train_number_from_row).collect()
    }

    async fn find_train_number(
        &self,
        train_number_id: Uuid,
    ) -> Result<Option<TrainNumber>, StorageError> {
        let row = sqlx::query(&format!(
            "select {TRAIN_NUMBER_COLUMNS} from train_numbers where id = $1"
        ))
        .bind(train_number_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(train_number_from_row).transpose()
    }

    async fn find_train_number_by_number(
        &self,
        number: &str,
    ) -> Result<Option<TrainNumber>, StorageError> {
        let row = sqlx::query(&format!(
            "select {TRAIN_NUMBER_COLUMNS} from train_numbers where number = $1"
        ))
        .bind(number)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(train_number_from_row).transpose()
    }

    async fn create_train_number(&self, train: TrainNumber) -> Result<TrainNumber, StorageError> {
        sqlx::query(
            "insert into train_numbers (id, number, description, route, is_active) \
             values ($1, $2, $3, $4, $5)",
        )
        .bind(train.id)
        .bind(&train.number)
        .bind(&train.description)
        .bind(&train.route)
        .bind(train.is_active)
        .execute(&self.pool)
        .await?;
        Ok(train)
    }
}
