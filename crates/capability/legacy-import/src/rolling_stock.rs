//! 车辆导入：机车（Locomotoras）与客车车厢（Coches）
//!
//! 导入前先按目录确保品牌与车型 / 车厢类别存在（dry-run 时不创建，
//! 用占位 id 代替，使计数与真实执行一致）。编号已存在的单元跳过，从不更新。

use crate::ImportError;
use crate::catalog::{BrandSpec, RailcarSeries, RollingStockCatalog, railcar_class_code};
use crate::report::ImportReport;
use crate::source::{LegacyRecord, RowError};
use domain::{Brand, LocomotiveModel, MaintenanceUnit, RailcarClass, UnitKind};
use sigma_storage::{SigmaStore, StorageError};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};
use uuid::Uuid;

async fn ensure_brands(
    store: &dyn SigmaStore,
    specs: &[BrandSpec],
    dry_run: bool,
) -> Result<HashMap<String, Uuid>, ImportError> {
    let mut brands = HashMap::new();
    for spec in specs {
        let id = match store.find_brand_by_code(&spec.code).await? {
            Some(brand) => brand.id,
            None if dry_run => Uuid::new_v4(),
            None => {
                let brand = Brand::new(&spec.code, &spec.code).with_full_name(&spec.full_name);
                let brand = store.create_brand(brand).await?;
                info!(code = %brand.code, "brand created");
                brand.id
            }
        };
        brands.insert(spec.code.clone(), id);
    }
    Ok(brands)
}

/// 车型编码 -> (车型 id, 品牌 id)。
async fn ensure_locomotive_models(
    store: &dyn SigmaStore,
    catalog: &RollingStockCatalog,
    brands: &HashMap<String, Uuid>,
    dry_run: bool,
) -> Result<HashMap<String, (Uuid, Uuid)>, ImportError> {
    let mut models = HashMap::new();
    for spec in &catalog.locomotive_models {
        if let Some(model) = store.find_locomotive_model_by_code(&spec.code).await? {
            models.insert(spec.code.clone(), (model.id, model.brand_id));
            continue;
        }
        let Some(&brand_id) = brands.get(&spec.brand) else {
            warn!(model = %spec.code, brand = %spec.brand, "model brand is not in the catalog");
            continue;
        };
        let id = if dry_run {
            Uuid::new_v4()
        } else {
            let model = store
                .create_locomotive_model(LocomotiveModel::new(&spec.code, &spec.name, brand_id))
                .await?;
            info!(code = %model.code, "locomotive model created");
            model.id
        };
        models.insert(spec.code.clone(), (id, brand_id));
    }
    Ok(models)
}

/// 类别编码（`<品牌>_<类别>`）-> (类别 id, 品牌 id)。
async fn ensure_railcar_classes(
    store: &dyn SigmaStore,
    catalog: &RollingStockCatalog,
    brands: &HashMap<String, Uuid>,
    dry_run: bool,
) -> Result<HashMap<String, (Uuid, Uuid)>, ImportError> {
    let mut classes = HashMap::new();
    for spec in &catalog.railcar_classes {
        let code = spec.code();
        if let Some(class) = store.find_railcar_class_by_code(&code).await? {
            classes.insert(code, (class.id, class.brand_id));
            continue;
        }
        let Some(&brand_id) = brands.get(&spec.brand) else {
            warn!(class = %code, brand = %spec.brand, "class brand is not in the catalog");
            continue;
        };
        let id = if dry_run {
            Uuid::new_v4()
        } else {
            let class = store
                .create_railcar_class(RailcarClass::new(&code, &spec.name, brand_id))
                .await?;
            info!(code = %class.code, "railcar class created");
            class.id
        };
        classes.insert(code, (id, brand_id));
    }
    Ok(classes)
}

/// 编号已在存储中或本次已处理过。
async fn unit_exists(
    store: &dyn SigmaStore,
    seen: &HashSet<String>,
    number: &str,
) -> Result<bool, ImportError> {
    if seen.contains(number) {
        return Ok(true);
    }
    Ok(store.find_unit_by_number(number).await?.is_some())
}

/// 写入单元；并发写入造成的编号冲突按“已存在”处理。返回是否新建。
async fn create_unit(
    store: &dyn SigmaStore,
    number: &str,
    kind: UnitKind,
    dry_run: bool,
) -> Result<bool, ImportError> {
    if dry_run {
        return Ok(true);
    }
    match store.create_unit(MaintenanceUnit::new(number, kind)).await {
        Ok(unit) => {
            debug!(unit = %unit.number, unit_type = unit.unit_type().as_str(), "unit created");
            Ok(true)
        }
        Err(StorageError::Conflict(_)) => Ok(false),
        Err(err) => Err(err.into()),
    }
}

pub(crate) async fn import_locomotives(
    store: &dyn SigmaStore,
    catalog: &RollingStockCatalog,
    records: Vec<LegacyRecord>,
    seen: &mut HashSet<String>,
    dry_run: bool,
    report: &mut ImportReport,
) -> Result<(), ImportError> {
    let brands = ensure_brands(store, &catalog.locomotive_brands, dry_run).await?;
    let models = ensure_locomotive_models(store, catalog, &brands, dry_run).await?;

    for record in records {
        report.row_read();
        let row = match record.result {
            Ok(row) => row,
            Err(err) => {
                report.skip(record.line, &err);
                continue;
            }
        };
        let number = match row.required("Locs") {
            Ok(number) => number,
            Err(err) => {
                report.skip(record.line, &err);
                continue;
            }
        };
        let serie = row.get("Serie");

        if unit_exists(store, seen, number).await? {
            report.already_exists();
            continue;
        }
        if catalog.is_motorcoach(number) {
            debug!(unit = number, "motorcoach excluded from locomotive import");
            report.excluded();
            continue;
        }
        let Some(series) = catalog.locomotive_series(serie) else {
            report.unmapped(record.line, serie, number);
            continue;
        };
        let Some(&(model_id, model_brand_id)) = models.get(&series.model) else {
            let reason = RowError::Malformed(format!("model not found: {}", series.model));
            report.skip(record.line, &reason);
            continue;
        };
        if !brands.contains_key(&series.brand) {
            let reason = RowError::Malformed(format!("brand not found: {}", series.brand));
            report.skip(record.line, &reason);
            continue;
        }

        let kind = UnitKind::Locomotive {
            brand_id: model_brand_id,
            model_id,
        };
        seen.insert(number.to_string());
        if create_unit(store, number, kind, dry_run).await? {
            report.created();
        } else {
            report.already_exists();
        }
    }
    Ok(())
}

pub(crate) async fn import_railcars(
    store: &dyn SigmaStore,
    catalog: &RollingStockCatalog,
    records: Vec<LegacyRecord>,
    seen: &mut HashSet<String>,
    dry_run: bool,
    report: &mut ImportReport,
) -> Result<(), ImportError> {
    let brands = ensure_brands(store, &catalog.railcar_brands, dry_run).await?;
    let classes = ensure_railcar_classes(store, catalog, &brands, dry_run).await?;

    for record in records {
        report.row_read();
        let row = match record.result {
            Ok(row) => row,
            Err(err) => {
                report.skip(record.line, &err);
                continue;
            }
        };
        let number = match row.required("Coche") {
            Ok(number) => number,
            Err(err) => {
                report.skip(record.line, &err);
                continue;
            }
        };
        let serie = row.get("Serie");

        if unit_exists(store, seen, number).await? {
            report.already_exists();
            continue;
        }
        let (brand, class) = match catalog.railcar_series(serie) {
            Some(RailcarSeries::Class { brand, class }) => (brand, class),
            Some(RailcarSeries::Excluded) => {
                debug!(unit = number, serie, "railcar serie excluded");
                report.excluded();
                continue;
            }
            None => {
                report.unmapped(record.line, serie, number);
                continue;
            }
        };
        let Some(&brand_id) = brands.get(brand) else {
            let reason = RowError::Malformed(format!("brand not found: {brand}"));
            report.skip(record.line, &reason);
            continue;
        };
        let code = railcar_class_code(brand, class);
        let Some(&(class_id, _)) = classes.get(&code) else {
            let reason = RowError::Malformed(format!("class not found: {code}"));
            report.skip(record.line, &reason);
            continue;
        };

        let kind = UnitKind::Railcar { brand_id, class_id };
        seen.insert(number.to_string());
        if create_unit(store, number, kind, dry_run).await? {
            report.created();
        } else {
            report.already_exists();
        }
    }
    Ok(())
}
