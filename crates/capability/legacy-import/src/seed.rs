//! 初始数据加载
//!
//! 参考目录（品牌、车型、车厢类别、GOP、故障类型及默认受影响系统）按编码
//! “不存在则创建”；随后读取 `personal.csv` 与 `ums.csv`（分号分隔，Latin-1）。
//! CSV 缺失只记录警告，已存在的行跳过。

use crate::ImportError;
use crate::source::{INITIAL_DATA_DELIMITER, LegacyRecord, LegacyRow, RowError, read_records};
use domain::{
    AffectedSystem, Brand, FailureType, Gop, LocomotiveModel, MaintenanceUnit, Personnel,
    RailcarClass, Sector, UnitKind, UnitType,
};
use serde::Serialize;
use sigma_storage::SigmaStore;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const PERSONNEL_FILE: &str = "personal.csv";
pub const UNITS_FILE: &str = "ums.csv";

// (code, name, full_name)
const BRANDS: &[(&str, &str, &str)] = &[
    ("GM", "GM", "General Motors"),
    ("CNR", "Dalian CNR", "CNR Dalian Locomotive & Rolling Stock Co."),
    ("MTF", "Materfer", "Material Ferroviario S.A."),
    ("NOHAB", "Nohab", "Nydqvist & Holm AB"),
];

// (code, name, brand)
const LOCOMOTIVE_MODELS: &[(&str, &str, &str)] = &[
    ("G22-CW", "G22-CW", "GM"),
    ("GT22-CW", "GT22-CW", "GM"),
    ("GT22-CW-2", "GT22-CW-2", "GM"),
    ("CKD8G", "CKD8G", "CNR"),
];

const RAILCAR_CLASSES: &[(&str, &str, &str)] = &[
    ("CDA", "CDA", "CNR"),
    ("CPA", "CPA", "CNR"),
    ("CRA", "CRA", "CNR"),
    ("FG", "FG", "CNR"),
    ("FS", "FS", "CNR"),
    ("PUA", "PUA", "CNR"),
    ("PUAD", "PUAD", "CNR"),
    ("FURGON_UNICA", "Furgon Unica", "MTF"),
    ("UNICA", "Unica", "MTF"),
];

const GOPS: &[(&str, &str)] = &[
    ("PMRE", "Playa Mecánica Remedios de Escalada"),
    ("TY", "Guardia Temperley"),
    ("PC", "Guardia Plaza C."),
    ("MPN", "Guardia Mar del Plata"),
    ("CA", "Guardia Cañuelas"),
    ("PU", "Guardia Maipú"),
];

// (code, name, default affected system)
const FAILURE_TYPES: &[(&str, &str, &str)] = &[
    ("MEC", "Mecánicas", "Sistema Mecánico"),
    ("ELE", "Eléctricas", "Sistema Eléctrico"),
    ("NEU", "Neumáticas", "Sistema Neumático"),
    ("ELEC", "Electrónicas", "Sistema Electrónico"),
    ("OTR", "Otras", "Otro"),
    ("ATS", "Falla de ATS", "ATS"),
    ("HASLER", "Falla de Hasler", "Hasler"),
    ("HV", "Falla de Hombre Vivo", "Hombre Vivo"),
];

// ums.csv 中的品牌名 -> 品牌编码
const UNIT_BRANDS: &[(&str, &str)] = &[
    ("GM", "GM"),
    ("Dalian CNR", "CNR"),
    ("CNR", "CNR"),
    ("Materfer", "MTF"),
    ("Nohab", "NOHAB"),
];

// ums.csv 中的类别名 -> 类别编码
const UNIT_CLASSES: &[(&str, &str)] = &[
    ("CDA", "CDA"),
    ("CPA", "CPA"),
    ("CRA", "CRA"),
    ("FG", "FG"),
    ("FS", "FS"),
    ("PUA", "PUA"),
    ("PUAD", "PUAD"),
    ("Furgon Unica", "FURGON_UNICA"),
    ("Unica", "UNICA"),
];

const DEFAULT_CONFIGURATION: &str = "CM";
const DEFAULT_CAR_COUNT: u16 = 1;

#[derive(Debug, Clone, Default, Serialize)]
pub struct SeedReport {
    pub brands_created: u64,
    pub models_created: u64,
    pub classes_created: u64,
    pub gops_created: u64,
    pub failure_types_created: u64,
    pub affected_systems_created: u64,
    pub personnel_created: u64,
    pub personnel_skipped: u64,
    pub locomotives_created: u64,
    pub railcars_created: u64,
    pub motorcoaches_created: u64,
    pub units_skipped: u64,
    /// 品牌 / 车型 / 类别无法识别或行数据错误。
    pub units_rejected: u64,
}

impl fmt::Display for SeedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Reference: {} brands, {} models, {} classes, {} GOPs, {} failure types created; \
             Personnel: {} created, {} skipped; \
             Locomotives: {}, Railcars: {}, Motorcoaches: {}, Skipped: {}, Rejected: {}",
            self.brands_created,
            self.models_created,
            self.classes_created,
            self.gops_created,
            self.failure_types_created,
            self.personnel_created,
            self.personnel_skipped,
            self.locomotives_created,
            self.railcars_created,
            self.motorcoaches_created,
            self.units_skipped,
            self.units_rejected
        )
    }
}

/// 初始数据加载器。
pub struct InitialDataLoader {
    store: Arc<dyn SigmaStore>,
}

impl InitialDataLoader {
    pub fn new(store: Arc<dyn SigmaStore>) -> Self {
        Self { store }
    }

    /// 加载参考目录，再从 `dir` 读取人员与维修单元。
    pub async fn load(&self, dir: &Path) -> Result<SeedReport, ImportError> {
        let mut report = SeedReport::default();
        self.load_brands(&mut report).await?;
        self.load_locomotive_models(&mut report).await?;
        self.load_railcar_classes(&mut report).await?;
        self.load_gops(&mut report).await?;
        self.load_failure_types(&mut report).await?;

        if let Some(records) = read_optional(&dir.join(PERSONNEL_FILE))? {
            self.load_personnel(records, &mut report).await?;
        }
        if let Some(records) = read_optional(&dir.join(UNITS_FILE))? {
            self.load_units(records, &mut report).await?;
        }
        info!(%report, "initial data loaded");
        Ok(report)
    }

    async fn brand_id(&self, code: &str) -> Result<Option<Uuid>, ImportError> {
        Ok(self.store.find_brand_by_code(code).await?.map(|brand| brand.id))
    }

    async fn load_brands(&self, report: &mut SeedReport) -> Result<(), ImportError> {
        for (code, name, full_name) in BRANDS {
            if self.store.find_brand_by_code(code).await?.is_some() {
                continue;
            }
            self.store
                .create_brand(Brand::new(*code, *name).with_full_name(*full_name))
                .await?;
            report.brands_created += 1;
            debug!(code, "brand created");
        }
        Ok(())
    }

    async fn load_locomotive_models(&self, report: &mut SeedReport) -> Result<(), ImportError> {
        for (code, name, brand) in LOCOMOTIVE_MODELS {
            if self.store.find_locomotive_model_by_code(code).await?.is_some() {
                continue;
            }
            let Some(brand_id) = self.brand_id(brand).await? else {
                warn!(code, brand, "brand missing for locomotive model");
                continue;
            };
            self.store
                .create_locomotive_model(LocomotiveModel::new(*code, *name, brand_id))
                .await?;
            report.models_created += 1;
        }
        Ok(())
    }

    async fn load_railcar_classes(&self, report: &mut SeedReport) -> Result<(), ImportError> {
        for (code, name, brand) in RAILCAR_CLASSES {
            if self.store.find_railcar_class_by_code(code).await?.is_some() {
                continue;
            }
            let Some(brand_id) = self.brand_id(brand).await? else {
                warn!(code, brand, "brand missing for railcar class");
                continue;
            };
            self.store
                .create_railcar_class(RailcarClass::new(*code, *name, brand_id))
                .await?;
            report.classes_created += 1;
        }
        Ok(())
    }

    async fn load_gops(&self, report: &mut SeedReport) -> Result<(), ImportError> {
        for (code, name) in GOPS {
            if self.store.find_gop_by_code(code).await?.is_some() {
                continue;
            }
            self.store.create_gop(Gop::new(*code, *name)).await?;
            report.gops_created += 1;
        }
        Ok(())
    }

    async fn load_failure_types(&self, report: &mut SeedReport) -> Result<(), ImportError> {
        for (code, name, system) in FAILURE_TYPES {
            let failure_type = match self.store.find_failure_type_by_code(code).await? {
                Some(failure_type) => failure_type,
                None => {
                    report.failure_types_created += 1;
                    self.store
                        .create_failure_type(FailureType::new(*code, *name))
                        .await?
                }
            };
            if self.store.find_affected_system_by_code(code).await?.is_none() {
                self.store
                    .create_affected_system(AffectedSystem::new(*code, *system, failure_type.id))
                    .await?;
                report.affected_systems_created += 1;
            }
        }
        Ok(())
    }

    async fn load_personnel(
        &self,
        records: Vec<LegacyRecord>,
        report: &mut SeedReport,
    ) -> Result<(), ImportError> {
        for record in records {
            let personnel = match record.result.and_then(|row| parse_personnel(&row)) {
                Ok(Some(personnel)) => personnel,
                Ok(None) => {
                    warn!(line = record.line, "unknown sector, skipping personnel row");
                    report.personnel_skipped += 1;
                    continue;
                }
                Err(err) => {
                    warn!(line = record.line, %err, "skipping personnel row");
                    report.personnel_skipped += 1;
                    continue;
                }
            };
            if self
                .store
                .find_personnel_by_employee(&personnel.employee_number, personnel.sector)
                .await?
                .is_some()
            {
                report.personnel_skipped += 1;
                continue;
            }
            self.store.create_personnel(personnel).await?;
            report.personnel_created += 1;
        }
        Ok(())
    }

    async fn load_units(
        &self,
        records: Vec<LegacyRecord>,
        report: &mut SeedReport,
    ) -> Result<(), ImportError> {
        let brands: HashMap<String, Uuid> = self
            .store
            .list_brands()
            .await?
            .into_iter()
            .map(|brand| (brand.code, brand.id))
            .collect();
        let models: HashMap<String, Uuid> = self
            .store
            .list_locomotive_models(None)
            .await?
            .into_iter()
            .map(|model| (model.code, model.id))
            .collect();
        let classes: HashMap<String, Uuid> = self
            .store
            .list_railcar_classes(None)
            .await?
            .into_iter()
            .map(|class| (class.code, class.id))
            .collect();
        let unit_brands: HashMap<&str, &str> = UNIT_BRANDS.iter().copied().collect();
        let unit_classes: HashMap<&str, &str> = UNIT_CLASSES.iter().copied().collect();

        for record in records {
            let row = match record.result {
                Ok(row) => row,
                Err(err) => {
                    warn!(line = record.line, %err, "skipping unit row");
                    report.units_rejected += 1;
                    continue;
                }
            };
            let (number, unit_type) = match (
                row.required("Unidad de Mantenimiento"),
                row.required("Tipo"),
            ) {
                (Ok(number), Ok(unit_type)) => (number, unit_type),
                (Err(err), _) | (_, Err(err)) => {
                    warn!(line = record.line, %err, "skipping unit row");
                    report.units_rejected += 1;
                    continue;
                }
            };
            if self.store.find_unit_by_number(number).await?.is_some() {
                report.units_skipped += 1;
                continue;
            }

            let brand_name = row.get("Marca");
            let Some(&brand_id) = unit_brands
                .get(brand_name)
                .and_then(|code| brands.get(*code))
            else {
                warn!(unit = number, brand = brand_name, "unknown brand");
                report.units_rejected += 1;
                continue;
            };

            let kind = match UnitType::from_label(unit_type) {
                Some(UnitType::Locomotive) => {
                    let model_name = row.get("Modelo");
                    let model_code = model_name.replace(' ', "");
                    let Some(&model_id) = models.get(&model_code) else {
                        warn!(unit = number, model = model_name, "unknown locomotive model");
                        report.units_rejected += 1;
                        continue;
                    };
                    UnitKind::Locomotive { brand_id, model_id }
                }
                Some(UnitType::Railcar) => {
                    let class_name = row.get("Clase");
                    let Some(&class_id) = unit_classes
                        .get(class_name)
                        .and_then(|code| classes.get(*code))
                    else {
                        warn!(unit = number, class = class_name, "unknown railcar class");
                        report.units_rejected += 1;
                        continue;
                    };
                    UnitKind::Railcar { brand_id, class_id }
                }
                Some(UnitType::Motorcoach) => match motorcoach_kind(&row, brand_id) {
                    Ok(kind) => kind,
                    Err(err) => {
                        warn!(unit = number, %err, "skipping motorcoach row");
                        report.units_rejected += 1;
                        continue;
                    }
                },
                None => {
                    warn!(unit = number, unit_type, "unknown unit type");
                    report.units_rejected += 1;
                    continue;
                }
            };

            let unit = self
                .store
                .create_unit(MaintenanceUnit::new(number, kind))
                .await?;
            match unit.unit_type() {
                UnitType::Locomotive => report.locomotives_created += 1,
                UnitType::Railcar => report.railcars_created += 1,
                UnitType::Motorcoach => report.motorcoaches_created += 1,
            }
        }
        Ok(())
    }
}

fn read_optional(path: &Path) -> Result<Option<Vec<LegacyRecord>>, ImportError> {
    match read_records(path, INITIAL_DATA_DELIMITER) {
        Ok(records) => Ok(Some(records)),
        Err(ImportError::MissingFile(path)) => {
            warn!(path = %path.display(), "CSV file not found");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// 部门无法识别时返回 `Ok(None)`。
fn parse_personnel(row: &LegacyRow) -> Result<Option<Personnel>, RowError> {
    let employee_number = row.required("Legajo SAP")?;
    let full_name = row.required("Nombre y Apellido")?;
    let Some(sector) = Sector::from_label(row.get("Sector")) else {
        return Ok(None);
    };
    let mut personnel = Personnel::new(employee_number, full_name, sector);
    personnel.tax_id = row.optional("Cuit").map(str::to_string);
    personnel.simaf_sector = row.optional("SectorSIMAF").map(str::to_string);
    Ok(Some(personnel))
}

fn motorcoach_kind(row: &LegacyRow, brand_id: Uuid) -> Result<UnitKind, RowError> {
    let configuration = row
        .optional("Conformación")
        .unwrap_or(DEFAULT_CONFIGURATION)
        .to_string();
    let car_count = match row.optional("Cantidad Coches") {
        Some(value) => value.parse().map_err(|_| RowError::NotNumeric {
            field: "Cantidad Coches".to_string(),
            value: value.to_string(),
        })?,
        None => DEFAULT_CAR_COUNT,
    };
    Ok(UnitKind::Motorcoach {
        brand_id,
        configuration,
        car_count,
    })
}
