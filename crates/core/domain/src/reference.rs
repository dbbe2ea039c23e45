//! 参考数据实体
//!
//! 这些表很少修改，主要由初始数据加载与遗留导入维护：
//! - 品牌：Brand
//! - 车型 / 车厢类别：LocomotiveModel, RailcarClass（均归属一个品牌）
//! - 故障分类：FailureType, AffectedSystem
//! - 班组与人员：Gop, Personnel
//! - 车次：TrainNumber
//! - 遗留参考表：InterventionType, Location

use crate::UnknownCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 制造商品牌（如 GM、CNR、Materfer）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brand {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub full_name: Option<String>,
    pub is_active: bool,
}

impl Brand {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            code: code.into(),
            full_name: None,
            is_active: true,
        }
    }

    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }
}

impl fmt::Display for Brand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// 机车车型（如 GT22-CW、CKD8G）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocomotiveModel {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub brand_id: Uuid,
    pub description: Option<String>,
    pub is_active: bool,
}

impl LocomotiveModel {
    pub fn new(code: impl Into<String>, name: impl Into<String>, brand_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            code: code.into(),
            brand_id,
            description: None,
            is_active: true,
        }
    }
}

/// 客车车厢类别（如 U、FU、CPA）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RailcarClass {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub brand_id: Uuid,
    pub description: Option<String>,
    pub is_active: bool,
}

impl RailcarClass {
    pub fn new(code: impl Into<String>, name: impl Into<String>, brand_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            code: code.into(),
            name: name.into(),
            brand_id,
            description: None,
            is_active: true,
        }
    }
}

/// 故障类型（机械、电气、气动、电子、其他、ATS、Hasler、Hombre Vivo）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureType {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub is_active: bool,
}

impl FailureType {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            code: code.into(),
            description: None,
            is_active: true,
        }
    }
}

/// 受影响系统，归属一个故障类型。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffectedSystem {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub failure_type_id: Uuid,
    pub description: Option<String>,
    pub is_active: bool,
}

impl AffectedSystem {
    pub fn new(code: impl Into<String>, name: impl Into<String>, failure_type_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            code: code.into(),
            failure_type_id,
            description: None,
            is_active: true,
        }
    }
}

/// 运营班组（Guardia Operativa）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gop {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub is_active: bool,
}

impl Gop {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            code: code.into(),
            description: None,
            is_active: true,
        }
    }
}

impl fmt::Display for Gop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// 人员所属部门，与维修单元的两个业务域对应。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sector {
    #[serde(rename = "locomotora")]
    Locomotives,
    #[serde(rename = "coche_remolcado")]
    TowedRailcars,
}

impl Sector {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sector::Locomotives => "locomotora",
            Sector::TowedRailcars => "coche_remolcado",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Sector::Locomotives => "Locomotoras",
            Sector::TowedRailcars => "Coches Remolcados",
        }
    }

    /// 按 SAP 导出中的显示名解析（`Locomotoras` / `Coches Remolcados`）。
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Locomotoras" => Some(Sector::Locomotives),
            "Coches Remolcados" => Some(Sector::TowedRailcars),
            _ => None,
        }
    }
}

impl FromStr for Sector {
    type Err = UnknownCode;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "locomotora" => Ok(Sector::Locomotives),
            "coche_remolcado" => Ok(Sector::TowedRailcars),
            other => Err(UnknownCode::new("sector", other)),
        }
    }
}

/// 维修人员（Interviniente）。
///
/// 自然键为 (employee_number, sector)：同一员工可在两个部门各出现一次。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Personnel {
    pub id: Uuid,
    pub employee_number: String,
    pub full_name: String,
    pub sector: Sector,
    pub tax_id: Option<String>,
    pub simaf_sector: Option<String>,
    pub is_active: bool,
}

impl Personnel {
    pub fn new(
        employee_number: impl Into<String>,
        full_name: impl Into<String>,
        sector: Sector,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_number: employee_number.into(),
            full_name: full_name.into(),
            sector,
            tax_id: None,
            simaf_sector: None,
            is_active: true,
        }
    }
}

impl fmt::Display for Personnel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.full_name, self.employee_number)
    }
}

/// 车次号。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainNumber {
    pub id: Uuid,
    pub number: String,
    pub description: Option<String>,
    pub route: Option<String>,
    pub is_active: bool,
}

impl TrainNumber {
    pub fn new(number: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            number: number.into(),
            description: None,
            route: None,
            is_active: true,
        }
    }
}

/// 干预分类：检修（REV）、扣车（DET）或未分类（`-`）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InterventionClass {
    #[serde(rename = "REV")]
    Review,
    #[serde(rename = "DET")]
    Detention,
    #[default]
    #[serde(rename = "-")]
    Unclassified,
}

impl InterventionClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterventionClass::Review => "REV",
            InterventionClass::Detention => "DET",
            InterventionClass::Unclassified => "-",
        }
    }

    /// 遗留值不在识别集合内时归为未分类，从不拒绝。
    pub fn from_legacy(value: &str) -> Self {
        value.trim().parse().unwrap_or_default()
    }
}

impl FromStr for InterventionClass {
    type Err = UnknownCode;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "REV" => Ok(InterventionClass::Review),
            "DET" => Ok(InterventionClass::Detention),
            "-" => Ok(InterventionClass::Unclassified),
            other => Err(UnknownCode::new("intervention class", other)),
        }
    }
}

/// 干预类型（遗留表 Intervenciones），按字符串编码唯一。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterventionType {
    pub id: Uuid,
    pub code: String,
    pub description: String,
    pub class: InterventionClass,
    pub is_active: bool,
}

impl InterventionType {
    pub fn new(
        code: impl Into<String>,
        description: impl Into<String>,
        class: InterventionClass,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            code: code.into(),
            description: description.into(),
            class,
            is_active: true,
        }
    }
}

/// 地点类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocationKind {
    #[serde(rename = "Taller")]
    Workshop,
    #[serde(rename = "Estación")]
    Station,
    #[serde(rename = "Depósito")]
    Depot,
    #[serde(rename = "Desvío")]
    Siding,
    #[serde(rename = "Mesa")]
    Turntable,
    #[serde(rename = "Línea")]
    Line,
}

impl LocationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationKind::Workshop => "Taller",
            LocationKind::Station => "Estación",
            LocationKind::Depot => "Depósito",
            LocationKind::Siding => "Desvío",
            LocationKind::Turntable => "Mesa",
            LocationKind::Line => "Línea",
        }
    }
}

impl FromStr for LocationKind {
    type Err = UnknownCode;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Taller" => Ok(LocationKind::Workshop),
            "Estación" => Ok(LocationKind::Station),
            "Depósito" => Ok(LocationKind::Depot),
            "Desvío" => Ok(LocationKind::Siding),
            "Mesa" => Ok(LocationKind::Turntable),
            "Línea" => Ok(LocationKind::Line),
            other => Err(UnknownCode::new("location kind", other)),
        }
    }
}

/// 地点可执行的检修类别。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocationRevision {
    #[serde(rename = "Reparacion")]
    Repair,
    #[serde(rename = "Alistamiento")]
    Readiness,
    #[serde(rename = "-")]
    NotApplicable,
}

impl LocationRevision {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationRevision::Repair => "Reparacion",
            LocationRevision::Readiness => "Alistamiento",
            LocationRevision::NotApplicable => "-",
        }
    }
}

impl FromStr for LocationRevision {
    type Err = UnknownCode;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Reparacion" => Ok(LocationRevision::Repair),
            "Alistamiento" => Ok(LocationRevision::Readiness),
            "-" => Ok(LocationRevision::NotApplicable),
            other => Err(UnknownCode::new("location revision", other)),
        }
    }
}

/// 物理地点（车站、车间、车库等），按数字编码唯一。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: Uuid,
    pub code: i32,
    pub description: String,
    pub short_code: Option<String>,
    pub kind: Option<LocationKind>,
    pub revision: Option<LocationRevision>,
    pub is_active: bool,
}

impl Location {
    pub fn new(code: i32, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            code,
            description: description.into(),
            short_code: None,
            kind: None,
            revision: None,
            is_active: true,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.short_code.as_deref() {
            Some(short) if short != "-" => {
                write!(f, "{} - {} ({})", self.code, self.description, short)
            }
            _ => write!(f, "{} - {}", self.code, self.description),
        }
    }
}
