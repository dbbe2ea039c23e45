//! 维修单元（Unidad de Mantenimiento）
//!
//! 维修单元由共享的身份记录（id、编号、启用标志）与恰好一个类型扩展组成。
//! 类型扩展以和类型 [`UnitKind`] 表达，判别值 [`UnitType`] 由变体推导，
//! 因此“判别值与扩展一致”在类型层面成立。

use crate::UnknownCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 维修单元类型判别值。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitType {
    #[serde(rename = "locomotora")]
    Locomotive,
    #[serde(rename = "coche_remolcado")]
    Railcar,
    #[serde(rename = "coche_motor")]
    Motorcoach,
}

impl UnitType {
    pub const ALL: [UnitType; 3] = [UnitType::Locomotive, UnitType::Railcar, UnitType::Motorcoach];

    pub fn as_str(&self) -> &'static str {
        match self {
            UnitType::Locomotive => "locomotora",
            UnitType::Railcar => "coche_remolcado",
            UnitType::Motorcoach => "coche_motor",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UnitType::Locomotive => "Locomotora",
            UnitType::Railcar => "Coche Remolcado",
            UnitType::Motorcoach => "Coche Motor",
        }
    }

    /// 按初始数据 CSV 中的 `Tipo` 列解析（`Locomotora` / `Coche Remolcado` / `Coche Motor`）。
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.label() == label.trim())
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for UnitType {
    type Err = UnknownCode;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| UnknownCode::new("unit type", value))
    }
}

/// 类型扩展属性。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UnitKind {
    Locomotive {
        brand_id: Uuid,
        model_id: Uuid,
    },
    Railcar {
        brand_id: Uuid,
        class_id: Uuid,
    },
    Motorcoach {
        brand_id: Uuid,
        configuration: String,
        car_count: u16,
    },
}

impl UnitKind {
    pub fn unit_type(&self) -> UnitType {
        match self {
            UnitKind::Locomotive { .. } => UnitType::Locomotive,
            UnitKind::Railcar { .. } => UnitType::Railcar,
            UnitKind::Motorcoach { .. } => UnitType::Motorcoach,
        }
    }

    pub fn brand_id(&self) -> Uuid {
        match self {
            UnitKind::Locomotive { brand_id, .. }
            | UnitKind::Railcar { brand_id, .. }
            | UnitKind::Motorcoach { brand_id, .. } => *brand_id,
        }
    }
}

/// 维修单元：机车、客车车厢或动车组。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceUnit {
    pub id: Uuid,
    pub number: String,
    pub is_active: bool,
    pub kind: UnitKind,
}

impl MaintenanceUnit {
    pub fn new(number: impl Into<String>, kind: UnitKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            number: number.into(),
            is_active: true,
            kind,
        }
    }

    pub fn unit_type(&self) -> UnitType {
        self.kind.unit_type()
    }
}

impl fmt::Display for MaintenanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.unit_type().label(), self.number)
    }
}
