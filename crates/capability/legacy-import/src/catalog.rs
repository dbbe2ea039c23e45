//! 车辆系列映射目录
//!
//! 遗留导出中的 `Serie` 字段是自由文本，这里把它映射到规范化的
//! (品牌, 车型) 或 (品牌, 车厢类别)。目录可以整体替换，测试中注入替代目录。

use std::collections::{HashMap, HashSet};

/// 导入前确保存在的品牌。`name` 与 `code` 相同。
#[derive(Debug, Clone)]
pub struct BrandSpec {
    pub code: String,
    pub full_name: String,
}

#[derive(Debug, Clone)]
pub struct LocomotiveModelSpec {
    pub code: String,
    pub name: String,
    pub brand: String,
}

/// 车厢类别。存储编码为 `<品牌>_<类别>`，不同品牌可复用同一类别名。
#[derive(Debug, Clone)]
pub struct RailcarClassSpec {
    pub brand: String,
    pub class: String,
    pub name: String,
}

impl RailcarClassSpec {
    pub fn code(&self) -> String {
        railcar_class_code(&self.brand, &self.class)
    }
}

pub fn railcar_class_code(brand: &str, class: &str) -> String {
    format!("{brand}_{class}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocomotiveSeries {
    pub brand: String,
    pub model: String,
}

/// 客车车厢系列映射。`Excluded` 表示不导入（货车、空系列）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RailcarSeries {
    Class { brand: String, class: String },
    Excluded,
}

/// 机车 / 客车车厢的系列目录。
#[derive(Debug, Clone)]
pub struct RollingStockCatalog {
    pub locomotive_brands: Vec<BrandSpec>,
    pub locomotive_models: Vec<LocomotiveModelSpec>,
    pub locomotive_series: HashMap<String, LocomotiveSeries>,
    /// 出现在机车导出里、实际是动车组的单元编号。
    pub motorcoach_units: HashSet<String>,
    pub railcar_brands: Vec<BrandSpec>,
    pub railcar_classes: Vec<RailcarClassSpec>,
    pub railcar_series: HashMap<String, RailcarSeries>,
}

impl RollingStockCatalog {
    pub fn locomotive_series(&self, serie: &str) -> Option<&LocomotiveSeries> {
        self.locomotive_series.get(serie)
    }

    /// `None` 表示系列未知；`Some(Excluded)` 表示已知但不导入。
    pub fn railcar_series(&self, serie: &str) -> Option<&RailcarSeries> {
        self.railcar_series.get(serie)
    }

    pub fn is_motorcoach(&self, number: &str) -> bool {
        self.motorcoach_units.contains(number)
    }
}

const LOCOMOTIVE_BRANDS: &[(&str, &str)] = &[
    ("GM", "General Motors"),
    ("CNR", "China CNR Corporation (Dalian)"),
    ("Nohab", "NOHAB"),
    ("Alco", "American Locomotive Company"),
    ("GAIA", "GAIA"),
    ("CSR", "China South Railway"),
    ("CAF", "Construcciones y Auxiliar de Ferrocarriles"),
];

// (code, name, brand)
const LOCOMOTIVE_MODELS: &[(&str, &str, &str)] = &[
    ("G12", "G12", "GM"),
    ("GR12", "GR12", "GM"),
    ("G22-CW", "G22-CW", "GM"),
    ("GT22-CW", "GT22-CW", "GM"),
    ("GT22-CW-2", "GT22-CW-2", "GM"),
    ("GT22-CW-3", "GT22-CW-3", "GM"),
    ("319", "319", "GM"),
    ("OTHER", "Otro GM", "GM"),
    ("CKD8G", "CKD8G", "CNR"),
    ("CKD8H", "CKD8H", "CNR"),
    ("RSD16", "RSD16", "Alco"),
    ("Alco", "Alco genérico", "Alco"),
    ("GAIA", "GAIA", "GAIA"),
    ("CSR", "CSR", "CSR"),
    ("593", "Serie 593", "CAF"),
    ("Nohab", "Nohab", "Nohab"),
];

// (serie, brand, model)
const LOCOMOTIVE_SERIES: &[(&str, &str, &str)] = &[
    ("G12", "GM", "G12"),
    ("GR12", "GM", "GR12"),
    ("G22", "GM", "G22-CW"),
    ("GT22-CW", "GM", "GT22-CW"),
    ("GT22-CW2", "GM", "GT22-CW-2"),
    ("GT22-CW3", "GM", "GT22-CW-3"),
    ("GM 319", "GM", "319"),
    ("GM", "GM", "OTHER"),
    ("CNR", "CNR", "CKD8G"),
    ("GAIA", "GAIA", "GAIA"),
    ("Alco", "Alco", "Alco"),
    ("Alco RSD16", "Alco", "RSD16"),
    // 导出中带尾随空格的写法
    ("Alco RSD16 ", "Alco", "RSD16"),
    ("CSR", "CSR", "CSR"),
    ("CAF 593", "CAF", "593"),
    ("C.M. NOHAB", "Nohab", "Nohab"),
];

const MOTORCOACH_UNITS: &[&str] = &["105", "106"];

const RAILCAR_BRANDS: &[(&str, &str)] = &[
    ("Materfer", "Materfer S.A."),
    ("CNR", "China CNR Corporation (Dalian)"),
    ("Sorefame", "Sorefame"),
    ("Tecnotren", "Tecnotren"),
    ("Toshiba", "Toshiba"),
    ("Werkspoor", "Werkspoor"),
    ("Hitachi", "Hitachi"),
    ("Automovilera", "Automovilera"),
    ("Carga", "Vagones de Carga"),
];

// (brand, class, name)
const RAILCAR_CLASSES: &[(&str, &str, &str)] = &[
    ("Materfer", "U", "Unica"),
    ("Materfer", "UC", "Unica Cabina"),
    ("Materfer", "FU", "Furgon Unica"),
    ("Materfer", "FUC", "Furgon Unica Cabina"),
    ("Materfer", "F", "Furgon"),
    ("Materfer", "FC", "Furgon Correo"),
    ("Materfer", "DA", "Dormitorio con AA"),
    ("Materfer", "CT", "Clase Turista"),
    ("Materfer", "CU", "Clase Unica"),
    ("Materfer", "CUG", "Clase Unica G"),
    ("Materfer", "P", "Primera"),
    ("Materfer", "RA", "Restaurant con AA"),
    ("CNR", "CNR", "CNR generico"),
    ("CNR", "CPA", "Coche de Pasajeros A"),
    ("CNR", "CRA", "Coche Remolque A"),
    ("CNR", "PUA", "Pasajeros Unica A"),
    ("CNR", "PUAD", "Pasajeros Unica A Discapacitados"),
    ("CNR", "FG", "Furgon Generador"),
    ("CNR", "FS", "Furgon Standard"),
    ("CNR", "CDA", "Coche Dormitorio A"),
    ("Sorefame", "Sorefame", "Sorefame generico"),
    ("Sorefame", "Rp", "Remolque de pasajeros"),
    ("Sorefame", "Ry", "Remolque tipo Y"),
    ("Sorefame", "Mc", "Motor cabina"),
    ("Sorefame", "CT", "Clase Turista"),
    ("Sorefame", "P", "Primera"),
    ("Tecnotren", "M", "Motor"),
    ("Tecnotren", "R", "Remolque"),
    ("Toshiba", "Toshiba", "Toshiba generico"),
    ("Werkspoor", "CSS", "Coche Salon Standard"),
    ("Werkspoor", "CVS", "Coche Viajeros Standard"),
    ("Werkspoor", "FS", "Furgon Standard"),
    ("Werkspoor", "FC", "Furgon Correo"),
    ("Hitachi", "OA", "Coche OA"),
    ("Automovilera", "Automovilera", "Automovilera generico"),
    ("Carga", "Chata", "Vagon Chata"),
    ("Carga", "Hopper", "Vagon Hopper"),
    ("Carga", "BK", "Vagon BK"),
    ("Carga", "Cubierto", "Vagon Cubierto"),
    ("Carga", "Tanque", "Vagon Tanque"),
    ("Carga", "Plataforma", "Vagon Plataforma"),
    ("Carga", "Tolva", "Vagon Tolva"),
    ("Carga", "Vagon", "Vagon Generico"),
];

// (serie, brand, class)
const RAILCAR_SERIES: &[(&str, &str, &str)] = &[
    ("U. Materfer", "Materfer", "U"),
    ("U.C. Materfer", "Materfer", "UC"),
    ("F.U. Materfer", "Materfer", "FU"),
    ("F.U.C. Materfer", "Materfer", "FUC"),
    ("F. Materfer", "Materfer", "F"),
    ("F.C. Materfer", "Materfer", "FC"),
    ("D.A. Materfer", "Materfer", "DA"),
    ("C.T. Materfer", "Materfer", "CT"),
    ("C.U. Materfer", "Materfer", "CU"),
    ("C.U.G. Materfer", "Materfer", "CUG"),
    ("P. Materfer", "Materfer", "P"),
    ("R.A. Materfer", "Materfer", "RA"),
    ("CNR", "CNR", "CNR"),
    ("CPA", "CNR", "CPA"),
    ("CRA", "CNR", "CRA"),
    ("PUA", "CNR", "PUA"),
    ("PUAD", "CNR", "PUAD"),
    ("FG", "CNR", "FG"),
    ("FS", "CNR", "FS"),
    ("CDA", "CNR", "CDA"),
    ("Sorefame", "Sorefame", "Sorefame"),
    ("Sorefame P", "Sorefame", "P"),
    ("Sorefame CT", "Sorefame", "CT"),
    ("Rp - Sorefame", "Sorefame", "Rp"),
    ("Ry - Sorefame", "Sorefame", "Ry"),
    ("Mc - Sorefame", "Sorefame", "Mc"),
    ("Tecnotren (M)", "Tecnotren", "M"),
    ("Tecnotren (R)", "Tecnotren", "R"),
    ("Toshiba", "Toshiba", "Toshiba"),
    ("CSS Werkspoor", "Werkspoor", "CSS"),
    ("CVS Werkspoor", "Werkspoor", "CVS"),
    ("FS Werkspoor", "Werkspoor", "FS"),
    ("FC", "Werkspoor", "FC"),
    ("OA Hitachi", "Hitachi", "OA"),
    ("Automovilera", "Automovilera", "Automovilera"),
];

// 货车与空系列：已知但不导入
const RAILCAR_EXCLUDED_SERIES: &[&str] = &[
    "Chata",
    "Hopper",
    "BK",
    "Cubierto",
    "Tanque",
    "Tanque?",
    "Plataforma",
    "Tolva",
    "Vagon",
    "",
];

fn brand_specs(rows: &[(&str, &str)]) -> Vec<BrandSpec> {
    rows.iter()
        .map(|(code, full_name)| BrandSpec {
            code: code.to_string(),
            full_name: full_name.to_string(),
        })
        .collect()
}

impl Default for RollingStockCatalog {
    fn default() -> Self {
        let locomotive_models = LOCOMOTIVE_MODELS
            .iter()
            .map(|(code, name, brand)| LocomotiveModelSpec {
                code: code.to_string(),
                name: name.to_string(),
                brand: brand.to_string(),
            })
            .collect();
        let locomotive_series = LOCOMOTIVE_SERIES
            .iter()
            .map(|(serie, brand, model)| {
                (
                    serie.to_string(),
                    LocomotiveSeries {
                        brand: brand.to_string(),
                        model: model.to_string(),
                    },
                )
            })
            .collect();
        let railcar_classes = RAILCAR_CLASSES
            .iter()
            .map(|(brand, class, name)| RailcarClassSpec {
                brand: brand.to_string(),
                class: class.to_string(),
                name: name.to_string(),
            })
            .collect();
        let mut railcar_series: HashMap<String, RailcarSeries> = RAILCAR_SERIES
            .iter()
            .map(|(serie, brand, class)| {
                (
                    serie.to_string(),
                    RailcarSeries::Class {
                        brand: brand.to_string(),
                        class: class.to_string(),
                    },
                )
            })
            .collect();
        for serie in RAILCAR_EXCLUDED_SERIES {
            railcar_series.insert(serie.to_string(), RailcarSeries::Excluded);
        }

        Self {
            locomotive_brands: brand_specs(LOCOMOTIVE_BRANDS),
            locomotive_models,
            locomotive_series,
            motorcoach_units: MOTORCOACH_UNITS.iter().map(|unit| unit.to_string()).collect(),
            railcar_brands: brand_specs(RAILCAR_BRANDS),
            railcar_classes,
            railcar_series,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_series_point_at_declared_entries() {
        let catalog = RollingStockCatalog::default();
        for series in catalog.locomotive_series.values() {
            assert!(
                catalog
                    .locomotive_models
                    .iter()
                    .any(|model| model.code == series.model && model.brand == series.brand),
                "{series:?}"
            );
        }
        for series in catalog.railcar_series.values() {
            if let RailcarSeries::Class { brand, class } = series {
                assert!(
                    catalog
                        .railcar_classes
                        .iter()
                        .any(|spec| &spec.brand == brand && &spec.class == class),
                    "{brand} {class}"
                );
            }
        }
    }

    #[test]
    fn trailing_space_series_and_exclusions() {
        let catalog = RollingStockCatalog::default();
        assert_eq!(
            catalog.locomotive_series("Alco RSD16 "),
            catalog.locomotive_series("Alco RSD16")
        );
        assert_eq!(catalog.railcar_series(""), Some(&RailcarSeries::Excluded));
        assert_eq!(catalog.railcar_series("Tanque?"), Some(&RailcarSeries::Excluded));
        assert!(catalog.railcar_series("Desconocido").is_none());
        assert!(catalog.is_motorcoach("105"));
    }
}
