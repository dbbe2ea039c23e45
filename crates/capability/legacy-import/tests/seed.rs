use domain::{Sector, UnitKind, UnitType};
use sigma_legacy_import::InitialDataLoader;
use sigma_storage::{
    FailureCatalogStore, GopStore, InMemoryStore, MaintenanceUnitStore, PersonnelStore,
    RollingStockModelStore, SigmaStore, UnitFilter,
};
use std::sync::Arc;

const PERSONAL: &str = "Legajo SAP;Cuit;Nombre y Apellido;Sector;SectorSIMAF\n\
123;20123456789;JUAN PEREZ;Locomotoras;PMRE\n\
124;;ANA GOMEZ;Talleres;PMRE\n";

const UMS: &str = "Unidad de Mantenimiento;Tipo;Marca;Modelo;Clase;Cantidad Coches;Conformaci\u{f3}n\n\
A100;Locomotora;GM;G22-CW;;;\n\
5101;Coche Remolcado;Dalian CNR;;CPA;;\n\
5102;Coche Remolcado;Materfer;;Furgon Unica;;\n\
M1;Coche Motor;Materfer;;;3;CM-R-CM\n\
M2;Coche Motor;Materfer;;;;\n\
B1;Locomotora;Fiat;G22-CW;;;\n";

fn write_latin1(dir: &std::path::Path, name: &str, text: &str) {
    let bytes: Vec<u8> = text
        .chars()
        .map(|ch| u8::try_from(u32::from(ch)).expect("latin-1 char"))
        .collect();
    std::fs::write(dir.join(name), bytes).expect("write file");
}

fn loader(store: &Arc<InMemoryStore>) -> InitialDataLoader {
    let dyn_store: Arc<dyn SigmaStore> = store.clone();
    InitialDataLoader::new(dyn_store)
}

#[tokio::test]
async fn loads_reference_catalog_personnel_and_units() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_latin1(dir.path(), "personal.csv", PERSONAL);
    write_latin1(dir.path(), "ums.csv", UMS);
    let store = Arc::new(InMemoryStore::new());

    let report = loader(&store).load(dir.path()).await.expect("load");
    assert_eq!(report.brands_created, 4);
    assert_eq!(report.gops_created, 6);
    assert_eq!(report.failure_types_created, 8);
    assert_eq!(report.affected_systems_created, 8);
    assert_eq!((report.personnel_created, report.personnel_skipped), (1, 1));
    assert_eq!(report.locomotives_created, 1);
    assert_eq!(report.railcars_created, 2);
    assert_eq!(report.motorcoaches_created, 2);
    assert_eq!(report.units_rejected, 1);

    assert!(!store.list_gops(true).await.expect("gops").is_empty());
    let juan = store
        .find_personnel_by_employee("123", Sector::Locomotives)
        .await
        .expect("find")
        .expect("personnel");
    assert_eq!(juan.full_name, "JUAN PEREZ");
    assert_eq!(juan.tax_id.as_deref(), Some("20123456789"));

    let locomotives = store
        .list_units(UnitFilter {
            unit_type: Some(UnitType::Locomotive),
            active_only: false,
        })
        .await
        .expect("units");
    assert_eq!(locomotives.len(), 1);
    let model = store
        .find_locomotive_model_by_code("G22-CW")
        .await
        .expect("find")
        .expect("model");
    assert!(matches!(
        locomotives[0].kind,
        UnitKind::Locomotive { model_id, .. } if model_id == model.id
    ));

    let furgon = store
        .find_railcar_class_by_code("FURGON_UNICA")
        .await
        .expect("find")
        .expect("class");
    let unit = store
        .find_unit_by_number("5102")
        .await
        .expect("find")
        .expect("5102");
    assert!(matches!(
        unit.kind,
        UnitKind::Railcar { class_id, .. } if class_id == furgon.id
    ));

    let m1 = store.find_unit_by_number("M1").await.expect("find").expect("M1");
    assert!(matches!(
        m1.kind,
        UnitKind::Motorcoach { ref configuration, car_count: 3, .. } if configuration == "CM-R-CM"
    ));
    let m2 = store.find_unit_by_number("M2").await.expect("find").expect("M2");
    assert!(matches!(
        m2.kind,
        UnitKind::Motorcoach { ref configuration, car_count: 1, .. } if configuration == "CM"
    ));

    let ats = store
        .find_affected_system_by_code("ATS")
        .await
        .expect("find")
        .expect("system");
    assert_eq!(ats.name, "ATS");
}

#[tokio::test]
async fn second_load_skips_existing_rows() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_latin1(dir.path(), "personal.csv", PERSONAL);
    write_latin1(dir.path(), "ums.csv", UMS);
    let store = Arc::new(InMemoryStore::new());
    let loader = loader(&store);

    loader.load(dir.path()).await.expect("first load");
    let again = loader.load(dir.path()).await.expect("second load");
    assert_eq!(again.brands_created, 0);
    assert_eq!(again.gops_created, 0);
    assert_eq!(again.personnel_created, 0);
    assert_eq!(again.units_skipped, 5);
    assert_eq!(store.list_units(UnitFilter::default()).await.expect("units").len(), 5);
}

#[tokio::test]
async fn missing_csv_files_only_warn() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(InMemoryStore::new());
    let report = loader(&store).load(dir.path()).await.expect("load");
    assert_eq!(report.gops_created, 6);
    assert_eq!(report.personnel_created, 0);
    assert!(store.list_units(UnitFilter::default()).await.expect("units").is_empty());
}
