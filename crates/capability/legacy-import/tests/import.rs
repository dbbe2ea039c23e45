use chrono::NaiveDate;
use domain::{InterventionClass, LegacyRef, LocationKind, UnitKind};
use sigma_legacy_import::catalog::{BrandSpec, LocomotiveModelSpec, LocomotiveSeries};
use sigma_legacy_import::{ImportError, ImportStream, LegacyImporter, RollingStockCatalog};
use sigma_storage::{
    InMemoryStore, InterventionTypeStore, LocationStore, MaintenanceEventStore,
    MaintenanceUnitStore, RollingStockModelStore, SigmaStore,
};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const LUGARES: &str = "Lugar_codigo,Lugar_descripcion,Lugar_shortdesc,Lugar_tipo,Lugar_revision\n\
10,Taller X,-,Taller,Reparacion\n\
11,Dep\u{f3}sito Ca\u{f1}uelas,CA,Dep\u{f3}sito,Alistamiento\n\
12,V\u{ed}a muerta,,Galp\u{f3}n,Pintura\n\
X9,C\u{f3}digo inv\u{e1}lido,,,\n";

const INTERVENCIONES: &str = "Intervencion_tipo,Intervencion_descripcion,Intervencion_clase\n\
RG,Reparaci\u{f3}n general,REV\n\
AV,Aver\u{ed}a,DET\n\
XX,Sin clase,\n";

const INTERVENCIONES_CCRR: &str = "Intervencion_tipo,Intervencion_descripcion,Intervencion_clase\n\
LV,Lavado,OTRA\n\
RG,Reparaci\u{f3}n general CCRR,REV\n";

const LOCOMOTORAS: &str = "Locs,Serie\n\
9001,GT22-CW\n\
9002,G22\n\
105,GT22-CW\n\
9003,Fiat\n\
9001,GT22-CW\n\
,GT22-CW\n";

const COCHES: &str = "Coche,Serie\n\
5001,CPA\n\
5002,Chata\n\
5003,\n\
5004,Misterio\n\
5005,FS Werkspoor\n";

const DETENCIONES: &str = "Locs,Fecha_desde,Fecha_hasta,Intervencion,Lugar,Observaciones,Fecha_est\n\
9001,03/11/2019,05/11/2019,RG,10,Cambio de zapatas,\n\
9001,03/11/2019,,RG,10,repetida,\n\
7777,12/01/2020,,ZZ,99,,\n\
9001,31/02/2020,,RG,10,,\n\
9001,,,RG,10,,\n\
9001,04/11/2019,xx/yy,RG,abc,,20/11/2019\n";

const DETENCIONES_CCRR: &str = "Coche,Fecha_desde,Fecha_hasta,Intervencion,Lugar,Observaciones,Fecha_est\n\
5001,01/02/2021,,LV,11,,\n\
5001,01/02/2021,,LV,11,,\n\
8888,02/02/2021,,LV,,,\n";

fn write_latin1(dir: &Path, name: &str, text: &str) {
    let bytes: Vec<u8> = text
        .chars()
        .map(|ch| u8::try_from(u32::from(ch)).expect("latin-1 char"))
        .collect();
    std::fs::write(dir.join(name), bytes).expect("write file");
}

fn legacy_dir() -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    write_latin1(dir.path(), "Lugares.txt", LUGARES);
    write_latin1(dir.path(), "Intervenciones.txt", INTERVENCIONES);
    write_latin1(dir.path(), "IntervencionesCCRR.txt", INTERVENCIONES_CCRR);
    write_latin1(dir.path(), "Locomotoras.txt", LOCOMOTORAS);
    write_latin1(dir.path(), "Coches.txt", COCHES);
    write_latin1(dir.path(), "Detenciones.txt", DETENCIONES);
    write_latin1(dir.path(), "DetencionesCCRR.txt", DETENCIONES_CCRR);
    dir
}

fn importer(store: &Arc<InMemoryStore>) -> LegacyImporter {
    let dyn_store: Arc<dyn SigmaStore> = store.clone();
    LegacyImporter::new(dyn_store)
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("date")
}

#[tokio::test]
async fn location_rerun_updates_the_same_row() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(InMemoryStore::new());
    let importer = importer(&store);

    write_latin1(
        dir.path(),
        "Lugares.txt",
        "Lugar_codigo,Lugar_descripcion\n10,Taller X\n",
    );
    let first = importer
        .import_stream(dir.path(), ImportStream::Locations, false)
        .await
        .expect("first run");
    assert_eq!((first.created, first.updated), (1, 0));

    write_latin1(
        dir.path(),
        "Lugares.txt",
        "Lugar_codigo,Lugar_descripcion\n10,Taller X renamed\n",
    );
    let second = importer
        .import_stream(dir.path(), ImportStream::Locations, false)
        .await
        .expect("second run");
    assert_eq!((second.created, second.updated), (0, 1));
    assert_eq!(second.to_string(), "Lugares: 0 created, 1 updated, 0 skipped");

    let locations = store.list_locations().await.expect("list");
    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0].description, "Taller X renamed");
}

#[tokio::test]
async fn reference_tables_decode_latin1_and_coerce_enums() {
    let dir = legacy_dir();
    let store = Arc::new(InMemoryStore::new());
    let summary = importer(&store)
        .run(
            dir.path(),
            &[
                ImportStream::Locations,
                ImportStream::Interventions,
                ImportStream::RailcarInterventions,
            ],
            false,
        )
        .await
        .expect("run");
    assert!(summary.is_success());

    let lugares = summary.report(ImportStream::Locations).expect("lugares");
    assert_eq!((lugares.created, lugares.skipped), (3, 1));

    let deposito = store
        .find_location_by_code(11)
        .await
        .expect("find")
        .expect("location 11");
    assert_eq!(deposito.description, "Depósito Cañuelas");
    assert_eq!(deposito.kind, Some(LocationKind::Depot));

    let via = store
        .find_location_by_code(12)
        .await
        .expect("find")
        .expect("location 12");
    assert_eq!((via.kind, via.revision, via.short_code), (None, None, None));

    // 两个干预类型文件写入同一张表，RG 被第二个文件更新
    let ccrr = summary
        .report(ImportStream::RailcarInterventions)
        .expect("ccrr");
    assert_eq!((ccrr.created, ccrr.updated), (1, 1));
    assert_eq!(store.list_intervention_types().await.expect("list").len(), 4);

    let lavado = store
        .find_intervention_type_by_code("LV")
        .await
        .expect("find")
        .expect("LV");
    assert_eq!(lavado.class, InterventionClass::Unclassified);
    let rg = store
        .find_intervention_type_by_code("RG")
        .await
        .expect("find")
        .expect("RG");
    assert_eq!(rg.class, InterventionClass::Review);
    assert_eq!(rg.description, "Reparación general CCRR");
}

#[tokio::test]
async fn locomotive_import_skips_existing_and_excluded_units() {
    let dir = legacy_dir();
    let store = Arc::new(InMemoryStore::new());
    let importer = importer(&store);

    let first = importer
        .import_stream(dir.path(), ImportStream::Locomotives, false)
        .await
        .expect("first run");
    assert_eq!(first.created, 2);
    assert_eq!(first.already_exists, 1);
    assert_eq!(first.excluded, 1);
    assert_eq!(first.unmapped, 1);
    assert_eq!(first.skipped, 1);
    assert_eq!(
        first.to_string(),
        "Locomotoras: 2 created, 1 already exist, 1 motorcoaches excluded, 2 errors"
    );

    let unit = store
        .find_unit_by_number("9001")
        .await
        .expect("find")
        .expect("9001");
    let model = store
        .find_locomotive_model_by_code("GT22-CW")
        .await
        .expect("find")
        .expect("model");
    match unit.kind {
        UnitKind::Locomotive { model_id, brand_id } => {
            assert_eq!(model_id, model.id);
            assert_eq!(brand_id, model.brand_id);
        }
        other => panic!("unexpected kind {other:?}"),
    }
    assert!(store.find_unit_by_number("105").await.expect("find").is_none());

    let second = importer
        .import_stream(dir.path(), ImportStream::Locomotives, false)
        .await
        .expect("second run");
    assert_eq!(second.created, 0);
    assert_eq!(second.already_exists, 3);
    assert_eq!(
        store
            .list_units(Default::default())
            .await
            .expect("units")
            .len(),
        2
    );
}

#[tokio::test]
async fn railcar_import_separates_freight_from_unknown_series() {
    let dir = legacy_dir();
    let store = Arc::new(InMemoryStore::new());
    let report = importer(&store)
        .import_stream(dir.path(), ImportStream::Railcars, false)
        .await
        .expect("run");
    assert_eq!(report.created, 2);
    assert_eq!(report.excluded, 2);
    assert_eq!(report.unmapped, 1);
    assert_eq!(
        report.to_string(),
        "Coches: 2 created, 0 already exist, 2 cargo wagons skipped, 1 errors"
    );

    let werkspoor = store
        .find_railcar_class_by_code("Werkspoor_FS")
        .await
        .expect("find")
        .expect("class");
    let unit = store
        .find_unit_by_number("5005")
        .await
        .expect("find")
        .expect("5005");
    assert!(matches!(
        unit.kind,
        UnitKind::Railcar { class_id, .. } if class_id == werkspoor.id
    ));
    // 货车类别依然随目录创建
    assert!(
        store
            .find_railcar_class_by_code("Carga_Chata")
            .await
            .expect("find")
            .is_some()
    );
}

#[tokio::test]
async fn event_import_dedups_and_keeps_legacy_codes() {
    let dir = legacy_dir();
    let store = Arc::new(InMemoryStore::new());
    let importer = importer(&store).with_batch_size(2);
    let streams = [
        ImportStream::Locations,
        ImportStream::Interventions,
        ImportStream::Locomotives,
        ImportStream::Events,
    ];

    let summary = importer.run(dir.path(), &streams, false).await.expect("run");
    let events = summary.report(ImportStream::Events).expect("events");
    assert_eq!(events.created, 3);
    assert_eq!(events.duplicates, 1);
    assert_eq!(events.skipped, 2);
    assert_eq!(events.batches, 2);
    assert_eq!(store.count_events().await.expect("count"), 3);

    let unit = store
        .find_unit_by_number("9001")
        .await
        .expect("find")
        .expect("9001");
    let for_unit = store.list_events_for_unit(unit.id).await.expect("events");
    assert_eq!(for_unit.len(), 2);
    let later = for_unit
        .iter()
        .find(|event| event.date_from == date(2019, 11, 4))
        .expect("event of 04/11/2019");
    assert_eq!(later.date_to, None);
    assert_eq!(later.estimated_date, Some(date(2019, 11, 20)));
    assert_eq!(later.location, LegacyRef::Absent);
    assert!(later.intervention.is_resolved());

    let legacy = store.list_legacy_events().await.expect("legacy");
    let orphan = legacy
        .iter()
        .find(|event| event.unit == LegacyRef::Legacy("7777".to_string()))
        .expect("orphan event");
    assert_eq!(orphan.intervention, LegacyRef::Legacy("ZZ".to_string()));
    assert_eq!(orphan.location, LegacyRef::Legacy(99));

    let rerun = importer
        .import_stream(dir.path(), ImportStream::Events, false)
        .await
        .expect("rerun");
    assert_eq!((rerun.created, rerun.duplicates, rerun.skipped), (0, 4, 2));
    assert_eq!(store.count_events().await.expect("count"), 3);
}

#[tokio::test]
async fn railcar_events_are_deduplicated_too() {
    let dir = legacy_dir();
    let store = Arc::new(InMemoryStore::new());
    let summary = importer(&store)
        .run(dir.path(), &ImportStream::ALL_CCRR, false)
        .await
        .expect("run");
    let events = summary
        .report(ImportStream::RailcarEvents)
        .expect("ccrr events");
    assert_eq!((events.created, events.duplicates), (2, 1));
    assert_eq!(
        events.to_string(),
        "Detenciones CCRR: 2 created, 0 skipped, 1 duplicates"
    );

    let unit = store
        .find_unit_by_number("5001")
        .await
        .expect("find")
        .expect("5001");
    let for_unit = store.list_events_for_unit(unit.id).await.expect("events");
    assert_eq!(for_unit.len(), 1);
    // 本次没有导入地点，编码 11 保留为遗留编码
    assert_eq!(for_unit[0].location, LegacyRef::Legacy(11));
}

#[tokio::test]
async fn dry_run_reports_real_counts_without_writing() {
    let dir = legacy_dir();
    let streams: Vec<ImportStream> = ImportStream::ORDER.to_vec();

    let dry_store = Arc::new(InMemoryStore::new());
    let dry = importer(&dry_store)
        .run(dir.path(), &streams, true)
        .await
        .expect("dry run");
    assert_eq!(dry_store.write_count(), 0);
    assert!(dry.dry_run);

    let real_store = Arc::new(InMemoryStore::new());
    let real = importer(&real_store)
        .run(dir.path(), &streams, false)
        .await
        .expect("real run");
    assert!(real_store.write_count() > 0);

    let counts = |summary: &sigma_legacy_import::ImportSummary| {
        summary
            .reports
            .iter()
            .map(|report| {
                (
                    report.stream,
                    (
                        report.rows,
                        report.created,
                        report.updated,
                        report.skipped,
                        report.already_exists,
                        report.excluded,
                        report.unmapped,
                        report.duplicates,
                    ),
                )
            })
            .collect::<HashMap<_, _>>()
    };
    assert_eq!(counts(&dry), counts(&real));
}

#[tokio::test]
async fn missing_file_fails_only_that_stream() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_latin1(dir.path(), "Lugares.txt", "Lugar_codigo,Lugar_descripcion\n1,Plaza\n");
    let store = Arc::new(InMemoryStore::new());
    let importer = importer(&store);

    let summary = importer
        .run(
            dir.path(),
            &[ImportStream::Interventions, ImportStream::Locations],
            false,
        )
        .await
        .expect("run");
    assert!(!summary.is_success());
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].stream, ImportStream::Interventions);
    // 执行顺序固定：lugares 先于 intervenciones
    let order: Vec<ImportStream> = summary.reports.iter().map(|report| report.stream).collect();
    assert_eq!(order, vec![ImportStream::Locations]);

    let err = importer
        .import_stream(dir.path(), ImportStream::Events, false)
        .await
        .expect_err("missing file");
    assert!(matches!(err, ImportError::MissingFile(_)));

    let err = importer
        .run(&dir.path().join("nope"), &ImportStream::ALL, false)
        .await
        .expect_err("missing dir");
    assert!(matches!(err, ImportError::MissingDirectory(_)));
}

#[tokio::test]
async fn injected_catalog_replaces_series_tables() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_latin1(dir.path(), "Locomotoras.txt", "Locs,Serie\nT1,Serie X\nT2,GT22-CW\n");

    let catalog = RollingStockCatalog {
        locomotive_brands: vec![BrandSpec {
            code: "TST".to_string(),
            full_name: "Fabricante de prueba".to_string(),
        }],
        locomotive_models: vec![LocomotiveModelSpec {
            code: "X1".to_string(),
            name: "Modelo X1".to_string(),
            brand: "TST".to_string(),
        }],
        locomotive_series: HashMap::from([(
            "Serie X".to_string(),
            LocomotiveSeries {
                brand: "TST".to_string(),
                model: "X1".to_string(),
            },
        )]),
        motorcoach_units: HashSet::new(),
        railcar_brands: Vec::new(),
        railcar_classes: Vec::new(),
        railcar_series: HashMap::new(),
    };

    let store = Arc::new(InMemoryStore::new());
    let report = importer(&store)
        .with_catalog(catalog)
        .import_stream(dir.path(), ImportStream::Locomotives, false)
        .await
        .expect("run");
    assert_eq!((report.created, report.unmapped), (1, 1));
    assert!(
        store
            .find_locomotive_model_by_code("X1")
            .await
            .expect("find")
            .is_some()
    );
    assert!(
        store
            .find_locomotive_model_by_code("GT22-CW")
            .await
            .expect("find")
            .is_none()
    );
}
