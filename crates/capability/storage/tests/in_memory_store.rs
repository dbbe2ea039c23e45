use chrono::NaiveDate;
use domain::{
    Brand, EntryType, Gop, InterventionClass, InterventionType, LegacyRef, Location, LocationKind,
    LocomotiveModel, MaintenanceEvent, MaintenanceUnit, Personnel, Sector, Ticket, TicketDraft,
    TicketStatus, UnitKind, UnitType,
};
use sigma_storage::{
    BrandStore, GopStore, InMemoryStore, InterventionTypeStore, LocationStore,
    MaintenanceEventStore, MaintenanceUnitStore, PersonnelStore, RollingStockModelStore,
    StorageError, TicketFilter, TicketStore, TicketUpdate, UnitFilter, UpsertOutcome,
};

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, day).expect("date")
}

async fn seed_locomotive(store: &InMemoryStore, number: &str) -> MaintenanceUnit {
    let brand = match store.find_brand_by_code("GM").await.expect("find brand") {
        Some(brand) => brand,
        None => store
            .create_brand(Brand::new("GM", "GM").with_full_name("General Motors"))
            .await
            .expect("brand"),
    };
    let model = match store
        .find_locomotive_model_by_code("GT22-CW")
        .await
        .expect("find model")
    {
        Some(model) => model,
        None => store
            .create_locomotive_model(LocomotiveModel::new("GT22-CW", "GT22-CW", brand.id))
            .await
            .expect("model"),
    };
    store
        .create_unit(MaintenanceUnit::new(
            number,
            UnitKind::Locomotive {
                brand_id: brand.id,
                model_id: model.id,
            },
        ))
        .await
        .expect("unit")
}

#[tokio::test]
async fn duplicate_codes_conflict() {
    let store = InMemoryStore::new();
    store.create_brand(Brand::new("GM", "GM")).await.expect("create");
    let err = store
        .create_brand(Brand::new("GM", "Otro"))
        .await
        .expect_err("duplicate");
    assert!(err.is_conflict());

    seed_locomotive(&store, "9001").await;
    let err = store
        .create_unit(MaintenanceUnit::new(
            "9001",
            UnitKind::Motorcoach {
                brand_id: uuid::Uuid::new_v4(),
                configuration: "CM".to_string(),
                car_count: 1,
            },
        ))
        .await
        .expect_err("duplicate unit");
    assert!(matches!(err, StorageError::Conflict(_)));
}

#[tokio::test]
async fn personnel_natural_key_includes_sector() {
    let store = InMemoryStore::new();
    store
        .create_personnel(Personnel::new("1001", "Juan Pérez", Sector::Locomotives))
        .await
        .expect("create");
    store
        .create_personnel(Personnel::new("1001", "Juan Pérez", Sector::TowedRailcars))
        .await
        .expect("same employee, other sector");

    let found = store
        .find_personnel_by_employee("1001", Sector::TowedRailcars)
        .await
        .expect("find");
    assert!(found.is_some());
    assert_eq!(store.list_personnel(None).await.expect("list").len(), 2);
}

#[tokio::test]
async fn location_upsert_keeps_single_row() {
    let store = InMemoryStore::new();
    let (first, outcome) = store
        .upsert_location(Location::new(10, "Taller X"))
        .await
        .expect("insert");
    assert_eq!(outcome, UpsertOutcome::Created);

    let mut renamed = Location::new(10, "Taller X renamed");
    renamed.kind = Some(LocationKind::Workshop);
    let (second, outcome) = store.upsert_location(renamed).await.expect("update");
    assert_eq!(outcome, UpsertOutcome::Updated);
    assert_eq!(second.id, first.id);

    let all = store.list_locations().await.expect("list");
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].description, "Taller X renamed");
    assert_eq!(all[0].kind, Some(LocationKind::Workshop));
}

#[tokio::test]
async fn intervention_upsert_updates_class() {
    let store = InMemoryStore::new();
    store
        .upsert_intervention_type(InterventionType::new(
            "R1",
            "Revisión",
            InterventionClass::Unclassified,
        ))
        .await
        .expect("insert");
    let (updated, outcome) = store
        .upsert_intervention_type(InterventionType::new("R1", "Revisión 1", InterventionClass::Review))
        .await
        .expect("update");
    assert_eq!(outcome, UpsertOutcome::Updated);
    assert_eq!(updated.class, InterventionClass::Review);
    assert_eq!(store.list_intervention_types().await.expect("list").len(), 1);
}

#[tokio::test]
async fn referenced_unit_cannot_be_deleted() {
    let store = InMemoryStore::new();
    let unit = seed_locomotive(&store, "9001").await;
    let spare = seed_locomotive(&store, "9002").await;
    let mut event = MaintenanceEvent::new(LegacyRef::Resolved(unit.id), date(1));
    event.is_legacy = true;
    store.insert_events(vec![event]).await.expect("events");

    let err = store.delete_unit(unit.id).await.expect_err("referenced");
    assert!(matches!(err, StorageError::Referenced(_)));
    assert!(store.delete_unit(spare.id).await.expect("delete"));
    assert!(!store.delete_unit(spare.id).await.expect("already gone"));

    let brand = store.find_brand_by_code("GM").await.expect("find").expect("brand");
    let err = store.delete_brand(brand.id).await.expect_err("brand in use");
    assert!(matches!(err, StorageError::Referenced(_)));
}

#[tokio::test]
async fn unit_filter_and_toggle() {
    let store = InMemoryStore::new();
    let unit = seed_locomotive(&store, "9001").await;
    seed_locomotive(&store, "9002").await;

    let toggled = store
        .set_unit_active(unit.id, false)
        .await
        .expect("toggle")
        .expect("exists");
    assert!(!toggled.is_active);

    let active = store
        .list_units(UnitFilter {
            unit_type: Some(UnitType::Locomotive),
            active_only: true,
        })
        .await
        .expect("list");
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].number, "9002");

    let railcars = store
        .list_units(UnitFilter {
            unit_type: Some(UnitType::Railcar),
            active_only: false,
        })
        .await
        .expect("list");
    assert!(railcars.is_empty());
}

#[tokio::test]
async fn ticket_filters_counts_and_updates() {
    let store = InMemoryStore::new();
    let unit = seed_locomotive(&store, "9001").await;
    let gop = store.create_gop(Gop::new("TY", "Guardia Temperley")).await.expect("gop");

    let first = Ticket::from_draft(
        TicketDraft::new(date(2), unit.id, gop.id, EntryType::Immediate, "Sin tracción"),
        "2025-0001".to_string(),
    );
    let second = Ticket::from_draft(
        TicketDraft::new(date(9), unit.id, gop.id, EntryType::Scheduled, "Bocina"),
        "2025-0002".to_string(),
    );
    store.create_ticket(first.clone()).await.expect("first");
    store.create_ticket(second.clone()).await.expect("second");
    assert!(
        store
            .create_ticket(Ticket::from_draft(
                TicketDraft::new(date(9), unit.id, gop.id, EntryType::NoEntry, "dup"),
                "2025-0002".to_string(),
            ))
            .await
            .expect_err("duplicate number")
            .is_conflict()
    );

    assert!(
        store
            .save_ticket_status(first.id, TicketStatus::Completed)
            .await
            .expect("status")
    );
    let counts = store.count_tickets_by_status().await.expect("counts");
    assert_eq!((counts.pending, counts.completed, counts.total()), (1, 1, 2));

    let all = store.list_tickets(TicketFilter::default()).await.expect("list");
    assert_eq!(all[0].number, "2025-0002");

    let scheduled = store
        .list_tickets(TicketFilter {
            entry_type: Some(EntryType::Scheduled),
            date_from: Some(date(5)),
            ..TicketFilter::default()
        })
        .await
        .expect("filtered");
    assert_eq!(scheduled.len(), 1);
    assert_eq!(scheduled[0].id, second.id);

    let updated = store
        .update_ticket(
            first.id,
            TicketUpdate {
                observations: Some(Some("Cambio de filtro".to_string())),
                ..TicketUpdate::default()
            },
        )
        .await
        .expect("update")
        .expect("exists");
    assert_eq!(updated.observations.as_deref(), Some("Cambio de filtro"));
    assert_eq!(updated.status, TicketStatus::Completed);

    let cleared = store
        .update_ticket(
            first.id,
            TicketUpdate {
                observations: Some(None),
                ..TicketUpdate::default()
            },
        )
        .await
        .expect("clear")
        .expect("exists");
    assert_eq!(cleared.observations, None);
    assert_eq!(cleared.failure_description, updated.failure_description);

    let numbers = store.list_ticket_numbers("2025-").await.expect("numbers");
    assert_eq!(numbers.len(), 2);
}

#[tokio::test]
async fn reads_do_not_count_as_writes() {
    let store = InMemoryStore::new();
    store.list_units(UnitFilter::default()).await.expect("list");
    store.find_location_by_code(1).await.expect("find");
    store.list_legacy_events().await.expect("events");
    assert_eq!(store.write_count(), 0);

    store.upsert_location(Location::new(1, "Plaza")).await.expect("upsert");
    assert_eq!(store.write_count(), 1);
}
