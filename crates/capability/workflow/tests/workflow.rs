use chrono::NaiveDate;
use domain::{
    Brand, EntryType, Gop, LegacyRef, LocomotiveModel, MaintenanceEvent, RailcarClass,
    TicketDraft, TicketStatus, UnitKind,
};
use sigma_storage::{
    BrandStore, GopStore, InMemoryStore, MaintenanceEventStore, RollingStockModelStore,
    SigmaStore, TicketFilter, TicketUpdate, UnitFilter,
};
use sigma_workflow::{RollingStockRegistry, TicketService, WorkflowError};
use std::sync::Arc;
use uuid::Uuid;

struct Fixture {
    store: Arc<InMemoryStore>,
    registry: RollingStockRegistry,
    tickets: Arc<TicketService>,
    gm: Brand,
    gt22: LocomotiveModel,
    gop: Gop,
}

async fn fixture() -> Fixture {
    let store = Arc::new(InMemoryStore::new());
    let gm = store.create_brand(Brand::new("GM", "GM")).await.expect("brand");
    let gt22 = store
        .create_locomotive_model(LocomotiveModel::new("GT22-CW", "GT22-CW", gm.id))
        .await
        .expect("model");
    let gop = store
        .create_gop(Gop::new("PMRE", "Playa Mecánica Remedios de Escalada"))
        .await
        .expect("gop");
    let dyn_store: Arc<dyn SigmaStore> = store.clone();
    Fixture {
        registry: RollingStockRegistry::new(dyn_store.clone()),
        tickets: Arc::new(TicketService::new(dyn_store)),
        store,
        gm,
        gt22,
        gop,
    }
}

fn locomotive(fx: &Fixture) -> UnitKind {
    UnitKind::Locomotive {
        brand_id: fx.gm.id,
        model_id: fx.gt22.id,
    }
}

fn draft(unit_id: Uuid, gop_id: Uuid) -> TicketDraft {
    TicketDraft::new(
        NaiveDate::from_ymd_opt(2025, 6, 3).expect("date"),
        unit_id,
        gop_id,
        EntryType::Immediate,
        "Falla de frenos",
    )
}

#[tokio::test]
async fn register_rejects_duplicate_number() {
    let fx = fixture().await;
    let unit = fx.registry.register_unit("9001", locomotive(&fx)).await.expect("register");
    assert_eq!(unit.unit_type(), domain::UnitType::Locomotive);

    let err = fx
        .registry
        .register_unit(" 9001 ", locomotive(&fx))
        .await
        .expect_err("duplicate");
    assert!(matches!(err, WorkflowError::DuplicateUnitNumber(_)));
}

#[tokio::test]
async fn register_checks_model_brand() {
    let fx = fixture().await;
    let cnr = fx.store.create_brand(Brand::new("CNR", "Dalian CNR")).await.expect("brand");
    let err = fx
        .registry
        .register_unit(
            "A801",
            UnitKind::Locomotive {
                brand_id: cnr.id,
                model_id: fx.gt22.id,
            },
        )
        .await
        .expect_err("model from other brand");
    assert!(matches!(err, WorkflowError::Invalid(_)));

    let class = fx
        .store
        .create_railcar_class(RailcarClass::new("CPA", "Coche de Pasajeros A", cnr.id))
        .await
        .expect("class");
    let railcar = fx
        .registry
        .register_unit(
            "5001",
            UnitKind::Railcar {
                brand_id: cnr.id,
                class_id: class.id,
            },
        )
        .await
        .expect("railcar");
    assert_eq!(railcar.kind.brand_id(), cnr.id);
}

#[tokio::test]
async fn toggle_and_delete_units() {
    let fx = fixture().await;
    let unit = fx.registry.register_unit("9001", locomotive(&fx)).await.expect("register");
    fx.registry.register_unit("9002", locomotive(&fx)).await.expect("register");

    let unit_off = fx.registry.set_active("9001", false).await.expect("toggle");
    assert!(!unit_off.is_active);
    let active = fx
        .registry
        .list_units(UnitFilter {
            unit_type: None,
            active_only: true,
        })
        .await
        .expect("list");
    assert_eq!(active.len(), 1);

    fx.store
        .insert_events(vec![MaintenanceEvent::new(
            LegacyRef::Resolved(unit.id),
            NaiveDate::from_ymd_opt(2020, 1, 1).expect("date"),
        )])
        .await
        .expect("event");
    let err = fx.registry.delete_unit("9001").await.expect_err("referenced");
    assert!(matches!(err, WorkflowError::UnitReferenced(_)));

    fx.registry.delete_unit("9002").await.expect("delete");
    assert!(fx.registry.find_unit("9002").await.expect("find").is_none());
}

#[tokio::test]
async fn first_ticket_of_year_and_increment() {
    let fx = fixture().await;
    let unit = fx.registry.register_unit("9001", locomotive(&fx)).await.expect("register");

    let first = fx
        .tickets
        .create_ticket_for_year(draft(unit.id, fx.gop.id), 2025)
        .await
        .expect("first");
    assert_eq!(first.number, "2025-0001");
    assert_eq!(first.status, TicketStatus::Pending);

    let mut manual = draft(unit.id, fx.gop.id);
    manual.number = Some("2025-0047".to_string());
    fx.tickets
        .create_ticket_for_year(manual, 2025)
        .await
        .expect("manual number");

    let next = fx
        .tickets
        .create_ticket_for_year(draft(unit.id, fx.gop.id), 2025)
        .await
        .expect("next");
    assert_eq!(next.number, "2025-0048");

    let other_year = fx
        .tickets
        .create_ticket_for_year(draft(unit.id, fx.gop.id), 2026)
        .await
        .expect("other year");
    assert_eq!(other_year.number, "2026-0001");
}

#[tokio::test]
async fn exhausted_sequence_is_rejected_without_panicking() {
    let fx = fixture().await;
    let unit = fx.registry.register_unit("9001", locomotive(&fx)).await.expect("register");

    let mut manual = draft(unit.id, fx.gop.id);
    manual.number = Some("2025-4294967295".to_string());
    fx.tickets
        .create_ticket_for_year(manual, 2025)
        .await
        .expect("manual number");

    let err = fx
        .tickets
        .create_ticket_for_year(draft(unit.id, fx.gop.id), 2025)
        .await
        .expect_err("sequence exhausted");
    assert!(matches!(err, WorkflowError::Invalid(_)));
    assert!(matches!(
        fx.tickets.next_ticket_number(2025).await,
        Err(WorkflowError::Invalid(_))
    ));

    let other_year = fx
        .tickets
        .create_ticket_for_year(draft(unit.id, fx.gop.id), 2026)
        .await
        .expect("other year");
    assert_eq!(other_year.number, "2026-0001");
}

#[tokio::test]
async fn update_clears_nullable_fields() {
    let fx = fixture().await;
    let unit = fx.registry.register_unit("9001", locomotive(&fx)).await.expect("register");
    let mut with_details = draft(unit.id, fx.gop.id);
    with_details.work_order = Some("OT-17".to_string());
    with_details.observations = Some("Revisar compresor".to_string());
    let ticket = fx
        .tickets
        .create_ticket_for_year(with_details, 2025)
        .await
        .expect("create");

    let cleared = fx
        .tickets
        .update_ticket(
            &ticket.number,
            TicketUpdate {
                work_order: Some(None),
                ..TicketUpdate::default()
            },
        )
        .await
        .expect("clear work order");
    assert_eq!(cleared.work_order, None);
    assert_eq!(cleared.observations.as_deref(), Some("Revisar compresor"));
}

#[tokio::test]
async fn concurrent_creation_allocates_distinct_numbers() {
    let fx = fixture().await;
    let unit = fx.registry.register_unit("9001", locomotive(&fx)).await.expect("register");

    let mut handles = Vec::new();
    for _ in 0..16 {
        let tickets = fx.tickets.clone();
        let draft = draft(unit.id, fx.gop.id);
        handles.push(tokio::spawn(async move {
            tickets.create_ticket_for_year(draft, 2025).await
        }));
    }
    let mut numbers = Vec::new();
    for handle in handles {
        numbers.push(handle.await.expect("join").expect("create").number);
    }
    numbers.sort();
    numbers.dedup();
    assert_eq!(numbers.len(), 16);
    assert_eq!(numbers.last().map(String::as_str), Some("2025-0016"));
}

#[tokio::test]
async fn creation_requires_active_unit_and_gop() {
    let fx = fixture().await;
    let unit = fx.registry.register_unit("9001", locomotive(&fx)).await.expect("register");

    let err = fx
        .tickets
        .create_ticket_for_year(draft(Uuid::new_v4(), fx.gop.id), 2025)
        .await
        .expect_err("missing unit");
    assert!(matches!(err, WorkflowError::UnitNotFound(_)));

    let err = fx
        .tickets
        .create_ticket_for_year(draft(unit.id, Uuid::new_v4()), 2025)
        .await
        .expect_err("missing gop");
    assert!(matches!(err, WorkflowError::GopNotFound(_)));

    fx.registry.set_active("9001", false).await.expect("toggle");
    let err = fx
        .tickets
        .create_ticket_for_year(draft(unit.id, fx.gop.id), 2025)
        .await
        .expect_err("inactive unit");
    assert!(matches!(err, WorkflowError::UnitInactive(_)));
}

#[tokio::test]
async fn complete_once_then_edit() {
    let fx = fixture().await;
    let unit = fx.registry.register_unit("9001", locomotive(&fx)).await.expect("register");
    let ticket = fx
        .tickets
        .create_ticket_for_year(draft(unit.id, fx.gop.id), 2025)
        .await
        .expect("create");

    let done = fx.tickets.complete_ticket(&ticket.number).await.expect("complete");
    assert_eq!(done.status, TicketStatus::Completed);
    let err = fx
        .tickets
        .complete_ticket(&ticket.number)
        .await
        .expect_err("second completion");
    assert!(matches!(err, WorkflowError::AlreadyCompleted(_)));

    let edited = fx
        .tickets
        .update_ticket(
            &ticket.number,
            TicketUpdate {
                work_order: Some(Some("OT-5521".to_string())),
                ..TicketUpdate::default()
            },
        )
        .await
        .expect("edit completed ticket");
    assert_eq!(edited.work_order.as_deref(), Some("OT-5521"));
    assert_eq!(edited.status, TicketStatus::Completed);

    let counts = fx.tickets.counts().await.expect("counts");
    assert_eq!((counts.pending, counts.completed), (0, 1));
    let pending = fx
        .tickets
        .list_tickets(TicketFilter {
            status: Some(TicketStatus::Pending),
            ..TicketFilter::default()
        })
        .await
        .expect("list");
    assert!(pending.is_empty());
}
