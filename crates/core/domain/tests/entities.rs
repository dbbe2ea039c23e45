use chrono::NaiveDate;
use domain::{
    EntryType, InterventionClass, LocationKind, LocationRevision, MaintenanceUnit, Sector, Ticket,
    TicketDraft, TicketNumber, TicketStatus, UnitKind, UnitType,
};
use uuid::Uuid;

fn draft() -> TicketDraft {
    TicketDraft::new(
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
        Uuid::new_v4(),
        Uuid::new_v4(),
        EntryType::Immediate,
        "Pérdida de aceite",
    )
}

#[test]
fn first_ticket_of_year_is_one() {
    let next = TicketNumber::next_for_year(2025, std::iter::empty()).expect("next");
    assert_eq!(next.to_string(), "2025-0001");
}

#[test]
fn next_ticket_follows_year_maximum() {
    let existing = ["2025-0047", "2025-0003", "2024-0999", "manual-7"];
    let next = TicketNumber::next_for_year(2025, existing.iter().copied()).expect("next");
    assert_eq!(next.to_string(), "2025-0048");
}

#[test]
fn next_ticket_is_none_when_sequence_is_exhausted() {
    let existing = ["2025-4294967295", "2026-0001"];
    assert!(TicketNumber::next_for_year(2025, existing.iter().copied()).is_none());
    let next = TicketNumber::next_for_year(2026, existing.iter().copied()).expect("next");
    assert_eq!(next.to_string(), "2026-0002");
}

#[test]
fn ticket_completes_once() {
    let mut ticket = Ticket::from_draft(draft(), "2025-0001".to_string());
    assert_eq!(ticket.status, TicketStatus::Pending);
    assert!(ticket.complete());
    assert!(ticket.is_completed());
    assert!(!ticket.complete());
    assert_eq!(ticket.status, TicketStatus::Completed);
}

#[test]
fn unit_type_follows_extension() {
    let brand_id = Uuid::new_v4();
    let loco = MaintenanceUnit::new(
        "9001",
        UnitKind::Locomotive {
            brand_id,
            model_id: Uuid::new_v4(),
        },
    );
    let motorcoach = MaintenanceUnit::new(
        "105",
        UnitKind::Motorcoach {
            brand_id,
            configuration: "CM".to_string(),
            car_count: 1,
        },
    );

    assert_eq!(loco.unit_type(), UnitType::Locomotive);
    assert_eq!(loco.kind.brand_id(), brand_id);
    assert_eq!(loco.to_string(), "Locomotora 9001");
    assert_eq!(motorcoach.unit_type(), UnitType::Motorcoach);
    assert!(loco.is_active);
}

#[test]
fn unit_type_codes_and_labels() {
    assert_eq!("coche_remolcado".parse::<UnitType>(), Ok(UnitType::Railcar));
    assert_eq!(UnitType::from_label("Coche Motor"), Some(UnitType::Motorcoach));
    assert!("vagon".parse::<UnitType>().is_err());
}

#[test]
fn unknown_enum_values_fall_back() {
    assert_eq!(InterventionClass::from_legacy("REV"), InterventionClass::Review);
    assert_eq!(InterventionClass::from_legacy("xyz"), InterventionClass::Unclassified);
    assert_eq!(InterventionClass::from_legacy(""), InterventionClass::Unclassified);
    assert_eq!("Depósito".parse::<LocationKind>(), Ok(LocationKind::Depot));
    assert!("Galpón".parse::<LocationKind>().is_err());
    assert_eq!("-".parse::<LocationRevision>(), Ok(LocationRevision::NotApplicable));
}

#[test]
fn sector_labels() {
    assert_eq!(Sector::from_label("Locomotoras"), Some(Sector::Locomotives));
    assert_eq!(Sector::from_label(" Coches Remolcados "), Some(Sector::TowedRailcars));
    assert_eq!(Sector::from_label("Talleres"), None);
}
