use super::{CommandResult, Context, print_json};
use crate::cli::{
    TicketCommand, TicketCreateArgs, TicketDetailsArgs, TicketField, TicketListArgs,
    TicketUpdateArgs,
};
use domain::{Sector, Ticket, TicketDraft};
use sigma_storage::{TicketFilter, TicketUpdate, UnitFilter};
use sigma_workflow::{TicketService, WorkflowError};
use std::collections::HashMap;
use uuid::Uuid;

pub async fn run(ctx: &Context, command: TicketCommand) -> CommandResult {
    let service = TicketService::new(ctx.store.clone());
    match command {
        TicketCommand::List(args) => list(ctx, &service, args).await,
        TicketCommand::Show { number } => {
            let ticket = service
                .find_ticket(&number)
                .await?
                .ok_or(WorkflowError::TicketNotFound(number))?;
            output(ctx, &ticket).await
        }
        TicketCommand::Counts => {
            let counts = service.counts().await?;
            if ctx.json {
                return print_json(&counts);
            }
            println!("pendiente: {}", counts.pending);
            println!("finalizado: {}", counts.completed);
            Ok(())
        }
        TicketCommand::Create(args) => {
            let draft = draft_from(ctx, args).await?;
            let ticket = service.create_ticket(draft).await?;
            output(ctx, &ticket).await
        }
        TicketCommand::Complete { number } => {
            let ticket = service.complete_ticket(&number).await?;
            output(ctx, &ticket).await
        }
        TicketCommand::Update(args) => {
            let number = args.number.clone();
            let update = update_from(ctx, args).await?;
            let ticket = service.update_ticket(&number, update).await?;
            output(ctx, &ticket).await
        }
    }
}

async fn list(ctx: &Context, service: &TicketService, args: TicketListArgs) -> CommandResult {
    let gop_id = match args.gop {
        Some(code) => Some(gop_id(ctx, &code).await?),
        None => None,
    };
    let tickets = service
        .list_tickets(TicketFilter {
            status: args.status,
            entry_type: args.entry_type,
            gop_id,
            unit_type: args.unit_type,
            date_from: args.from,
            date_to: args.to,
        })
        .await?;
    if ctx.json {
        return print_json(&tickets);
    }
    let units = unit_numbers(ctx).await?;
    for ticket in &tickets {
        print_ticket(ticket, &units);
    }
    println!("{} ticket(s)", tickets.len());
    Ok(())
}

async fn draft_from(ctx: &Context, args: TicketCreateArgs) -> Result<TicketDraft, WorkflowError> {
    let date = args
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let unit_id = unit_id(ctx, &args.unit).await?;
    let gop_id = gop_id(ctx, &args.gop).await?;
    let mut draft = TicketDraft::new(date, unit_id, gop_id, args.entry_type, args.description);
    draft.number = args.number;

    let details = resolve_details(ctx, args.details).await?;
    draft.work_order = details.work_order.flatten();
    draft.personnel_id = details.personnel_id.flatten();
    draft.train_number_id = details.train_number_id.flatten();
    draft.failure_type_id = details.failure_type_id.flatten();
    draft.affected_system_id = details.affected_system_id.flatten();
    draft.notified_at = details.notified_at.flatten();
    draft.intervened_at = details.intervened_at.flatten();
    draft.delivered_at = details.delivered_at.flatten();
    draft.observations = details.observations.flatten();
    Ok(draft)
}

async fn update_from(ctx: &Context, args: TicketUpdateArgs) -> Result<TicketUpdate, WorkflowError> {
    let mut update = resolve_details(ctx, args.details).await?;
    if let Some(number) = args.unit {
        update.unit_id = Some(unit_id(ctx, &number).await?);
    }
    if let Some(code) = args.gop {
        update.gop_id = Some(gop_id(ctx, &code).await?);
    }
    update.date = args.date;
    update.entry_type = args.entry_type;
    update.failure_description = args.description;
    for field in args.clear {
        clear_field(&mut update, field);
    }
    Ok(update)
}

fn clear_field(update: &mut TicketUpdate, field: TicketField) {
    match field {
        TicketField::WorkOrder => update.work_order = Some(None),
        TicketField::Personnel => update.personnel_id = Some(None),
        TicketField::Train => update.train_number_id = Some(None),
        TicketField::FailureType => update.failure_type_id = Some(None),
        TicketField::AffectedSystem => update.affected_system_id = Some(None),
        TicketField::NotifiedAt => update.notified_at = Some(None),
        TicketField::IntervenedAt => update.intervened_at = Some(None),
        TicketField::DeliveredAt => update.delivered_at = Some(None),
        TicketField::Observations => update.observations = Some(None),
    }
}

/// 把可选字段中的编码解析为 id，结果放在一个只含这些字段的更新里（不清空任何字段）。
async fn resolve_details(
    ctx: &Context,
    details: TicketDetailsArgs,
) -> Result<TicketUpdate, WorkflowError> {
    let mut update = TicketUpdate {
        work_order: details.work_order.map(Some),
        notified_at: details.notified_at.map(Some),
        intervened_at: details.intervened_at.map(Some),
        delivered_at: details.delivered_at.map(Some),
        observations: details.observations.map(Some),
        ..TicketUpdate::default()
    };
    if let Some(employee) = details.personnel {
        update.personnel_id = Some(Some(personnel_id(ctx, &employee, details.sector).await?));
    }
    if let Some(number) = details.train {
        let train = ctx
            .store
            .find_train_number_by_number(&number)
            .await?
            .ok_or_else(|| WorkflowError::Invalid(format!("train number not found: {number}")))?;
        update.train_number_id = Some(Some(train.id));
    }
    if let Some(code) = details.failure_type {
        let failure_type = ctx
            .store
            .find_failure_type_by_code(&code)
            .await?
            .ok_or_else(|| WorkflowError::Invalid(format!("failure type not found: {code}")))?;
        update.failure_type_id = Some(Some(failure_type.id));
    }
    if let Some(code) = details.affected_system {
        let system = ctx
            .store
            .find_affected_system_by_code(&code)
            .await?
            .ok_or_else(|| WorkflowError::Invalid(format!("affected system not found: {code}")))?;
        update.affected_system_id = Some(Some(system.id));
    }
    Ok(update)
}

async fn unit_id(ctx: &Context, number: &str) -> Result<Uuid, WorkflowError> {
    ctx.store
        .find_unit_by_number(number)
        .await?
        .map(|unit| unit.id)
        .ok_or_else(|| WorkflowError::UnitNotFound(number.to_string()))
}

async fn gop_id(ctx: &Context, code: &str) -> Result<Uuid, WorkflowError> {
    ctx.store
        .find_gop_by_code(code)
        .await?
        .map(|gop| gop.id)
        .ok_or_else(|| WorkflowError::GopNotFound(code.to_string()))
}

/// 未指定部门时先查机车部门，再查客车部门。
async fn personnel_id(
    ctx: &Context,
    employee: &str,
    sector: Option<Sector>,
) -> Result<Uuid, WorkflowError> {
    let sectors = match sector {
        Some(sector) => vec![sector],
        None => vec![Sector::Locomotives, Sector::TowedRailcars],
    };
    for sector in sectors {
        if let Some(personnel) = ctx.store.find_personnel_by_employee(employee, sector).await? {
            return Ok(personnel.id);
        }
    }
    Err(WorkflowError::Invalid(format!("personnel not found: {employee}")))
}

async fn unit_numbers(ctx: &Context) -> Result<HashMap<Uuid, String>, WorkflowError> {
    let units = ctx.store.list_units(UnitFilter::default()).await?;
    Ok(units.into_iter().map(|unit| (unit.id, unit.number)).collect())
}

async fn output(ctx: &Context, ticket: &Ticket) -> CommandResult {
    if ctx.json {
        return print_json(ticket);
    }
    let units = unit_numbers(ctx).await?;
    print_ticket(ticket, &units);
    Ok(())
}

fn print_ticket(ticket: &Ticket, units: &HashMap<Uuid, String>) {
    let unit = units
        .get(&ticket.unit_id)
        .map(String::as_str)
        .unwrap_or("?");
    println!(
        "{}\t{}\t{}\t{}\t{}\t{}",
        ticket.number,
        ticket.date,
        ticket.status,
        ticket.entry_type,
        unit,
        ticket.failure_description
    );
}
