use super::{CommandResult, Context, print_json};
use crate::cli::{RegisterUnitArgs, UnitCommand};
use domain::{MaintenanceUnit, UnitKind, UnitType};
use sigma_storage::UnitFilter;
use sigma_workflow::{RollingStockRegistry, WorkflowError};

pub async fn run(ctx: &Context, command: UnitCommand) -> CommandResult {
    let registry = RollingStockRegistry::new(ctx.store.clone());
    match command {
        UnitCommand::List {
            unit_type,
            active_only,
        } => {
            let units = registry
                .list_units(UnitFilter {
                    unit_type,
                    active_only,
                })
                .await?;
            if ctx.json {
                return print_json(&units);
            }
            for unit in &units {
                print_unit(unit);
            }
            println!("{} unit(s)", units.len());
            Ok(())
        }
        UnitCommand::Show { number } => {
            let unit = registry
                .find_unit(&number)
                .await?
                .ok_or(WorkflowError::UnitNotFound(number))?;
            output(ctx, &unit)
        }
        UnitCommand::Register(args) => {
            let number = args.number.clone();
            let kind = resolve_kind(ctx, args).await?;
            let unit = registry.register_unit(&number, kind).await?;
            output(ctx, &unit)
        }
        UnitCommand::Activate { number } => {
            let unit = registry.set_active(&number, true).await?;
            output(ctx, &unit)
        }
        UnitCommand::Deactivate { number } => {
            let unit = registry.set_active(&number, false).await?;
            output(ctx, &unit)
        }
        UnitCommand::Delete { number } => {
            registry.delete_unit(&number).await?;
            if !ctx.json {
                println!("unit {number} deleted");
            }
            Ok(())
        }
    }
}

/// 把命令行中的品牌 / 车型 / 类别编码解析为类型扩展。
async fn resolve_kind(ctx: &Context, args: RegisterUnitArgs) -> Result<UnitKind, WorkflowError> {
    let brand = ctx
        .store
        .find_brand_by_code(&args.brand)
        .await?
        .ok_or_else(|| WorkflowError::Invalid(format!("brand not found: {}", args.brand)))?;
    let kind = match args.unit_type {
        UnitType::Locomotive => {
            let code = args
                .model
                .ok_or_else(|| WorkflowError::Invalid("--model is required".to_string()))?;
            let model = ctx
                .store
                .find_locomotive_model_by_code(&code)
                .await?
                .ok_or_else(|| WorkflowError::Invalid(format!("model not found: {code}")))?;
            UnitKind::Locomotive {
                brand_id: brand.id,
                model_id: model.id,
            }
        }
        UnitType::Railcar => {
            let code = args
                .class
                .ok_or_else(|| WorkflowError::Invalid("--class is required".to_string()))?;
            let class = ctx
                .store
                .find_railcar_class_by_code(&code)
                .await?
                .ok_or_else(|| WorkflowError::Invalid(format!("class not found: {code}")))?;
            UnitKind::Railcar {
                brand_id: brand.id,
                class_id: class.id,
            }
        }
        UnitType::Motorcoach => UnitKind::Motorcoach {
            brand_id: brand.id,
            configuration: args.configuration,
            car_count: args.car_count,
        },
    };
    Ok(kind)
}

fn output(ctx: &Context, unit: &MaintenanceUnit) -> CommandResult {
    if ctx.json {
        print_json(unit)
    } else {
        print_unit(unit);
        Ok(())
    }
}

fn print_unit(unit: &MaintenanceUnit) {
    let state = if unit.is_active { "active" } else { "inactive" };
    match &unit.kind {
        UnitKind::Motorcoach {
            configuration,
            car_count,
            ..
        } => println!(
            "{}\t{}\t{}\t{} car(s) {}",
            unit.number,
            unit.unit_type().label(),
            state,
            car_count,
            configuration
        ),
        _ => println!("{}\t{}\t{}", unit.number, unit.unit_type().label(), state),
    }
}
