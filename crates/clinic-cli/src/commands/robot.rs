use clinic_core::enums::{MaintenanceKind, MaintenanceStatus};
use clinic_db::repos::maintenance::{MaintenanceFilter, NewMaintenanceOrder};
use clinic_db::repos::robot::NewRobot;
use clinic_db::updates::maintenance::MaintenanceUpdateBuilder;
use clinic_db::updates::robot::RobotUpdateBuilder;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::{MaintenanceCommands, RobotCommands};
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::{clearable, parse_enum, parse_money};
use crate::context::AppContext;
use crate::output::output;

/// Handle `clinic robot`.
pub async fn handle(
    action: &RobotCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let svc = &ctx.service;
    match action {
        RobotCommands::Register {
            mac,
            name,
            model,
            serial,
            clinic,
        } => {
            let robot = svc
                .register_robot(&NewRobot {
                    mac_address: mac.clone(),
                    name: name.clone(),
                    hardware_model: model.clone(),
                    serial_number: serial.clone(),
                    clinic_id: clinic.clone(),
                })
                .await?;
            output(&robot, flags.format)
        }
        RobotCommands::List => {
            let limit = effective_limit(flags.limit, ctx.default_limit());
            let robots = svc.list_robots(limit).await?;
            output(&json!({ "robots": robots }), flags.format)
        }
        RobotCommands::Get { id } => output(&svc.get_robot(id).await?, flags.format),
        RobotCommands::Update {
            id,
            name,
            model,
            serial,
            status,
            clinic,
        } => {
            let mut builder = RobotUpdateBuilder::new();
            if let Some(name) = name {
                builder = builder.name(name.as_str());
            }
            if let Some(model) = clearable(model.as_ref()) {
                builder = builder.hardware_model(model);
            }
            if let Some(serial) = clearable(serial.as_ref()) {
                builder = builder.serial_number(serial);
            }
            if let Some(status) = clearable(status.as_ref()) {
                builder = builder.operational_status(status);
            }
            if let Some(clinic) = clearable(clinic.as_ref()) {
                builder = builder.clinic_id(clinic);
            }
            output(&svc.update_robot(id, builder.build()).await?, flags.format)
        }
        RobotCommands::Block { id } => output(&svc.set_robot_blocked(id, true).await?, flags.format),
        RobotCommands::Unblock { id } => {
            output(&svc.set_robot_blocked(id, false).await?, flags.format)
        }
        RobotCommands::Maintenance { action } => handle_maintenance(action, ctx, flags).await,
    }
}

async fn handle_maintenance(
    action: &MaintenanceCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let svc = &ctx.service;
    match action {
        MaintenanceCommands::Open {
            robot,
            kind,
            defect,
            no_hold,
        } => {
            let order = svc
                .open_maintenance_order(&NewMaintenanceOrder {
                    robot_id: robot.clone(),
                    kind: parse_enum::<MaintenanceKind>(kind, "kind")?,
                    reported_defect: defect.clone(),
                    hold_robot: !no_hold,
                })
                .await?;
            output(&order, flags.format)
        }
        MaintenanceCommands::List { active, status } => {
            let which = match status {
                Some(raw) => MaintenanceFilter::Status(parse_enum::<MaintenanceStatus>(raw, "status")?),
                None if *active => MaintenanceFilter::Active,
                None => MaintenanceFilter::All,
            };
            let limit = effective_limit(flags.limit, ctx.default_limit());
            let orders = svc.list_maintenance_orders(which, limit).await?;
            output(&json!({ "maintenance_orders": orders }), flags.format)
        }
        MaintenanceCommands::Get { id } => output(&svc.get_maintenance_order(id).await?, flags.format),
        MaintenanceCommands::History { robot } => {
            let orders = svc.robot_maintenance_history(robot).await?;
            output(&json!({ "maintenance_orders": orders }), flags.format)
        }
        MaintenanceCommands::Update {
            id,
            status,
            diagnosis,
            solution,
            cost,
            billed,
        } => {
            let mut builder = MaintenanceUpdateBuilder::new();
            if let Some(raw) = status {
                builder = builder.status(parse_enum::<MaintenanceStatus>(raw, "status")?);
            }
            if let Some(diagnosis) = clearable(diagnosis.as_ref()) {
                builder = builder.diagnosis(diagnosis);
            }
            if let Some(solution) = clearable(solution.as_ref()) {
                builder = builder.solution(solution);
            }
            if let Some(raw) = cost {
                builder = builder.total_cost_cents(parse_money(raw, "cost")?);
            }
            if let Some(billed) = billed {
                builder = builder.billed_to_client(*billed);
            }
            output(&svc.update_maintenance_order(id, builder.build()).await?, flags.format)
        }
        MaintenanceCommands::Close { id } => {
            output(&svc.close_maintenance_and_release(id).await?, flags.format)
        }
    }
}
