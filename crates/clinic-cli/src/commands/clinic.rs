use clinic_core::enums::SubscriptionStatus;
use clinic_db::repos::clinic::NewClinic;
use clinic_db::updates::clinic::ClinicUpdateBuilder;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ClinicCommands;
use crate::cli::subcommands::clinic::ClinicUpdateArgs;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::{clearable, parse_enum};
use crate::context::AppContext;
use crate::output::output;

/// Handle `clinic clinic`.
pub async fn handle(
    action: &ClinicCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let svc = &ctx.service;
    match action {
        ClinicCommands::Create {
            legal_name,
            trade_name,
            max_therapists,
            plan,
        } => {
            let mut new = NewClinic::named(legal_name.as_str());
            new.trade_name.clone_from(trade_name);
            new.plan.clone_from(plan);
            if let Some(max) = max_therapists {
                new.max_therapists = *max;
            }
            output(&svc.create_clinic(&new).await?, flags.format)
        }
        ClinicCommands::Get { id } => {
            let clinic = match id {
                Some(id) => svc.get_clinic(id).await?,
                None => svc.current_clinic().await?,
            };
            output(&clinic, flags.format)
        }
        ClinicCommands::List => {
            let limit = effective_limit(flags.limit, ctx.default_limit());
            let clinics = svc.list_clinics(limit).await?;
            output(&json!({ "clinics": clinics }), flags.format)
        }
        ClinicCommands::Update(args) => update(args, ctx, flags).await,
    }
}

async fn update(args: &ClinicUpdateArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut builder = ClinicUpdateBuilder::new();
    if let Some(legal_name) = &args.legal_name {
        builder = builder.legal_name(legal_name.as_str());
    }
    if let Some(value) = clearable(args.trade_name.as_ref()) {
        builder = builder.trade_name(value);
    }
    if let Some(value) = clearable(args.tax_id.as_ref()) {
        builder = builder.tax_id(value);
    }
    if let Some(value) = clearable(args.address.as_ref()) {
        builder = builder.address(value);
    }
    if let Some(value) = clearable(args.city.as_ref()) {
        builder = builder.city(value);
    }
    if let Some(value) = clearable(args.state.as_ref()) {
        builder = builder.state(value);
    }
    if let Some(value) = clearable(args.mission.as_ref()) {
        builder = builder.mission(value);
    }
    if let Some(raw) = &args.subscription {
        builder = builder.subscription_status(parse_enum::<SubscriptionStatus>(raw, "subscription")?);
    }
    if let Some(value) = clearable(args.plan.as_ref()) {
        builder = builder.plan(value);
    }
    if let Some(max) = args.max_therapists {
        builder = builder.max_therapists(max);
    }

    let clinic = ctx.service.update_clinic(&args.id, builder.build()).await?;
    output(&clinic, flags.format)
}
