use chrono::{DateTime, Duration, Utc};
use clinic_core::enums::{AppointmentStatus, SessionType};
use clinic_db::repos::appointment::{AppointmentFilter, DeleteScope, NewAppointment};
use clinic_db::updates::appointment::AppointmentUpdateBuilder;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::AppointmentCommands;
use crate::cli::subcommands::appointment::{AppointmentCreateArgs, AppointmentUpdateArgs};
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::{clearable, parse_date, parse_datetime, parse_enum, parse_money};
use crate::context::AppContext;
use crate::output::output;

/// Handle `clinic appointment`.
pub async fn handle(
    action: &AppointmentCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let svc = &ctx.service;
    match action {
        AppointmentCommands::Create(args) => create(args, ctx, flags).await,
        AppointmentCommands::List {
            from,
            to,
            patient,
            therapist,
            status,
        } => {
            let filter = AppointmentFilter {
                from: from.as_deref().map(|raw| parse_datetime(raw, "from")).transpose()?,
                to: to.as_deref().map(|raw| parse_datetime(raw, "to")).transpose()?,
                patient_id: patient.clone(),
                therapist_id: therapist.clone(),
                status: status
                    .as_deref()
                    .map(|raw| parse_enum::<AppointmentStatus>(raw, "status"))
                    .transpose()?,
                limit: Some(effective_limit(flags.limit, ctx.default_limit())),
            };
            let appointments = svc.list_appointments(&filter).await?;
            output(&json!({ "appointments": appointments }), flags.format)
        }
        AppointmentCommands::Get { id } => output(&svc.get_appointment(id).await?, flags.format),
        AppointmentCommands::Update(args) => update(args, ctx, flags).await,
        AppointmentCommands::Status { id, status, reason } => {
            let status = parse_enum::<AppointmentStatus>(status, "status")?;
            let appointment = svc
                .set_appointment_status(id, status, reason.as_deref())
                .await?;
            output(&appointment, flags.format)
        }
        AppointmentCommands::Delete { id, future } => {
            let scope = if *future {
                DeleteScope::ThisAndFuture
            } else {
                DeleteScope::Single
            };
            output(&svc.delete_appointment(id, scope).await?, flags.format)
        }
    }
}

async fn create(args: &AppointmentCreateArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let therapist_id = match &args.therapist {
        Some(id) => id.clone(),
        None => ctx.service.require_actor()?.user_id.clone(),
    };
    let starts_at = parse_datetime(&args.start, "start")?;

    let batch = ctx
        .service
        .create_appointments(&NewAppointment {
            patient_id: args.patient.clone(),
            therapist_id,
            room_id: args.room.clone(),
            starts_at,
            ends_at: starts_at + minutes(args.minutes),
            session_type: parse_enum::<SessionType>(&args.session_type, "session type")?,
            notes: args.notes.clone(),
            session_fee_cents: args
                .fee
                .as_deref()
                .map(|raw| parse_money(raw, "fee"))
                .transpose()?,
            repeat_weekly_until: args
                .weekly_until
                .as_deref()
                .map(|raw| parse_date(raw, "weekly-until"))
                .transpose()?,
        })
        .await?;
    output(&batch, flags.format)
}

async fn update(args: &AppointmentUpdateArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut builder = AppointmentUpdateBuilder::new();

    let new_start = args
        .start
        .as_deref()
        .map(|raw| parse_datetime(raw, "start"))
        .transpose()?;
    if new_start.is_some() || args.minutes.is_some() {
        let current = ctx.service.get_appointment(&args.id).await?;
        let (starts_at, ends_at) = reschedule(current.starts_at, current.ends_at, new_start, args.minutes);
        builder = builder.starts_at(starts_at).ends_at(ends_at);
    }

    if let Some(therapist) = &args.therapist {
        builder = builder.therapist_id(therapist.as_str());
    }
    if args.no_room {
        builder = builder.room_id(None);
    } else if let Some(room) = &args.room {
        builder = builder.room_id(Some(room.clone()));
    }
    if let Some(raw) = &args.session_type {
        builder = builder.session_type(parse_enum::<SessionType>(raw, "session type")?);
    }
    if let Some(notes) = clearable(args.notes.as_ref()) {
        builder = builder.notes(notes);
    }
    if let Some(fee) = clearable(args.fee.as_ref()) {
        let cents = fee.as_deref().map(|raw| parse_money(raw, "fee")).transpose()?;
        builder = builder.session_fee_cents(cents);
    }

    let appointment = ctx.service.update_appointment(&args.id, builder.build()).await?;
    output(&appointment, flags.format)
}

fn minutes(count: u32) -> Duration {
    Duration::minutes(i64::from(count))
}

/// New window for a move and/or resize; a move alone keeps the duration.
fn reschedule(
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    new_start: Option<DateTime<Utc>>,
    new_minutes: Option<u32>,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = new_start.unwrap_or(starts_at);
    let duration = new_minutes.map_or(ends_at - starts_at, minutes);
    (start, start + duration)
}
