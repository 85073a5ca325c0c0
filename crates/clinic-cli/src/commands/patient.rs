use clinic_db::repos::patient::{NewCaregiver, NewPatient};
use clinic_db::updates::patient::PatientUpdateBuilder;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::PatientCommands;
use crate::cli::subcommands::patient::{AnamnesisArgs, CaregiverArgs, PatientUpdateArgs};
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::{clearable, parse_date, parse_money};
use crate::context::AppContext;
use crate::output::output;

/// Handle `clinic patient`.
pub async fn handle(
    action: &PatientCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let svc = &ctx.service;
    match action {
        PatientCommands::Create {
            name,
            birth_date,
            notes,
            fee,
        } => {
            let patient = svc
                .create_patient(&NewPatient {
                    name: name.clone(),
                    birth_date: parse_date(birth_date, "birth date")?,
                    notes: notes.clone(),
                    default_session_fee_cents: fee
                        .as_deref()
                        .map(|raw| parse_money(raw, "fee"))
                        .transpose()?,
                })
                .await?;
            output(&patient, flags.format)
        }
        PatientCommands::Get { id } => output(&svc.get_patient(id).await?, flags.format),
        PatientCommands::List { all } => {
            let limit = effective_limit(flags.limit, ctx.default_limit());
            let active = (!all).then_some(true);
            let patients = svc.list_patients(active, limit).await?;
            output(&json!({ "patients": patients }), flags.format)
        }
        PatientCommands::Update(args) => update(args, ctx, flags).await,
        PatientCommands::Delete { id } => {
            svc.delete_patient(id).await?;
            output(&json!({ "deleted": id }), flags.format)
        }
        PatientCommands::Anamnesis { id } => output(&svc.get_anamnesis(id).await?, flags.format),
        PatientCommands::SetAnamnesis(args) => set_anamnesis(args, ctx, flags).await,
        PatientCommands::AddCaregiver(args) => add_caregiver(args, ctx, flags).await,
        PatientCommands::Caregivers { id } => {
            let caregivers = svc.list_patient_caregivers(id).await?;
            output(&json!({ "caregivers": caregivers }), flags.format)
        }
        PatientCommands::RemoveCaregiver { id, caregiver } => {
            svc.remove_caregiver(id, caregiver).await?;
            output(
                &json!({ "patient_id": id, "removed_caregiver_id": caregiver }),
                flags.format,
            )
        }
        PatientCommands::Link { id, therapist } => {
            svc.link_therapist(id, therapist).await?;
            output(
                &json!({ "patient_id": id, "therapist_id": therapist, "linked": true }),
                flags.format,
            )
        }
        PatientCommands::Unlink { id, therapist } => {
            svc.unlink_therapist(id, therapist).await?;
            output(
                &json!({ "patient_id": id, "therapist_id": therapist, "linked": false }),
                flags.format,
            )
        }
        PatientCommands::Therapists { id } => {
            let therapists = svc.list_patient_therapists(id).await?;
            output(&json!({ "therapists": therapists }), flags.format)
        }
        PatientCommands::OfTherapist { therapist } => {
            let patients = svc.list_therapist_patients(therapist).await?;
            output(&json!({ "patients": patients }), flags.format)
        }
    }
}

async fn update(args: &PatientUpdateArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut builder = PatientUpdateBuilder::new();
    if let Some(name) = &args.name {
        builder = builder.name(name.as_str());
    }
    if let Some(raw) = &args.birth_date {
        builder = builder.birth_date(parse_date(raw, "birth date")?);
    }
    if let Some(notes) = clearable(args.notes.as_ref()) {
        builder = builder.notes(notes);
    }
    if let Some(fee) = clearable(args.fee.as_ref()) {
        let cents = fee.as_deref().map(|raw| parse_money(raw, "fee")).transpose()?;
        builder = builder.default_session_fee_cents(cents);
    }
    if args.activate {
        builder = builder.active(true);
    } else if args.deactivate {
        builder = builder.active(false);
    }

    let patient = ctx.service.update_patient(&args.id, builder.build()).await?;
    output(&patient, flags.format)
}

/// Omitted flags keep the stored value; an empty flag clears it.
async fn set_anamnesis(args: &AnamnesisArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut anamnesis = ctx.service.get_anamnesis(&args.id).await?;
    let fields = [
        (&mut anamnesis.main_diagnosis, &args.diagnosis),
        (&mut anamnesis.medical_history, &args.history),
        (&mut anamnesis.music_preferences, &args.music),
        (&mut anamnesis.motor_development, &args.motor),
        (&mut anamnesis.sensitivities, &args.sensitivities),
    ];
    for (slot, given) in fields {
        if let Some(value) = clearable(given.as_ref()) {
            *slot = value;
        }
    }

    let saved = ctx.service.upsert_anamnesis(&anamnesis).await?;
    output(&saved, flags.format)
}

async fn add_caregiver(args: &CaregiverArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let link = ctx
        .service
        .add_caregiver(
            &args.id,
            &NewCaregiver {
                name: args.name.clone(),
                tax_id: args.tax_id.clone(),
                phone: args.phone.clone(),
                email: args.email.clone(),
                relationship: args.relationship.clone(),
                is_primary: args.primary,
            },
        )
        .await?;
    output(&link, flags.format)
}
