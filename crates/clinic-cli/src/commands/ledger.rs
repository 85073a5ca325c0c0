use chrono::Datelike;
use clinic_core::enums::{LedgerKind, LedgerStatus};
use clinic_db::repos::ledger::{BillingRequest, LedgerFilter, NewLedgerEntry};
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::LedgerCommands;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::{parse_date, parse_enum, parse_money, parse_month};
use crate::context::AppContext;
use crate::output::output;

/// Handle `clinic ledger`.
pub async fn handle(
    action: &LedgerCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let svc = &ctx.service;
    match action {
        LedgerCommands::Add {
            description,
            amount,
            kind,
            due,
            patient,
            caregiver,
        } => {
            let entry = svc
                .create_ledger_entry(&NewLedgerEntry {
                    description: description.clone(),
                    amount_cents: parse_money(amount, "amount")?,
                    kind: parse_enum::<LedgerKind>(kind, "kind")?,
                    due_date: parse_date(due, "due")?,
                    patient_id: patient.clone(),
                    caregiver_id: caregiver.clone(),
                })
                .await?;
            output(&entry, flags.format)
        }
        LedgerCommands::List {
            kind,
            status,
            month,
            patient,
        } => {
            let filter = LedgerFilter {
                kind: kind
                    .as_deref()
                    .map(|raw| parse_enum::<LedgerKind>(raw, "kind"))
                    .transpose()?,
                status: status
                    .as_deref()
                    .map(|raw| parse_enum::<LedgerStatus>(raw, "status"))
                    .transpose()?,
                month: month.as_deref().map(parse_month).transpose()?,
                patient_id: patient.clone(),
                limit: Some(effective_limit(flags.limit, ctx.default_limit())),
            };
            let entries = svc.list_ledger_entries(&filter).await?;
            output(&json!({ "entries": entries }), flags.format)
        }
        LedgerCommands::Get { id } => output(&svc.get_ledger_entry(id).await?, flags.format),
        LedgerCommands::Settle {
            id,
            method,
            paid_on,
        } => {
            let paid_on = match paid_on {
                Some(raw) => parse_date(raw, "paid-on")?,
                None => ctx.today(),
            };
            output(&svc.settle_ledger_entry(id, paid_on, method).await?, flags.format)
        }
        LedgerCommands::Reverse { id } => output(&svc.reverse_ledger_entry(id).await?, flags.format),
        LedgerCommands::Cancel { id } => output(&svc.cancel_ledger_entry(id).await?, flags.format),
        LedgerCommands::Summary { month } => {
            let (year, month) = match month {
                Some(raw) => parse_month(raw)?,
                None => {
                    let today = ctx.today();
                    (today.year(), today.month())
                }
            };
            output(&svc.ledger_summary(year, month).await?, flags.format)
        }
        LedgerCommands::Bill {
            appointments,
            contract,
            reference,
        } => {
            let outcome = svc
                .bill_sessions(&BillingRequest {
                    appointment_ids: appointments.clone(),
                    contract_id: contract.clone(),
                    reference: reference.clone(),
                    today: ctx.today(),
                })
                .await?;
            tracing::info!(
                entry_id = %outcome.ledger_entry.id,
                sessions = outcome.appointment_ids.len(),
                "billed sessions"
            );
            output(&outcome, flags.format)
        }
    }
}
