use clinic_core::enums::{BillingMode, ContractStatus};
use clinic_db::repos::contract::NewContract;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ContractCommands;
use crate::cli::subcommands::contract::ContractCreateArgs;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::{parse_date, parse_enum, parse_money};
use crate::context::AppContext;
use crate::output::output;

/// Handle `clinic contract`.
pub async fn handle(
    action: &ContractCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let svc = &ctx.service;
    match action {
        ContractCommands::Create(args) => {
            let contract = svc.create_contract(&new_contract(args)?).await?;
            output(&contract, flags.format)
        }
        ContractCommands::List { patient, status } => {
            let status = status
                .as_deref()
                .map(|raw| parse_enum::<ContractStatus>(raw, "status"))
                .transpose()?;
            let limit = effective_limit(flags.limit, ctx.default_limit());
            let contracts = svc.list_contracts(patient.as_deref(), status, limit).await?;
            output(&json!({ "contracts": contracts }), flags.format)
        }
        ContractCommands::Get { id } => output(&svc.get_contract(id).await?, flags.format),
        ContractCommands::Active { patient } => {
            let contract = svc.active_contract_for(patient).await?;
            output(&json!({ "patient_id": patient, "contract": contract }), flags.format)
        }
        ContractCommands::Status { id, status } => {
            let status = parse_enum::<ContractStatus>(status, "status")?;
            output(&svc.set_contract_status(id, status).await?, flags.format)
        }
    }
}

fn new_contract(args: &ContractCreateArgs) -> anyhow::Result<NewContract> {
    Ok(NewContract {
        patient_id: args.patient.clone(),
        therapist_id: args.therapist.clone(),
        caregiver_id: args.caregiver.clone(),
        billing: parse_enum::<BillingMode>(&args.billing, "billing")?,
        amount_cents: parse_money(&args.amount, "amount")?,
        start_date: parse_date(&args.start, "start")?,
        end_date: args
            .end
            .as_deref()
            .map(|raw| parse_date(raw, "end"))
            .transpose()?,
        due_day: args.due_day,
        notes: args.notes.clone(),
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use clinic_core::enums::BillingMode;

    use super::new_contract;
    use crate::cli::subcommands::contract::ContractCreateArgs;

    #[test]
    fn monthly_contract_from_flags() {
        let args = ContractCreateArgs {
            patient: "pat-1".into(),
            therapist: None,
            caregiver: Some("crg-1".into()),
            billing: "monthly-fixed".into(),
            amount: "600,00".into(),
            start: "01/03/2025".into(),
            end: None,
            due_day: 10,
            notes: None,
        };

        let contract = new_contract(&args).expect("contract should build");
        assert_eq!(contract.billing, BillingMode::MonthlyFixed);
        assert_eq!(contract.amount_cents, 60_000);
        assert_eq!(contract.start_date, NaiveDate::from_ymd_opt(2025, 3, 1).expect("date"));
    }

    #[test]
    fn bad_billing_mode_is_rejected() {
        let args = ContractCreateArgs {
            patient: "pat-1".into(),
            therapist: None,
            caregiver: None,
            billing: "yearly".into(),
            amount: "100".into(),
            start: "2025-03-01".into(),
            end: None,
            due_day: 10,
            notes: None,
        };
        let err = new_contract(&args).expect_err("should fail");
        assert!(err.to_string().contains("invalid billing 'yearly'"));
    }
}
