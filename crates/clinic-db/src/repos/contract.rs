//! Contract repository: billing agreements between the clinic and a patient's family.

use chrono::NaiveDate;

use clinic_core::audit_detail::StatusChangedDetail;
use clinic_core::entities::Contract;
use clinic_core::enums::{AuditAction, BillingMode, ContractStatus, EntityType};
use clinic_core::errors::CoreError;
use clinic_core::ids::PREFIX_CONTRACT;

use crate::error::DatabaseError;
use crate::helpers::{fmt_date, fmt_datetime, get_opt_string, get_u32, parse_date, parse_datetime, parse_enum, parse_optional_date, utc_now};
use crate::service::ClinicService;

const SELECT_COLS: &str = "id, clinic_id, patient_id, therapist_id, caregiver_id, billing, \
     amount_cents, start_date, end_date, due_day, status, notes, created_at";

/// Input for signing a contract.
#[derive(Debug, Clone)]
pub struct NewContract {
    pub patient_id: String,
    pub therapist_id: Option<String>,
    pub caregiver_id: Option<String>,
    pub billing: BillingMode,
    pub amount_cents: i64,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub due_day: u32,
    pub notes: Option<String>,
}

fn row_to_contract(row: &libsql::Row) -> Result<Contract, DatabaseError> {
    Ok(Contract {
        id: row.get(0)?,
        clinic_id: row.get(1)?,
        patient_id: row.get(2)?,
        therapist_id: get_opt_string(row, 3)?,
        caregiver_id: get_opt_string(row, 4)?,
        billing: parse_enum(&row.get::<String>(5)?)?,
        amount_cents: row.get(6)?,
        start_date: parse_date(&row.get::<String>(7)?)?,
        end_date: parse_optional_date(get_opt_string(row, 8)?.as_deref())?,
        due_day: get_u32(row, 9)?,
        status: parse_enum(&row.get::<String>(10)?)?,
        notes: get_opt_string(row, 11)?,
        created_at: parse_datetime(&row.get::<String>(12)?)?,
    })
}

fn validate_contract(new: &NewContract) -> Result<(), DatabaseError> {
    if !(1..=28).contains(&new.due_day) {
        return Err(DatabaseError::Validation(format!(
            "due day must be between 1 and 28, got {}",
            new.due_day
        )));
    }
    if new.amount_cents < 0 {
        return Err(DatabaseError::Validation(
            "contract amount cannot be negative".into(),
        ));
    }
    if new.end_date.is_some_and(|end| end < new.start_date) {
        return Err(DatabaseError::Validation(
            "contract cannot end before it starts".into(),
        ));
    }
    Ok(())
}

impl ClinicService {
    /// Sign a contract. Admins only.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` for an out-of-range due day,
    /// negative amount, or inverted dates.
    pub async fn create_contract(&self, new: &NewContract) -> Result<Contract, DatabaseError> {
        self.require_admin()?;
        validate_contract(new)?;
        let patient = self.get_patient(&new.patient_id).await?;
        if let Some(ref therapist_id) = new.therapist_id {
            self.get_user(therapist_id).await?;
        }

        let now = utc_now();
        let id = self.db().generate_id(PREFIX_CONTRACT).await?;
        self.db()
            .execute(
                &format!(
                    "INSERT INTO contracts ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
                ),
                libsql::params![
                    id.as_str(),
                    patient.clinic_id.as_str(),
                    new.patient_id.as_str(),
                    new.therapist_id.as_deref(),
                    new.caregiver_id.as_deref(),
                    new.billing.as_str(),
                    new.amount_cents,
                    fmt_date(&new.start_date),
                    new.end_date.as_ref().map(fmt_date),
                    i64::from(new.due_day),
                    ContractStatus::Active.as_str(),
                    new.notes.as_deref(),
                    fmt_datetime(&now)
                ],
            )
            .await?;
        self.record_audit(EntityType::Contract, &id, AuditAction::Created, None)
            .await?;

        Ok(Contract {
            id,
            clinic_id: patient.clinic_id,
            patient_id: new.patient_id.clone(),
            therapist_id: new.therapist_id.clone(),
            caregiver_id: new.caregiver_id.clone(),
            billing: new.billing,
            amount_cents: new.amount_cents,
            start_date: new.start_date,
            end_date: new.end_date,
            due_day: new.due_day,
            status: ContractStatus::Active,
            notes: new.notes.clone(),
            created_at: now,
        })
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` for unknown or foreign contracts.
    pub async fn get_contract(&self, id: &str) -> Result<Contract, DatabaseError> {
        let mut filter = self.scoped_filter("clinic_id")?;
        filter.push("id =", id);
        let sql = format!("SELECT {SELECT_COLS} FROM contracts {}", filter.where_clause());
        let mut rows = self
            .db()
            .query(&sql, libsql::params_from_iter(filter.into_params()))
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::Contract, id))?;
        row_to_contract(&row)
    }

    /// Contracts, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_contracts(
        &self,
        patient_id: Option<&str>,
        status: Option<ContractStatus>,
        limit: u32,
    ) -> Result<Vec<Contract>, DatabaseError> {
        let mut filter = self.scoped_filter("clinic_id")?;
        if let Some(patient_id) = patient_id {
            filter.push("patient_id =", patient_id);
        }
        if let Some(status) = status {
            filter.push("status =", status.as_str());
        }
        let sql = format!(
            "SELECT {SELECT_COLS} FROM contracts {} ORDER BY created_at DESC, rowid DESC LIMIT {limit}",
            filter.where_clause()
        );
        let mut rows = self
            .db()
            .query(&sql, libsql::params_from_iter(filter.into_params()))
            .await?;
        let mut contracts = Vec::new();
        while let Some(row) = rows.next().await? {
            contracts.push(row_to_contract(&row)?);
        }
        Ok(contracts)
    }

    /// The patient's most recent active contract, if any.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn active_contract_for(&self, patient_id: &str) -> Result<Option<Contract>, DatabaseError> {
        Ok(self
            .list_contracts(Some(patient_id), Some(ContractStatus::Active), 1)
            .await?
            .into_iter()
            .next())
    }

    /// Cancel or finish a contract.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` for a disallowed transition.
    pub async fn set_contract_status(
        &self,
        contract_id: &str,
        status: ContractStatus,
    ) -> Result<Contract, DatabaseError> {
        self.require_admin()?;
        let current = self.get_contract(contract_id).await?;
        if !current.status.can_transition_to(status) {
            return Err(CoreError::invalid_transition(
                EntityType::Contract,
                contract_id,
                current.status,
                status,
            )
            .into());
        }

        self.db()
            .execute(
                "UPDATE contracts SET status = ?1 WHERE id = ?2",
                libsql::params![status.as_str(), contract_id],
            )
            .await?;
        self.record_audit_with(
            EntityType::Contract,
            contract_id,
            AuditAction::StatusChanged,
            &StatusChangedDetail {
                from: current.status.as_str().to_string(),
                to: status.as_str().to_string(),
                reason: None,
            },
        )
        .await?;

        Ok(Contract { status, ..current })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{seed_patient, test_service};
    use pretty_assertions::assert_eq;

    fn monthly(patient_id: &str, amount_cents: i64) -> NewContract {
        NewContract {
            patient_id: patient_id.into(),
            therapist_id: None,
            caregiver_id: None,
            billing: BillingMode::MonthlyFixed,
            amount_cents,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: None,
            due_day: 10,
            notes: None,
        }
    }

    #[tokio::test]
    async fn create_and_find_active_contract() {
        let svc = test_service().await;
        let ana = seed_patient(&svc, "Ana Silva").await;
        assert_eq!(svc.active_contract_for(&ana.id).await.unwrap(), None);

        let contract = svc.create_contract(&monthly(&ana.id, 60_000)).await.unwrap();
        assert!(contract.id.starts_with("ctr-"));
        assert_eq!(svc.get_contract(&contract.id).await.unwrap(), contract);
        assert_eq!(
            svc.active_contract_for(&ana.id).await.unwrap(),
            Some(contract)
        );
    }

    #[tokio::test]
    async fn due_day_out_of_range_is_rejected() {
        let svc = test_service().await;
        let ana = seed_patient(&svc, "Ana Silva").await;
        let result = svc
            .create_contract(&NewContract {
                due_day: 31,
                ..monthly(&ana.id, 60_000)
            })
            .await;
        assert!(matches!(result, Err(DatabaseError::Validation(_))));
    }

    #[tokio::test]
    async fn finished_contract_is_terminal() {
        let svc = test_service().await;
        let ana = seed_patient(&svc, "Ana Silva").await;
        let contract = svc.create_contract(&monthly(&ana.id, 60_000)).await.unwrap();

        let finished = svc
            .set_contract_status(&contract.id, ContractStatus::Finished)
            .await
            .unwrap();
        assert_eq!(finished.status, ContractStatus::Finished);
        assert_eq!(svc.active_contract_for(&ana.id).await.unwrap(), None);

        let result = svc
            .set_contract_status(&contract.id, ContractStatus::Active)
            .await;
        assert!(matches!(result, Err(DatabaseError::InvalidState(_))));
    }
}
