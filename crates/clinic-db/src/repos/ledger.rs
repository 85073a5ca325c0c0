//! Ledger repository: receivables, payables, monthly summary, and session billing.

use std::collections::HashSet;

use chrono::{Datelike, Duration, NaiveDate};

use clinic_core::audit_detail::{BilledDetail, StatusChangedDetail};
use clinic_core::entities::{Appointment, Contract, LedgerEntry};
use clinic_core::enums::{AppointmentStatus, AuditAction, BillingMode, EntityType, LedgerKind, LedgerStatus};
use clinic_core::errors::CoreError;
use clinic_core::ids::PREFIX_LEDGER;
use clinic_core::responses::{BillingOutcome, LedgerSummary};

use crate::error::DatabaseError;
use crate::helpers::{fmt_date, fmt_datetime, get_opt_string, parse_date, parse_datetime, parse_enum, parse_optional_date, require_text, utc_now};
use crate::service::ClinicService;

const SELECT_COLS: &str = "id, clinic_id, description, amount_cents, kind, status, due_date, \
     paid_on, payment_method, patient_id, caregiver_id, created_at, updated_at";

/// Days until an invoice without a contract falls due.
const DEFAULT_DUE_DAYS: i64 = 5;

/// Input for a manual ledger entry.
#[derive(Debug, Clone)]
pub struct NewLedgerEntry {
    pub description: String,
    pub amount_cents: i64,
    pub kind: LedgerKind,
    pub due_date: NaiveDate,
    pub patient_id: Option<String>,
    pub caregiver_id: Option<String>,
}

/// Filter for ledger listings. `month` selects by due date.
#[derive(Debug, Default)]
pub struct LedgerFilter {
    pub kind: Option<LedgerKind>,
    pub status: Option<LedgerStatus>,
    pub month: Option<(i32, u32)>,
    pub patient_id: Option<String>,
    pub limit: Option<u32>,
}

/// Input for billing completed sessions.
#[derive(Debug, Clone)]
pub struct BillingRequest {
    pub appointment_ids: Vec<String>,
    /// Contract to bill under; defaults to the patient's active contract.
    pub contract_id: Option<String>,
    /// Free-form reference shown in the description, e.g. `"03/2025"`.
    pub reference: String,
    pub today: NaiveDate,
}

fn row_to_entry(row: &libsql::Row) -> Result<LedgerEntry, DatabaseError> {
    Ok(LedgerEntry {
        id: row.get(0)?,
        clinic_id: row.get(1)?,
        description: row.get(2)?,
        amount_cents: row.get(3)?,
        kind: parse_enum(&row.get::<String>(4)?)?,
        status: parse_enum(&row.get::<String>(5)?)?,
        due_date: parse_date(&row.get::<String>(6)?)?,
        paid_on: parse_optional_date(get_opt_string(row, 7)?.as_deref())?,
        payment_method: get_opt_string(row, 8)?,
        patient_id: get_opt_string(row, 9)?,
        caregiver_id: get_opt_string(row, 10)?,
        created_at: parse_datetime(&row.get::<String>(11)?)?,
        updated_at: parse_datetime(&row.get::<String>(12)?)?,
    })
}

/// First and one-past-last day of a month.
///
/// # Errors
///
/// Returns `DatabaseError::Validation` for an invalid month.
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), DatabaseError> {
    let invalid = || DatabaseError::Validation(format!("invalid month {year}-{month:02}"));
    let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let end = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(invalid)?;
    Ok((start, end))
}

/// Due date for a billing issued on `today`: the contract's due day of the
/// following month, or a few days out without a contract.
#[must_use]
pub fn billing_due_date(today: NaiveDate, contract: Option<&Contract>) -> NaiveDate {
    let fallback = today + Duration::days(DEFAULT_DUE_DAYS);
    let Some(contract) = contract else {
        return fallback;
    };
    let (year, month) = if today.month() == 12 {
        (today.year() + 1, 1)
    } else {
        (today.year(), today.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, contract.due_day).unwrap_or(fallback)
}

/// Amount owed for a set of completed sessions.
///
/// Monthly contracts bill their fixed amount. Otherwise each session costs its
/// own fee, falling back to the per-session contract amount, then the
/// patient's default fee, then zero.
#[must_use]
pub fn billing_amount(
    appointments: &[Appointment],
    contract: Option<&Contract>,
    patient_default_cents: Option<i64>,
) -> i64 {
    if let Some(contract) = contract
        && contract.billing == BillingMode::MonthlyFixed
    {
        return contract.amount_cents;
    }
    let contract_rate = contract.map(|c| c.amount_cents);
    appointments
        .iter()
        .map(|apt| {
            apt.session_fee_cents
                .or(contract_rate)
                .or(patient_default_cents)
                .unwrap_or(0)
        })
        .sum()
}

fn billing_description(reference: &str, contract: Option<&Contract>, sessions: usize) -> String {
    match contract {
        Some(contract) if contract.billing == BillingMode::MonthlyFixed => format!(
            "Faturamento Ref: {reference} - Mensalidade Fixa (Contrato #{})",
            contract.id
        ),
        _ => format!("Faturamento Ref: {reference} - {sessions} Sessões Realizadas"),
    }
}

impl ClinicService {
    async fn insert_ledger_entry(
        &self,
        clinic_id: &str,
        new: &NewLedgerEntry,
    ) -> Result<LedgerEntry, DatabaseError> {
        let description = require_text("description", &new.description)?;
        if new.amount_cents < 0 {
            return Err(DatabaseError::Validation(
                "amount cannot be negative; use an expense entry".into(),
            ));
        }

        let now = utc_now();
        let id = self.db().generate_id(PREFIX_LEDGER).await?;
        self.db()
            .execute(
                &format!(
                    "INSERT INTO ledger_entries ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL, NULL, ?8, ?9, ?10, ?10)"
                ),
                libsql::params![
                    id.as_str(),
                    clinic_id,
                    description,
                    new.amount_cents,
                    new.kind.as_str(),
                    LedgerStatus::Pending.as_str(),
                    fmt_date(&new.due_date),
                    new.patient_id.as_deref(),
                    new.caregiver_id.as_deref(),
                    fmt_datetime(&now)
                ],
            )
            .await?;

        Ok(LedgerEntry {
            id,
            clinic_id: clinic_id.to_string(),
            description: description.to_string(),
            amount_cents: new.amount_cents,
            kind: new.kind,
            status: LedgerStatus::Pending,
            due_date: new.due_date,
            paid_on: None,
            payment_method: None,
            patient_id: new.patient_id.clone(),
            caregiver_id: new.caregiver_id.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Record a pending receivable or payable. Admins only.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` for a blank description or
    /// negative amount.
    pub async fn create_ledger_entry(&self, new: &NewLedgerEntry) -> Result<LedgerEntry, DatabaseError> {
        self.require_admin()?;
        let clinic_id = self.require_clinic_id()?;
        if let Some(ref patient_id) = new.patient_id {
            self.get_patient(patient_id).await?;
        }
        let entry = self.insert_ledger_entry(&clinic_id, new).await?;
        self.record_audit(EntityType::LedgerEntry, &entry.id, AuditAction::Created, None)
            .await?;
        Ok(entry)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` for unknown or foreign entries.
    pub async fn get_ledger_entry(&self, id: &str) -> Result<LedgerEntry, DatabaseError> {
        self.require_admin()?;
        let mut filter = self.scoped_filter("clinic_id")?;
        filter.push("id =", id);
        let sql = format!("SELECT {SELECT_COLS} FROM ledger_entries {}", filter.where_clause());
        let mut rows = self
            .db()
            .query(&sql, libsql::params_from_iter(filter.into_params()))
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::LedgerEntry, id))?;
        row_to_entry(&row)
    }

    /// Ledger entries ordered by due date.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` for an invalid month.
    pub async fn list_ledger_entries(&self, filter: &LedgerFilter) -> Result<Vec<LedgerEntry>, DatabaseError> {
        self.require_admin()?;
        let mut sql_filter = self.scoped_filter("clinic_id")?;
        if let Some(kind) = filter.kind {
            sql_filter.push("kind =", kind.as_str());
        }
        if let Some(status) = filter.status {
            sql_filter.push("status =", status.as_str());
        }
        if let Some((year, month)) = filter.month {
            let (start, end) = month_bounds(year, month)?;
            sql_filter.push("due_date >=", fmt_date(&start));
            sql_filter.push("due_date <", fmt_date(&end));
        }
        if let Some(ref patient_id) = filter.patient_id {
            sql_filter.push("patient_id =", patient_id.as_str());
        }

        let limit = filter.limit.unwrap_or(200);
        let sql = format!(
            "SELECT {SELECT_COLS} FROM ledger_entries {} ORDER BY due_date, rowid LIMIT {limit}",
            sql_filter.where_clause()
        );
        let mut rows = self
            .db()
            .query(&sql, libsql::params_from_iter(sql_filter.into_params()))
            .await?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(row_to_entry(&row)?);
        }
        Ok(entries)
    }

    async fn transition_ledger_entry(
        &self,
        entry_id: &str,
        status: LedgerStatus,
        paid_on: Option<NaiveDate>,
        payment_method: Option<&str>,
    ) -> Result<LedgerEntry, DatabaseError> {
        let current = self.get_ledger_entry(entry_id).await?;
        if !current.status.can_transition_to(status) {
            return Err(CoreError::invalid_transition(
                EntityType::LedgerEntry,
                entry_id,
                current.status,
                status,
            )
            .into());
        }

        let now = utc_now();
        self.db()
            .execute(
                "UPDATE ledger_entries
                 SET status = ?1, paid_on = ?2, payment_method = ?3, updated_at = ?4
                 WHERE id = ?5",
                libsql::params![
                    status.as_str(),
                    paid_on.as_ref().map(fmt_date),
                    payment_method,
                    fmt_datetime(&now),
                    entry_id
                ],
            )
            .await?;
        self.record_audit_with(
            EntityType::LedgerEntry,
            entry_id,
            AuditAction::StatusChanged,
            &StatusChangedDetail {
                from: current.status.as_str().to_string(),
                to: status.as_str().to_string(),
                reason: payment_method.map(String::from),
            },
        )
        .await?;

        Ok(LedgerEntry {
            status,
            paid_on,
            payment_method: payment_method.map(String::from),
            updated_at: now,
            ..current
        })
    }

    /// Mark an entry paid.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` unless the entry is pending.
    pub async fn settle_ledger_entry(
        &self,
        entry_id: &str,
        paid_on: NaiveDate,
        payment_method: &str,
    ) -> Result<LedgerEntry, DatabaseError> {
        let method = require_text("payment method", payment_method)?;
        self.transition_ledger_entry(entry_id, LedgerStatus::Paid, Some(paid_on), Some(method))
            .await
    }

    /// Undo a payment: back to pending with payment data cleared.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` unless the entry is paid.
    pub async fn reverse_ledger_entry(&self, entry_id: &str) -> Result<LedgerEntry, DatabaseError> {
        self.transition_ledger_entry(entry_id, LedgerStatus::Pending, None, None)
            .await
    }

    /// Cancel a pending entry. Billed appointments are released so they can
    /// be billed again.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` unless the entry is pending.
    pub async fn cancel_ledger_entry(&self, entry_id: &str) -> Result<LedgerEntry, DatabaseError> {
        let cancelled = self
            .transition_ledger_entry(entry_id, LedgerStatus::Cancelled, None, None)
            .await?;
        self.db()
            .execute(
                "UPDATE appointments SET ledger_entry_id = NULL WHERE ledger_entry_id = ?1",
                [entry_id],
            )
            .await?;
        Ok(cancelled)
    }

    /// Expected (not cancelled) and realized (paid) totals for entries due
    /// in a month.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` for an invalid month.
    pub async fn ledger_summary(&self, year: i32, month: u32) -> Result<LedgerSummary, DatabaseError> {
        self.require_admin()?;
        let (start, end) = month_bounds(year, month)?;
        let mut filter = self.scoped_filter("clinic_id")?;
        filter.push("due_date >=", fmt_date(&start));
        filter.push("due_date <", fmt_date(&end));
        filter.push("status !=", LedgerStatus::Cancelled.as_str());

        let sql = format!(
            "SELECT kind, status, COALESCE(SUM(amount_cents), 0)
             FROM ledger_entries {} GROUP BY kind, status",
            filter.where_clause()
        );
        let mut rows = self
            .db()
            .query(&sql, libsql::params_from_iter(filter.into_params()))
            .await?;

        let mut summary = LedgerSummary {
            year,
            month,
            ..LedgerSummary::default()
        };
        while let Some(row) = rows.next().await? {
            let kind: LedgerKind = parse_enum(&row.get::<String>(0)?)?;
            let status: LedgerStatus = parse_enum(&row.get::<String>(1)?)?;
            let total = row.get::<i64>(2)?;
            let paid = status == LedgerStatus::Paid;
            match kind {
                LedgerKind::Revenue => {
                    summary.expected_revenue_cents += total;
                    if paid {
                        summary.realized_revenue_cents += total;
                    }
                }
                LedgerKind::Expense => {
                    summary.expected_expense_cents += total;
                    if paid {
                        summary.realized_expense_cents += total;
                    }
                }
            }
        }
        Ok(summary.with_balances())
    }

    /// Bill completed sessions of one patient into a single revenue entry and
    /// link the sessions to it. Runs in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` for an empty, repeated or
    /// mixed-patient selection and `DatabaseError::InvalidState` for sessions that are not
    /// completed or were already billed.
    pub async fn bill_sessions(&self, request: &BillingRequest) -> Result<BillingOutcome, DatabaseError> {
        self.require_admin()?;
        if request.appointment_ids.is_empty() {
            return Err(DatabaseError::Validation(
                "select at least one session to bill".into(),
            ));
        }
        let mut seen = HashSet::with_capacity(request.appointment_ids.len());
        if let Some(dup) = request.appointment_ids.iter().find(|id| !seen.insert(id.as_str())) {
            return Err(DatabaseError::Validation(format!(
                "appointment {dup} was selected more than once"
            )));
        }

        let mut appointments = Vec::with_capacity(request.appointment_ids.len());
        for id in &request.appointment_ids {
            let apt = self.get_appointment(id).await?;
            if apt.status != AppointmentStatus::Completed {
                return Err(DatabaseError::InvalidState(format!(
                    "appointment {id} is {}, only completed sessions can be billed",
                    apt.status
                )));
            }
            if let Some(ref entry) = apt.ledger_entry_id {
                return Err(DatabaseError::InvalidState(format!(
                    "appointment {id} was already billed in {entry}"
                )));
            }
            appointments.push(apt);
        }

        let patient_id = appointments[0].patient_id.clone();
        if appointments.iter().any(|a| a.patient_id != patient_id) {
            return Err(DatabaseError::Validation(
                "all billed sessions must belong to the same patient".into(),
            ));
        }
        let patient = self.get_patient(&patient_id).await?;

        let contract = match request.contract_id {
            Some(ref contract_id) => {
                let contract = self.get_contract(contract_id).await?;
                if contract.patient_id != patient_id {
                    return Err(DatabaseError::Validation(format!(
                        "contract {contract_id} belongs to another patient"
                    )));
                }
                Some(contract)
            }
            None => self.active_contract_for(&patient_id).await?,
        };

        let amount_cents = billing_amount(
            &appointments,
            contract.as_ref(),
            patient.default_session_fee_cents,
        );
        let new = NewLedgerEntry {
            description: billing_description(&request.reference, contract.as_ref(), appointments.len()),
            amount_cents,
            kind: LedgerKind::Revenue,
            due_date: billing_due_date(request.today, contract.as_ref()),
            patient_id: Some(patient_id),
            caregiver_id: contract.as_ref().and_then(|c| c.caregiver_id.clone()),
        };

        let tx = self.db().conn().transaction().await?;
        let entry = self.insert_ledger_entry(&patient.clinic_id, &new).await?;
        for apt in &appointments {
            self.db()
                .execute(
                    "UPDATE appointments SET ledger_entry_id = ?1, updated_at = ?2 WHERE id = ?3",
                    libsql::params![entry.id.as_str(), fmt_datetime(&utc_now()), apt.id.as_str()],
                )
                .await?;
        }
        self.record_audit_with(
            EntityType::LedgerEntry,
            &entry.id,
            AuditAction::Billed,
            &BilledDetail {
                ledger_entry_id: entry.id.clone(),
                appointment_ids: request.appointment_ids.clone(),
                amount_cents,
            },
        )
        .await?;
        tx.commit().await?;

        tracing::info!(entry = %entry.id, sessions = appointments.len(), "billed sessions");
        Ok(BillingOutcome {
            ledger_entry: entry,
            appointment_ids: request.appointment_ids.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::contract::NewContract;
    use crate::test_support::helpers::{at, seed_appointment, seed_patient, seed_therapist, test_service};
    use crate::updates::appointment::AppointmentUpdateBuilder;
    use crate::updates::patient::PatientUpdateBuilder;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn contract(billing: BillingMode, amount_cents: i64) -> Contract {
        Contract {
            id: "ctr-1".into(),
            clinic_id: "cln-1".into(),
            patient_id: "pat-1".into(),
            therapist_id: None,
            caregiver_id: None,
            billing,
            amount_cents,
            start_date: date(2025, 1, 1),
            end_date: None,
            due_day: 10,
            status: clinic_core::enums::ContractStatus::Active,
            notes: None,
            created_at: utc_now(),
        }
    }

    fn session(fee: Option<i64>) -> Appointment {
        Appointment {
            id: "apt-1".into(),
            clinic_id: "cln-1".into(),
            patient_id: "pat-1".into(),
            therapist_id: "usr-1".into(),
            room_id: None,
            starts_at: at(0, 9),
            ends_at: at(0, 10),
            session_type: clinic_core::enums::SessionType::Individual,
            status: AppointmentStatus::Completed,
            notes: None,
            session_fee_cents: fee,
            ledger_entry_id: None,
            created_at: utc_now(),
            updated_at: utc_now(),
        }
    }

    #[rstest]
    #[case::monthly_ignores_fees(Some(contract(BillingMode::MonthlyFixed, 60_000)), 60_000)]
    #[case::contract_rate_fills_gaps(Some(contract(BillingMode::PerSession, 10_000)), 35_000)]
    #[case::patient_default_fills_gaps(None, 25_000)]
    fn billing_amount_fallbacks(#[case] contract: Option<Contract>, #[case] expected: i64) {
        let sessions = [session(Some(15_000)), session(None), session(None)];
        assert_eq!(billing_amount(&sessions, contract.as_ref(), Some(5_000)), expected);
    }

    #[test]
    fn billing_amount_defaults_to_zero() {
        assert_eq!(billing_amount(&[session(None)], None, None), 0);
    }

    #[rstest]
    #[case::mid_year(date(2025, 3, 20), date(2025, 4, 10))]
    #[case::december(date(2025, 12, 5), date(2026, 1, 10))]
    fn due_date_with_contract(#[case] today: NaiveDate, #[case] expected: NaiveDate) {
        let c = contract(BillingMode::MonthlyFixed, 1);
        assert_eq!(billing_due_date(today, Some(&c)), expected);
    }

    #[test]
    fn due_date_without_contract() {
        assert_eq!(billing_due_date(date(2025, 3, 30), None), date(2025, 4, 4));
    }

    #[test]
    fn month_bounds_wraps_year() {
        assert_eq!(
            month_bounds(2025, 12).unwrap(),
            (date(2025, 12, 1), date(2026, 1, 1))
        );
        assert!(month_bounds(2025, 13).is_err());
    }

    #[tokio::test]
    async fn settle_reverse_and_cancel() {
        let svc = test_service().await;
        let entry = svc
            .create_ledger_entry(&NewLedgerEntry {
                description: "Aluguel".into(),
                amount_cents: 300_000,
                kind: LedgerKind::Expense,
                due_date: date(2025, 3, 5),
                patient_id: None,
                caregiver_id: None,
            })
            .await
            .unwrap();

        let paid = svc
            .settle_ledger_entry(&entry.id, date(2025, 3, 4), "pix")
            .await
            .unwrap();
        assert_eq!(paid.status, LedgerStatus::Paid);
        assert_eq!(paid.paid_on, Some(date(2025, 3, 4)));

        let reversed = svc.reverse_ledger_entry(&entry.id).await.unwrap();
        assert_eq!(reversed.status, LedgerStatus::Pending);
        assert_eq!(reversed.paid_on, None);
        assert_eq!(reversed.payment_method, None);
        assert_eq!(svc.get_ledger_entry(&entry.id).await.unwrap(), reversed);

        svc.cancel_ledger_entry(&entry.id).await.unwrap();
        let result = svc.settle_ledger_entry(&entry.id, date(2025, 3, 6), "pix").await;
        assert!(matches!(result, Err(DatabaseError::InvalidState(_))));
    }

    #[tokio::test]
    async fn monthly_summary() {
        let svc = test_service().await;
        let entries = [
            ("Sessões", 50_000, LedgerKind::Revenue, date(2025, 3, 10)),
            ("Mensalidade", 30_000, LedgerKind::Revenue, date(2025, 3, 15)),
            ("Aluguel", 20_000, LedgerKind::Expense, date(2025, 3, 5)),
            ("Abril", 99_000, LedgerKind::Revenue, date(2025, 4, 1)),
        ];
        let mut ids = Vec::new();
        for (description, amount_cents, kind, due_date) in entries {
            let entry = svc
                .create_ledger_entry(&NewLedgerEntry {
                    description: description.into(),
                    amount_cents,
                    kind,
                    due_date,
                    patient_id: None,
                    caregiver_id: None,
                })
                .await
                .unwrap();
            ids.push(entry.id);
        }
        svc.settle_ledger_entry(&ids[0], date(2025, 3, 10), "pix").await.unwrap();
        svc.settle_ledger_entry(&ids[2], date(2025, 3, 5), "boleto").await.unwrap();

        let summary = svc.ledger_summary(2025, 3).await.unwrap();
        assert_eq!(
            summary,
            LedgerSummary {
                year: 2025,
                month: 3,
                expected_revenue_cents: 80_000,
                realized_revenue_cents: 50_000,
                expected_expense_cents: 20_000,
                realized_expense_cents: 20_000,
                expected_balance_cents: 60_000,
                realized_balance_cents: 30_000,
            }
        );

        let march = svc
            .list_ledger_entries(&LedgerFilter {
                month: Some((2025, 3)),
                kind: Some(LedgerKind::Revenue),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(march.len(), 2);
    }

    #[tokio::test]
    async fn bill_sessions_per_session_and_refuse_rebilling() {
        let svc = test_service().await;
        let ana = seed_patient(&svc, "Ana Silva").await;
        svc.update_patient(
            &ana.id,
            PatientUpdateBuilder::new().default_session_fee_cents(Some(12_000)).build(),
        )
        .await
        .unwrap();
        let sam = seed_therapist(&svc, "Samuel Rocha").await;

        let mut ids = Vec::new();
        for day in 0..2 {
            let apt = seed_appointment(&svc, &ana.id, &sam.id, at(day, 9)).await;
            svc.set_appointment_status(&apt.id, AppointmentStatus::Completed, None)
                .await
                .unwrap();
            ids.push(apt.id);
        }
        let scheduled = seed_appointment(&svc, &ana.id, &sam.id, at(7, 9)).await;

        let outcome = svc
            .bill_sessions(&BillingRequest {
                appointment_ids: ids.clone(),
                contract_id: None,
                reference: "03/2025".into(),
                today: date(2025, 3, 30),
            })
            .await
            .unwrap();
        let entry = &outcome.ledger_entry;
        assert_eq!(entry.amount_cents, 24_000);
        assert_eq!(entry.description, "Faturamento Ref: 03/2025 - 2 Sessões Realizadas");
        assert_eq!(entry.due_date, date(2025, 4, 4));
        assert_eq!(entry.kind, LedgerKind::Revenue);

        let billed = svc.get_appointment(&ids[0]).await.unwrap();
        assert_eq!(billed.ledger_entry_id.as_deref(), Some(entry.id.as_str()));

        let again = svc
            .bill_sessions(&BillingRequest {
                appointment_ids: vec![ids[1].clone()],
                contract_id: None,
                reference: "03/2025".into(),
                today: date(2025, 3, 30),
            })
            .await;
        assert!(matches!(again, Err(DatabaseError::InvalidState(_))));

        let not_completed = svc
            .bill_sessions(&BillingRequest {
                appointment_ids: vec![scheduled.id],
                contract_id: None,
                reference: "03/2025".into(),
                today: date(2025, 3, 30),
            })
            .await;
        assert!(matches!(not_completed, Err(DatabaseError::InvalidState(_))));

        svc.cancel_ledger_entry(&entry.id).await.unwrap();
        let released = svc.get_appointment(&ids[0]).await.unwrap();
        assert_eq!(released.ledger_entry_id, None);
    }

    #[tokio::test]
    async fn bill_sessions_rejects_repeated_appointment() {
        let svc = test_service().await;
        let ana = seed_patient(&svc, "Ana Silva").await;
        let sam = seed_therapist(&svc, "Samuel Rocha").await;
        let apt = seed_appointment(&svc, &ana.id, &sam.id, at(0, 9)).await;
        svc.update_appointment(
            &apt.id,
            AppointmentUpdateBuilder::new().session_fee_cents(Some(10_000)).build(),
        )
        .await
        .unwrap();
        svc.set_appointment_status(&apt.id, AppointmentStatus::Completed, None)
            .await
            .unwrap();

        let result = svc
            .bill_sessions(&BillingRequest {
                appointment_ids: vec![apt.id.clone(), apt.id.clone()],
                contract_id: None,
                reference: "03/2025".into(),
                today: date(2025, 3, 30),
            })
            .await;
        assert!(matches!(result, Err(DatabaseError::Validation(_))));
        assert_eq!(svc.get_appointment(&apt.id).await.unwrap().ledger_entry_id, None);

        let outcome = svc
            .bill_sessions(&BillingRequest {
                appointment_ids: vec![apt.id.clone()],
                contract_id: None,
                reference: "03/2025".into(),
                today: date(2025, 3, 30),
            })
            .await
            .unwrap();
        assert_eq!(outcome.ledger_entry.amount_cents, 10_000);
        assert_eq!(
            outcome.ledger_entry.description,
            "Faturamento Ref: 03/2025 - 1 Sessões Realizadas"
        );
    }

    #[tokio::test]
    async fn bill_sessions_monthly_contract() {
        let svc = test_service().await;
        let ana = seed_patient(&svc, "Ana Silva").await;
        let sam = seed_therapist(&svc, "Samuel Rocha").await;
        let contract = svc
            .create_contract(&NewContract {
                patient_id: ana.id.clone(),
                therapist_id: Some(sam.id.clone()),
                caregiver_id: None,
                billing: BillingMode::MonthlyFixed,
                amount_cents: 60_000,
                start_date: date(2025, 1, 1),
                end_date: None,
                due_day: 10,
                notes: None,
            })
            .await
            .unwrap();
        let apt = seed_appointment(&svc, &ana.id, &sam.id, at(0, 9)).await;
        svc.set_appointment_status(&apt.id, AppointmentStatus::Completed, None)
            .await
            .unwrap();

        let outcome = svc
            .bill_sessions(&BillingRequest {
                appointment_ids: vec![apt.id],
                contract_id: None,
                reference: "03/2025".into(),
                today: date(2025, 3, 30),
            })
            .await
            .unwrap();
        assert_eq!(outcome.ledger_entry.amount_cents, 60_000);
        assert_eq!(outcome.ledger_entry.due_date, date(2025, 4, 10));
        assert_eq!(
            outcome.ledger_entry.description,
            format!("Faturamento Ref: 03/2025 - Mensalidade Fixa (Contrato #{})", contract.id)
        );
    }
}
