//! End-to-end clinic workflow against an in-memory database.
//!
//! - Setup: bootstrap clinic, team, patient, caregiver, contract
//! - Agenda: weekly series, completion, therapist visibility
//! - Finance: billing completed sessions, settlement, monthly summary
//! - Audit: mutations are queryable afterwards

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use pretty_assertions::assert_eq;

use clinic_core::enums::{
    AppointmentStatus, AuditAction, BillingMode, EntityType, LedgerKind, LedgerStatus, ReportStatus,
    Role, SessionType,
};
use clinic_db::repos::appointment::{AppointmentFilter, DeleteScope, NewAppointment};
use clinic_db::repos::audit::AuditFilter;
use clinic_db::repos::clinic::NewClinic;
use clinic_db::repos::contract::NewContract;
use clinic_db::repos::ledger::{BillingRequest, LedgerFilter};
use clinic_db::repos::patient::{NewCaregiver, NewPatient};
use clinic_db::repos::report::ReportDraft;
use clinic_db::repos::user::NewUser;
use clinic_db::service::ClinicService;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn bootstrapped() -> ClinicService {
    let mut svc = ClinicService::new_local(":memory:").await.unwrap();
    svc.bootstrap_clinic(
        &NewClinic::named("Clínica Som & Ser"),
        "Helena Costa",
        "helena@example.com",
    )
    .await
    .unwrap();
    svc
}

#[tokio::test]
async fn month_of_sessions_is_billed_and_settled() {
    let mut svc = bootstrapped().await;
    let admin_id = svc.actor().unwrap().user_id.clone();

    let sam = svc
        .create_user(&NewUser {
            full_name: "Samuel Rocha".into(),
            email: "Sam@Example.com".into(),
            phone: None,
            role: Role::Therapist,
            clinic_id: None,
        })
        .await
        .unwrap();
    assert_eq!(sam.email, "sam@example.com");

    let ana = svc
        .create_patient(&NewPatient {
            name: "Ana Silva".into(),
            birth_date: date(2018, 4, 2),
            notes: None,
            default_session_fee_cents: Some(15_000),
        })
        .await
        .unwrap();
    let maria = svc
        .add_caregiver(
            &ana.id,
            &NewCaregiver {
                name: "Maria Silva".into(),
                relationship: Some("mãe".into()),
                is_primary: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    svc.link_therapist(&ana.id, &sam.id).await.unwrap();

    svc.create_contract(&NewContract {
        patient_id: ana.id.clone(),
        therapist_id: Some(sam.id.clone()),
        caregiver_id: Some(maria.caregiver.id.clone()),
        billing: BillingMode::PerSession,
        amount_cents: 12_000,
        start_date: date(2025, 3, 1),
        end_date: None,
        due_day: 10,
        notes: None,
    })
    .await
    .unwrap();

    let first = Utc.with_ymd_and_hms(2025, 3, 3, 14, 0, 0).unwrap();
    let batch = svc
        .create_appointments(&NewAppointment {
            patient_id: ana.id.clone(),
            therapist_id: sam.id.clone(),
            room_id: None,
            starts_at: first,
            ends_at: first + Duration::minutes(50),
            session_type: SessionType::Individual,
            notes: None,
            session_fee_cents: None,
            repeat_weekly_until: Some(date(2025, 3, 31)),
        })
        .await
        .unwrap();
    assert_eq!(batch.appointments.len(), 5);

    // The therapist completes the first four sessions through their reports.
    svc.act_as(&sam.id).await.unwrap();
    let agenda = svc
        .list_appointments(&AppointmentFilter::default())
        .await
        .unwrap();
    assert_eq!(agenda.len(), 5);
    for apt in &batch.appointments[..4] {
        svc.save_report(&ReportDraft {
            appointment_id: apt.id.clone(),
            prompt_id: None,
            raw_notes: "Ana cantou".into(),
            generated_text: "Relatório".into(),
            status: ReportStatus::Finalized,
        })
        .await
        .unwrap();
    }
    let last = &batch.appointments[4];
    let outcome = svc
        .delete_appointment(&last.id, DeleteScope::ThisAndFuture)
        .await
        .unwrap();
    assert_eq!(outcome.deleted, 1);

    svc.act_as(&admin_id).await.unwrap();
    let completed = svc
        .list_appointments(&AppointmentFilter {
            status: Some(AppointmentStatus::Completed),
            ..Default::default()
        })
        .await
        .unwrap();
    let ids: Vec<String> = completed.iter().map(|a| a.id.clone()).collect();
    assert_eq!(ids.len(), 4);

    let billing = svc
        .bill_sessions(&BillingRequest {
            appointment_ids: ids,
            contract_id: None,
            reference: "03/2025".into(),
            today: date(2025, 3, 31),
        })
        .await
        .unwrap();
    let entry = billing.ledger_entry;
    assert_eq!(entry.amount_cents, 48_000);
    assert_eq!(entry.due_date, date(2025, 4, 10));
    assert_eq!(entry.caregiver_id.as_deref(), Some(maria.caregiver.id.as_str()));

    let settled = svc
        .settle_ledger_entry(&entry.id, date(2025, 4, 9), "pix")
        .await
        .unwrap();
    assert_eq!(settled.status, LedgerStatus::Paid);

    let april = svc.ledger_summary(2025, 4).await.unwrap();
    assert_eq!(april.expected_revenue_cents, 48_000);
    assert_eq!(april.realized_balance_cents, 48_000);

    let revenue = svc
        .list_ledger_entries(&LedgerFilter {
            kind: Some(LedgerKind::Revenue),
            patient_id: Some(ana.id.clone()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(revenue.len(), 1);

    let billed = svc
        .query_audit(&AuditFilter {
            entity_type: Some(EntityType::LedgerEntry),
            action: Some(AuditAction::Billed),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(billed.len(), 1);
    assert_eq!(billed[0].actor_id.as_deref(), Some(admin_id.as_str()));
}

#[tokio::test]
async fn setup_runs_only_once() {
    let mut svc = bootstrapped().await;
    let again = svc
        .bootstrap_clinic(&NewClinic::named("Outra"), "X", "x@example.com")
        .await;
    assert!(again.is_err());
}

#[tokio::test]
async fn file_database_persists_between_opens() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("clinic.db");
    let path = path.to_str().unwrap();

    let admin_id = {
        let mut svc = ClinicService::new_local(path).await.unwrap();
        let (_, admin) = svc
            .bootstrap_clinic(&NewClinic::named("Som & Ser"), "Helena", "helena@example.com")
            .await
            .unwrap();
        admin.id
    };

    let mut svc = ClinicService::new_local(path).await.unwrap();
    let actor = svc.act_as(&admin_id).await.unwrap();
    assert_eq!(actor.role, Role::ClinicAdmin);
    assert_eq!(svc.current_clinic().await.unwrap().legal_name, "Som & Ser");
}
