//! Appointment repository: agenda, weekly series, and status transitions.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use clinic_core::audit_detail::{SeriesDeletedDetail, StatusChangedDetail};
use clinic_core::entities::Appointment;
use clinic_core::enums::{AppointmentStatus, AuditAction, EntityType, Role, SessionType};
use clinic_core::errors::CoreError;
use clinic_core::ids::PREFIX_APPOINTMENT;
use clinic_core::responses::{AppointmentBatch, DeleteOutcome};

use crate::error::DatabaseError;
use crate::helpers::{SetClause, SqlFilter, fmt_datetime, get_opt_string, opt_int, opt_text, parse_datetime, parse_enum, utc_now};
use crate::service::ClinicService;
use crate::updates::appointment::AppointmentUpdate;

const SELECT_COLS: &str = "id, clinic_id, patient_id, therapist_id, room_id, starts_at, ends_at, \
     session_type, status, notes, session_fee_cents, ledger_entry_id, created_at, updated_at";

/// Longest weekly series accepted in one request (two years).
pub const MAX_OCCURRENCES: usize = 104;

/// Input for booking an appointment or a weekly series.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub patient_id: String,
    pub therapist_id: String,
    pub room_id: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub session_type: SessionType,
    pub notes: Option<String>,
    pub session_fee_cents: Option<i64>,
    /// Repeat every 7 days while the occurrence starts on or before this date.
    pub repeat_weekly_until: Option<NaiveDate>,
}

/// Filter for agenda queries. Therapists are always restricted to their own
/// appointments.
#[derive(Debug, Default)]
pub struct AppointmentFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub patient_id: Option<String>,
    pub therapist_id: Option<String>,
    pub status: Option<AppointmentStatus>,
    pub limit: Option<u32>,
}

/// What `delete_appointment` removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteScope {
    Single,
    /// This appointment and every later one for the same patient and therapist.
    ThisAndFuture,
}

pub(crate) fn row_to_appointment(row: &libsql::Row) -> Result<Appointment, DatabaseError> {
    Ok(Appointment {
        id: row.get(0)?,
        clinic_id: row.get(1)?,
        patient_id: row.get(2)?,
        therapist_id: row.get(3)?,
        room_id: get_opt_string(row, 4)?,
        starts_at: parse_datetime(&row.get::<String>(5)?)?,
        ends_at: parse_datetime(&row.get::<String>(6)?)?,
        session_type: parse_enum(&row.get::<String>(7)?)?,
        status: parse_enum(&row.get::<String>(8)?)?,
        notes: get_opt_string(row, 9)?,
        session_fee_cents: row.get::<Option<i64>>(10)?,
        ledger_entry_id: get_opt_string(row, 11)?,
        created_at: parse_datetime(&row.get::<String>(12)?)?,
        updated_at: parse_datetime(&row.get::<String>(13)?)?,
    })
}

/// Start times of a weekly series, first occurrence included.
///
/// # Errors
///
/// Returns `DatabaseError::Validation` when `until` precedes the first
/// occurrence or the series exceeds [`MAX_OCCURRENCES`].
pub fn weekly_occurrences(
    first: DateTime<Utc>,
    until: Option<NaiveDate>,
) -> Result<Vec<DateTime<Utc>>, DatabaseError> {
    let Some(until) = until else {
        return Ok(vec![first]);
    };
    if until < first.date_naive() {
        return Err(DatabaseError::Validation(format!(
            "repeat end {until} is before the first session"
        )));
    }

    let mut starts = Vec::new();
    let mut current = first;
    while current.date_naive() <= until {
        if starts.len() == MAX_OCCURRENCES {
            return Err(DatabaseError::Validation(format!(
                "weekly series is limited to {MAX_OCCURRENCES} sessions"
            )));
        }
        starts.push(current);
        current += Duration::weeks(1);
    }
    Ok(starts)
}

fn validate_window(starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> Result<(), DatabaseError> {
    if ends_at <= starts_at {
        return Err(DatabaseError::Validation(
            "appointment must end after it starts".into(),
        ));
    }
    Ok(())
}

impl ClinicService {
    /// Therapists may only act on their own agenda.
    pub(crate) fn ensure_own_agenda(&self, therapist_id: &str) -> Result<(), DatabaseError> {
        let actor = self.require_staff()?;
        if actor.is_therapist() && actor.user_id != therapist_id {
            return Err(DatabaseError::Forbidden(
                "therapists can only manage their own agenda".into(),
            ));
        }
        Ok(())
    }

    async fn ensure_therapist(&self, therapist_id: &str) -> Result<(), DatabaseError> {
        let therapist = self.get_user(therapist_id).await?;
        if therapist.role != Role::Therapist || !therapist.active {
            return Err(DatabaseError::Validation(format!(
                "{} is not an active therapist",
                therapist.full_name
            )));
        }
        Ok(())
    }

    /// Book an appointment, or a weekly series when `repeat_weekly_until` is
    /// set. The series is inserted atomically.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` for an empty time window, a bad
    /// series, or a non-therapist; `DatabaseError::NotFound` for unknown
    /// patient, therapist, or room.
    pub async fn create_appointments(
        &self,
        new: &NewAppointment,
    ) -> Result<AppointmentBatch, DatabaseError> {
        self.ensure_own_agenda(&new.therapist_id)?;
        validate_window(new.starts_at, new.ends_at)?;
        let patient = self.get_patient(&new.patient_id).await?;
        self.ensure_therapist(&new.therapist_id).await?;
        if let Some(ref room_id) = new.room_id {
            self.get_room(room_id).await?;
        }

        let starts = weekly_occurrences(new.starts_at, new.repeat_weekly_until)?;
        let duration = new.ends_at - new.starts_at;
        let now = utc_now();

        let tx = self.db().conn().transaction().await?;
        let mut appointments = Vec::with_capacity(starts.len());
        for starts_at in starts {
            let id = self.db().generate_id(PREFIX_APPOINTMENT).await?;
            let ends_at = starts_at + duration;
            self.db()
                .execute(
                    &format!(
                        "INSERT INTO appointments ({SELECT_COLS})
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, NULL, ?12, ?12)"
                    ),
                    libsql::params![
                        id.as_str(),
                        patient.clinic_id.as_str(),
                        new.patient_id.as_str(),
                        new.therapist_id.as_str(),
                        new.room_id.as_deref(),
                        fmt_datetime(&starts_at),
                        fmt_datetime(&ends_at),
                        new.session_type.as_str(),
                        AppointmentStatus::Scheduled.as_str(),
                        new.notes.as_deref(),
                        new.session_fee_cents,
                        fmt_datetime(&now)
                    ],
                )
                .await?;
            self.record_audit(EntityType::Appointment, &id, AuditAction::Created, None)
                .await?;

            appointments.push(Appointment {
                id,
                clinic_id: patient.clinic_id.clone(),
                patient_id: new.patient_id.clone(),
                therapist_id: new.therapist_id.clone(),
                room_id: new.room_id.clone(),
                starts_at,
                ends_at,
                session_type: new.session_type,
                status: AppointmentStatus::Scheduled,
                notes: new.notes.clone(),
                session_fee_cents: new.session_fee_cents,
                ledger_entry_id: None,
                created_at: now,
                updated_at: now,
            });
        }
        tx.commit().await?;

        tracing::info!(count = appointments.len(), "booked appointments");
        Ok(AppointmentBatch { appointments })
    }

    /// Fetch an appointment visible to the actor.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` for unknown, foreign, or (for
    /// therapists) other therapists' appointments.
    pub async fn get_appointment(&self, id: &str) -> Result<Appointment, DatabaseError> {
        let mut filter = self.agenda_filter()?;
        filter.push("id =", id);
        let sql = format!("SELECT {SELECT_COLS} FROM appointments {}", filter.where_clause());
        let mut rows = self
            .db()
            .query(&sql, libsql::params_from_iter(filter.into_params()))
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::Appointment, id))?;
        row_to_appointment(&row)
    }

    fn agenda_filter(&self) -> Result<SqlFilter, DatabaseError> {
        let mut filter = self.scoped_filter("clinic_id")?;
        let actor = self.require_actor()?;
        if actor.is_therapist() {
            filter.push("therapist_id =", actor.user_id.as_str());
        }
        Ok(filter)
    }

    /// Agenda query ordered by start time.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_appointments(
        &self,
        filter: &AppointmentFilter,
    ) -> Result<Vec<Appointment>, DatabaseError> {
        let mut sql_filter = self.agenda_filter()?;
        if let Some(ref from) = filter.from {
            sql_filter.push("starts_at >=", fmt_datetime(from));
        }
        if let Some(ref to) = filter.to {
            sql_filter.push("starts_at <", fmt_datetime(to));
        }
        if let Some(ref patient_id) = filter.patient_id {
            sql_filter.push("patient_id =", patient_id.as_str());
        }
        if let Some(ref therapist_id) = filter.therapist_id {
            sql_filter.push("therapist_id =", therapist_id.as_str());
        }
        if let Some(status) = filter.status {
            sql_filter.push("status =", status.as_str());
        }

        let limit = filter.limit.unwrap_or(500);
        let sql = format!(
            "SELECT {SELECT_COLS} FROM appointments {} ORDER BY starts_at, rowid LIMIT {limit}",
            sql_filter.where_clause()
        );
        let mut rows = self
            .db()
            .query(&sql, libsql::params_from_iter(sql_filter.into_params()))
            .await?;
        let mut appointments = Vec::new();
        while let Some(row) = rows.next().await? {
            appointments.push(row_to_appointment(&row)?);
        }
        Ok(appointments)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` if the resulting window is empty.
    pub async fn update_appointment(
        &self,
        appointment_id: &str,
        update: AppointmentUpdate,
    ) -> Result<Appointment, DatabaseError> {
        let current = self.get_appointment(appointment_id).await?;
        self.ensure_own_agenda(&current.therapist_id)?;

        let starts_at = update.starts_at.unwrap_or(current.starts_at);
        let ends_at = update.ends_at.unwrap_or(current.ends_at);
        validate_window(starts_at, ends_at)?;

        let mut sets = SetClause::new();
        if let Some(ref therapist_id) = update.therapist_id {
            self.ensure_own_agenda(therapist_id)?;
            self.ensure_therapist(therapist_id).await?;
            sets.set("therapist_id", therapist_id.as_str());
        }
        if let Some(ref room_id) = update.room_id {
            if let Some(room_id) = room_id {
                self.get_room(room_id).await?;
            }
            sets.set("room_id", opt_text(room_id.as_deref()));
        }
        if update.starts_at.is_some() {
            sets.set("starts_at", fmt_datetime(&starts_at));
        }
        if update.ends_at.is_some() {
            sets.set("ends_at", fmt_datetime(&ends_at));
        }
        if let Some(session_type) = update.session_type {
            sets.set("session_type", session_type.as_str());
        }
        if let Some(ref notes) = update.notes {
            sets.set("notes", opt_text(notes.as_deref()));
        }
        if let Some(fee) = update.session_fee_cents {
            sets.set("session_fee_cents", opt_int(fee));
        }

        if sets.is_empty() {
            return Ok(current);
        }
        sets.set("updated_at", fmt_datetime(&utc_now()));

        let (sql, params) = sets.into_update("appointments", appointment_id);
        self.db()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;
        self.record_audit_with(
            EntityType::Appointment,
            appointment_id,
            AuditAction::Updated,
            &update,
        )
        .await?;
        self.get_appointment(appointment_id).await
    }

    /// Move an appointment through its state machine.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` for a disallowed transition.
    pub async fn set_appointment_status(
        &self,
        appointment_id: &str,
        status: AppointmentStatus,
        reason: Option<&str>,
    ) -> Result<Appointment, DatabaseError> {
        let current = self.get_appointment(appointment_id).await?;
        self.ensure_own_agenda(&current.therapist_id)?;

        if !current.status.can_transition_to(status) {
            return Err(CoreError::invalid_transition(
                EntityType::Appointment,
                appointment_id,
                current.status,
                status,
            )
            .into());
        }

        let now = utc_now();
        self.db()
            .execute(
                "UPDATE appointments SET status = ?1, updated_at = ?2 WHERE id = ?3",
                libsql::params![status.as_str(), fmt_datetime(&now), appointment_id],
            )
            .await?;

        let detail = StatusChangedDetail {
            from: current.status.as_str().to_string(),
            to: status.as_str().to_string(),
            reason: reason.map(String::from),
        };
        self.record_audit_with(
            EntityType::Appointment,
            appointment_id,
            AuditAction::StatusChanged,
            &detail,
        )
        .await?;

        Ok(Appointment {
            status,
            updated_at: now,
            ..current
        })
    }

    /// Delete one appointment, or it and every later unbilled appointment
    /// for the same patient and therapist.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` when the appointment was billed.
    pub async fn delete_appointment(
        &self,
        appointment_id: &str,
        scope: DeleteScope,
    ) -> Result<DeleteOutcome, DatabaseError> {
        let current = self.get_appointment(appointment_id).await?;
        self.ensure_own_agenda(&current.therapist_id)?;
        if current.ledger_entry_id.is_some() {
            return Err(DatabaseError::InvalidState(format!(
                "appointment {appointment_id} was billed; reverse the ledger entry first"
            )));
        }

        let deleted = match scope {
            DeleteScope::Single => {
                self.db()
                    .execute("DELETE FROM appointments WHERE id = ?1", [appointment_id])
                    .await?
            }
            DeleteScope::ThisAndFuture => {
                self.db()
                    .execute(
                        "DELETE FROM appointments
                         WHERE patient_id = ?1 AND therapist_id = ?2 AND starts_at >= ?3
                           AND ledger_entry_id IS NULL",
                        libsql::params![
                            current.patient_id.as_str(),
                            current.therapist_id.as_str(),
                            fmt_datetime(&current.starts_at)
                        ],
                    )
                    .await?
            }
        };
        let deleted = u32::try_from(deleted).unwrap_or(u32::MAX);

        self.record_audit_with(
            EntityType::Appointment,
            appointment_id,
            AuditAction::Deleted,
            &SeriesDeletedDetail {
                from_appointment: appointment_id.to_string(),
                deleted,
            },
        )
        .await?;
        Ok(DeleteOutcome { deleted })
    }

    /// The patient's most recent completed sessions, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the patient is not visible.
    pub async fn recent_completed_appointments(
        &self,
        patient_id: &str,
        count: u32,
    ) -> Result<Vec<Appointment>, DatabaseError> {
        self.get_patient(patient_id).await?;
        let mut rows = self
            .db()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM appointments
                     WHERE patient_id = ?1 AND status = ?2
                     ORDER BY starts_at DESC, rowid DESC LIMIT {count}"
                ),
                libsql::params![patient_id, AppointmentStatus::Completed.as_str()],
            )
            .await?;
        let mut appointments = Vec::new();
        while let Some(row) = rows.next().await? {
            appointments.push(row_to_appointment(&row)?);
        }
        Ok(appointments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{at, one_hour, seed_appointment, seed_patient, seed_therapist, test_service};
    use crate::updates::appointment::AppointmentUpdateBuilder;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case::single(None, 1)]
    #[case::same_day(Some((2025, 3, 10)), 1)]
    #[case::inclusive_end_day(Some((2025, 3, 31)), 4)]
    #[case::day_before_fourth(Some((2025, 3, 30)), 3)]
    fn weekly_series_counts(#[case] until: Option<(i32, u32, u32)>, #[case] expected: usize) {
        let until = until.map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap());
        let starts = weekly_occurrences(at(0, 14), until).unwrap();
        assert_eq!(starts.len(), expected);
        assert_eq!(starts[0], at(0, 14));
        if expected > 1 {
            assert_eq!(starts[1], at(7, 14));
        }
    }

    #[test]
    fn series_ending_before_start_is_rejected() {
        let until = NaiveDate::from_ymd_opt(2025, 3, 9);
        assert!(matches!(
            weekly_occurrences(at(0, 14), until),
            Err(DatabaseError::Validation(_))
        ));
    }

    #[test]
    fn overlong_series_is_rejected() {
        let until = NaiveDate::from_ymd_opt(2030, 1, 1);
        assert!(matches!(
            weekly_occurrences(at(0, 14), until),
            Err(DatabaseError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn create_weekly_series() {
        let svc = test_service().await;
        let ana = seed_patient(&svc, "Ana Silva").await;
        let sam = seed_therapist(&svc, "Samuel Rocha").await;

        let batch = svc
            .create_appointments(&NewAppointment {
                repeat_weekly_until: NaiveDate::from_ymd_opt(2025, 3, 24),
                ..one_hour(&ana.id, &sam.id, at(0, 14))
            })
            .await
            .unwrap();
        assert_eq!(batch.appointments.len(), 3);
        assert!(batch.appointments.iter().all(|a| a.status == AppointmentStatus::Scheduled));
        assert_eq!(batch.appointments[2].starts_at, at(14, 14));
        assert_eq!(batch.appointments[2].ends_at, at(14, 15));

        let listed = svc
            .list_appointments(&AppointmentFilter::default())
            .await
            .unwrap();
        assert_eq!(listed, batch.appointments);
    }

    #[tokio::test]
    async fn empty_window_is_rejected() {
        let svc = test_service().await;
        let ana = seed_patient(&svc, "Ana Silva").await;
        let sam = seed_therapist(&svc, "Samuel Rocha").await;
        let result = svc
            .create_appointments(&NewAppointment {
                ends_at: at(0, 14),
                ..one_hour(&ana.id, &sam.id, at(0, 14))
            })
            .await;
        assert!(matches!(result, Err(DatabaseError::Validation(_))));
    }

    #[tokio::test]
    async fn list_by_window() {
        let svc = test_service().await;
        let ana = seed_patient(&svc, "Ana Silva").await;
        let sam = seed_therapist(&svc, "Samuel Rocha").await;
        seed_appointment(&svc, &ana.id, &sam.id, at(0, 9)).await;
        let tuesday = seed_appointment(&svc, &ana.id, &sam.id, at(1, 9)).await;
        seed_appointment(&svc, &ana.id, &sam.id, at(2, 9)).await;

        let listed = svc
            .list_appointments(&AppointmentFilter {
                from: Some(at(1, 0)),
                to: Some(at(2, 0)),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, tuesday.id);
    }

    #[tokio::test]
    async fn therapists_only_see_their_own_agenda() {
        let mut svc = test_service().await;
        let ana = seed_patient(&svc, "Ana Silva").await;
        let sam = seed_therapist(&svc, "Samuel Rocha").await;
        let lia = seed_therapist(&svc, "Lia Prado").await;
        seed_appointment(&svc, &ana.id, &sam.id, at(0, 9)).await;
        let lias = seed_appointment(&svc, &ana.id, &lia.id, at(0, 11)).await;

        svc.act_as(&sam.id).await.unwrap();
        let listed = svc
            .list_appointments(&AppointmentFilter::default())
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].therapist_id, sam.id);

        assert!(matches!(
            svc.get_appointment(&lias.id).await,
            Err(DatabaseError::NotFound { .. })
        ));
        let booking_for_other = svc
            .create_appointments(&one_hour(&ana.id, &lia.id, at(3, 9)))
            .await;
        assert!(matches!(booking_for_other, Err(DatabaseError::Forbidden(_))));
    }

    #[tokio::test]
    async fn status_transitions_follow_state_machine() {
        let svc = test_service().await;
        let ana = seed_patient(&svc, "Ana Silva").await;
        let sam = seed_therapist(&svc, "Samuel Rocha").await;
        let apt = seed_appointment(&svc, &ana.id, &sam.id, at(0, 9)).await;

        let no_show = svc
            .set_appointment_status(&apt.id, AppointmentStatus::NoShow, Some("faltou"))
            .await
            .unwrap();
        assert_eq!(no_show.status, AppointmentStatus::NoShow);

        let rebooked = svc
            .set_appointment_status(&apt.id, AppointmentStatus::Scheduled, None)
            .await
            .unwrap();
        assert_eq!(rebooked.status, AppointmentStatus::Scheduled);

        svc.set_appointment_status(&apt.id, AppointmentStatus::Completed, None)
            .await
            .unwrap();
        let result = svc
            .set_appointment_status(&apt.id, AppointmentStatus::Cancelled, None)
            .await;
        assert!(matches!(result, Err(DatabaseError::InvalidState(_))));
    }

    #[tokio::test]
    async fn update_moves_appointment() {
        let svc = test_service().await;
        let ana = seed_patient(&svc, "Ana Silva").await;
        let sam = seed_therapist(&svc, "Samuel Rocha").await;
        let room = svc.create_room("Sala Verde", None, None, None).await.unwrap();
        let apt = seed_appointment(&svc, &ana.id, &sam.id, at(0, 9)).await;

        let moved = svc
            .update_appointment(
                &apt.id,
                AppointmentUpdateBuilder::new()
                    .starts_at(at(0, 10))
                    .ends_at(at(0, 11))
                    .room_id(Some(room.id.clone()))
                    .build(),
            )
            .await
            .unwrap();
        assert_eq!(moved.starts_at, at(0, 10));
        assert_eq!(moved.room_id, Some(room.id));

        let inverted = svc
            .update_appointment(&apt.id, AppointmentUpdateBuilder::new().ends_at(at(0, 8)).build())
            .await;
        assert!(matches!(inverted, Err(DatabaseError::Validation(_))));
    }

    #[tokio::test]
    async fn delete_this_and_future_keeps_past_and_other_therapists() {
        let svc = test_service().await;
        let ana = seed_patient(&svc, "Ana Silva").await;
        let sam = seed_therapist(&svc, "Samuel Rocha").await;
        let lia = seed_therapist(&svc, "Lia Prado").await;

        let batch = svc
            .create_appointments(&NewAppointment {
                repeat_weekly_until: NaiveDate::from_ymd_opt(2025, 4, 7),
                ..one_hour(&ana.id, &sam.id, at(0, 14))
            })
            .await
            .unwrap();
        assert_eq!(batch.appointments.len(), 5);
        seed_appointment(&svc, &ana.id, &lia.id, at(21, 9)).await;

        let outcome = svc
            .delete_appointment(&batch.appointments[2].id, DeleteScope::ThisAndFuture)
            .await
            .unwrap();
        assert_eq!(outcome.deleted, 3);

        let remaining = svc
            .list_appointments(&AppointmentFilter::default())
            .await
            .unwrap();
        assert_eq!(remaining.len(), 3);
    }

    #[tokio::test]
    async fn recent_completed_newest_first() {
        let svc = test_service().await;
        let ana = seed_patient(&svc, "Ana Silva").await;
        let sam = seed_therapist(&svc, "Samuel Rocha").await;
        for day in 0..5 {
            let apt = seed_appointment(&svc, &ana.id, &sam.id, at(day, 9)).await;
            if day != 4 {
                svc.set_appointment_status(&apt.id, AppointmentStatus::Completed, None)
                    .await
                    .unwrap();
            }
        }

        let recent = svc.recent_completed_appointments(&ana.id, 3).await.unwrap();
        let starts: Vec<_> = recent.iter().map(|a| a.starts_at).collect();
        assert_eq!(starts, vec![at(3, 9), at(2, 9), at(1, 9)]);
    }
}
