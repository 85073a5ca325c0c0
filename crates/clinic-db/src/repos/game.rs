//! Game session repository: results of music games played with the robots.

use chrono::{DateTime, Utc};

use clinic_core::entities::GameSession;
use clinic_core::enums::{AuditAction, EntityType};
use clinic_core::ids::PREFIX_GAME_SESSION;

use crate::error::DatabaseError;
use crate::helpers::{fmt_datetime, get_opt_string, parse_datetime, require_text, utc_now};
use crate::service::ClinicService;

const SELECT_COLS: &str = "id, clinic_id, patient_id, therapist_id, game_name, difficulty, \
     score, notes, played_at";

#[derive(Debug, Clone, Default)]
pub struct NewGameSession {
    pub patient_id: String,
    pub game_name: String,
    pub difficulty: Option<String>,
    pub score: Option<i64>,
    pub notes: Option<String>,
    /// Defaults to now.
    pub played_at: Option<DateTime<Utc>>,
}

fn row_to_game_session(row: &libsql::Row) -> Result<GameSession, DatabaseError> {
    Ok(GameSession {
        id: row.get(0)?,
        clinic_id: row.get(1)?,
        patient_id: row.get(2)?,
        therapist_id: get_opt_string(row, 3)?,
        game_name: row.get(4)?,
        difficulty: get_opt_string(row, 5)?,
        score: row.get::<Option<i64>>(6)?,
        notes: get_opt_string(row, 7)?,
        played_at: parse_datetime(&row.get::<String>(8)?)?,
    })
}

impl ClinicService {
    /// Record a played game. Therapists are recorded as the conducting
    /// therapist.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` for an unknown patient.
    pub async fn record_game_session(&self, new: &NewGameSession) -> Result<GameSession, DatabaseError> {
        let actor = self.require_staff()?;
        let therapist_id = actor.is_therapist().then(|| actor.user_id.clone());
        let game_name = require_text("game name", &new.game_name)?;
        let patient = self.get_patient(&new.patient_id).await?;

        let played_at = new.played_at.unwrap_or_else(utc_now);
        let id = self.db().generate_id(PREFIX_GAME_SESSION).await?;
        self.db()
            .execute(
                &format!(
                    "INSERT INTO game_sessions ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
                ),
                libsql::params![
                    id.as_str(),
                    patient.clinic_id.as_str(),
                    patient.id.as_str(),
                    therapist_id.as_deref(),
                    game_name,
                    new.difficulty.as_deref(),
                    new.score,
                    new.notes.as_deref(),
                    fmt_datetime(&played_at)
                ],
            )
            .await?;
        self.record_audit(EntityType::GameSession, &id, AuditAction::Created, None)
            .await?;

        Ok(GameSession {
            id,
            clinic_id: patient.clinic_id,
            patient_id: patient.id,
            therapist_id,
            game_name: game_name.to_string(),
            difficulty: new.difficulty.clone(),
            score: new.score,
            notes: new.notes.clone(),
            played_at,
        })
    }

    /// Games played by a patient, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` for an unknown patient.
    pub async fn list_game_sessions(
        &self,
        patient_id: &str,
        limit: u32,
    ) -> Result<Vec<GameSession>, DatabaseError> {
        self.get_patient(patient_id).await?;
        let mut rows = self
            .db()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM game_sessions WHERE patient_id = ?1
                     ORDER BY played_at DESC, rowid DESC LIMIT {limit}"
                ),
                [patient_id],
            )
            .await?;
        let mut sessions = Vec::new();
        while let Some(row) = rows.next().await? {
            sessions.push(row_to_game_session(&row)?);
        }
        Ok(sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{at, seed_patient, seed_therapist, test_service};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn record_and_list_newest_first() {
        let mut svc = test_service().await;
        let ana = seed_patient(&svc, "Ana Silva").await;
        let sam = seed_therapist(&svc, "Samuel Rocha").await;
        svc.act_as(&sam.id).await.unwrap();

        for (day, game) in [(0, "Ritmo"), (1, "Eco Musical")] {
            let recorded = svc
                .record_game_session(&NewGameSession {
                    patient_id: ana.id.clone(),
                    game_name: game.into(),
                    score: Some(80 + day),
                    played_at: Some(at(day, 10)),
                    ..Default::default()
                })
                .await
                .unwrap();
            assert_eq!(recorded.therapist_id.as_deref(), Some(sam.id.as_str()));
        }

        let sessions = svc.list_game_sessions(&ana.id, 10).await.unwrap();
        let names: Vec<_> = sessions.iter().map(|s| s.game_name.as_str()).collect();
        assert_eq!(names, ["Eco Musical", "Ritmo"]);
        assert_eq!(sessions[0].score, Some(81));
    }

    #[tokio::test]
    async fn blank_game_name_is_rejected() {
        let svc = test_service().await;
        let ana = seed_patient(&svc, "Ana Silva").await;
        let result = svc
            .record_game_session(&NewGameSession {
                patient_id: ana.id,
                game_name: "  ".into(),
                ..Default::default()
            })
            .await;
        assert!(matches!(result, Err(DatabaseError::Validation(_))));
    }
}
