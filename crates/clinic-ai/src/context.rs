//! Loading the records a generation draws on.

use chrono::NaiveDate;

use clinic_core::entities::{
    Anamnesis, Appointment, GameSession, InterventionPlan, Patient, PromptTemplate, Resource,
    Room, SessionReport, TherapistProfile, User,
};
use clinic_core::enums::PromptCategory;
use clinic_db::service::ClinicService;

use crate::AiError;

/// How many past sessions, reports, and plans are quoted in a prompt.
pub const HISTORY_DEPTH: u32 = 3;
const GAME_HISTORY_DEPTH: u32 = 5;
const CATALOG_LIMIT: u32 = 200;

/// What is being written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationKind {
    Plan,
    Report,
}

impl GenerationKind {
    /// Template category usable for this kind.
    #[must_use]
    pub const fn category(self) -> PromptCategory {
        match self {
            Self::Plan => PromptCategory::Plan,
            Self::Report => PromptCategory::Report,
        }
    }
}

/// Everything a template may reference for one patient.
#[derive(Debug, Clone)]
pub struct GenerationContext {
    pub kind: GenerationKind,
    pub prompt: PromptTemplate,
    pub patient: Patient,
    pub anamnesis: Anamnesis,
    pub therapist: User,
    pub profile: TherapistProfile,
    /// Completed sessions, newest first.
    pub recent_sessions: Vec<Appointment>,
    /// Finalized reports, newest first.
    pub recent_reports: Vec<SessionReport>,
    /// Plans, newest first.
    pub plans: Vec<InterventionPlan>,
    /// Games played, newest first.
    pub games: Vec<GameSession>,
    pub resources: Vec<Resource>,
    pub rooms: Vec<Room>,
    /// Day the plan is written, or the day the reported session took place.
    pub session_date: NaiveDate,
    /// The therapist's own account of the session (reports only).
    pub session_notes: Option<String>,
}

fn ensure_usable(prompt: &PromptTemplate, kind: GenerationKind) -> Result<(), AiError> {
    if prompt.category != kind.category() {
        return Err(AiError::Template(format!(
            "prompt '{}' is a {} template, not a {} template",
            prompt.name,
            prompt.category,
            kind.category()
        )));
    }
    if !prompt.active {
        return Err(AiError::Template(format!(
            "prompt '{}' is inactive",
            prompt.name
        )));
    }
    Ok(())
}

async fn load(
    svc: &ClinicService,
    kind: GenerationKind,
    prompt: PromptTemplate,
    patient_id: &str,
    therapist_id: &str,
    session_date: NaiveDate,
    session_notes: Option<String>,
) -> Result<GenerationContext, AiError> {
    let patient = svc.get_patient(patient_id).await?;
    let anamnesis = svc.get_anamnesis(patient_id).await?;
    let therapist = svc.get_user(therapist_id).await?;
    let profile = svc.get_therapist_profile(therapist_id).await?;
    let recent_sessions = svc
        .recent_completed_appointments(patient_id, HISTORY_DEPTH)
        .await?;
    let recent_reports = svc
        .recent_finalized_reports(patient_id, HISTORY_DEPTH)
        .await?;
    let plans = svc.list_plans(patient_id, HISTORY_DEPTH).await?;
    let games = svc
        .list_game_sessions(patient_id, GAME_HISTORY_DEPTH)
        .await?;
    let resources = svc.list_resources(true, CATALOG_LIMIT).await?;
    let rooms = svc.list_rooms(true, CATALOG_LIMIT).await?;

    tracing::debug!(
        patient = %patient.id,
        sessions = recent_sessions.len(),
        reports = recent_reports.len(),
        plans = plans.len(),
        "loaded generation context"
    );

    Ok(GenerationContext {
        kind,
        prompt,
        patient,
        anamnesis,
        therapist,
        profile,
        recent_sessions,
        recent_reports,
        plans,
        games,
        resources,
        rooms,
        session_date,
        session_notes,
    })
}

/// Context for an intervention plan written today by the acting user.
///
/// # Errors
///
/// Returns [`AiError::Template`] for a report or inactive template and
/// [`AiError::Database`] when the template or patient cannot be loaded.
pub async fn load_plan_context(
    svc: &ClinicService,
    prompt_id: &str,
    patient_id: &str,
    today: NaiveDate,
) -> Result<GenerationContext, AiError> {
    let therapist_id = svc.require_staff()?.user_id.clone();
    let prompt = svc.get_prompt(prompt_id).await?;
    ensure_usable(&prompt, GenerationKind::Plan)?;
    load(
        svc,
        GenerationKind::Plan,
        prompt,
        patient_id,
        &therapist_id,
        today,
        None,
    )
    .await
}

/// Context for the report of one appointment, written from the therapist's
/// notes.
///
/// # Errors
///
/// Returns [`AiError::Template`] for a plan or inactive template and
/// [`AiError::Database`] when the template or appointment cannot be loaded.
pub async fn load_report_context(
    svc: &ClinicService,
    prompt_id: &str,
    appointment_id: &str,
    session_notes: &str,
) -> Result<GenerationContext, AiError> {
    let prompt = svc.get_prompt(prompt_id).await?;
    ensure_usable(&prompt, GenerationKind::Report)?;
    let appointment = svc.get_appointment(appointment_id).await?;
    load(
        svc,
        GenerationKind::Report,
        prompt,
        &appointment.patient_id,
        &appointment.therapist_id,
        appointment.starts_at.date_naive(),
        Some(session_notes.to_string()),
    )
    .await
}
