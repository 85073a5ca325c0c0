//! Plan and report generation against an in-memory clinic.
//!
//! The provider is a fake that records what it was sent and answers in
//! codenames, so these tests check both directions of the name mapping.

use std::sync::Mutex;

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use pretty_assertions::assert_eq;

use clinic_ai::{
    AiError, GenerateOptions, GenerationRequest, Generator, PromptComposer, TextGenerator,
};
use clinic_config::AnonymizationConfig;
use clinic_core::entities::{Anamnesis, TherapistProfile};
use clinic_core::enums::{AppointmentStatus, PromptCategory, ReportStatus, Role, SessionType};
use clinic_db::repos::appointment::NewAppointment;
use clinic_db::repos::clinic::NewClinic;
use clinic_db::repos::patient::NewPatient;
use clinic_db::repos::plan::NewPlan;
use clinic_db::repos::prompt::NewPrompt;
use clinic_db::repos::report::ReportDraft;
use clinic_db::repos::user::NewUser;
use clinic_db::service::ClinicService;

struct EchoGenerator {
    reply: String,
    seen: Mutex<Vec<GenerationRequest>>,
}

impl EchoGenerator {
    fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn prompts(&self) -> Vec<String> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.prompt.clone())
            .collect()
    }
}

impl TextGenerator for &EchoGenerator {
    async fn generate(&self, req: &GenerationRequest) -> Result<String, AiError> {
        self.seen.lock().unwrap().push(req.clone());
        Ok(self.reply.clone())
    }
}

struct Fixture {
    svc: ClinicService,
    therapist_id: String,
    patient_id: String,
    plan_prompt: String,
    report_prompt: String,
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn fixture() -> Fixture {
    let mut svc = ClinicService::new_local(":memory:").await.unwrap();
    svc.bootstrap_clinic(
        &NewClinic::named("Clínica Som & Ser"),
        "Helena Costa",
        "helena@example.com",
    )
    .await
    .unwrap();

    let sam = svc
        .create_user(&NewUser {
            full_name: "Samuel Rocha".into(),
            email: "sam@example.com".into(),
            phone: None,
            role: Role::Therapist,
            clinic_id: None,
        })
        .await
        .unwrap();
    let ana = svc
        .create_patient(&NewPatient {
            name: "Ana Silva".into(),
            birth_date: date(2018, 4, 2),
            notes: None,
            default_session_fee_cents: None,
        })
        .await
        .unwrap();
    svc.link_therapist(&ana.id, &sam.id).await.unwrap();
    svc.upsert_anamnesis(&Anamnesis {
        patient_id: ana.id.clone(),
        main_diagnosis: Some("TEA nível 1; Ana evita ruídos altos".into()),
        music_preferences: Some("Percussão".into()),
        ..Anamnesis::default()
    })
    .await
    .unwrap();

    svc.act_as(&sam.id).await.unwrap();
    svc.upsert_therapist_profile(&TherapistProfile {
        user_id: sam.id.clone(),
        professional_registry: Some("UBAM 1234".into()),
        education: Some("Musicoterapia".into()),
        ..TherapistProfile::default()
    })
    .await
    .unwrap();

    let plan_prompt = svc
        .create_prompt(&NewPrompt {
            name: "Plano mensal".into(),
            description: None,
            body: "Paciente: {{NOME}}, Idade: {{IDADE}}\nDiagnóstico: {{DIAGNOSTICO}}\n\
                   Sessões:\n{{ULTIMAS_SESSOES}}\nTerapeuta: {{TERAPEUTA_CREDENCIAL_COM_REGISTRO}}\n\
                   Objetivo: {{OBJETIVO_PRINCIPAL_PLANO}}"
                .into(),
            model: None,
            temperature: Some(0.5),
            category: PromptCategory::Plan,
        })
        .await
        .unwrap();
    let report_prompt = svc
        .create_prompt(&NewPrompt {
            name: "Relatório".into(),
            description: None,
            body: "Sessão de {{DATA_SESSAO}} com {{NOME}}.\nRelato: {{RELATO_SESSAO}}\n\
                   Anteriores:\n{{HISTORICO_RELATORIOS}}"
                .into(),
            model: Some("gemini-2.5-pro".into()),
            temperature: None,
            category: PromptCategory::Report,
        })
        .await
        .unwrap();

    Fixture {
        svc,
        therapist_id: sam.id,
        patient_id: ana.id,
        plan_prompt: plan_prompt.id,
        report_prompt: report_prompt.id,
    }
}

async fn completed_session(fx: &Fixture, day: u32, notes: &str) -> String {
    let start = Utc.with_ymd_and_hms(2025, 3, day, 14, 0, 0).unwrap();
    let batch = fx
        .svc
        .create_appointments(&NewAppointment {
            patient_id: fx.patient_id.clone(),
            therapist_id: fx.therapist_id.clone(),
            room_id: None,
            starts_at: start,
            ends_at: start + Duration::minutes(50),
            session_type: SessionType::Individual,
            notes: Some(notes.into()),
            session_fee_cents: None,
            repeat_weekly_until: None,
        })
        .await
        .unwrap();
    let id = batch.appointments[0].id.clone();
    fx.svc
        .set_appointment_status(&id, AppointmentStatus::Completed, None)
        .await
        .unwrap();
    id
}

fn composer() -> PromptComposer {
    PromptComposer::new(AnonymizationConfig::default(), "gemini-2.5-flash")
}

#[tokio::test]
async fn plan_prompt_never_carries_real_names() {
    let fx = fixture().await;
    completed_session(&fx, 3, "Ana tocou tambor com Samuel").await;
    completed_session(&fx, 10, "Explorou chocalhos").await;

    let echo = EchoGenerator::new("Plano para HORACE, conduzido por SAM.");
    let generator = Generator::new(composer(), &echo);
    let generation = generator
        .generate_plan(
            &fx.svc,
            &fx.plan_prompt,
            &fx.patient_id,
            date(2025, 3, 17),
            GenerateOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(generation.text, "Plano para Ana Silva, conduzido por Samuel Rocha.");
    assert_eq!(generation.model, "gemini-2.5-flash");

    let prompts = echo.prompts();
    assert_eq!(prompts.len(), 1);
    assert_eq!(prompts[0], generation.prompt_used);
    assert_eq!(
        prompts[0],
        "Paciente: HORACE, Idade: 6\n\
         Diagnóstico: TEA nível 1; HORACE evita ruídos altos\n\
         Sessões:\n\
         - 10/03/2025: Explorou chocalhos\n\
         - 03/03/2025: HORACE tocou tambor com SAM\n\
         Terapeuta: SAM - UBAM 1234\n\
         Objetivo: Não especificado (primeiro plano)."
    );
}

#[tokio::test]
async fn report_uses_session_date_and_previous_reports() {
    let fx = fixture().await;
    let first = completed_session(&fx, 3, "Primeira sessão").await;
    fx.svc
        .save_report(&ReportDraft {
            appointment_id: first,
            prompt_id: None,
            raw_notes: "Ana chegou agitada".into(),
            generated_text: "Ana Silva respondeu bem ao tambor.".into(),
            status: ReportStatus::Finalized,
        })
        .await
        .unwrap();
    let second = completed_session(&fx, 10, "Segunda sessão").await;

    let echo = EchoGenerator::new("HORACE manteve o foco.");
    let generator = Generator::new(composer(), &echo);
    let generation = generator
        .generate_report(
            &fx.svc,
            &fx.report_prompt,
            &second,
            "Ana cantou junto com Samuel",
            GenerateOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(generation.text, "Ana Silva manteve o foco.");
    assert_eq!(generation.model, "gemini-2.5-pro");
    // Previous reports are dated by when they were written.
    let prompt = &generation.prompt_used;
    assert!(prompt.starts_with(
        "Sessão de 10/03/2025 com HORACE.\n\
         Relato: HORACE cantou junto com SAM\n\
         Anteriores:\n\
         --- Relatório de "
    ));
    assert!(prompt.ends_with(" ---\nHORACE respondeu bem ao tambor."));
    assert!(!prompt.contains("Ana"));
}

#[tokio::test]
async fn previous_plan_feeds_the_objective() {
    let fx = fixture().await;
    fx.svc
        .save_plan(&NewPlan {
            patient_id: fx.patient_id.clone(),
            prompt_id: None,
            title: "Regulação sensorial".into(),
            original_text: "Trabalhar tolerância a sons.".into(),
            final_text: None,
            model_label: None,
        })
        .await
        .unwrap();

    let composed = composer()
        .compose_plan(
            &fx.svc,
            &fx.plan_prompt,
            &fx.patient_id,
            date(2025, 3, 17),
            GenerateOptions::default(),
        )
        .await
        .unwrap();
    assert!(
        composed
            .prompt
            .ends_with("Objetivo: Conforme último plano de intervenção (Regulação sensorial).")
    );
    assert!(!composed.prompt.contains("{{"));
}

#[tokio::test]
async fn wrong_template_category_fails_before_any_call() {
    let fx = fixture().await;
    let echo = EchoGenerator::new("unused");
    let generator = Generator::new(composer(), &echo);

    let err = generator
        .generate_plan(
            &fx.svc,
            &fx.report_prompt,
            &fx.patient_id,
            date(2025, 3, 17),
            GenerateOptions::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AiError::Template(_)));

    let err = generator
        .generate_plan(
            &fx.svc,
            &fx.plan_prompt,
            "pat-missing",
            date(2025, 3, 17),
            GenerateOptions::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AiError::Database(_)));
    assert!(echo.prompts().is_empty());
}
