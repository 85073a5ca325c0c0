//! The `{{VARIABLE}}` catalog and how each value is computed.
//!
//! Every variable has a fallback used when its source record or field is
//! missing, so a template never renders an empty hole for known names.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

use chrono::NaiveDate;
use serde::Serialize;

use crate::context::{GenerationContext, GenerationKind};

/// One template variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VariableSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub fallback: &'static str,
}

const NOT_INFORMED: &str = "Não informado";

const fn variable(name: &'static str, description: &'static str, fallback: &'static str) -> VariableSpec {
    VariableSpec {
        name,
        description,
        fallback,
    }
}

/// Every variable a template may use.
pub const CATALOG: &[VariableSpec] = &[
    variable("NOME", "Patient name (codename when anonymized)", "Paciente"),
    variable("IDADE", "Patient age in whole years", NOT_INFORMED),
    variable("DIAGNOSTICO", "Main diagnosis, or medical history", NOT_INFORMED),
    variable("DIAGNOSTICO_E_ANAMNESE", "Diagnosis with the anamnesis summary", NOT_INFORMED),
    variable("PREFERENCIAS", "Music preferences", NOT_INFORMED),
    variable("SENSIBILIDADES", "Sensitivities, or motor development notes", NOT_INFORMED),
    variable("ULTIMAS_SESSOES", "Last completed sessions with their notes", "Nenhuma sessão anterior registrada."),
    variable("HISTORICO_RELATORIOS", "Last finalized session reports", "Nenhum relatório anterior."),
    variable("HISTORICO_PLANOS", "Last intervention plans", "Nenhum plano anterior."),
    variable("HISTORICO_JOGOS", "Last music games played", "Nenhum jogo registrado."),
    variable("OBJETIVO_PRINCIPAL_PLANO", "Objective carried over from the latest plan", "Não especificado."),
    variable("DATA_SESSAO", "Session date (today for plans)", NOT_INFORMED),
    variable("RECURSOS_LISTA", "Usable clinic resources", "Nenhum recurso cadastrado."),
    variable("SALAS_LISTA", "Active clinic rooms", "Nenhuma sala cadastrada."),
    variable("RELATO_SESSAO", "Therapist's account of the session", NOT_INFORMED),
    variable("RELATO_LIVRE_TERAPEUTA", "Therapist's account of the session", NOT_INFORMED),
    variable("TERAPEUTA_NOME", "Therapist name (codename when anonymized)", "Terapeuta"),
    variable("TERAPEUTA_FORMACAO", "Therapist education", "Profissional de Saúde"),
    variable("TERAPEUTA_TECNICAS_PREFERIDAS", "Preferred techniques", NOT_INFORMED),
    variable("TERAPEUTA_RECURSOS_PREFERIDOS", "Preferred resources", NOT_INFORMED),
    variable("TERAPEUTA_ESTILO_CONDUCAO", "Session conducting style", NOT_INFORMED),
    variable("TERAPEUTA_OBSERVACOES", "Clinical notes from the therapist profile", NOT_INFORMED),
    variable("TERAPEUTA_CREDENCIAL_COM_REGISTRO", "Therapist name with professional registry", "Terapeuta"),
];

const FIRST_PLAN_OBJECTIVE: &str = "Não especificado (primeiro plano).";
const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y";

/// Look up a catalog entry.
#[must_use]
pub fn lookup(name: &str) -> Option<&'static VariableSpec> {
    CATALOG.iter().find(|v| v.name == name)
}

/// Computed variable values, before anonymization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedVariables {
    pub values: BTreeMap<String, String>,
    /// Variables that fell back to their default text.
    pub fallbacks: BTreeSet<&'static str>,
}

impl ResolvedVariables {
    fn set(&mut self, name: &'static str, value: Option<String>) {
        let fallback = lookup(name).map_or("", |v| v.fallback);
        self.set_or(name, value, fallback);
    }

    fn set_or(&mut self, name: &'static str, value: Option<String>, fallback: &str) {
        match value.filter(|v| !v.trim().is_empty()) {
            Some(value) => {
                self.values.insert(name.to_string(), value);
            }
            None => {
                self.values.insert(name.to_string(), fallback.to_string());
                self.fallbacks.insert(name);
            }
        }
    }

    /// Apply `f` to every value.
    #[must_use]
    pub fn map_values(mut self, f: impl Fn(&str) -> String) -> Self {
        for value in self.values.values_mut() {
            *value = f(value);
        }
        self
    }
}

fn format_date(date: NaiveDate, format: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", date.format(format)).is_err() {
        tracing::warn!(format, "invalid date format, using {DEFAULT_DATE_FORMAT}");
        return date.format(DEFAULT_DATE_FORMAT).to_string();
    }
    out
}

fn text(value: Option<&String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

fn join_nonempty<I: IntoIterator<Item = String>>(items: I, sep: &str) -> Option<String> {
    let joined = items.into_iter().collect::<Vec<_>>().join(sep);
    (!joined.is_empty()).then_some(joined)
}

/// Codenames that stand in for the patient and therapist name variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Codenames<'a> {
    pub patient: &'a str,
    pub therapist: &'a str,
}

/// Compute every catalog variable for a context, with real names.
#[must_use]
pub fn resolve(ctx: &GenerationContext, date_format: &str) -> ResolvedVariables {
    resolve_with(ctx, date_format, None)
}

/// Compute every catalog variable. With `codenames`, `NOME`,
/// `TERAPEUTA_NOME` and the name part of `TERAPEUTA_CREDENCIAL_COM_REGISTRO`
/// are the codenames themselves, whatever the real names look like.
#[must_use]
pub fn resolve_with(
    ctx: &GenerationContext,
    date_format: &str,
    codenames: Option<Codenames<'_>>,
) -> ResolvedVariables {
    let mut vars = ResolvedVariables::default();
    let anamnesis = &ctx.anamnesis;
    let profile = &ctx.profile;
    let date = |d: NaiveDate| format_date(d, date_format);

    let patient_name = codenames.map_or_else(|| ctx.patient.name.trim().to_string(), |c| c.patient.to_string());
    vars.set("NOME", Some(patient_name));
    vars.set(
        "IDADE",
        Some(ctx.patient.age_on(ctx.session_date).to_string()),
    );

    let diagnosis = text(anamnesis.main_diagnosis.as_ref())
        .filter(|d| !d.is_empty())
        .or_else(|| text(anamnesis.medical_history.as_ref()));
    vars.set("DIAGNOSTICO", diagnosis);

    let summary = [
        ("Diagnóstico", &anamnesis.main_diagnosis),
        ("Histórico médico", &anamnesis.medical_history),
        ("Desenvolvimento motor", &anamnesis.motor_development),
        ("Sensibilidades", &anamnesis.sensitivities),
    ]
    .into_iter()
    .filter_map(|(label, value)| {
        text(value.as_ref())
            .filter(|v| !v.is_empty())
            .map(|v| format!("{label}: {v}"))
    });
    vars.set("DIAGNOSTICO_E_ANAMNESE", join_nonempty(summary, "\n"));

    vars.set("PREFERENCIAS", text(anamnesis.music_preferences.as_ref()));
    vars.set(
        "SENSIBILIDADES",
        text(anamnesis.sensitivities.as_ref())
            .filter(|s| !s.is_empty())
            .or_else(|| text(anamnesis.motor_development.as_ref())),
    );

    let sessions = ctx.recent_sessions.iter().map(|apt| {
        let notes = apt
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or("Sem observações");
        format!("- {}: {notes}", date(apt.starts_at.date_naive()))
    });
    vars.set("ULTIMAS_SESSOES", join_nonempty(sessions, "\n"));

    let reports = ctx.recent_reports.iter().rev().map(|r| {
        format!(
            "--- Relatório de {} ---\n{}",
            date(r.created_at.date_naive()),
            r.generated_text.trim()
        )
    });
    vars.set("HISTORICO_RELATORIOS", join_nonempty(reports, "\n\n"));

    let plans = ctx.plans.iter().rev().map(|p| {
        format!(
            "--- Plano de {}: {} ---\n{}",
            date(p.created_at.date_naive()),
            p.title,
            p.final_text.trim()
        )
    });
    vars.set("HISTORICO_PLANOS", join_nonempty(plans, "\n\n"));

    let games = ctx.games.iter().map(|g| {
        let mut details = Vec::new();
        if let Some(ref difficulty) = g.difficulty {
            details.push(format!("dificuldade: {difficulty}"));
        }
        if let Some(score) = g.score {
            details.push(format!("pontuação: {score}"));
        }
        let details = if details.is_empty() {
            String::new()
        } else {
            format!(" ({})", details.join(", "))
        };
        format!("- {}: {}{details}", date(g.played_at.date_naive()), g.game_name)
    });
    vars.set("HISTORICO_JOGOS", join_nonempty(games, "\n"));

    let objective = ctx
        .plans
        .first()
        .map(|p| format!("Conforme último plano de intervenção ({}).", p.title));
    match ctx.kind {
        GenerationKind::Plan => vars.set_or("OBJETIVO_PRINCIPAL_PLANO", objective, FIRST_PLAN_OBJECTIVE),
        GenerationKind::Report => vars.set("OBJETIVO_PRINCIPAL_PLANO", objective),
    }

    vars.set("DATA_SESSAO", Some(date(ctx.session_date)));
    vars.set(
        "RECURSOS_LISTA",
        join_nonempty(ctx.resources.iter().map(|r| r.name.clone()), ", "),
    );
    vars.set(
        "SALAS_LISTA",
        join_nonempty(ctx.rooms.iter().map(|r| r.name.clone()), ", "),
    );

    let notes = text(ctx.session_notes.as_ref());
    vars.set("RELATO_SESSAO", notes.clone());
    vars.set("RELATO_LIVRE_TERAPEUTA", notes);

    let therapist_name = codenames.map_or_else(
        || ctx.therapist.full_name.trim().to_string(),
        |c| c.therapist.to_string(),
    );
    vars.set("TERAPEUTA_NOME", Some(therapist_name.clone()));
    vars.set("TERAPEUTA_FORMACAO", text(profile.education.as_ref()));
    vars.set(
        "TERAPEUTA_TECNICAS_PREFERIDAS",
        text(profile.preferred_techniques.as_ref()),
    );
    vars.set(
        "TERAPEUTA_RECURSOS_PREFERIDOS",
        text(profile.preferred_resources.as_ref()),
    );
    vars.set(
        "TERAPEUTA_ESTILO_CONDUCAO",
        text(profile.conducting_style.as_ref()),
    );
    vars.set("TERAPEUTA_OBSERVACOES", text(profile.clinical_notes.as_ref()));

    let credential = match text(profile.professional_registry.as_ref()).filter(|r| !r.is_empty()) {
        Some(registry) => format!("{therapist_name} - {registry}"),
        None => therapist_name,
    };
    vars.set("TERAPEUTA_CREDENCIAL_COM_REGISTRO", Some(credential));

    vars
}
