//! Compose → generate → restore names.

use std::future::Future;

use chrono::NaiveDate;
use clinic_config::AnonymizationConfig;
use clinic_db::service::ClinicService;
use serde::Serialize;

use crate::anonymize::{Anonymizer, NameMap};
use crate::context::{GenerationContext, load_plan_context, load_report_context};
use crate::error::AiError;
use crate::template::{placeholders, render};
use crate::variables::{Codenames, resolve_with};

const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y";

/// One text-generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    pub temperature: Option<f64>,
}

/// The AI provider seam.
pub trait TextGenerator: Send + Sync {
    /// Send `req.prompt` as-is and return the raw response text.
    fn generate(
        &self,
        req: &GenerationRequest,
    ) -> impl Future<Output = Result<String, AiError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Swap patient and therapist names for codenames before sending.
    pub anonymize: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self { anonymize: true }
    }
}

/// A prompt ready to send.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComposedPrompt {
    pub model: String,
    pub temperature: Option<f64>,
    /// Exactly the text sent to the provider.
    pub prompt: String,
    pub anonymized: bool,
    /// Placeholders that are not catalog variables and rendered empty.
    pub unresolved: Vec<String>,
}

/// Generated text with names restored, plus the prompt that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Generation {
    pub text: String,
    pub prompt_used: String,
    pub model: String,
}

/// Builds prompts from generation contexts. Does not talk to any provider.
#[derive(Debug, Clone)]
pub struct PromptComposer {
    anonymization: AnonymizationConfig,
    default_model: String,
    date_format: String,
}

impl PromptComposer {
    #[must_use]
    pub fn new(anonymization: AnonymizationConfig, default_model: impl Into<String>) -> Self {
        Self {
            anonymization,
            default_model: default_model.into(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }

    /// `strftime` format used for dates inside variables.
    #[must_use]
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    /// Patient and therapist names mapped to their codenames, full names
    /// first.
    ///
    /// # Errors
    ///
    /// Returns [`AiError::Anonymization`] if a configured codename is empty.
    pub fn name_map(&self, ctx: &GenerationContext) -> Result<NameMap, AiError> {
        let mut names = NameMap::new(self.anonymization.min_name_len);
        names.insert_person(&ctx.patient.name, &self.anonymization.patient_codename)?;
        names.insert_person(&ctx.therapist.full_name, &self.anonymization.therapist_codename)?;
        Ok(names)
    }

    fn anonymizer(&self, ctx: &GenerationContext, anonymize: bool) -> Result<Anonymizer, AiError> {
        if anonymize && self.anonymization.enabled {
            self.name_map(ctx)?.compile()
        } else {
            Ok(Anonymizer::disabled())
        }
    }

    /// Resolve variables, anonymize their values, and render the template.
    ///
    /// # Errors
    ///
    /// Returns [`AiError::Anonymization`] if the name map cannot be compiled.
    pub fn compose(
        &self,
        ctx: &GenerationContext,
        anonymize: bool,
    ) -> Result<(ComposedPrompt, Anonymizer), AiError> {
        let masked = anonymize && self.anonymization.enabled;
        let anonymizer = self.anonymizer(ctx, anonymize)?;
        let codenames = masked.then(|| Codenames {
            patient: &self.anonymization.patient_codename,
            therapist: &self.anonymization.therapist_codename,
        });
        let vars = resolve_with(ctx, &self.date_format, codenames);

        for name in placeholders(&ctx.prompt.body) {
            if vars.fallbacks.contains(name.as_str()) {
                tracing::warn!(variable = %name, prompt = %ctx.prompt.id, "variable has no source data, using fallback");
            }
        }

        let values = vars.map_values(|v| anonymizer.anonymize(v)).values;
        let rendered = render(&ctx.prompt.body, &values);
        let model = ctx
            .prompt
            .model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(&self.default_model)
            .to_string();

        tracing::debug!(
            prompt = %ctx.prompt.id,
            kind = ?ctx.kind,
            model = %model,
            chars = rendered.text.chars().count(),
            anonymized = masked,
            "composed prompt"
        );

        let composed = ComposedPrompt {
            model,
            temperature: ctx.prompt.temperature,
            prompt: rendered.text,
            anonymized: masked,
            unresolved: rendered.unresolved,
        };
        Ok((composed, anonymizer))
    }

    /// Compose a plan prompt for `patient_id` as the acting therapist.
    ///
    /// # Errors
    ///
    /// See [`load_plan_context`] and [`Self::compose`].
    pub async fn compose_plan(
        &self,
        svc: &ClinicService,
        prompt_id: &str,
        patient_id: &str,
        today: NaiveDate,
        opts: GenerateOptions,
    ) -> Result<ComposedPrompt, AiError> {
        let ctx = load_plan_context(svc, prompt_id, patient_id, today).await?;
        Ok(self.compose(&ctx, opts.anonymize)?.0)
    }

    /// Compose a report prompt for one appointment.
    ///
    /// # Errors
    ///
    /// See [`load_report_context`] and [`Self::compose`].
    pub async fn compose_report(
        &self,
        svc: &ClinicService,
        prompt_id: &str,
        appointment_id: &str,
        session_notes: &str,
        opts: GenerateOptions,
    ) -> Result<ComposedPrompt, AiError> {
        let ctx = load_report_context(svc, prompt_id, appointment_id, session_notes).await?;
        Ok(self.compose(&ctx, opts.anonymize)?.0)
    }
}

/// A [`PromptComposer`] wired to a provider.
pub struct Generator<G> {
    composer: PromptComposer,
    generator: G,
}

impl<G: TextGenerator> Generator<G> {
    #[must_use]
    pub const fn new(composer: PromptComposer, generator: G) -> Self {
        Self {
            composer,
            generator,
        }
    }

    #[must_use]
    pub const fn composer(&self) -> &PromptComposer {
        &self.composer
    }

    /// Compose, call the provider once, and restore real names in the answer.
    ///
    /// # Errors
    ///
    /// Returns the provider's error unchanged; nothing is retried.
    pub async fn run(
        &self,
        ctx: &GenerationContext,
        opts: GenerateOptions,
    ) -> Result<Generation, AiError> {
        let (composed, anonymizer) = self.composer.compose(ctx, opts.anonymize)?;
        let req = GenerationRequest {
            model: composed.model,
            prompt: composed.prompt,
            temperature: composed.temperature,
        };
        let raw = self.generator.generate(&req).await?;
        Ok(Generation {
            text: anonymizer.deanonymize(&raw),
            prompt_used: req.prompt,
            model: req.model,
        })
    }

    /// Generate an intervention plan for `patient_id`.
    ///
    /// # Errors
    ///
    /// Loading errors are returned before any provider call.
    pub async fn generate_plan(
        &self,
        svc: &ClinicService,
        prompt_id: &str,
        patient_id: &str,
        today: NaiveDate,
        opts: GenerateOptions,
    ) -> Result<Generation, AiError> {
        let ctx = load_plan_context(svc, prompt_id, patient_id, today).await?;
        self.run(&ctx, opts).await
    }

    /// Generate the report of one appointment from the therapist's notes.
    ///
    /// # Errors
    ///
    /// Loading errors are returned before any provider call.
    pub async fn generate_report(
        &self,
        svc: &ClinicService,
        prompt_id: &str,
        appointment_id: &str,
        session_notes: &str,
        opts: GenerateOptions,
    ) -> Result<Generation, AiError> {
        let ctx = load_report_context(svc, prompt_id, appointment_id, session_notes).await?;
        self.run(&ctx, opts).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::variables::fixtures::plan_context;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    struct FakeGenerator {
        reply: Option<&'static str>,
        seen: Mutex<Vec<GenerationRequest>>,
    }

    impl FakeGenerator {
        fn replying(reply: &'static str) -> Self {
            Self {
                reply: Some(reply),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: None,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl TextGenerator for FakeGenerator {
        async fn generate(&self, req: &GenerationRequest) -> Result<String, AiError> {
            self.seen.lock().unwrap().push(req.clone());
            self.reply
                .map(String::from)
                .ok_or(AiError::RateLimited { retry_after_secs: 30 })
        }
    }

    fn composer() -> PromptComposer {
        PromptComposer::new(AnonymizationConfig::default(), "gemini-2.5-flash")
    }

    #[test]
    fn composes_with_codenames() {
        let ctx = plan_context("Paciente: {{NOME}}, Idade: {{IDADE}}");
        let (composed, _) = composer().compose(&ctx, true).unwrap();
        assert_eq!(composed.prompt, "Paciente: HORACE, Idade: 6");
        assert!(composed.anonymized);
        assert_eq!(composed.model, "gemini-2.5-flash");
    }

    #[test]
    fn names_inside_free_text_are_anonymized() {
        let mut ctx = plan_context("{{DIAGNOSTICO}} / {{TERAPEUTA_CREDENCIAL_COM_REGISTRO}}");
        ctx.anamnesis.main_diagnosis = Some("ana apresenta TEA; Samuel acompanha".into());
        ctx.profile.professional_registry = Some("UBAM 1234".into());
        let (composed, _) = composer().compose(&ctx, true).unwrap();
        assert_eq!(composed.prompt, "HORACE apresenta TEA; SAM acompanha / SAM - UBAM 1234");
    }

    #[rstest]
    #[case("Ana Silva Jr.", "Ana Silva Jr. tem TEA", "HORACE | HORACE tem TEA")]
    #[case("(Bia) Souza", "(Bia) Souza tem TEA; Bia sorriu", "HORACE | HORACE tem TEA; HORACE sorriu")]
    #[case("Bo", "Bo tem TEA", "HORACE | Bo tem TEA")]
    fn unusual_patient_names_never_reach_the_name_variable(
        #[case] name: &str,
        #[case] diagnosis: &str,
        #[case] expected: &str,
    ) {
        let mut ctx = plan_context("{{NOME}} | {{DIAGNOSTICO}}");
        ctx.patient.name = name.into();
        ctx.anamnesis.main_diagnosis = Some(diagnosis.into());
        let (composed, _) = composer().compose(&ctx, true).unwrap();
        assert_eq!(composed.prompt, expected);
    }

    #[test]
    fn unknown_placeholders_render_empty() {
        let ctx = plan_context("A{{DESCONHECIDA}}B {{NOME}}");
        let (composed, _) = composer().compose(&ctx, true).unwrap();
        assert_eq!(composed.prompt, "AB HORACE");
        assert_eq!(composed.unresolved, vec!["DESCONHECIDA".to_string()]);
    }

    #[test]
    fn values_cannot_inject_placeholders() {
        let mut ctx = plan_context("{{PREFERENCIAS}}");
        ctx.anamnesis.music_preferences = Some("{{NOME}} gosta de samba".into());
        let (composed, _) = composer().compose(&ctx, true).unwrap();
        assert!(!composed.prompt.contains("{{"));
        assert!(!composed.prompt.contains("Ana"));
    }

    #[test]
    fn disabled_anonymization_keeps_real_names() {
        let ctx = plan_context("{{NOME}} com {{TERAPEUTA_NOME}}");
        let (composed, _) = composer().compose(&ctx, false).unwrap();
        assert_eq!(composed.prompt, "Ana Silva com Samuel Rocha");
        assert!(!composed.anonymized);

        let config = AnonymizationConfig {
            enabled: false,
            ..AnonymizationConfig::default()
        };
        let (composed, _) = PromptComposer::new(config, "m")
            .compose(&ctx, true)
            .unwrap();
        assert_eq!(composed.prompt, "Ana Silva com Samuel Rocha");
    }

    #[test]
    fn template_model_and_temperature_win() {
        let mut ctx = plan_context("{{NOME}}");
        ctx.prompt.model = Some("gemini-2.5-pro".into());
        ctx.prompt.temperature = Some(0.3);
        let (composed, _) = composer().compose(&ctx, true).unwrap();
        assert_eq!(composed.model, "gemini-2.5-pro");
        assert_eq!(composed.temperature, Some(0.3));
    }

    #[tokio::test]
    async fn run_restores_real_names() {
        let fake = FakeGenerator::replying("HORACE respondeu bem; SAM manteve o ritmo.");
        let generator = Generator::new(composer(), fake);
        let ctx = plan_context("Plano para {{NOME}} ({{IDADE}} anos)");

        let generation = generator.run(&ctx, GenerateOptions::default()).await.unwrap();
        assert_eq!(
            generation.text,
            "Ana Silva respondeu bem; Samuel Rocha manteve o ritmo."
        );
        assert_eq!(generation.prompt_used, "Plano para HORACE (6 anos)");

        let seen = generator.generator.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(!seen[0].prompt.contains("Ana"));
    }

    #[tokio::test]
    async fn provider_errors_are_not_retried() {
        let generator = Generator::new(composer(), FakeGenerator::failing());
        let err = generator
            .run(&plan_context("{{NOME}}"), GenerateOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::RateLimited { retry_after_secs: 30 }));
        assert_eq!(generator.generator.seen.lock().unwrap().len(), 1);
    }
}
