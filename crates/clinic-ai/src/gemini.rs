//! Google Gemini `generateContent` client.

use std::time::{Duration, Instant};

use clinic_config::GeminiConfig;
use serde::{Deserialize, Serialize};

use crate::error::AiError;
use crate::http::check_response;
use crate::pipeline::{GenerationRequest, TextGenerator};

const USER_AGENT: &str = concat!("clinic/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the Gemini REST API.
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GeminiClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AiError::NotConfigured`] when no API key is set, or
    /// [`AiError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &GeminiConfig) -> Result<Self, AiError> {
        let api_key = config
            .require_api_key()
            .map_err(|_| AiError::NotConfigured("gemini".to_string()))?
            .to_string();
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        let model = model.trim().trim_start_matches("models/");
        format!("{}/v1beta/models/{model}:generateContent", self.base_url)
    }

    async fn generate_content(&self, req: &GenerationRequest) -> Result<String, AiError> {
        let body = GenerateRequest {
            contents: [Content {
                role: "user",
                parts: [Part { text: &req.prompt }],
            }],
            generation_config: req.temperature.map(|temperature| GenerationConfig { temperature }),
        };

        let started = Instant::now();
        let resp = self
            .http
            .post(self.endpoint(&req.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;
        let text = check_response(resp).await?.text().await?;
        let output = parse_generate_response(&text)?;

        tracing::info!(
            model = %req.model,
            prompt_chars = req.prompt.chars().count(),
            output_chars = output.chars().count(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "gemini generation finished"
        );
        Ok(output)
    }
}

impl TextGenerator for GeminiClient {
    async fn generate(&self, req: &GenerationRequest) -> Result<String, AiError> {
        self.generate_content(req).await
    }
}

/// Concatenate the text parts of the first candidate.
///
/// # Errors
///
/// Returns [`AiError::Parse`] for malformed JSON and [`AiError::EmptyResponse`]
/// when the prompt was blocked or the candidate carries no text.
pub fn parse_generate_response(body: &str) -> Result<String, AiError> {
    let resp: GenerateResponse =
        serde_json::from_str(body).map_err(|e| AiError::Parse(e.to_string()))?;

    if let Some(reason) = resp.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(AiError::EmptyResponse(format!("prompt blocked: {reason}")));
    }

    let Some(candidate) = resp.candidates.into_iter().next() else {
        return Err(AiError::EmptyResponse("no candidates".to_string()));
    };
    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        let reason = candidate
            .finish_reason
            .unwrap_or_else(|| "no text".to_string());
        return Err(AiError::EmptyResponse(format!("finish reason: {reason}")));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FIXTURE: &str = r#"{
        "candidates": [
            {
                "content": {
                    "parts": [
                        {"text": "Plano para HORACE:\n"},
                        {"text": "1. Exploração rítmica."}
                    ],
                    "role": "model"
                },
                "finishReason": "STOP",
                "index": 0
            }
        ],
        "usageMetadata": {"promptTokenCount": 120, "candidatesTokenCount": 40},
        "modelVersion": "gemini-2.5-flash"
    }"#;

    fn config(api_key: &str) -> GeminiConfig {
        GeminiConfig {
            api_key: api_key.to_string(),
            base_url: "https://example.test/".to_string(),
            ..GeminiConfig::default()
        }
    }

    #[test]
    fn joins_candidate_parts() {
        let text = parse_generate_response(FIXTURE).unwrap();
        assert_eq!(text, "Plano para HORACE:\n1. Exploração rítmica.");
    }

    #[test]
    fn blocked_prompt_is_empty_response() {
        let body = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let err = parse_generate_response(body).unwrap_err();
        assert!(matches!(err, AiError::EmptyResponse(ref m) if m.contains("SAFETY")));
    }

    #[test]
    fn candidate_without_text_is_empty_response() {
        let body = r#"{"candidates": [{"content": {"parts": []}, "finishReason": "MAX_TOKENS"}]}"#;
        let err = parse_generate_response(body).unwrap_err();
        assert!(matches!(err, AiError::EmptyResponse(ref m) if m.contains("MAX_TOKENS")));
    }

    #[test]
    fn no_candidates_is_empty_response() {
        assert!(matches!(
            parse_generate_response("{}"),
            Err(AiError::EmptyResponse(_))
        ));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        assert!(matches!(
            parse_generate_response("<html>"),
            Err(AiError::Parse(_))
        ));
    }

    #[test]
    fn request_body_shape() {
        let body = GenerateRequest {
            contents: [Content {
                role: "user",
                parts: [Part { text: "Olá" }],
            }],
            generation_config: Some(GenerationConfig { temperature: 0.4 }),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "Olá"}]}],
                "generationConfig": {"temperature": 0.4}
            })
        );
    }

    #[test]
    fn missing_key_is_not_configured() {
        let err = GeminiClient::from_config(&config("")).err().unwrap();
        assert!(matches!(err, AiError::NotConfigured(ref p) if p == "gemini"));
    }

    #[test]
    fn endpoint_uses_model_path() {
        let client = GeminiClient::from_config(&config("k")).unwrap();
        assert_eq!(
            client.endpoint("models/gemini-2.5-pro"),
            "https://example.test/v1beta/models/gemini-2.5-pro:generateContent"
        );
    }
}
