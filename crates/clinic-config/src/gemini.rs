//! Gemini text-generation API configuration.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

const fn default_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeminiConfig {
    /// API key sent as `x-goog-api-key`.
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model used when a prompt template does not name one.
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Request timeout in seconds. A timeout surfaces as a generation error.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            default_model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl GeminiConfig {
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// The API key, or [`ConfigError::NotConfigured`] when it is blank.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotConfigured`] for section `gemini`.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        if self.is_configured() {
            Ok(self.api_key.trim())
        } else {
            Err(ConfigError::NotConfigured {
                section: "gemini".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = GeminiConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.default_model, "gemini-2.5-flash");
        assert_eq!(config.timeout_secs, 60);
        assert!(config.base_url.starts_with("https://"));
    }

    #[test]
    fn blank_api_key_is_not_configured() {
        let config = GeminiConfig {
            api_key: "   ".into(),
            ..GeminiConfig::default()
        };
        assert!(matches!(
            config.require_api_key(),
            Err(ConfigError::NotConfigured { ref section }) if section == "gemini"
        ));

        let config = GeminiConfig {
            api_key: " key-1 ".into(),
            ..GeminiConfig::default()
        };
        assert_eq!(config.require_api_key().unwrap(), "key-1");
    }
}
