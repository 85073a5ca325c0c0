//! Name anonymization settings for AI prompts.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const fn default_enabled() -> bool {
    true
}

fn default_patient_codename() -> String {
    "HORACE".to_string()
}

fn default_therapist_codename() -> String {
    "SAM".to_string()
}

const fn default_min_name_len() -> usize {
    3
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnonymizationConfig {
    /// Replace patient and therapist names before text leaves the process.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_patient_codename")]
    pub patient_codename: String,

    #[serde(default = "default_therapist_codename")]
    pub therapist_codename: String,

    /// Names shorter than this (in characters) are never substituted.
    #[serde(default = "default_min_name_len")]
    pub min_name_len: usize,
}

impl Default for AnonymizationConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            patient_codename: default_patient_codename(),
            therapist_codename: default_therapist_codename(),
            min_name_len: default_min_name_len(),
        }
    }
}

impl AnonymizationConfig {
    /// Reject codenames that would make de-anonymization ambiguous.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for empty or identical codenames
    /// and for a zero minimum length.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.patient_codename.trim().is_empty() {
            return Err(invalid("anonymization.patient_codename", "must not be empty"));
        }
        if self.therapist_codename.trim().is_empty() {
            return Err(invalid("anonymization.therapist_codename", "must not be empty"));
        }
        if self
            .patient_codename
            .eq_ignore_ascii_case(&self.therapist_codename)
        {
            return Err(invalid(
                "anonymization.therapist_codename",
                "must differ from the patient codename",
            ));
        }
        if self.min_name_len == 0 {
            return Err(invalid("anonymization.min_name_len", "must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
