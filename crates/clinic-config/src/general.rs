//! General application configuration.

use serde::{Deserialize, Serialize};

/// Default result limit.
const fn default_limit() -> u32 {
    20
}

fn default_date_format() -> String {
    "%d/%m/%Y".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// User ID commands run as when `--as` is not given.
    #[serde(default)]
    pub actor_id: String,

    /// Default result limit for list commands.
    #[serde(default = "default_limit")]
    pub default_limit: u32,

    /// `chrono` format for dates rendered into prompts.
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            actor_id: String::new(),
            default_limit: default_limit(),
            date_format: default_date_format(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = GeneralConfig::default();
        assert!(config.actor_id.is_empty());
        assert_eq!(config.default_limit, 20);
        assert_eq!(config.date_format, "%d/%m/%Y");
    }
}
