//! # clinic-config
//!
//! Layered configuration loading using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`CLINIC_*` prefix, `__` as separator)
//! 2. Project-level `.clinic/config.toml`
//! 3. User-level `~/.config/clinic/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `CLINIC_GEMINI__API_KEY` -> `gemini.api_key`,
//! `CLINIC_ANONYMIZATION__ENABLED` -> `anonymization.enabled`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use clinic_config::ClinicConfig;
//!
//! let config = ClinicConfig::load_with_dotenv().expect("config");
//! if config.gemini.is_configured() {
//!     println!("model: {}", config.gemini.default_model);
//! }
//! ```

mod anonymization;
mod database;
mod error;
mod gemini;
mod general;

pub use anonymization::AnonymizationConfig;
pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use gemini::GeminiConfig;
pub use general::GeneralConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the per-project directory holding `config.toml` and the database.
pub const PROJECT_DIR: &str = ".clinic";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ClinicConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub anonymization: AnonymizationConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl ClinicConfig {
    /// Load configuration from all sources, resolving the project file
    /// relative to the current directory.
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a source fails to parse or the result is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_for(Path::new("."))
    }

    /// Load configuration using `<project_root>/.clinic/config.toml` as the
    /// project layer.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a source fails to parse or the result is invalid.
    pub fn load_for(project_root: &Path) -> Result<Self, ConfigError> {
        let config: Self = Self::figment_for(project_root).extract()?;
        config.anonymization.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a source fails to parse or the result is invalid.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain relative to the current directory.
    #[must_use]
    pub fn figment() -> Figment {
        Self::figment_for(Path::new("."))
    }

    /// Build the figment provider chain for a project root.
    ///
    /// Public so tests can inspect the figment or layer extra providers.
    #[must_use]
    pub fn figment_for(project_root: &Path) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        let local_path = Self::project_config_path(project_root);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("CLINIC_").split("__"))
    }

    /// `<project_root>/.clinic/config.toml`.
    #[must_use]
    pub fn project_config_path(project_root: &Path) -> PathBuf {
        project_root.join(PROJECT_DIR).join("config.toml")
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("clinic").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_loads() {
        let config = ClinicConfig::default();
        assert!(!config.database.is_remote());
        assert!(!config.gemini.is_configured());
        assert!(config.anonymization.enabled);
        assert_eq!(config.general.default_limit, 20);
    }

    #[test]
    fn figment_builds_without_files() {
        figment::Jail::expect_with(|_jail| {
            let config: ClinicConfig = ClinicConfig::figment().extract()?;
            assert_eq!(config.anonymization.patient_codename, "HORACE");
            assert_eq!(config.gemini.default_model, "gemini-2.5-flash");
            Ok(())
        });
    }

    #[test]
    fn project_config_path_is_under_project_dir() {
        let path = ClinicConfig::project_config_path(Path::new("/srv/clinic"));
        assert_eq!(path, PathBuf::from("/srv/clinic/.clinic/config.toml"));
    }
}
