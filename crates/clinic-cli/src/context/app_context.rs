use std::path::{Path, PathBuf};

use anyhow::Context;
use clinic_config::{ClinicConfig, PROJECT_DIR};
use clinic_db::service::ClinicService;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub service: ClinicService,
    pub config: ClinicConfig,
    pub project_root: PathBuf,
}

impl AppContext {
    /// Open the configured database and resolve the acting user.
    pub async fn init(
        project_root: PathBuf,
        config: ClinicConfig,
        actor: Option<&str>,
    ) -> anyhow::Result<Self> {
        let mut service = if config.database.is_remote() {
            ClinicService::new_remote(&config.database.url, &config.database.auth_token)
                .await
                .context("failed to open remote clinic database")?
        } else {
            let path = local_db_path(&project_root, &config);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            ClinicService::new_local(&path.to_string_lossy())
                .await
                .with_context(|| format!("failed to open clinic database at {}", path.display()))?
        };

        if let Some(user_id) = actor {
            service
                .act_as(user_id)
                .await
                .with_context(|| format!("cannot act as '{user_id}'"))?;
        }

        Ok(Self {
            service,
            config,
            project_root,
        })
    }

    /// The default page size when neither the command nor `--limit` sets one.
    #[must_use]
    pub fn default_limit(&self) -> u32 {
        self.config.general.default_limit
    }

    /// Today's date in UTC.
    #[must_use]
    pub fn today(&self) -> chrono::NaiveDate {
        chrono::Utc::now().date_naive()
    }
}

/// `database.path`, relative paths resolved against the project root.
fn local_db_path(project_root: &Path, config: &ClinicConfig) -> PathBuf {
    if config.database.has_local_path() {
        let configured = PathBuf::from(&config.database.path);
        if configured.is_absolute() {
            configured
        } else {
            project_root.join(configured)
        }
    } else {
        project_root.join(PROJECT_DIR).join("clinic.db")
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use clinic_config::ClinicConfig;

    use super::local_db_path;

    #[test]
    fn defaults_to_project_database() {
        let config = ClinicConfig::default();
        assert_eq!(
            local_db_path(Path::new("/srv/clinic"), &config),
            PathBuf::from("/srv/clinic/.clinic/clinic.db")
        );
    }

    #[test]
    fn relative_path_is_project_relative() {
        let mut config = ClinicConfig::default();
        config.database.path = "data/clinic.db".into();
        assert_eq!(
            local_db_path(Path::new("/srv/clinic"), &config),
            PathBuf::from("/srv/clinic/data/clinic.db")
        );

        config.database.path = "/var/lib/clinic.db".into();
        assert_eq!(
            local_db_path(Path::new("/srv/clinic"), &config),
            PathBuf::from("/var/lib/clinic.db")
        );
    }
}
