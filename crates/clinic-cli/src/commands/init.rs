use anyhow::{Context, bail};
use clinic_config::{ClinicConfig, PROJECT_DIR};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::InitArgs;
use crate::output::output;

const STARTER_CONFIG: &str = r#"# Clinic project configuration. Environment variables override these values
# (CLINIC_<SECTION>__<KEY>, e.g. CLINIC_GEMINI__API_KEY).

[database]
# Empty path means .clinic/clinic.db. Set url + auth_token for a remote libSQL database.
path = ""
url = ""
auth_token = ""

[gemini]
# Prefer CLINIC_GEMINI__API_KEY in .env over storing the key here.
api_key = ""
default_model = "gemini-2.5-flash"
timeout_secs = 60

[anonymization]
enabled = true
patient_codename = "HORACE"
therapist_codename = "Terapeuta"
min_name_len = 3

[general]
# User the CLI acts as; `--as <user-id>` overrides it.
actor_id = ""
default_limit = 20
date_format = "%d/%m/%Y"
"#;

#[derive(Debug, Serialize)]
struct InitResponse {
    project_root: String,
    config_path: String,
    overwritten: bool,
}

/// Handle `clinic init`.
pub fn handle(args: &InitArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let root = match &flags.project {
        Some(project) => std::path::PathBuf::from(project),
        None => std::env::current_dir().context("failed to read current directory")?,
    };

    let config_path = ClinicConfig::project_config_path(&root);
    let existed = config_path.exists();
    if existed && !args.force {
        bail!(
            "{} already exists; pass --force to overwrite it",
            config_path.display()
        );
    }

    std::fs::create_dir_all(root.join(PROJECT_DIR))
        .with_context(|| format!("failed to create {}", root.join(PROJECT_DIR).display()))?;
    std::fs::write(&config_path, STARTER_CONFIG)
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    tracing::info!(path = %config_path.display(), "initialized clinic project");

    output(
        &InitResponse {
            project_root: root.display().to_string(),
            config_path: config_path.display().to_string(),
            overwritten: existed,
        },
        flags.format,
    )
}

#[cfg(test)]
mod tests {
    use clinic_config::ClinicConfig;

    use super::STARTER_CONFIG;

    #[test]
    fn starter_config_matches_defaults() {
        let parsed: ClinicConfig = toml::from_str(STARTER_CONFIG).expect("starter config parses");
        let defaults = ClinicConfig::default();

        assert_eq!(parsed.gemini.default_model, defaults.gemini.default_model);
        assert_eq!(
            parsed.anonymization.patient_codename,
            defaults.anonymization.patient_codename
        );
        assert_eq!(parsed.general.default_limit, defaults.general.default_limit);
        assert_eq!(parsed.general.date_format, defaults.general.date_format);
        assert!(parsed.anonymization.validate().is_ok());
    }
}
