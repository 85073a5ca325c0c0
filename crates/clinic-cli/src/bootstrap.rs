use std::path::{Path, PathBuf};

use anyhow::Context;
use clinic_config::{ClinicConfig, PROJECT_DIR};

use crate::cli::GlobalFlags;

/// Load `.env` for the project, then the layered configuration.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<ClinicConfig> {
    let root = project_hint(flags)?;
    load_project_dotenv(root.as_deref())?;

    let base = root.unwrap_or_else(|| PathBuf::from("."));
    ClinicConfig::load_for(&base).map_err(anyhow::Error::from)
}

/// The project root the config layer should read from, if one can be found.
fn project_hint(flags: &GlobalFlags) -> anyhow::Result<Option<PathBuf>> {
    if let Some(project) = &flags.project {
        let path = PathBuf::from(project);
        let root = if path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name == PROJECT_DIR)
        {
            path.parent().map(Path::to_path_buf).unwrap_or(path)
        } else {
            path
        };
        return Ok(Some(root));
    }

    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    Ok(crate::context::find_project_root(&cwd))
}

fn load_project_dotenv(root: Option<&Path>) -> anyhow::Result<()> {
    if let Some(root) = root {
        let env_path = root.join(".env");
        if env_path.exists() {
            dotenvy::from_path(&env_path)
                .with_context(|| format!("failed to load dotenv file at {}", env_path.display()))?;
            return Ok(());
        }
    }

    dotenvy::dotenv().ok();
    Ok(())
}
