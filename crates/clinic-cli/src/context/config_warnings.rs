use clinic_config::ClinicConfig;

/// Emit warnings for likely mistyped env var keys that silently fell back to defaults.
pub fn warn_unconfigured(config: &ClinicConfig) {
    for warning in collect_unconfigured_warnings(config, std::env::vars()) {
        tracing::warn!("{warning}");
    }
}

fn collect_unconfigured_warnings<I>(config: &ClinicConfig, env: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let env_keys = env.into_iter().map(|(key, _)| key).collect::<Vec<_>>();

    let mut warnings = Vec::new();

    if !config.gemini.is_configured() && has_env_prefix(&env_keys, "CLINIC_GEMINI") {
        warnings.push(
            "Gemini config appears default while CLINIC_GEMINI* env vars exist. Use double underscores (example: CLINIC_GEMINI__API_KEY)."
                .to_string(),
        );
    }

    if !config.database.is_remote()
        && !config.database.has_local_path()
        && has_env_prefix(&env_keys, "CLINIC_DATABASE")
    {
        warnings.push(
            "Database config appears default while CLINIC_DATABASE* env vars exist. Use double underscores (example: CLINIC_DATABASE__URL)."
                .to_string(),
        );
    }

    if config.general.actor_id.is_empty() && has_env_prefix(&env_keys, "CLINIC_GENERAL_ACTOR") {
        warnings.push(
            "No acting user configured while CLINIC_GENERAL_ACTOR* env vars exist. Use double underscores (example: CLINIC_GENERAL__ACTOR_ID)."
                .to_string(),
        );
    }

    warnings
}

fn has_env_prefix(keys: &[String], prefix: &str) -> bool {
    keys.iter().any(|key| key.starts_with(prefix))
}
