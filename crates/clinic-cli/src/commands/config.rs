use clinic_config::ClinicConfig;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ConfigArgs;
use crate::output::output;

const REDACTED: &str = "********";

/// Handle `clinic config`.
pub fn handle(args: &ConfigArgs, config: &ClinicConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let shown = if args.show_secrets {
        config.clone()
    } else {
        redacted(config)
    };
    output(&shown, flags.format)
}

fn redacted(config: &ClinicConfig) -> ClinicConfig {
    let mut config = config.clone();
    for secret in [&mut config.gemini.api_key, &mut config.database.auth_token] {
        if !secret.is_empty() {
            *secret = REDACTED.to_string();
        }
    }
    config
}
