use anyhow::Context;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::BackupArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `clinic backup`.
pub async fn handle(args: &BackupArgs, ctx: &mut AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let snapshot = ctx.service.export_backup().await?;
    let Some(path) = &args.output else {
        return output(&snapshot, flags.format);
    };

    let body = serde_json::to_string_pretty(&snapshot)?;
    std::fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "wrote backup");
    output(
        &json!({
            "path": path,
            "generated_at": snapshot.generated_at,
            "clinics": snapshot.clinics.len(),
            "patients": snapshot.patients.len(),
        }),
        flags.format,
    )
}
