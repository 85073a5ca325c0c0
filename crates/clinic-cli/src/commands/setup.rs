use clinic_db::repos::clinic::NewClinic;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::SetupArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `clinic setup`.
///
/// Only works on an empty database; afterwards new clinics and users go
/// through `clinic clinic create` and `clinic team add`.
pub async fn handle(args: &SetupArgs, ctx: &mut AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    if args.master {
        let admin = ctx
            .service
            .bootstrap_master_admin(&args.admin_name, &args.admin_email)
            .await?;
        tracing::info!(user_id = %admin.id, "created master admin");
        return output(&json!({ "admin": admin }), flags.format);
    }

    let Some(legal_name) = args.clinic.as_deref() else {
        anyhow::bail!("--clinic is required unless --master is given");
    };
    let mut new = NewClinic::named(legal_name);
    if let Some(max) = args.max_therapists {
        new.max_therapists = max;
    }

    let (clinic, admin) = ctx
        .service
        .bootstrap_clinic(&new, &args.admin_name, &args.admin_email)
        .await?;
    tracing::info!(clinic_id = %clinic.id, user_id = %admin.id, "bootstrapped clinic");
    output(
        &json!({
            "clinic": clinic,
            "admin": admin,
            "project_root": ctx.project_root.display().to_string(),
            "next": format!("set general.actor_id = \"{}\" or pass --as {}", admin.id, admin.id),
        }),
        flags.format,
    )
}
