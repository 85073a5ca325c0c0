use clinic_core::enums::{AuditAction, EntityType};
use clinic_db::repos::audit::AuditFilter;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::AuditArgs;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `clinic audit`.
pub async fn handle(args: &AuditArgs, ctx: &mut AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let filter = AuditFilter {
        entity_type: args
            .entity_type
            .as_deref()
            .map(|raw| parse_enum::<EntityType>(raw, "entity type"))
            .transpose()?,
        entity_id: args.entity_id.clone(),
        action: args
            .action
            .as_deref()
            .map(|raw| parse_enum::<AuditAction>(raw, "action"))
            .transpose()?,
        actor_id: args.by.clone(),
        limit: Some(effective_limit(flags.limit, ctx.default_limit())),
    };
    let entries = ctx.service.query_audit(&filter).await?;
    output(&json!({ "entries": entries }), flags.format)
}
