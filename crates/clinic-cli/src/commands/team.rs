use clinic_core::entities::TherapistProfile;
use clinic_core::enums::Role;
use clinic_db::repos::user::NewUser;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::TeamCommands;
use crate::cli::subcommands::team::ProfileArgs;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::{clearable, parse_enum};
use crate::context::AppContext;
use crate::output::output;

/// Handle `clinic team`.
pub async fn handle(
    action: &TeamCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let svc = &ctx.service;
    match action {
        TeamCommands::Add {
            name,
            email,
            phone,
            role,
            clinic,
        } => {
            let user = svc
                .create_user(&NewUser {
                    full_name: name.clone(),
                    email: email.clone(),
                    phone: phone.clone(),
                    role: parse_enum::<Role>(role, "role")?,
                    clinic_id: clinic.clone(),
                })
                .await?;
            output(&user, flags.format)
        }
        TeamCommands::List { role } => {
            let role = role
                .as_deref()
                .map(|raw| parse_enum::<Role>(raw, "role"))
                .transpose()?;
            let limit = effective_limit(flags.limit, ctx.default_limit());
            let team = svc.list_team(role, limit).await?;
            output(&json!({ "team": team }), flags.format)
        }
        TeamCommands::Get { id } => output(&svc.get_user(id).await?, flags.format),
        TeamCommands::Activate { id } => output(&svc.set_user_active(id, true).await?, flags.format),
        TeamCommands::Deactivate { id } => {
            output(&svc.set_user_active(id, false).await?, flags.format)
        }
        TeamCommands::Profile { id } => {
            output(&svc.get_therapist_profile(id).await?, flags.format)
        }
        TeamCommands::SetProfile(args) => set_profile(args, ctx, flags).await,
    }
}

/// Merge the given flags into the stored profile; omitted flags keep their value.
async fn set_profile(args: &ProfileArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let current = ctx.service.get_therapist_profile(&args.id).await?;
    let profile = merge_profile(current, args);
    let saved = ctx.service.upsert_therapist_profile(&profile).await?;
    output(&saved, flags.format)
}

fn merge_profile(mut profile: TherapistProfile, args: &ProfileArgs) -> TherapistProfile {
    let fields = [
        (&mut profile.professional_registry, &args.registry),
        (&mut profile.education, &args.education),
        (&mut profile.specialties, &args.specialties),
        (&mut profile.preferred_techniques, &args.techniques),
        (&mut profile.preferred_resources, &args.resources),
        (&mut profile.conducting_style, &args.style),
        (&mut profile.clinical_notes, &args.notes),
        (&mut profile.bio, &args.bio),
    ];
    for (slot, given) in fields {
        if let Some(value) = clearable(given.as_ref()) {
            *slot = value;
        }
    }
    profile
}

#[cfg(test)]
mod tests {
    use clinic_core::entities::TherapistProfile;
    use pretty_assertions::assert_eq;

    use super::merge_profile;
    use crate::cli::subcommands::team::ProfileArgs;

    fn args() -> ProfileArgs {
        ProfileArgs {
            id: "usr-1".into(),
            registry: None,
            education: None,
            specialties: None,
            techniques: None,
            resources: None,
            style: None,
            notes: None,
            bio: None,
        }
    }

    #[test]
    fn omitted_flags_keep_stored_values() {
        let current = TherapistProfile {
            user_id: "usr-1".into(),
            education: Some("Musicoterapia, UFPE".into()),
            bio: Some("old bio".into()),
            ..TherapistProfile::default()
        };

        let merged = merge_profile(
            current,
            &ProfileArgs {
                registry: Some("UBAM 1234".into()),
                bio: Some(String::new()),
                ..args()
            },
        );

        assert_eq!(merged.professional_registry.as_deref(), Some("UBAM 1234"));
        assert_eq!(merged.education.as_deref(), Some("Musicoterapia, UFPE"));
        assert_eq!(merged.bio, None);
    }
}
