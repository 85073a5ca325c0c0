//! Prompt template repository.
//!
//! Therapists see their own templates plus those written by clinic admins,
//! and may only modify their own. Admins manage every template of the clinic.

use clinic_core::entities::PromptTemplate;
use clinic_core::enums::{AuditAction, EntityType, PromptCategory, Role};
use clinic_core::ids::PREFIX_PROMPT;

use crate::error::DatabaseError;
use crate::helpers::{SetClause, SqlFilter, fmt_datetime, get_bool, get_opt_string, opt_text, parse_datetime, parse_enum, require_text, utc_now};
use crate::service::ClinicService;
use crate::updates::prompt::PromptUpdate;

const SELECT_COLS: &str = "id, clinic_id, owner_id, name, description, body, model, \
     temperature, category, active, created_at, updated_at";

const MAX_TEMPERATURE: f64 = 2.0;

/// Input for a new prompt template.
#[derive(Debug, Clone)]
pub struct NewPrompt {
    pub name: String,
    pub description: Option<String>,
    pub body: String,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub category: PromptCategory,
}

fn row_to_prompt(row: &libsql::Row) -> Result<PromptTemplate, DatabaseError> {
    Ok(PromptTemplate {
        id: row.get(0)?,
        clinic_id: row.get(1)?,
        owner_id: row.get(2)?,
        name: row.get(3)?,
        description: get_opt_string(row, 4)?,
        body: row.get(5)?,
        model: get_opt_string(row, 6)?,
        temperature: row.get::<Option<f64>>(7)?,
        category: parse_enum(&row.get::<String>(8)?)?,
        active: get_bool(row, 9)?,
        created_at: parse_datetime(&row.get::<String>(10)?)?,
        updated_at: parse_datetime(&row.get::<String>(11)?)?,
    })
}

fn validate_temperature(temperature: Option<f64>) -> Result<(), DatabaseError> {
    match temperature {
        Some(t) if !(0.0..=MAX_TEMPERATURE).contains(&t) => Err(DatabaseError::Validation(
            format!("temperature must be between 0 and {MAX_TEMPERATURE}, got {t}"),
        )),
        _ => Ok(()),
    }
}

impl ClinicService {
    /// Clinic-scoped filter that also hides other therapists' templates.
    fn prompt_filter(&self) -> Result<SqlFilter, DatabaseError> {
        let mut filter = self.scoped_filter("clinic_id")?;
        let actor = self.require_staff()?;
        if actor.is_therapist() {
            filter.push_expr(
                |p| {
                    format!(
                        "(owner_id = {p} OR owner_id IN \
                         (SELECT id FROM users WHERE role IN ('{}', '{}')))",
                        Role::ClinicAdmin.as_str(),
                        Role::MasterAdmin.as_str()
                    )
                },
                actor.user_id.as_str(),
            );
        }
        Ok(filter)
    }

    fn ensure_prompt_owner(&self, prompt: &PromptTemplate) -> Result<(), DatabaseError> {
        let actor = self.require_staff()?;
        if actor.is_therapist() && prompt.owner_id != actor.user_id {
            return Err(DatabaseError::Forbidden(format!(
                "prompt {} belongs to another user; clone it to make changes",
                prompt.id
            )));
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` for a blank name or body or an out
    /// of range temperature.
    pub async fn create_prompt(&self, new: &NewPrompt) -> Result<PromptTemplate, DatabaseError> {
        let actor = self.require_staff()?;
        let owner_id = actor.user_id.clone();
        let clinic_id = self.require_clinic_id()?;
        let name = require_text("prompt name", &new.name)?;
        let body = require_text("prompt body", &new.body)?;
        validate_temperature(new.temperature)?;

        let now = utc_now();
        let id = self.db().generate_id(PREFIX_PROMPT).await?;
        self.db()
            .execute(
                &format!(
                    "INSERT INTO prompt_templates ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 1, ?10, ?10)"
                ),
                libsql::params![
                    id.as_str(),
                    clinic_id.as_str(),
                    owner_id.as_str(),
                    name,
                    new.description.as_deref(),
                    body,
                    new.model.as_deref(),
                    new.temperature,
                    new.category.as_str(),
                    fmt_datetime(&now)
                ],
            )
            .await?;
        self.record_audit(EntityType::Prompt, &id, AuditAction::Created, None)
            .await?;

        Ok(PromptTemplate {
            id,
            clinic_id,
            owner_id,
            name: name.to_string(),
            description: new.description.clone(),
            body: body.to_string(),
            model: new.model.clone(),
            temperature: new.temperature,
            category: new.category,
            active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` for templates the actor cannot see.
    pub async fn get_prompt(&self, id: &str) -> Result<PromptTemplate, DatabaseError> {
        let mut filter = self.prompt_filter()?;
        filter.push("id =", id);
        let sql = format!(
            "SELECT {SELECT_COLS} FROM prompt_templates {}",
            filter.where_clause()
        );
        let mut rows = self
            .db()
            .query(&sql, libsql::params_from_iter(filter.into_params()))
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::Prompt, id))?;
        row_to_prompt(&row)
    }

    async fn query_prompts(
        &self,
        category: Option<PromptCategory>,
        active_only: bool,
        limit: u32,
    ) -> Result<Vec<PromptTemplate>, DatabaseError> {
        let mut filter = self.prompt_filter()?;
        if let Some(category) = category {
            filter.push("category =", category.as_str());
        }
        if active_only {
            filter.push_raw("active = 1");
        }
        let sql = format!(
            "SELECT {SELECT_COLS} FROM prompt_templates {} ORDER BY name, rowid LIMIT {limit}",
            filter.where_clause()
        );
        let mut rows = self
            .db()
            .query(&sql, libsql::params_from_iter(filter.into_params()))
            .await?;
        let mut prompts = Vec::new();
        while let Some(row) = rows.next().await? {
            prompts.push(row_to_prompt(&row)?);
        }
        Ok(prompts)
    }

    /// Every template visible to the actor, active or not.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_prompts(
        &self,
        category: Option<PromptCategory>,
        limit: u32,
    ) -> Result<Vec<PromptTemplate>, DatabaseError> {
        self.query_prompts(category, false, limit).await
    }

    /// Templates offered for generation.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_active_prompts(
        &self,
        category: PromptCategory,
        limit: u32,
    ) -> Result<Vec<PromptTemplate>, DatabaseError> {
        self.query_prompts(Some(category), true, limit).await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::Forbidden` when a therapist edits someone
    /// else's template.
    pub async fn update_prompt(
        &self,
        prompt_id: &str,
        update: PromptUpdate,
    ) -> Result<PromptTemplate, DatabaseError> {
        let current = self.get_prompt(prompt_id).await?;
        self.ensure_prompt_owner(&current)?;

        let mut sets = SetClause::new();
        if let Some(ref name) = update.name {
            sets.set("name", require_text("prompt name", name)?);
        }
        if let Some(ref description) = update.description {
            sets.set("description", opt_text(description.as_deref()));
        }
        if let Some(ref body) = update.body {
            sets.set("body", require_text("prompt body", body)?);
        }
        if let Some(ref model) = update.model {
            sets.set("model", opt_text(model.as_deref()));
        }
        if let Some(temperature) = update.temperature {
            validate_temperature(temperature)?;
            sets.set(
                "temperature",
                temperature.map_or(libsql::Value::Null, libsql::Value::Real),
            );
        }
        if let Some(category) = update.category {
            sets.set("category", category.as_str());
        }

        if sets.is_empty() {
            return Ok(current);
        }
        sets.set("updated_at", fmt_datetime(&utc_now()));
        let (sql, params) = sets.into_update("prompt_templates", prompt_id);
        self.db()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;

        self.record_audit_with(EntityType::Prompt, prompt_id, AuditAction::Updated, &update)
            .await?;
        self.get_prompt(prompt_id).await
    }

    /// Enable or disable a template for generation.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Forbidden` when a therapist toggles someone
    /// else's template.
    pub async fn set_prompt_active(
        &self,
        prompt_id: &str,
        active: bool,
    ) -> Result<PromptTemplate, DatabaseError> {
        let current = self.get_prompt(prompt_id).await?;
        self.ensure_prompt_owner(&current)?;

        let now = utc_now();
        self.db()
            .execute(
                "UPDATE prompt_templates SET active = ?1, updated_at = ?2 WHERE id = ?3",
                libsql::params![i64::from(active), fmt_datetime(&now), prompt_id],
            )
            .await?;
        self.record_audit_with(
            EntityType::Prompt,
            prompt_id,
            AuditAction::Updated,
            &serde_json::json!({ "active": active }),
        )
        .await?;

        Ok(PromptTemplate {
            active,
            updated_at: now,
            ..current
        })
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::Forbidden` when a therapist deletes someone
    /// else's template.
    pub async fn delete_prompt(&self, prompt_id: &str) -> Result<(), DatabaseError> {
        let current = self.get_prompt(prompt_id).await?;
        self.ensure_prompt_owner(&current)?;
        self.db()
            .execute("DELETE FROM prompt_templates WHERE id = ?1", [prompt_id])
            .await?;
        self.record_audit(EntityType::Prompt, prompt_id, AuditAction::Deleted, None)
            .await?;
        Ok(())
    }

    /// Copy a visible template into one owned by the actor, named
    /// `"Cópia de {name}"`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` for templates the actor cannot see.
    pub async fn clone_prompt(&self, prompt_id: &str) -> Result<PromptTemplate, DatabaseError> {
        let source = self.get_prompt(prompt_id).await?;
        let copy = NewPrompt {
            name: format!("Cópia de {}", source.name),
            description: source.description,
            body: source.body,
            model: source.model,
            temperature: source.temperature,
            category: source.category,
        };
        self.create_prompt(&copy).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{seed_therapist, test_service};
    use crate::updates::prompt::PromptUpdateBuilder;
    use pretty_assertions::assert_eq;

    fn plan_prompt(name: &str) -> NewPrompt {
        NewPrompt {
            name: name.into(),
            description: None,
            body: "Paciente: {{NOME}}, Idade: {{IDADE}}".into(),
            model: None,
            temperature: Some(0.7),
            category: PromptCategory::Plan,
        }
    }

    #[tokio::test]
    async fn therapists_see_own_and_admin_templates() {
        let mut svc = test_service().await;
        let admin_prompt = svc.create_prompt(&plan_prompt("Plano base")).await.unwrap();
        let sam = seed_therapist(&svc, "Samuel Rocha").await;
        let lia = seed_therapist(&svc, "Lia Souza").await;

        svc.act_as(&lia.id).await.unwrap();
        let lia_prompt = svc.create_prompt(&plan_prompt("Plano da Lia")).await.unwrap();

        svc.act_as(&sam.id).await.unwrap();
        let sam_prompt = svc.create_prompt(&plan_prompt("Plano do Sam")).await.unwrap();
        let visible: Vec<_> = svc
            .list_prompts(None, 50)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(visible, [admin_prompt.id.clone(), sam_prompt.id]);
        assert!(matches!(
            svc.get_prompt(&lia_prompt.id).await,
            Err(DatabaseError::NotFound { .. })
        ));

        let edit = svc
            .update_prompt(&admin_prompt.id, PromptUpdateBuilder::new().name("x").build())
            .await;
        assert!(matches!(edit, Err(DatabaseError::Forbidden(_))));

        let copy = svc.clone_prompt(&admin_prompt.id).await.unwrap();
        assert_eq!(copy.name, "Cópia de Plano base");
        assert_eq!(copy.owner_id, sam.id);
        assert_eq!(copy.body, admin_prompt.body);
    }

    #[tokio::test]
    async fn inactive_templates_leave_active_list() {
        let svc = test_service().await;
        let prompt = svc.create_prompt(&plan_prompt("Plano base")).await.unwrap();
        assert_eq!(svc.list_active_prompts(PromptCategory::Plan, 10).await.unwrap().len(), 1);

        svc.set_prompt_active(&prompt.id, false).await.unwrap();
        assert!(svc.list_active_prompts(PromptCategory::Plan, 10).await.unwrap().is_empty());
        assert_eq!(svc.list_prompts(Some(PromptCategory::Plan), 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_validates_temperature() {
        let svc = test_service().await;
        let prompt = svc.create_prompt(&plan_prompt("Plano base")).await.unwrap();
        let result = svc
            .update_prompt(&prompt.id, PromptUpdateBuilder::new().temperature(Some(3.5)).build())
            .await;
        assert!(matches!(result, Err(DatabaseError::Validation(_))));

        let updated = svc
            .update_prompt(
                &prompt.id,
                PromptUpdateBuilder::new()
                    .temperature(None)
                    .model(Some("gemini-2.5-pro".into()))
                    .build(),
            )
            .await
            .unwrap();
        assert_eq!(updated.temperature, None);
        assert_eq!(updated.model.as_deref(), Some("gemini-2.5-pro"));

        svc.delete_prompt(&prompt.id).await.unwrap();
        assert!(svc.get_prompt(&prompt.id).await.is_err());
    }
}
