//! Therapeutic resource inventory repository.

use clinic_core::entities::Resource;
use clinic_core::enums::{AuditAction, EntityType, ResourceCondition};
use clinic_core::ids::PREFIX_RESOURCE;

use crate::error::DatabaseError;
use crate::helpers::{SetClause, fmt_datetime, get_opt_string, get_u32, opt_text, parse_datetime, parse_enum, require_text, utc_now};
use crate::service::ClinicService;
use crate::updates::resource::ResourceUpdate;

const SELECT_COLS: &str =
    "id, clinic_id, name, location, quantity, therapeutic_goals, condition, created_at, updated_at";

/// Input for adding an inventory item.
#[derive(Debug, Clone)]
pub struct NewResource {
    pub name: String,
    pub location: Option<String>,
    pub quantity: u32,
    pub therapeutic_goals: Option<String>,
    pub condition: ResourceCondition,
}

fn row_to_resource(row: &libsql::Row) -> Result<Resource, DatabaseError> {
    Ok(Resource {
        id: row.get(0)?,
        clinic_id: row.get(1)?,
        name: row.get(2)?,
        location: get_opt_string(row, 3)?,
        quantity: get_u32(row, 4)?,
        therapeutic_goals: get_opt_string(row, 5)?,
        condition: parse_enum(&row.get::<String>(6)?)?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
        updated_at: parse_datetime(&row.get::<String>(8)?)?,
    })
}

impl ClinicService {
    /// # Errors
    ///
    /// Returns `DatabaseError::Forbidden` for caregivers and
    /// `DatabaseError::Validation` for a blank name.
    pub async fn create_resource(&self, new: &NewResource) -> Result<Resource, DatabaseError> {
        self.require_staff()?;
        let clinic_id = self.require_clinic_id()?;
        let name = require_text("resource name", &new.name)?;

        let now = utc_now();
        let id = self.db().generate_id(PREFIX_RESOURCE).await?;
        self.db()
            .execute(
                &format!(
                    "INSERT INTO resources ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)"
                ),
                libsql::params![
                    id.as_str(),
                    clinic_id.as_str(),
                    name,
                    new.location.as_deref(),
                    i64::from(new.quantity),
                    new.therapeutic_goals.as_deref(),
                    new.condition.as_str(),
                    fmt_datetime(&now)
                ],
            )
            .await?;
        self.record_audit(EntityType::Resource, &id, AuditAction::Created, None)
            .await?;

        Ok(Resource {
            id,
            clinic_id,
            name: name.to_string(),
            location: new.location.clone(),
            quantity: new.quantity,
            therapeutic_goals: new.therapeutic_goals.clone(),
            condition: new.condition,
            created_at: now,
            updated_at: now,
        })
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` for unknown or foreign resources.
    pub async fn get_resource(&self, id: &str) -> Result<Resource, DatabaseError> {
        let mut filter = self.scoped_filter("clinic_id")?;
        filter.push("id =", id);
        let sql = format!("SELECT {SELECT_COLS} FROM resources {}", filter.where_clause());
        let mut rows = self
            .db()
            .query(&sql, libsql::params_from_iter(filter.into_params()))
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::Resource, id))?;
        row_to_resource(&row)
    }

    /// Inventory of the actor's clinic, optionally only items fit for use.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_resources(&self, usable_only: bool, limit: u32) -> Result<Vec<Resource>, DatabaseError> {
        let mut filter = self.scoped_filter("clinic_id")?;
        if usable_only {
            filter.push("condition !=", ResourceCondition::OutOfService.as_str());
            filter.push_raw("quantity > 0");
        }
        let sql = format!(
            "SELECT {SELECT_COLS} FROM resources {} ORDER BY name LIMIT {limit}",
            filter.where_clause()
        );
        let mut rows = self
            .db()
            .query(&sql, libsql::params_from_iter(filter.into_params()))
            .await?;
        let mut resources = Vec::new();
        while let Some(row) = rows.next().await? {
            resources.push(row_to_resource(&row)?);
        }
        Ok(resources)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the resource is not visible.
    pub async fn update_resource(
        &self,
        resource_id: &str,
        update: ResourceUpdate,
    ) -> Result<Resource, DatabaseError> {
        self.require_staff()?;
        self.get_resource(resource_id).await?;

        let mut sets = SetClause::new();
        if let Some(ref name) = update.name {
            sets.set("name", require_text("resource name", name)?);
        }
        if let Some(ref location) = update.location {
            sets.set("location", opt_text(location.as_deref()));
        }
        if let Some(quantity) = update.quantity {
            sets.set("quantity", i64::from(quantity));
        }
        if let Some(ref goals) = update.therapeutic_goals {
            sets.set("therapeutic_goals", opt_text(goals.as_deref()));
        }
        if let Some(condition) = update.condition {
            sets.set("condition", condition.as_str());
        }

        if sets.is_empty() {
            return self.get_resource(resource_id).await;
        }
        sets.set("updated_at", fmt_datetime(&utc_now()));

        let (sql, params) = sets.into_update("resources", resource_id);
        self.db()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;
        self.record_audit_with(EntityType::Resource, resource_id, AuditAction::Updated, &update)
            .await?;
        self.get_resource(resource_id).await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::Forbidden` for non-admins.
    pub async fn delete_resource(&self, resource_id: &str) -> Result<(), DatabaseError> {
        self.require_admin()?;
        self.get_resource(resource_id).await?;
        self.db()
            .execute("DELETE FROM resources WHERE id = ?1", [resource_id])
            .await?;
        self.record_audit(EntityType::Resource, resource_id, AuditAction::Deleted, None)
            .await?;
        Ok(())
    }
}
