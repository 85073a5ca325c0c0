//! Audit trail repository.
//!
//! Append-only entries recording every mutation, queryable by entity and action.

use clinic_core::entities::AuditEntry;
use clinic_core::enums::{AuditAction, EntityType};

use crate::error::DatabaseError;
use crate::helpers::{SqlFilter, fmt_datetime, get_opt_string, parse_datetime, parse_enum, parse_optional_json};
use crate::service::ClinicService;

/// Filter criteria for audit queries.
#[derive(Debug, Default)]
pub struct AuditFilter {
    pub entity_type: Option<EntityType>,
    pub entity_id: Option<String>,
    pub action: Option<AuditAction>,
    pub actor_id: Option<String>,
    pub limit: Option<u32>,
}

fn row_to_audit(row: &libsql::Row) -> Result<AuditEntry, DatabaseError> {
    Ok(AuditEntry {
        id: row.get::<String>(0)?,
        actor_id: get_opt_string(row, 1)?,
        entity_type: parse_enum(&row.get::<String>(2)?)?,
        entity_id: row.get::<String>(3)?,
        action: parse_enum(&row.get::<String>(4)?)?,
        detail: parse_optional_json(get_opt_string(row, 5)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

impl ClinicService {
    /// Append an audit entry. Called by every mutation method.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails.
    pub async fn append_audit(&self, entry: &AuditEntry) -> Result<(), DatabaseError> {
        self.db()
            .execute(
                "INSERT INTO audit_trail (id, actor_id, entity_type, entity_id, action, detail, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                libsql::params![
                    entry.id.as_str(),
                    entry.actor_id.as_deref(),
                    entry.entity_type.as_str(),
                    entry.entity_id.as_str(),
                    entry.action.as_str(),
                    entry.detail.as_ref().map(std::string::ToString::to_string),
                    fmt_datetime(&entry.created_at)
                ],
            )
            .await?;
        Ok(())
    }

    /// Query audit entries with optional filters, newest first.
    ///
    /// Only admins may read the trail.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Forbidden` for non-admins, or `DatabaseError`
    /// if the query fails.
    pub async fn query_audit(&self, filter: &AuditFilter) -> Result<Vec<AuditEntry>, DatabaseError> {
        self.require_admin()?;

        let mut sql_filter = SqlFilter::new();
        if let Some(entity_type) = filter.entity_type {
            sql_filter.push("entity_type =", entity_type.as_str());
        }
        if let Some(ref entity_id) = filter.entity_id {
            sql_filter.push("entity_id =", entity_id.as_str());
        }
        if let Some(action) = filter.action {
            sql_filter.push("action =", action.as_str());
        }
        if let Some(ref actor_id) = filter.actor_id {
            sql_filter.push("actor_id =", actor_id.as_str());
        }

        let limit = filter.limit.unwrap_or(100);
        let sql = format!(
            "SELECT id, actor_id, entity_type, entity_id, action, detail, created_at
             FROM audit_trail {}
             ORDER BY created_at DESC, rowid DESC LIMIT {limit}",
            sql_filter.where_clause()
        );

        let mut rows = self
            .db()
            .query(&sql, libsql::params_from_iter(sql_filter.into_params()))
            .await?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(row_to_audit(&row)?);
        }
        Ok(entries)
    }
}
