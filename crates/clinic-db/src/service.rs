//! Service layer orchestrating database access with tenant scoping and audit.
//!
//! `ClinicService` wraps `ClinicDb` and the acting user. All repo methods are
//! implemented as `impl ClinicService` blocks in [`crate::repos`].
//!
//! Every mutation method follows this protocol:
//! 1. Resolve the actor and check its role
//! 2. Execute SQL scoped to the actor's clinic
//! 3. Append an audit entry attributed to the actor

use clinic_core::entities::AuditEntry;
use clinic_core::enums::{AuditAction, EntityType, Role};
use clinic_core::identity::Actor;
use clinic_core::ids::PREFIX_AUDIT;

use crate::ClinicDb;
use crate::error::DatabaseError;
use crate::helpers::{SqlFilter, get_opt_string, parse_enum, utc_now};

pub struct ClinicService {
    db: ClinicDb,
    actor: Option<Actor>,
}

impl ClinicService {
    /// Create a service over a local database file (or `":memory:"`).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(db_path: &str) -> Result<Self, DatabaseError> {
        let db = ClinicDb::open_local(db_path).await?;
        Ok(Self::from_db(db))
    }

    /// Create a service over a remote libSQL database.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the remote database cannot be reached.
    pub async fn new_remote(url: &str, auth_token: &str) -> Result<Self, DatabaseError> {
        let db = ClinicDb::open_remote(url, auth_token).await?;
        Ok(Self::from_db(db))
    }

    #[must_use]
    pub const fn from_db(db: ClinicDb) -> Self {
        Self { db, actor: None }
    }

    #[must_use]
    pub const fn db(&self) -> &ClinicDb {
        &self.db
    }

    #[must_use]
    pub const fn actor(&self) -> Option<&Actor> {
        self.actor.as_ref()
    }

    pub fn set_actor(&mut self, actor: Actor) {
        self.actor = Some(actor);
    }

    /// Load `user_id` from the `users` table and act on their behalf.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` for unknown users and
    /// `DatabaseError::Forbidden` for deactivated ones.
    pub async fn act_as(&mut self, user_id: &str) -> Result<&Actor, DatabaseError> {
        let mut rows = self
            .db
            .query(
                "SELECT id, clinic_id, role, full_name, active FROM users WHERE id = ?1",
                [user_id],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::User, user_id))?;

        if row.get::<i64>(4)? == 0 {
            return Err(DatabaseError::Forbidden(format!(
                "user {user_id} is deactivated"
            )));
        }

        let actor = Actor {
            user_id: row.get(0)?,
            clinic_id: get_opt_string(&row, 1)?,
            role: parse_enum(&row.get::<String>(2)?)?,
            full_name: row.get(3)?,
        };
        tracing::debug!(user_id = %actor.user_id, role = %actor.role, "acting as user");
        let actor = self.actor.insert(actor);
        Ok(&*actor)
    }

    /// The acting user, or `Forbidden` when none was resolved.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Forbidden` if no actor is set.
    pub fn require_actor(&self) -> Result<&Actor, DatabaseError> {
        self.actor.as_ref().ok_or_else(|| {
            DatabaseError::Forbidden(
                "no acting user; set general.actor_id or pass --as <user-id>".into(),
            )
        })
    }

    /// The acting user, if they hold an admin role.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Forbidden` for non-admins.
    pub fn require_admin(&self) -> Result<&Actor, DatabaseError> {
        let actor = self.require_actor()?;
        if !actor.is_admin() {
            return Err(DatabaseError::Forbidden(format!(
                "{} cannot perform this action",
                actor.role
            )));
        }
        Ok(actor)
    }

    /// The acting user, if they work at the clinic (admins and therapists).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Forbidden` for caregivers.
    pub fn require_staff(&self) -> Result<&Actor, DatabaseError> {
        let actor = self.require_actor()?;
        if !(actor.is_admin() || actor.is_therapist()) {
            return Err(DatabaseError::Forbidden(format!(
                "{} cannot perform this action",
                actor.role
            )));
        }
        Ok(actor)
    }

    /// The acting user, if they are a master admin.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Forbidden` for every other role.
    pub fn require_master(&self) -> Result<&Actor, DatabaseError> {
        let actor = self.require_actor()?;
        if actor.role != Role::MasterAdmin {
            return Err(DatabaseError::Forbidden(
                "only master admins can manage clinics".into(),
            ));
        }
        Ok(actor)
    }

    /// Clinic new records are created in.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Forbidden` when the actor has no clinic.
    pub fn require_clinic_id(&self) -> Result<String, DatabaseError> {
        let actor = self.require_actor()?;
        actor.clinic_id.clone().ok_or_else(|| {
            DatabaseError::Forbidden(format!(
                "user {} is not bound to a clinic",
                actor.user_id
            ))
        })
    }

    /// Restrict `filter` to the actor's clinic. Master admins are unrestricted.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Forbidden` if no actor is set.
    pub fn scope(&self, filter: &mut SqlFilter, column: &str) -> Result<(), DatabaseError> {
        let actor = self.require_actor()?;
        if actor.sees_all_clinics() {
            return Ok(());
        }
        match actor.clinic_id.as_deref() {
            Some(clinic_id) => filter.push(&format!("{column} ="), clinic_id),
            None => filter.push_raw("0"),
        }
        Ok(())
    }

    /// A filter pre-scoped to the actor's clinic on `column`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Forbidden` if no actor is set.
    pub fn scoped_filter(&self, column: &str) -> Result<SqlFilter, DatabaseError> {
        let mut filter = SqlFilter::new();
        self.scope(&mut filter, column)?;
        Ok(filter)
    }

    /// Append an audit entry attributed to the current actor.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if ID generation or the INSERT fails.
    pub async fn record_audit(
        &self,
        entity_type: EntityType,
        entity_id: &str,
        action: AuditAction,
        detail: Option<serde_json::Value>,
    ) -> Result<AuditEntry, DatabaseError> {
        let entry = AuditEntry {
            id: self.db.generate_id(PREFIX_AUDIT).await?,
            actor_id: self.actor.as_ref().map(|a| a.user_id.clone()),
            entity_type,
            entity_id: entity_id.to_string(),
            action,
            detail,
            created_at: utc_now(),
        };
        self.append_audit(&entry).await?;
        tracing::info!(
            entity = %entity_type,
            id = %entity_id,
            action = %action,
            "recorded mutation"
        );
        Ok(entry)
    }

    /// Audit with a serializable detail payload.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if serialization or the INSERT fails.
    pub async fn record_audit_with<T: serde::Serialize + Sync>(
        &self,
        entity_type: EntityType,
        entity_id: &str,
        action: AuditAction,
        detail: &T,
    ) -> Result<AuditEntry, DatabaseError> {
        let value = serde_json::to_value(detail)?;
        self.record_audit(entity_type, entity_id, action, Some(value))
            .await
    }
}
