//! Clinic repository: tenant records and first-run bootstrap.

use clinic_core::entities::{Clinic, User};
use clinic_core::enums::{AuditAction, EntityType, Role, SubscriptionStatus};
use clinic_core::identity::Actor;
use clinic_core::ids::{PREFIX_CLINIC, PREFIX_USER};

use crate::error::DatabaseError;
use crate::helpers::{SetClause, fmt_datetime, get_opt_string, get_u32, opt_text, parse_datetime, parse_enum, require_text, utc_now};
use crate::service::ClinicService;
use crate::updates::clinic::ClinicUpdate;

const SELECT_COLS: &str = "id, legal_name, trade_name, tax_id, subscription_status, plan, \
     max_therapists, address, city, state, mission, created_at, updated_at";

/// Input for creating a clinic.
#[derive(Debug, Clone)]
pub struct NewClinic {
    pub legal_name: String,
    pub trade_name: Option<String>,
    pub tax_id: Option<String>,
    pub subscription_status: SubscriptionStatus,
    pub plan: Option<String>,
    pub max_therapists: u32,
    pub city: Option<String>,
    pub state: Option<String>,
}

impl NewClinic {
    #[must_use]
    pub fn named(legal_name: impl Into<String>) -> Self {
        Self {
            legal_name: legal_name.into(),
            trade_name: None,
            tax_id: None,
            subscription_status: SubscriptionStatus::Trial,
            plan: None,
            max_therapists: 5,
            city: None,
            state: None,
        }
    }
}

fn row_to_clinic(row: &libsql::Row) -> Result<Clinic, DatabaseError> {
    Ok(Clinic {
        id: row.get(0)?,
        legal_name: row.get(1)?,
        trade_name: get_opt_string(row, 2)?,
        tax_id: get_opt_string(row, 3)?,
        subscription_status: parse_enum(&row.get::<String>(4)?)?,
        plan: get_opt_string(row, 5)?,
        max_therapists: get_u32(row, 6)?,
        address: get_opt_string(row, 7)?,
        city: get_opt_string(row, 8)?,
        state: get_opt_string(row, 9)?,
        mission: get_opt_string(row, 10)?,
        created_at: parse_datetime(&row.get::<String>(11)?)?,
        updated_at: parse_datetime(&row.get::<String>(12)?)?,
    })
}

impl ClinicService {
    async fn user_count(&self) -> Result<i64, DatabaseError> {
        let mut rows = self.db().query("SELECT COUNT(*) FROM users", ()).await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<i64>(0)?)
    }

    async fn insert_clinic(&self, new: &NewClinic) -> Result<Clinic, DatabaseError> {
        let legal_name = require_text("legal name", &new.legal_name)?;
        let now = utc_now();
        let id = self.db().generate_id(PREFIX_CLINIC).await?;

        self.db()
            .execute(
                &format!(
                    "INSERT INTO clinics ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL, ?8, ?9, NULL, ?10, ?10)"
                ),
                libsql::params![
                    id.as_str(),
                    legal_name,
                    new.trade_name.as_deref(),
                    new.tax_id.as_deref(),
                    new.subscription_status.as_str(),
                    new.plan.as_deref(),
                    i64::from(new.max_therapists),
                    new.city.as_deref(),
                    new.state.as_deref(),
                    fmt_datetime(&now)
                ],
            )
            .await?;

        self.record_audit(EntityType::Clinic, &id, AuditAction::Created, None)
            .await?;
        self.fetch_clinic(&id).await
    }

    pub(crate) async fn insert_user_row(
        &self,
        clinic_id: Option<&str>,
        full_name: &str,
        email: &str,
        phone: Option<&str>,
        role: Role,
    ) -> Result<User, DatabaseError> {
        let full_name = require_text("full name", full_name)?;
        let email = require_text("email", email)?.to_lowercase();
        let now = utc_now();
        let id = self.db().generate_id(PREFIX_USER).await?;

        self.db()
            .execute(
                "INSERT INTO users (id, clinic_id, full_name, email, phone, role, active, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7, ?7)",
                libsql::params![
                    id.as_str(),
                    clinic_id,
                    full_name,
                    email.as_str(),
                    phone,
                    role.as_str(),
                    fmt_datetime(&now)
                ],
            )
            .await?;

        Ok(User {
            id,
            clinic_id: clinic_id.map(String::from),
            full_name: full_name.to_string(),
            email,
            phone: phone.map(String::from),
            role,
            active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// First-run setup: create a clinic and its administrator, then act as
    /// that administrator.
    ///
    /// Only allowed while the `users` table is empty.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` if users already exist.
    pub async fn bootstrap_clinic(
        &mut self,
        new: &NewClinic,
        admin_name: &str,
        admin_email: &str,
    ) -> Result<(Clinic, User), DatabaseError> {
        if self.user_count().await? > 0 {
            return Err(DatabaseError::InvalidState(
                "setup already ran; ask an admin to create your account".into(),
            ));
        }

        let clinic = self.insert_clinic(new).await?;
        let admin = self
            .insert_user_row(Some(&clinic.id), admin_name, admin_email, None, Role::ClinicAdmin)
            .await?;
        self.set_actor(Actor {
            user_id: admin.id.clone(),
            clinic_id: admin.clinic_id.clone(),
            role: admin.role,
            full_name: admin.full_name.clone(),
        });
        self.record_audit(EntityType::User, &admin.id, AuditAction::Created, None)
            .await?;
        Ok((clinic, admin))
    }

    /// First-run setup for a platform operator account.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` if users already exist.
    pub async fn bootstrap_master_admin(
        &mut self,
        full_name: &str,
        email: &str,
    ) -> Result<User, DatabaseError> {
        if self.user_count().await? > 0 {
            return Err(DatabaseError::InvalidState(
                "setup already ran; ask an admin to create your account".into(),
            ));
        }
        let user = self
            .insert_user_row(None, full_name, email, None, Role::MasterAdmin)
            .await?;
        self.set_actor(Actor {
            user_id: user.id.clone(),
            clinic_id: None,
            role: Role::MasterAdmin,
            full_name: user.full_name.clone(),
        });
        self.record_audit(EntityType::User, &user.id, AuditAction::Created, None)
            .await?;
        Ok(user)
    }

    /// Create a clinic. Master admins only.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Forbidden` for other roles.
    pub async fn create_clinic(&self, new: &NewClinic) -> Result<Clinic, DatabaseError> {
        self.require_master()?;
        self.insert_clinic(new).await
    }

    async fn fetch_clinic(&self, id: &str) -> Result<Clinic, DatabaseError> {
        let mut rows = self
            .db()
            .query(&format!("SELECT {SELECT_COLS} FROM clinics WHERE id = ?1"), [id])
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::Clinic, id))?;
        row_to_clinic(&row)
    }

    /// Fetch a clinic visible to the actor.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` for unknown or foreign clinics.
    pub async fn get_clinic(&self, id: &str) -> Result<Clinic, DatabaseError> {
        let actor = self.require_actor()?;
        if !actor.sees_all_clinics() && actor.clinic_id.as_deref() != Some(id) {
            return Err(DatabaseError::not_found(EntityType::Clinic, id));
        }
        self.fetch_clinic(id).await
    }

    /// The actor's own clinic.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Forbidden` if the actor has no clinic.
    pub async fn current_clinic(&self) -> Result<Clinic, DatabaseError> {
        let clinic_id = self.require_clinic_id()?;
        self.fetch_clinic(&clinic_id).await
    }

    /// Every clinic for master admins; the actor's own clinic otherwise.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_clinics(&self, limit: u32) -> Result<Vec<Clinic>, DatabaseError> {
        let filter = self.scoped_filter("id")?;
        let sql = format!(
            "SELECT {SELECT_COLS} FROM clinics {} ORDER BY legal_name LIMIT {limit}",
            filter.where_clause()
        );
        let mut rows = self
            .db()
            .query(&sql, libsql::params_from_iter(filter.into_params()))
            .await?;
        let mut clinics = Vec::new();
        while let Some(row) = rows.next().await? {
            clinics.push(row_to_clinic(&row)?);
        }
        Ok(clinics)
    }

    /// Update clinic details. Clinic admins may edit their own clinic's
    /// profile; subscription fields are reserved to master admins.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Forbidden` when the actor may not edit the
    /// clinic or the touched fields.
    pub async fn update_clinic(
        &self,
        clinic_id: &str,
        update: ClinicUpdate,
    ) -> Result<Clinic, DatabaseError> {
        let actor = self.require_admin()?;
        if update.touches_subscription() && !actor.sees_all_clinics() {
            return Err(DatabaseError::Forbidden(
                "subscription fields can only be changed by a master admin".into(),
            ));
        }
        self.get_clinic(clinic_id).await?;

        let mut sets = SetClause::new();
        if let Some(ref legal_name) = update.legal_name {
            sets.set("legal_name", require_text("legal name", legal_name)?);
        }
        if let Some(ref trade_name) = update.trade_name {
            sets.set("trade_name", opt_text(trade_name.as_deref()));
        }
        if let Some(ref tax_id) = update.tax_id {
            sets.set("tax_id", opt_text(tax_id.as_deref()));
        }
        if let Some(status) = update.subscription_status {
            sets.set("subscription_status", status.as_str());
        }
        if let Some(ref plan) = update.plan {
            sets.set("plan", opt_text(plan.as_deref()));
        }
        if let Some(max) = update.max_therapists {
            sets.set("max_therapists", i64::from(max));
        }
        if let Some(ref address) = update.address {
            sets.set("address", opt_text(address.as_deref()));
        }
        if let Some(ref city) = update.city {
            sets.set("city", opt_text(city.as_deref()));
        }
        if let Some(ref state) = update.state {
            sets.set("state", opt_text(state.as_deref()));
        }
        if let Some(ref mission) = update.mission {
            sets.set("mission", opt_text(mission.as_deref()));
        }

        if sets.is_empty() {
            return self.fetch_clinic(clinic_id).await;
        }
        sets.set("updated_at", fmt_datetime(&utc_now()));

        let (sql, params) = sets.into_update("clinics", clinic_id);
        self.db()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;

        self.record_audit_with(EntityType::Clinic, clinic_id, AuditAction::Updated, &update)
            .await?;
        self.fetch_clinic(clinic_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClinicDb;
    use crate::test_support::helpers::{seed_therapist, test_service};
    use crate::updates::clinic::ClinicUpdateBuilder;
    use pretty_assertions::assert_eq;

    async fn empty_service() -> ClinicService {
        ClinicService::from_db(ClinicDb::open_local(":memory:").await.unwrap())
    }

    #[tokio::test]
    async fn bootstrap_creates_clinic_and_admin() {
        let mut svc = empty_service().await;
        let (clinic, admin) = svc
            .bootstrap_clinic(&NewClinic::named("Som & Ser"), "Helena Costa", "Helena@Example.com")
            .await
            .unwrap();

        assert!(clinic.id.starts_with("cln-"));
        assert_eq!(clinic.subscription_status, SubscriptionStatus::Trial);
        assert_eq!(admin.role, Role::ClinicAdmin);
        assert_eq!(admin.email, "helena@example.com");
        assert_eq!(svc.actor().map(|a| a.user_id.clone()), Some(admin.id));
    }

    #[tokio::test]
    async fn bootstrap_runs_once() {
        let mut svc = empty_service().await;
        svc.bootstrap_clinic(&NewClinic::named("A"), "Admin", "a@x.com")
            .await
            .unwrap();
        let result = svc
            .bootstrap_clinic(&NewClinic::named("B"), "Other", "b@x.com")
            .await;
        assert!(matches!(result, Err(DatabaseError::InvalidState(_))));
    }

    #[tokio::test]
    async fn master_admin_lists_all_clinics() {
        let mut svc = empty_service().await;
        svc.bootstrap_master_admin("Root", "root@x.com").await.unwrap();
        svc.create_clinic(&NewClinic::named("Clínica Norte")).await.unwrap();
        svc.create_clinic(&NewClinic::named("Clínica Sul")).await.unwrap();

        let clinics = svc.list_clinics(10).await.unwrap();
        assert_eq!(clinics.len(), 2);
        assert_eq!(clinics[0].legal_name, "Clínica Norte");
    }

    #[tokio::test]
    async fn clinic_admin_sees_only_own_clinic() {
        let svc = test_service().await;
        let own = svc.current_clinic().await.unwrap();

        let clinics = svc.list_clinics(10).await.unwrap();
        assert_eq!(clinics.len(), 1);
        assert_eq!(clinics[0].id, own.id);

        assert!(matches!(
            svc.create_clinic(&NewClinic::named("Outra")).await,
            Err(DatabaseError::Forbidden(_))
        ));
        assert!(matches!(
            svc.get_clinic("cln-00000000").await,
            Err(DatabaseError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn admin_updates_profile_but_not_subscription() {
        let svc = test_service().await;
        let clinic = svc.current_clinic().await.unwrap();

        let updated = svc
            .update_clinic(
                &clinic.id,
                ClinicUpdateBuilder::new()
                    .mission(Some("Música para todos".into()))
                    .city(Some("Olinda".into()))
                    .build(),
            )
            .await
            .unwrap();
        assert_eq!(updated.mission.as_deref(), Some("Música para todos"));
        assert_eq!(updated.city.as_deref(), Some("Olinda"));

        let result = svc
            .update_clinic(&clinic.id, ClinicUpdateBuilder::new().max_therapists(50).build())
            .await;
        assert!(matches!(result, Err(DatabaseError::Forbidden(_))));
    }

    #[tokio::test]
    async fn therapist_cannot_update_clinic() {
        let mut svc = test_service().await;
        let clinic = svc.current_clinic().await.unwrap();
        let therapist = seed_therapist(&svc, "Samuel Rocha").await;
        svc.act_as(&therapist.id).await.unwrap();

        let result = svc
            .update_clinic(&clinic.id, ClinicUpdateBuilder::new().legal_name("X").build())
            .await;
        assert!(matches!(result, Err(DatabaseError::Forbidden(_))));
    }
}
