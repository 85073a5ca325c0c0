//! Team repository: users, activation, and therapist profiles.

use clinic_core::audit_detail::StatusChangedDetail;
use clinic_core::entities::{TherapistProfile, User};
use clinic_core::enums::{AuditAction, EntityType, Role};

use crate::error::DatabaseError;
use crate::helpers::{SqlFilter, fmt_datetime, get_bool, get_opt_string, parse_datetime, parse_enum, parse_optional_datetime, utc_now};
use crate::service::ClinicService;

const SELECT_COLS: &str =
    "id, clinic_id, full_name, email, phone, role, active, created_at, updated_at";

/// Input for creating a team member.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    /// Target clinic. Required for master admins; ignored for clinic admins,
    /// who always create users in their own clinic.
    pub clinic_id: Option<String>,
}

pub(crate) fn row_to_user(row: &libsql::Row) -> Result<User, DatabaseError> {
    Ok(User {
        id: row.get(0)?,
        clinic_id: get_opt_string(row, 1)?,
        full_name: row.get(2)?,
        email: row.get(3)?,
        phone: get_opt_string(row, 4)?,
        role: parse_enum(&row.get::<String>(5)?)?,
        active: get_bool(row, 6)?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
        updated_at: parse_datetime(&row.get::<String>(8)?)?,
    })
}

fn row_to_profile(row: &libsql::Row) -> Result<TherapistProfile, DatabaseError> {
    Ok(TherapistProfile {
        user_id: row.get(0)?,
        professional_registry: get_opt_string(row, 1)?,
        education: get_opt_string(row, 2)?,
        specialties: get_opt_string(row, 3)?,
        preferred_techniques: get_opt_string(row, 4)?,
        preferred_resources: get_opt_string(row, 5)?,
        conducting_style: get_opt_string(row, 6)?,
        clinical_notes: get_opt_string(row, 7)?,
        bio: get_opt_string(row, 8)?,
        updated_at: parse_optional_datetime(get_opt_string(row, 9)?.as_deref())?,
    })
}

impl ClinicService {
    async fn ensure_therapist_slot(&self, clinic_id: &str) -> Result<(), DatabaseError> {
        let mut rows = self
            .db()
            .query(
                "SELECT c.max_therapists,
                        (SELECT COUNT(*) FROM users u
                         WHERE u.clinic_id = c.id AND u.role = 'therapist' AND u.active = 1)
                 FROM clinics c WHERE c.id = ?1",
                [clinic_id],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::Clinic, clinic_id))?;
        let max = row.get::<i64>(0)?;
        let active = row.get::<i64>(1)?;
        if active >= max {
            return Err(DatabaseError::InvalidState(format!(
                "therapist limit reached: the clinic plan allows {max} active therapists"
            )));
        }
        Ok(())
    }

    /// Create a team member. Admins only; creating a therapist respects the
    /// clinic's `max_therapists` limit.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Forbidden` for non-admins or role escalation,
    /// `DatabaseError::InvalidState` when the therapist limit is reached, and
    /// `DatabaseError::LibSql` on duplicate email.
    pub async fn create_user(&self, new: &NewUser) -> Result<User, DatabaseError> {
        let actor = self.require_admin()?;

        if new.role == Role::MasterAdmin && !actor.sees_all_clinics() {
            return Err(DatabaseError::Forbidden(
                "only master admins can create master admins".into(),
            ));
        }

        let clinic_id = if new.role == Role::MasterAdmin {
            None
        } else if actor.sees_all_clinics() {
            Some(new.clinic_id.clone().ok_or_else(|| {
                DatabaseError::Validation("clinic id is required for this role".into())
            })?)
        } else {
            Some(self.require_clinic_id()?)
        };

        if new.role == Role::Therapist
            && let Some(ref clinic_id) = clinic_id
        {
            self.ensure_therapist_slot(clinic_id).await?;
        }

        let user = self
            .insert_user_row(
                clinic_id.as_deref(),
                &new.full_name,
                &new.email,
                new.phone.as_deref(),
                new.role,
            )
            .await?;
        self.record_audit(EntityType::User, &user.id, AuditAction::Created, None)
            .await?;
        Ok(user)
    }

    /// Fetch a user visible to the actor.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` for unknown or foreign users.
    pub async fn get_user(&self, id: &str) -> Result<User, DatabaseError> {
        let mut filter = self.scoped_filter("clinic_id")?;
        filter.push("id =", id);
        let sql = format!("SELECT {SELECT_COLS} FROM users {}", filter.where_clause());
        let mut rows = self
            .db()
            .query(&sql, libsql::params_from_iter(filter.into_params()))
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::User, id))?;
        row_to_user(&row)
    }

    async fn list_users(&self, filter: SqlFilter, limit: u32) -> Result<Vec<User>, DatabaseError> {
        let sql = format!(
            "SELECT {SELECT_COLS} FROM users {} ORDER BY full_name LIMIT {limit}",
            filter.where_clause()
        );
        let mut rows = self
            .db()
            .query(&sql, libsql::params_from_iter(filter.into_params()))
            .await?;
        let mut users = Vec::new();
        while let Some(row) = rows.next().await? {
            users.push(row_to_user(&row)?);
        }
        Ok(users)
    }

    /// Every user of the actor's clinic, optionally filtered by role.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_team(&self, role: Option<Role>, limit: u32) -> Result<Vec<User>, DatabaseError> {
        let mut filter = self.scoped_filter("clinic_id")?;
        if let Some(role) = role {
            filter.push("role =", role.as_str());
        }
        self.list_users(filter, limit).await
    }

    /// Active therapists of the actor's clinic.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_therapists(&self, limit: u32) -> Result<Vec<User>, DatabaseError> {
        let mut filter = self.scoped_filter("clinic_id")?;
        filter.push("role =", Role::Therapist.as_str());
        filter.push_raw("active = 1");
        self.list_users(filter, limit).await
    }

    /// Activate or deactivate a team member. Admins only; re-activating a
    /// therapist respects the therapist limit.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Forbidden` for non-admins or self-deactivation.
    pub async fn set_user_active(&self, user_id: &str, active: bool) -> Result<User, DatabaseError> {
        let actor = self.require_admin()?;
        if actor.user_id == user_id && !active {
            return Err(DatabaseError::Forbidden(
                "you cannot deactivate your own account".into(),
            ));
        }

        let current = self.get_user(user_id).await?;
        if current.active == active {
            return Ok(current);
        }
        if active
            && current.role == Role::Therapist
            && let Some(ref clinic_id) = current.clinic_id
        {
            self.ensure_therapist_slot(clinic_id).await?;
        }

        let now = utc_now();
        self.db()
            .execute(
                "UPDATE users SET active = ?1, updated_at = ?2 WHERE id = ?3",
                libsql::params![i64::from(active), fmt_datetime(&now), user_id],
            )
            .await?;

        let detail = StatusChangedDetail {
            from: if current.active { "active" } else { "inactive" }.to_string(),
            to: if active { "active" } else { "inactive" }.to_string(),
            reason: None,
        };
        self.record_audit_with(EntityType::User, user_id, AuditAction::StatusChanged, &detail)
            .await?;

        Ok(User {
            active,
            updated_at: now,
            ..current
        })
    }

    /// Create or replace a therapist's professional profile.
    ///
    /// Therapists may only edit their own profile; admins may edit any
    /// therapist in their clinic.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Forbidden` when editing someone else's profile
    /// without admin rights.
    pub async fn upsert_therapist_profile(
        &self,
        profile: &TherapistProfile,
    ) -> Result<TherapistProfile, DatabaseError> {
        let actor = self.require_actor()?;
        if actor.user_id != profile.user_id && !actor.is_admin() {
            return Err(DatabaseError::Forbidden(
                "therapists can only edit their own profile".into(),
            ));
        }
        self.get_user(&profile.user_id).await?;

        let now = utc_now();
        self.db()
            .execute(
                "INSERT INTO therapist_profiles (user_id, professional_registry, education, specialties,
                     preferred_techniques, preferred_resources, conducting_style, clinical_notes, bio, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                 ON CONFLICT(user_id) DO UPDATE SET
                     professional_registry = excluded.professional_registry,
                     education = excluded.education,
                     specialties = excluded.specialties,
                     preferred_techniques = excluded.preferred_techniques,
                     preferred_resources = excluded.preferred_resources,
                     conducting_style = excluded.conducting_style,
                     clinical_notes = excluded.clinical_notes,
                     bio = excluded.bio,
                     updated_at = excluded.updated_at",
                libsql::params![
                    profile.user_id.as_str(),
                    profile.professional_registry.as_deref(),
                    profile.education.as_deref(),
                    profile.specialties.as_deref(),
                    profile.preferred_techniques.as_deref(),
                    profile.preferred_resources.as_deref(),
                    profile.conducting_style.as_deref(),
                    profile.clinical_notes.as_deref(),
                    profile.bio.as_deref(),
                    fmt_datetime(&now)
                ],
            )
            .await?;

        self.record_audit(
            EntityType::TherapistProfile,
            &profile.user_id,
            AuditAction::Updated,
            None,
        )
        .await?;

        Ok(TherapistProfile {
            updated_at: Some(now),
            ..profile.clone()
        })
    }

    /// A therapist's profile, or an empty one when none was saved yet.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the user is not visible.
    pub async fn get_therapist_profile(&self, user_id: &str) -> Result<TherapistProfile, DatabaseError> {
        self.get_user(user_id).await?;
        let mut rows = self
            .db()
            .query(
                "SELECT user_id, professional_registry, education, specialties, preferred_techniques,
                        preferred_resources, conducting_style, clinical_notes, bio, updated_at
                 FROM therapist_profiles WHERE user_id = ?1",
                [user_id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => row_to_profile(&row),
            None => Ok(TherapistProfile {
                user_id: user_id.to_string(),
                ..TherapistProfile::default()
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{seed_therapist, test_service};
    use crate::updates::clinic::ClinicUpdateBuilder;
    use pretty_assertions::assert_eq;

    fn therapist(name: &str, email: &str) -> NewUser {
        NewUser {
            full_name: name.into(),
            email: email.into(),
            phone: None,
            role: Role::Therapist,
            clinic_id: None,
        }
    }

    #[tokio::test]
    async fn create_user_in_actor_clinic() {
        let svc = test_service().await;
        let clinic_id = svc.require_clinic_id().unwrap();

        let user = svc
            .create_user(&therapist("Samuel Rocha", "sam@example.com"))
            .await
            .unwrap();
        assert!(user.id.starts_with("usr-"));
        assert_eq!(user.clinic_id.as_deref(), Some(clinic_id.as_str()));
        assert!(user.active);

        let fetched = svc.get_user(&user.id).await.unwrap();
        assert_eq!(fetched, user);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let svc = test_service().await;
        svc.create_user(&therapist("Sam", "sam@example.com")).await.unwrap();
        let result = svc.create_user(&therapist("Sam 2", "SAM@example.com")).await;
        assert!(matches!(result, Err(DatabaseError::LibSql(_))));
    }

    #[tokio::test]
    async fn therapist_limit_is_enforced() {
        let mut svc = test_service().await;
        let admin = svc.actor().cloned().unwrap();
        svc.set_actor(clinic_core::identity::Actor {
            role: Role::MasterAdmin,
            ..admin
        });
        let clinic_id = svc.require_clinic_id().unwrap();
        svc.update_clinic(&clinic_id, ClinicUpdateBuilder::new().max_therapists(1).build())
            .await
            .unwrap();

        let first = svc
            .create_user(&NewUser {
                clinic_id: Some(clinic_id.clone()),
                ..therapist("Sam", "sam@example.com")
            })
            .await
            .unwrap();
        let second = svc
            .create_user(&NewUser {
                clinic_id: Some(clinic_id.clone()),
                ..therapist("Lia", "lia@example.com")
            })
            .await;
        assert!(matches!(second, Err(DatabaseError::InvalidState(_))));

        svc.set_user_active(&first.id, false).await.unwrap();
        svc.create_user(&NewUser {
            clinic_id: Some(clinic_id),
            ..therapist("Lia", "lia@example.com")
        })
        .await
        .unwrap();

        let reactivate = svc.set_user_active(&first.id, true).await;
        assert!(matches!(reactivate, Err(DatabaseError::InvalidState(_))));
    }

    #[tokio::test]
    async fn list_team_and_therapists() {
        let svc = test_service().await;
        let a = seed_therapist(&svc, "Bia Souza").await;
        seed_therapist(&svc, "Ana Lima").await;
        svc.set_user_active(&a.id, false).await.unwrap();

        let team = svc.list_team(None, 10).await.unwrap();
        assert_eq!(team.len(), 3, "admin plus two therapists");

        let therapists = svc.list_therapists(10).await.unwrap();
        assert_eq!(therapists.len(), 1);
        assert_eq!(therapists[0].full_name, "Ana Lima");
    }

    #[tokio::test]
    async fn admin_cannot_deactivate_self() {
        let svc = test_service().await;
        let me = svc.actor().unwrap().user_id.clone();
        let result = svc.set_user_active(&me, false).await;
        assert!(matches!(result, Err(DatabaseError::Forbidden(_))));
    }

    #[tokio::test]
    async fn therapist_profile_upsert_and_defaults() {
        let mut svc = test_service().await;
        let sam = seed_therapist(&svc, "Samuel Rocha").await;
        let other = seed_therapist(&svc, "Lia Prado").await;

        let empty = svc.get_therapist_profile(&sam.id).await.unwrap();
        assert_eq!(empty.education, None);

        svc.act_as(&sam.id).await.unwrap();
        let saved = svc
            .upsert_therapist_profile(&TherapistProfile {
                user_id: sam.id.clone(),
                professional_registry: Some("CRM 1234".into()),
                education: Some("Musicoterapia".into()),
                ..TherapistProfile::default()
            })
            .await
            .unwrap();
        assert!(saved.updated_at.is_some());

        let fetched = svc.get_therapist_profile(&sam.id).await.unwrap();
        assert_eq!(fetched.professional_registry.as_deref(), Some("CRM 1234"));

        let result = svc
            .upsert_therapist_profile(&TherapistProfile {
                user_id: other.id.clone(),
                ..TherapistProfile::default()
            })
            .await;
        assert!(matches!(result, Err(DatabaseError::Forbidden(_))));
    }
}
