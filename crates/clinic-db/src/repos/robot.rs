//! Robot repository.
//!
//! Robots are hardware units identified by MAC address. A master admin keeps
//! the global pool; clinic admins register and manage their own clinic's units.

use clinic_core::entities::Robot;
use clinic_core::enums::{AuditAction, EntityType};
use clinic_core::ids::PREFIX_ROBOT;

use crate::error::DatabaseError;
use crate::helpers::{SetClause, fmt_datetime, get_bool, get_opt_string, opt_text, parse_datetime, require_text, utc_now};
use crate::service::ClinicService;
use crate::updates::robot::RobotUpdate;

const SELECT_COLS: &str = "id, clinic_id, mac_address, name, hardware_model, serial_number, \
     blocked, operational_status, created_at, updated_at";

/// Input for registering a robot.
#[derive(Debug, Clone, Default)]
pub struct NewRobot {
    pub mac_address: String,
    pub name: String,
    pub hardware_model: Option<String>,
    pub serial_number: Option<String>,
    /// Only honored for master admins; clinic admins always register into
    /// their own clinic.
    pub clinic_id: Option<String>,
}

fn row_to_robot(row: &libsql::Row) -> Result<Robot, DatabaseError> {
    Ok(Robot {
        id: row.get(0)?,
        clinic_id: get_opt_string(row, 1)?,
        mac_address: row.get(2)?,
        name: row.get(3)?,
        hardware_model: get_opt_string(row, 4)?,
        serial_number: get_opt_string(row, 5)?,
        blocked: get_bool(row, 6)?,
        operational_status: get_opt_string(row, 7)?,
        created_at: parse_datetime(&row.get::<String>(8)?)?,
        updated_at: parse_datetime(&row.get::<String>(9)?)?,
    })
}

/// Normalize a MAC address to `AA:BB:CC:DD:EE:FF`.
///
/// Accepts colon, dash, or no separators.
///
/// # Errors
///
/// Returns `DatabaseError::Validation` unless the input holds exactly twelve
/// hex digits.
pub fn normalize_mac(mac: &str) -> Result<String, DatabaseError> {
    let digits: String = mac
        .trim()
        .chars()
        .filter(|c| !matches!(c, ':' | '-'))
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if digits.len() != 12 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(DatabaseError::Validation(format!(
            "invalid MAC address '{mac}'"
        )));
    }
    let pairs: Vec<&str> = (0..6).map(|i| &digits[i * 2..i * 2 + 2]).collect();
    Ok(pairs.join(":"))
}

impl ClinicService {
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` for a malformed or already
    /// registered MAC address.
    pub async fn register_robot(&self, new: &NewRobot) -> Result<Robot, DatabaseError> {
        let actor = self.require_admin()?;
        let clinic_id = if actor.sees_all_clinics() {
            new.clinic_id.clone()
        } else {
            Some(self.require_clinic_id()?)
        };
        if let Some(ref clinic_id) = clinic_id {
            self.get_clinic(clinic_id).await?;
        }
        let name = require_text("robot name", &new.name)?;
        let mac = normalize_mac(&new.mac_address)?;

        let mut rows = self
            .db()
            .query("SELECT id FROM robots WHERE mac_address = ?1", [mac.as_str()])
            .await?;
        if rows.next().await?.is_some() {
            return Err(DatabaseError::Validation(format!(
                "a robot with MAC {mac} is already registered"
            )));
        }

        let now = utc_now();
        let id = self.db().generate_id(PREFIX_ROBOT).await?;
        self.db()
            .execute(
                &format!(
                    "INSERT INTO robots ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, NULL, ?7, ?7)"
                ),
                libsql::params![
                    id.as_str(),
                    clinic_id.as_deref(),
                    mac.as_str(),
                    name,
                    new.hardware_model.as_deref(),
                    new.serial_number.as_deref(),
                    fmt_datetime(&now)
                ],
            )
            .await?;
        self.record_audit(EntityType::Robot, &id, AuditAction::Created, None)
            .await?;

        Ok(Robot {
            id,
            clinic_id,
            mac_address: mac,
            name: name.to_string(),
            hardware_model: new.hardware_model.clone(),
            serial_number: new.serial_number.clone(),
            blocked: false,
            operational_status: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` for unknown or foreign robots.
    pub async fn get_robot(&self, id: &str) -> Result<Robot, DatabaseError> {
        let mut filter = self.scoped_filter("clinic_id")?;
        filter.push("id =", id);
        let sql = format!("SELECT {SELECT_COLS} FROM robots {}", filter.where_clause());
        let mut rows = self
            .db()
            .query(&sql, libsql::params_from_iter(filter.into_params()))
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::Robot, id))?;
        row_to_robot(&row)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_robots(&self, limit: u32) -> Result<Vec<Robot>, DatabaseError> {
        let filter = self.scoped_filter("clinic_id")?;
        let sql = format!(
            "SELECT {SELECT_COLS} FROM robots {} ORDER BY name, rowid LIMIT {limit}",
            filter.where_clause()
        );
        let mut rows = self
            .db()
            .query(&sql, libsql::params_from_iter(filter.into_params()))
            .await?;
        let mut robots = Vec::new();
        while let Some(row) = rows.next().await? {
            robots.push(row_to_robot(&row)?);
        }
        Ok(robots)
    }

    /// Update a robot. Moving a robot between clinics is reserved to master
    /// admins.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Forbidden` when a clinic admin reassigns a robot.
    pub async fn update_robot(&self, robot_id: &str, update: RobotUpdate) -> Result<Robot, DatabaseError> {
        self.require_admin()?;
        self.get_robot(robot_id).await?;

        let mut sets = SetClause::new();
        if let Some(ref clinic_id) = update.clinic_id {
            self.require_master()?;
            if let Some(clinic_id) = clinic_id {
                self.get_clinic(clinic_id).await?;
            }
            sets.set("clinic_id", opt_text(clinic_id.as_deref()));
        }
        if let Some(ref name) = update.name {
            sets.set("name", require_text("robot name", name)?);
        }
        if let Some(ref model) = update.hardware_model {
            sets.set("hardware_model", opt_text(model.as_deref()));
        }
        if let Some(ref serial) = update.serial_number {
            sets.set("serial_number", opt_text(serial.as_deref()));
        }
        if let Some(ref status) = update.operational_status {
            sets.set("operational_status", opt_text(status.as_deref()));
        }

        if sets.is_empty() {
            return self.get_robot(robot_id).await;
        }
        sets.set("updated_at", fmt_datetime(&utc_now()));
        let (sql, params) = sets.into_update("robots", robot_id);
        self.db()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;

        self.record_audit_with(EntityType::Robot, robot_id, AuditAction::Updated, &update)
            .await?;
        self.get_robot(robot_id).await
    }

    /// Block or unblock a robot.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Forbidden` for non-admins.
    pub async fn set_robot_blocked(&self, robot_id: &str, blocked: bool) -> Result<Robot, DatabaseError> {
        self.require_admin()?;
        let current = self.get_robot(robot_id).await?;
        if current.blocked == blocked {
            return Ok(current);
        }

        let now = utc_now();
        self.db()
            .execute(
                "UPDATE robots SET blocked = ?1, updated_at = ?2 WHERE id = ?3",
                libsql::params![i64::from(blocked), fmt_datetime(&now), robot_id],
            )
            .await?;
        self.record_audit_with(
            EntityType::Robot,
            robot_id,
            AuditAction::Updated,
            &serde_json::json!({ "blocked": blocked }),
        )
        .await?;

        Ok(Robot {
            blocked,
            updated_at: now,
            ..current
        })
    }
}
