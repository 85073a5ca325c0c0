//! Room repository.

use clinic_core::entities::Room;
use clinic_core::enums::{AuditAction, EntityType};
use clinic_core::ids::PREFIX_ROOM;

use crate::error::DatabaseError;
use crate::helpers::{SetClause, fmt_datetime, get_bool, get_opt_string, get_opt_u32, opt_int, opt_text, parse_datetime, require_text, utc_now};
use crate::service::ClinicService;
use crate::updates::room::RoomUpdate;

const SELECT_COLS: &str = "id, clinic_id, name, description, capacity, color, active, created_at";

fn row_to_room(row: &libsql::Row) -> Result<Room, DatabaseError> {
    Ok(Room {
        id: row.get(0)?,
        clinic_id: row.get(1)?,
        name: row.get(2)?,
        description: get_opt_string(row, 3)?,
        capacity: get_opt_u32(row, 4)?,
        color: get_opt_string(row, 5)?,
        active: get_bool(row, 6)?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

fn validate_color(color: Option<&str>) -> Result<(), DatabaseError> {
    if let Some(color) = color {
        let valid = color.len() == 7
            && color.starts_with('#')
            && color[1..].chars().all(|c| c.is_ascii_hexdigit());
        if !valid {
            return Err(DatabaseError::Validation(format!(
                "room color must look like #1a2b3c, got '{color}'"
            )));
        }
    }
    Ok(())
}

impl ClinicService {
    /// # Errors
    ///
    /// Returns `DatabaseError::Forbidden` for non-admins and
    /// `DatabaseError::Validation` for a blank name or malformed color.
    pub async fn create_room(
        &self,
        name: &str,
        description: Option<&str>,
        capacity: Option<u32>,
        color: Option<&str>,
    ) -> Result<Room, DatabaseError> {
        self.require_admin()?;
        let clinic_id = self.require_clinic_id()?;
        let name = require_text("room name", name)?;
        validate_color(color)?;

        let now = utc_now();
        let id = self.db().generate_id(PREFIX_ROOM).await?;
        self.db()
            .execute(
                &format!("INSERT INTO rooms ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7)"),
                libsql::params![
                    id.as_str(),
                    clinic_id.as_str(),
                    name,
                    description,
                    capacity.map(i64::from),
                    color,
                    fmt_datetime(&now)
                ],
            )
            .await?;
        self.record_audit(EntityType::Room, &id, AuditAction::Created, None)
            .await?;

        Ok(Room {
            id,
            clinic_id,
            name: name.to_string(),
            description: description.map(String::from),
            capacity,
            color: color.map(String::from),
            active: true,
            created_at: now,
        })
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` for unknown or foreign rooms.
    pub async fn get_room(&self, id: &str) -> Result<Room, DatabaseError> {
        let mut filter = self.scoped_filter("clinic_id")?;
        filter.push("id =", id);
        let sql = format!("SELECT {SELECT_COLS} FROM rooms {}", filter.where_clause());
        let mut rows = self
            .db()
            .query(&sql, libsql::params_from_iter(filter.into_params()))
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::Room, id))?;
        row_to_room(&row)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_rooms(&self, active_only: bool, limit: u32) -> Result<Vec<Room>, DatabaseError> {
        let mut filter = self.scoped_filter("clinic_id")?;
        if active_only {
            filter.push_raw("active = 1");
        }
        let sql = format!(
            "SELECT {SELECT_COLS} FROM rooms {} ORDER BY name LIMIT {limit}",
            filter.where_clause()
        );
        let mut rows = self
            .db()
            .query(&sql, libsql::params_from_iter(filter.into_params()))
            .await?;
        let mut rooms = Vec::new();
        while let Some(row) = rows.next().await? {
            rooms.push(row_to_room(&row)?);
        }
        Ok(rooms)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::Forbidden` for non-admins.
    pub async fn update_room(&self, room_id: &str, update: RoomUpdate) -> Result<Room, DatabaseError> {
        self.require_admin()?;
        self.get_room(room_id).await?;

        let mut sets = SetClause::new();
        if let Some(ref name) = update.name {
            sets.set("name", require_text("room name", name)?);
        }
        if let Some(ref description) = update.description {
            sets.set("description", opt_text(description.as_deref()));
        }
        if let Some(capacity) = update.capacity {
            sets.set("capacity", opt_int(capacity.map(i64::from)));
        }
        if let Some(ref color) = update.color {
            validate_color(color.as_deref())?;
            sets.set("color", opt_text(color.as_deref()));
        }
        if let Some(active) = update.active {
            sets.set("active", i64::from(active));
        }

        if sets.is_empty() {
            return self.get_room(room_id).await;
        }
        let (sql, params) = sets.into_update("rooms", room_id);
        self.db()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;

        self.record_audit_with(EntityType::Room, room_id, AuditAction::Updated, &update)
            .await?;
        self.get_room(room_id).await
    }

    /// Delete a room. Appointments booked in it keep their slot without a room.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Forbidden` for non-admins.
    pub async fn delete_room(&self, room_id: &str) -> Result<(), DatabaseError> {
        self.require_admin()?;
        self.get_room(room_id).await?;
        self.db()
            .execute("DELETE FROM rooms WHERE id = ?1", [room_id])
            .await?;
        self.record_audit(EntityType::Room, room_id, AuditAction::Deleted, None)
            .await?;
        Ok(())
    }
}
