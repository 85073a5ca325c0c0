//! Full-system JSON export for platform operators.

use clinic_core::responses::{BackupSnapshot, FULL_SYSTEM_BACKUP, SchemaMigration};
use serde_json::{Map, Number, Value};

use crate::error::DatabaseError;
use crate::helpers::utc_now;
use crate::migrations;
use crate::service::ClinicService;

fn column_value(value: libsql::Value) -> Value {
    match value {
        libsql::Value::Null => Value::Null,
        libsql::Value::Integer(i) => Value::from(i),
        libsql::Value::Real(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        libsql::Value::Text(s) => Value::String(s),
        libsql::Value::Blob(bytes) => Value::from(bytes),
    }
}

impl ClinicService {
    async fn dump_table(&self, table: &str) -> Result<Vec<Map<String, Value>>, DatabaseError> {
        let mut rows = self
            .db()
            .query(&format!("SELECT * FROM {table} ORDER BY rowid"), ())
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            let mut record = Map::new();
            for idx in 0..row.column_count() {
                let name = row.column_name(idx).unwrap_or_default().to_string();
                record.insert(name, column_value(row.get_value(idx)?));
            }
            out.push(record);
        }
        Ok(out)
    }

    /// Snapshot the schema and the core tables across every clinic.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Forbidden` unless the actor is a master admin.
    pub async fn export_backup(&self) -> Result<BackupSnapshot, DatabaseError> {
        self.require_master()?;

        let snapshot = BackupSnapshot {
            generated_at: utc_now(),
            kind: FULL_SYSTEM_BACKUP.to_string(),
            schema_migrations: migrations::embedded()
                .iter()
                .map(|(name, content)| SchemaMigration {
                    name: format!("{name}.sql"),
                    content: (*content).to_string(),
                })
                .collect(),
            clinics: self.dump_table("clinics").await?,
            users: self.dump_table("users").await?,
            patients: self.dump_table("patients").await?,
            appointments: self.dump_table("appointments").await?,
            reports: self.dump_table("session_reports").await?,
            prompts: self.dump_table("prompt_templates").await?,
        };
        tracing::info!(
            clinics = snapshot.clinics.len(),
            patients = snapshot.patients.len(),
            "backup exported"
        );
        Ok(snapshot)
    }
}
