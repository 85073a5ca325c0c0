//! Database location configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Local database file. Empty means `<project>/.clinic/clinic.db`.
    #[serde(default)]
    pub path: String,

    /// Remote libSQL URL (e.g., `libsql://clinic.turso.io`). Takes precedence
    /// over `path` when set together with `auth_token`.
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub auth_token: String,
}

impl DatabaseConfig {
    /// Whether a remote database is fully configured.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        !self.url.is_empty() && !self.auth_token.is_empty()
    }

    /// Whether an explicit local path was configured.
    #[must_use]
    pub fn has_local_path(&self) -> bool {
        !self.path.is_empty()
    }
}
