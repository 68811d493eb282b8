#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row; never serialized to clients.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    /// Argon2 PHC string. NULL for OAuth-only accounts.
    pub password_hash: Option<String>,
    pub oauth_provider: Option<String>,
    pub oauth_subject: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Identity shape returned to clients; never carries the hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
}

impl From<&UserRow> for UserIdentity {
    fn from(row: &UserRow) -> Self {
        UserIdentity {
            id: row.id,
            name: row.name.clone(),
            email: row.email.clone(),
        }
    }
}
