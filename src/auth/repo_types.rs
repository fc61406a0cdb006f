use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// Sign-in record in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct SignIn {
    pub id: i64,                      // assigned by the store
    pub username: String,             // unique
    #[serde(skip_serializing)]
    pub password_hash: String,        // Argon2 hash, not exposed in JSON
    pub email: String,                // unique
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Fields supplied by the caller when creating a record; id and timestamps come from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSignIn {
    pub username: String,
    pub password_hash: String,
    pub email: String,
}
