use async_trait::async_trait;
use sqlx::PgPool;

use crate::auth::error::{from_write_error, AuthError, AuthResult};
use crate::auth::repo_types::{NewSignIn, SignIn};

/// Storage capability behind the credential workflow.
///
/// Lookups report "no such record" as `Ok(None)`; only storage failures are errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SignInRepository: Send + Sync {
    /// Persist a new record, assigning its id and timestamps.
    async fn create(&self, record: NewSignIn) -> AuthResult<SignIn>;

    async fn get_by_username(&self, username: &str) -> AuthResult<Option<SignIn>>;

    async fn get_by_email(&self, email: &str) -> AuthResult<Option<SignIn>>;

    /// Overwrite the stored state for `record.id` and refresh `updated_at`.
    async fn update(&self, record: SignIn) -> AuthResult<SignIn>;

    /// Remove a record. Deleting an unknown id is not an error.
    async fn delete(&self, id: i64) -> AuthResult<()>;
}

#[derive(Clone)]
pub struct PgSignInRepository {
    db: PgPool,
}

impl PgSignInRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SignInRepository for PgSignInRepository {
    async fn create(&self, record: NewSignIn) -> AuthResult<SignIn> {
        sqlx::query_as::<_, SignIn>(
            r#"
            INSERT INTO sign_ins (username, password_hash, email)
            VALUES ($1, $2, $3)
            RETURNING id, username, password_hash, email, created_at, updated_at
            "#,
        )
        .bind(&record.username)
        .bind(&record.password_hash)
        .bind(&record.email)
        .fetch_one(&self.db)
        .await
        .map_err(from_write_error)
    }

    async fn get_by_username(&self, username: &str) -> AuthResult<Option<SignIn>> {
        let record = sqlx::query_as::<_, SignIn>(
            r#"
            SELECT id, username, password_hash, email, created_at, updated_at
            FROM sign_ins
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;
        Ok(record)
    }

    async fn get_by_email(&self, email: &str) -> AuthResult<Option<SignIn>> {
        let record = sqlx::query_as::<_, SignIn>(
            r#"
            SELECT id, username, password_hash, email, created_at, updated_at
            FROM sign_ins
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(record)
    }

    async fn update(&self, record: SignIn) -> AuthResult<SignIn> {
        sqlx::query_as::<_, SignIn>(
            r#"
            UPDATE sign_ins
            SET username = $1, password_hash = $2, email = $3, updated_at = now()
            WHERE id = $4
            RETURNING id, username, password_hash, email, created_at, updated_at
            "#,
        )
        .bind(&record.username)
        .bind(&record.password_hash)
        .bind(&record.email)
        .bind(record.id)
        .fetch_optional(&self.db)
        .await
        .map_err(from_write_error)?
        .ok_or(AuthError::NotFound(record.id))
    }

    async fn delete(&self, id: i64) -> AuthResult<()> {
        sqlx::query("DELETE FROM sign_ins WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}
