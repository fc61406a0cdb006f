use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::auth::error::{AuthError, AuthResult};
use crate::auth::repo::SignInRepository;
use crate::auth::repo_types::{NewSignIn, SignIn};

#[derive(Debug, Default)]
struct Table {
    rows: HashMap<i64, SignIn>,
    next_id: i64,
}

impl Table {
    /// Name of the unique constraint a row with these values would break, ignoring `skip_id`.
    fn clash(&self, username: &str, email: &str, skip_id: Option<i64>) -> Option<&'static str> {
        let others = self.rows.values().filter(|r| Some(r.id) != skip_id);
        for row in others {
            if row.username == username {
                return Some("sign_ins_username_key");
            }
            if row.email == email {
                return Some("sign_ins_email_key");
            }
        }
        None
    }
}

/// In-memory `SignInRepository` used by the router and service tests.
#[derive(Debug, Default, Clone)]
pub struct InMemorySignInRepository {
    table: Arc<RwLock<Table>>,
}

impl InMemorySignInRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SignInRepository for InMemorySignInRepository {
    async fn create(&self, record: NewSignIn) -> AuthResult<SignIn> {
        let mut table = self.table.write().await;
        if let Some(constraint) = table.clash(&record.username, &record.email, None) {
            return Err(AuthError::ConstraintViolation(constraint.into()));
        }

        table.next_id += 1;
        let now = OffsetDateTime::now_utc();
        let row = SignIn {
            id: table.next_id,
            username: record.username,
            password_hash: record.password_hash,
            email: record.email,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(row.id, row.clone());

        tracing::debug!(id = row.id, username = %row.username, "sign-in record created");
        Ok(row)
    }

    async fn get_by_username(&self, username: &str) -> AuthResult<Option<SignIn>> {
        let table = self.table.read().await;
        Ok(table.rows.values().find(|r| r.username == username).cloned())
    }

    async fn get_by_email(&self, email: &str) -> AuthResult<Option<SignIn>> {
        let table = self.table.read().await;
        Ok(table.rows.values().find(|r| r.email == email).cloned())
    }

    async fn update(&self, record: SignIn) -> AuthResult<SignIn> {
        let mut table = self.table.write().await;
        let created_at = match table.rows.get(&record.id) {
            Some(existing) => existing.created_at,
            None => return Err(AuthError::NotFound(record.id)),
        };
        if let Some(constraint) = table.clash(&record.username, &record.email, Some(record.id)) {
            return Err(AuthError::ConstraintViolation(constraint.into()));
        }

        let row = SignIn {
            created_at,
            updated_at: OffsetDateTime::now_utc(),
            ..record
        };
        table.rows.insert(row.id, row.clone());

        tracing::debug!(id = row.id, "sign-in record updated");
        Ok(row)
    }

    async fn delete(&self, id: i64) -> AuthResult<()> {
        let mut table = self.table.write().await;
        if table.rows.remove(&id).is_some() {
            tracing::debug!(id, "sign-in record deleted");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_record(username: &str, email: &str) -> NewSignIn {
        NewSignIn {
            username: username.into(),
            password_hash: "hashedpassword".into(),
            email: email.into(),
        }
    }

    #[tokio::test]
    async fn create_assigns_ids_and_lookups_find_the_record() {
        let repo = InMemorySignInRepository::new();
        let first = repo.create(new_record("testuser", "test@example.com")).await.unwrap();
        let second = repo.create(new_record("other", "other@example.com")).await.unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(first.created_at, first.updated_at);

        let by_name = repo.get_by_username("testuser").await.unwrap();
        assert_eq!(by_name, Some(first.clone()));
        let by_email = repo.get_by_email("test@example.com").await.unwrap();
        assert_eq!(by_email, Some(first));
    }

    #[tokio::test]
    async fn missing_records_are_none_not_errors() {
        let repo = InMemorySignInRepository::new();
        assert!(repo.get_by_username("nonexistentuser").await.unwrap().is_none());
        assert!(repo.get_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_username_or_email_is_rejected() {
        let repo = InMemorySignInRepository::new();
        repo.create(new_record("testuser", "test@example.com")).await.unwrap();

        let err = repo
            .create(new_record("testuser", "fresh@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::ConstraintViolation(ref c) if c == "sign_ins_username_key"));

        let err = repo
            .create(new_record("fresh", "test@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::ConstraintViolation(ref c) if c == "sign_ins_email_key"));
    }

    #[tokio::test]
    async fn update_changes_only_targeted_fields() {
        let repo = InMemorySignInRepository::new();
        let mut original = repo.create(new_record("testuser", "test@example.com")).await.unwrap();
        original.updated_at -= time::Duration::hours(1);
        repo.table
            .write()
            .await
            .rows
            .insert(original.id, original.clone());

        let changed = SignIn {
            email: "changed@example.com".into(),
            ..original.clone()
        };
        let updated = repo.update(changed).await.unwrap();

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.username, original.username);
        assert_eq!(updated.password_hash, original.password_hash);
        assert_eq!(updated.created_at, original.created_at);
        assert!(updated.updated_at > original.updated_at);

        let reread = repo.get_by_email("changed@example.com").await.unwrap().unwrap();
        assert_eq!(reread, updated);
        assert!(repo.get_by_email("test@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_of_unknown_id_is_not_found() {
        let repo = InMemorySignInRepository::new();
        let mut ghost = repo.create(new_record("testuser", "test@example.com")).await.unwrap();
        ghost.id = 42;
        assert!(matches!(repo.update(ghost).await, Err(AuthError::NotFound(42))));
    }

    #[tokio::test]
    async fn update_cannot_steal_another_email() {
        let repo = InMemorySignInRepository::new();
        repo.create(new_record("first", "first@example.com")).await.unwrap();
        let second = repo.create(new_record("second", "second@example.com")).await.unwrap();

        let clash = SignIn {
            email: "first@example.com".into(),
            ..second
        };
        assert!(matches!(
            repo.update(clash).await,
            Err(AuthError::ConstraintViolation(_))
        ));
    }

    #[tokio::test]
    async fn delete_then_lookup_by_former_email_is_none() {
        let repo = InMemorySignInRepository::new();
        let record = repo.create(new_record("testuser", "test@example.com")).await.unwrap();

        repo.delete(record.id).await.unwrap();
        assert!(repo.get_by_email("test@example.com").await.unwrap().is_none());

        // second delete of the same id is a no-op
        repo.delete(record.id).await.unwrap();
    }
}
