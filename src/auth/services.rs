use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::auth::dto::{SignInRequest, SignInResponse, SignUpRequest, SignUpResponse};
use crate::auth::error::{AuthError, AuthResult};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::repo::SignInRepository;
use crate::auth::repo_types::NewSignIn;
use crate::auth::token::TokenIssuer;

/// Credential workflow: sign-in and sign-up, independent of transport and storage.
#[derive(Clone)]
pub struct SignInService {
    repo: Arc<dyn SignInRepository>,
    tokens: Arc<dyn TokenIssuer>,
}

impl SignInService {
    pub fn new(repo: Arc<dyn SignInRepository>, tokens: Arc<dyn TokenIssuer>) -> Self {
        Self { repo, tokens }
    }

    /// Check credentials and issue a token.
    ///
    /// Unknown usernames and wrong passwords fail with the same
    /// `InvalidCredentials` so callers cannot probe which accounts exist.
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn sign_in(&self, input: SignInRequest) -> AuthResult<SignInResponse> {
        let Some(record) = self.repo.get_by_username(&input.username).await? else {
            warn!("sign-in for unknown username");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(&input.password, &record.password_hash)? {
            warn!(id = record.id, "sign-in with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(&record).map_err(|e| {
            error!(error = %e, id = record.id, "token issuance failed");
            AuthError::TokenIssuance
        })?;

        info!(id = record.id, "signed in");
        Ok(SignInResponse::new(record, token))
    }

    /// Register a new account after checking username and email are free.
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn sign_up(&self, input: SignUpRequest) -> AuthResult<SignUpResponse> {
        if self.repo.get_by_username(&input.username).await?.is_some() {
            warn!("username already taken");
            return Err(AuthError::DuplicateUsername);
        }
        if self.repo.get_by_email(&input.email).await?.is_some() {
            warn!(email = %input.email, "email already taken");
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = hash_password(&input.password)?;

        // A concurrent sign-up can still win the insert; the store's unique
        // constraint rejects ours and it surfaces as PersistenceFailure.
        let record = self
            .repo
            .create(NewSignIn {
                username: input.username,
                password_hash,
                email: input.email,
            })
            .await
            .map_err(|e| {
                error!(error = %e, "create sign-in record failed");
                AuthError::PersistenceFailure
            })?;

        info!(id = record.id, email = %record.email, "signed up");
        Ok(record.into())
    }
}
