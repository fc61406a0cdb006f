use jsonwebtoken::{encode, EncodingKey, Header};
use anyhow::Context;
use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::auth::claims::Claims;
use crate::auth::repo_types::SignIn;
use crate::config::JwtConfig;

/// Token handed back on a successful sign-in.
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, account: &SignIn) -> anyhow::Result<String>;
}

pub const PLACEHOLDER_TOKEN: &str = "sample-generated-token";

/// Fixed token used when no signing secret is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderIssuer;

impl TokenIssuer for PlaceholderIssuer {
    fn issue(&self, _account: &SignIn) -> anyhow::Result<String> {
        Ok(PLACEHOLDER_TOKEN.to_string())
    }
}

/// HS256 access tokens.
#[derive(Clone)]
pub struct JwtIssuer {
    encoding: EncodingKey,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl JwtIssuer {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::minutes(i64::from(cfg.ttl_minutes.max(1))),
        }
    }
}

impl TokenIssuer for JwtIssuer {
    fn issue(&self, account: &SignIn) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now
            .checked_add(self.ttl)
            .context("token expiry out of range")?;
        let claims = Claims {
            sub: account.id.to_string(),
            username: account.username.clone(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(account_id = account.id, "jwt signed");
        Ok(token)
    }
}
