use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// OAuth2 providers enabled for this process. A provider is only registered
/// when both of its credentials are present.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthConfig {
    pub redirect_base_url: String,
    pub google: Option<ProviderCredentials>,
    pub facebook: Option<ProviderCredentials>,
}

impl OAuthConfig {
    pub fn secure_cookies(&self) -> bool {
        self.redirect_base_url.starts_with("https://")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt: Option<JwtConfig>,
    pub oauth: OAuthConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key/value source; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let host = var("APP_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = match var("APP_PORT") {
            Some(p) => p.parse::<u16>().context("APP_PORT must be a port number")?,
            None => 8080,
        };

        let jwt = match var("JWT_SECRET") {
            Some(secret) => Some(JwtConfig {
                secret,
                issuer: var("JWT_ISSUER").unwrap_or_else(|| "signin-service".into()),
                audience: var("JWT_AUDIENCE").unwrap_or_else(|| "signin-users".into()),
                ttl_minutes: jwt_ttl_minutes(var("JWT_TTL_MINUTES"))?,
            }),
            None => None,
        };

        let credentials = |id_key: &str, secret_key: &str| -> Option<ProviderCredentials> {
            Some(ProviderCredentials {
                client_id: var(id_key)?,
                client_secret: var(secret_key)?,
            })
        };
        let oauth = OAuthConfig {
            redirect_base_url: var("OAUTH_REDIRECT_BASE_URL")
                .unwrap_or_else(|| format!("http://localhost:{port}")),
            google: credentials("GOOGLE_CLIENT_ID", "GOOGLE_CLIENT_SECRET"),
            facebook: credentials("FACEBOOK_APP_ID", "FACEBOOK_APP_SECRET"),
        };

        Ok(Self {
            database_url,
            host,
            port,
            jwt,
            oauth,
        })
    }
}

/// Token lifetime is capped at one year.
const MAX_JWT_TTL_MINUTES: u32 = 365 * 24 * 60;

fn jwt_ttl_minutes(raw: Option<String>) -> anyhow::Result<u32> {
    let Some(raw) = raw else {
        return Ok(60);
    };
    let minutes = raw
        .trim()
        .parse::<u32>()
        .context("JWT_TTL_MINUTES must be a whole number of minutes")?;
    anyhow::ensure!(
        (1..=MAX_JWT_TTL_MINUTES).contains(&minutes),
        "JWT_TTL_MINUTES must be between 1 and {MAX_JWT_TTL_MINUTES}"
    );
    Ok(minutes)
}
