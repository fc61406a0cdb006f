use async_trait::async_trait;
use oauth2::AuthType;
use serde::{Deserialize, Serialize};

use crate::config::ProviderCredentials;
use crate::oauth::error::{OAuthError, OAuthResult};

/// Identity reported by a provider after a completed handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthUser {
    pub provider: String,
    pub user_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

#[async_trait]
pub trait OAuthProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn scopes(&self) -> &'static [&'static str];

    fn auth_url(&self) -> &str;

    fn token_url(&self) -> &str;

    /// How the client credentials reach the token endpoint.
    fn auth_type(&self) -> AuthType {
        AuthType::BasicAuth
    }

    fn credentials(&self) -> &ProviderCredentials;

    /// Fetch the signed-in user's profile with a freshly exchanged access token.
    async fn fetch_user(&self, http: &reqwest::Client, access_token: &str)
        -> OAuthResult<OAuthUser>;
}

async fn get_json<T: serde::de::DeserializeOwned>(
    http: &reqwest::Client,
    url: &str,
    access_token: &str,
) -> OAuthResult<T> {
    let response = http
        .get(url)
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|e| OAuthError::UserInfo(e.to_string()))?;

    if !response.status().is_success() {
        return Err(OAuthError::UserInfo(format!(
            "provider returned {}",
            response.status()
        )));
    }

    response
        .json()
        .await
        .map_err(|e| OAuthError::UserInfo(e.to_string()))
}

pub struct GoogleProvider {
    credentials: ProviderCredentials,
}

impl GoogleProvider {
    pub fn new(credentials: ProviderCredentials) -> Self {
        Self { credentials }
    }
}

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    sub: String,
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

#[async_trait]
impl OAuthProvider for GoogleProvider {
    fn name(&self) -> &'static str {
        "google"
    }

    fn scopes(&self) -> &'static [&'static str] {
        &["openid", "email", "profile"]
    }

    fn auth_url(&self) -> &str {
        "https://accounts.google.com/o/oauth2/v2/auth"
    }

    fn token_url(&self) -> &str {
        "https://oauth2.googleapis.com/token"
    }

    fn credentials(&self) -> &ProviderCredentials {
        &self.credentials
    }

    async fn fetch_user(
        &self,
        http: &reqwest::Client,
        access_token: &str,
    ) -> OAuthResult<OAuthUser> {
        let info: GoogleUserInfo = get_json(
            http,
            "https://openidconnect.googleapis.com/v1/userinfo",
            access_token,
        )
        .await?;

        Ok(OAuthUser {
            provider: self.name().to_string(),
            user_id: info.sub,
            email: info.email,
            name: info.name,
            avatar_url: info.picture,
        })
    }
}

pub struct FacebookProvider {
    credentials: ProviderCredentials,
}

impl FacebookProvider {
    pub fn new(credentials: ProviderCredentials) -> Self {
        Self { credentials }
    }
}

#[derive(Debug, Deserialize)]
struct FacebookUserInfo {
    id: String,
    email: Option<String>,
    name: Option<String>,
    picture: Option<FacebookPicture>,
}

#[derive(Debug, Deserialize)]
struct FacebookPicture {
    data: FacebookPictureData,
}

#[derive(Debug, Deserialize)]
struct FacebookPictureData {
    url: Option<String>,
}

#[async_trait]
impl OAuthProvider for FacebookProvider {
    fn name(&self) -> &'static str {
        "facebook"
    }

    fn scopes(&self) -> &'static [&'static str] {
        &["email", "public_profile"]
    }

    fn auth_url(&self) -> &str {
        "https://www.facebook.com/v18.0/dialog/oauth"
    }

    fn token_url(&self) -> &str {
        "https://graph.facebook.com/v18.0/oauth/access_token"
    }

    // Graph API ignores the Basic header and wants the secret as a form field.
    fn auth_type(&self) -> AuthType {
        AuthType::RequestBody
    }

    fn credentials(&self) -> &ProviderCredentials {
        &self.credentials
    }

    async fn fetch_user(
        &self,
        http: &reqwest::Client,
        access_token: &str,
    ) -> OAuthResult<OAuthUser> {
        let info: FacebookUserInfo = get_json(
            http,
            "https://graph.facebook.com/me?fields=id,name,email,picture",
            access_token,
        )
        .await?;

        Ok(OAuthUser {
            provider: self.name().to_string(),
            user_id: info.id,
            email: info.email,
            name: info.name,
            avatar_url: info.picture.and_then(|p| p.data.url),
        })
    }
}
