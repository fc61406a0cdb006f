use std::collections::HashMap;

use async_trait::async_trait;
use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Form, Json, Router,
};
use oauth2::AuthType;
use serde_json::json;

use crate::config::ProviderCredentials;
use crate::oauth::error::{OAuthError, OAuthResult};
use crate::oauth::providers::{OAuthProvider, OAuthUser};

pub const STUB_CLIENT_ID: &str = "stub-client";
pub const STUB_CLIENT_SECRET: &str = "stub-secret";
pub const GOOD_CODE: &str = "good-code";
const STUB_ACCESS_TOKEN: &str = "stub-access-token";

/// Provider whose token endpoint runs on localhost and whose profile is canned.
pub struct StubProvider {
    credentials: ProviderCredentials,
    token_url: String,
    basic_auth: bool,
}

impl StubProvider {
    pub fn body_credentials(token_url: String) -> Self {
        Self::new(token_url, false)
    }

    pub fn basic_auth(token_url: String) -> Self {
        Self::new(token_url, true)
    }

    fn new(token_url: String, basic_auth: bool) -> Self {
        Self {
            credentials: ProviderCredentials {
                client_id: STUB_CLIENT_ID.into(),
                client_secret: STUB_CLIENT_SECRET.into(),
            },
            token_url,
            basic_auth,
        }
    }

    pub fn user() -> OAuthUser {
        OAuthUser {
            provider: "stub".into(),
            user_id: "stub-user-1".into(),
            email: Some("stub@example.com".into()),
            name: Some("Stub User".into()),
            avatar_url: None,
        }
    }
}

#[async_trait]
impl OAuthProvider for StubProvider {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn scopes(&self) -> &'static [&'static str] {
        &["profile"]
    }

    fn auth_url(&self) -> &str {
        "https://stub.example.com/authorize"
    }

    fn token_url(&self) -> &str {
        &self.token_url
    }

    fn auth_type(&self) -> AuthType {
        if self.basic_auth {
            AuthType::BasicAuth
        } else {
            AuthType::RequestBody
        }
    }

    fn credentials(&self) -> &ProviderCredentials {
        &self.credentials
    }

    async fn fetch_user(
        &self,
        _http: &reqwest::Client,
        access_token: &str,
    ) -> OAuthResult<OAuthUser> {
        if access_token != STUB_ACCESS_TOKEN {
            return Err(OAuthError::UserInfo("unexpected access token".into()));
        }
        Ok(Self::user())
    }
}

/// Token endpoint that, like Graph API, only accepts credentials as form fields.
async fn token(headers: HeaderMap, Form(form): Form<HashMap<String, String>>) -> Response {
    let field = |key: &str| form.get(key).map(String::as_str);
    let accepted = !headers.contains_key(header::AUTHORIZATION)
        && field("client_id") == Some(STUB_CLIENT_ID)
        && field("client_secret") == Some(STUB_CLIENT_SECRET)
        && field("grant_type") == Some("authorization_code")
        && field("code") == Some(GOOD_CODE)
        && field("code_verifier").is_some_and(|v| !v.is_empty());

    if !accepted {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_client" })),
        )
            .into_response();
    }
    Json(json!({
        "access_token": STUB_ACCESS_TOKEN,
        "token_type": "bearer",
        "expires_in": 3600,
    }))
    .into_response()
}

/// Serve the token endpoint on an ephemeral port and return its URL.
pub async fn spawn_token_endpoint() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind token endpoint");
    let addr = listener.local_addr().expect("local addr");
    let router = Router::new().route("/token", post(token));
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("token endpoint");
    });
    format!("http://{addr}/token")
}
