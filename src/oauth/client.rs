use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use oauth2::{
    basic::BasicClient, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken,
    PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use tracing::{debug, info};

use crate::config::OAuthConfig;
use crate::oauth::error::{OAuthError, OAuthResult};
use crate::oauth::providers::{FacebookProvider, GoogleProvider, OAuthProvider, OAuthUser};

/// Values produced when a handshake starts; the caller must hand `state` and
/// `pkce_verifier` back to `complete` when the provider redirects to the callback.
#[derive(Debug, Clone)]
pub struct PendingAuthorization {
    pub url: String,
    pub state: String,
    pub pkce_verifier: String,
}

/// The providers enabled at startup, keyed by their route name.
#[derive(Clone)]
pub struct OAuthProviders {
    providers: HashMap<&'static str, Arc<dyn OAuthProvider>>,
    redirect_base_url: String,
    http: reqwest::Client,
}

impl OAuthProviders {
    pub fn from_config(cfg: &OAuthConfig) -> anyhow::Result<Self> {
        let mut enabled: Vec<Arc<dyn OAuthProvider>> = Vec::new();
        if let Some(creds) = &cfg.google {
            enabled.push(Arc::new(GoogleProvider::new(creds.clone())));
        }
        if let Some(creds) = &cfg.facebook {
            enabled.push(Arc::new(FacebookProvider::new(creds.clone())));
        }
        Self::with_providers(enabled, &cfg.redirect_base_url)
    }

    pub fn with_providers(
        enabled: Vec<Arc<dyn OAuthProvider>>,
        redirect_base_url: &str,
    ) -> anyhow::Result<Self> {
        // The token endpoint must not be allowed to bounce us elsewhere.
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .context("build oauth http client")?;

        let providers: HashMap<_, _> = enabled.into_iter().map(|p| (p.name(), p)).collect();
        let names: Vec<_> = providers.keys().collect();
        info!(providers = ?names, "oauth providers registered");

        Ok(Self {
            providers,
            redirect_base_url: redirect_base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn get(&self, name: &str) -> OAuthResult<Arc<dyn OAuthProvider>> {
        self.providers
            .get(name)
            .cloned()
            .ok_or_else(|| OAuthError::UnsupportedProvider(name.to_string()))
    }

    pub fn redirect_uri(&self, provider: &str) -> String {
        format!("{}/auth/{}/callback", self.redirect_base_url, provider)
    }

    /// Build the provider's authorization URL with a fresh CSRF state and PKCE challenge.
    pub fn begin(&self, name: &str) -> OAuthResult<PendingAuthorization> {
        let provider = self.get(name)?;
        let creds = provider.credentials();

        let client = BasicClient::new(ClientId::new(creds.client_id.clone()))
            .set_client_secret(ClientSecret::new(creds.client_secret.clone()))
            .set_auth_uri(
                AuthUrl::new(provider.auth_url().to_string())
                    .map_err(|e| OAuthError::Config(format!("auth url: {e}")))?,
            )
            .set_redirect_uri(
                RedirectUrl::new(self.redirect_uri(provider.name()))
                    .map_err(|e| OAuthError::Config(format!("redirect url: {e}")))?,
            );

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
        let (url, csrf) = provider
            .scopes()
            .iter()
            .fold(client.authorize_url(CsrfToken::new_random), |req, scope| {
                req.add_scope(Scope::new(scope.to_string()))
            })
            .set_pkce_challenge(pkce_challenge)
            .url();

        debug!(provider = provider.name(), "oauth authorization started");
        Ok(PendingAuthorization {
            url: url.to_string(),
            state: csrf.secret().clone(),
            pkce_verifier: pkce_verifier.secret().clone(),
        })
    }

    /// Exchange the callback `code` for a token and fetch the user's profile.
    pub async fn complete(
        &self,
        name: &str,
        code: &str,
        pkce_verifier: String,
    ) -> OAuthResult<OAuthUser> {
        let provider = self.get(name)?;
        let creds = provider.credentials();

        let client = BasicClient::new(ClientId::new(creds.client_id.clone()))
            .set_client_secret(ClientSecret::new(creds.client_secret.clone()))
            .set_auth_type(provider.auth_type())
            .set_token_uri(
                TokenUrl::new(provider.token_url().to_string())
                    .map_err(|e| OAuthError::Config(format!("token url: {e}")))?,
            )
            .set_redirect_uri(
                RedirectUrl::new(self.redirect_uri(provider.name()))
                    .map_err(|e| OAuthError::Config(format!("redirect url: {e}")))?,
            );

        let token = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier))
            .request_async(&self.http)
            .await
            .map_err(|e| OAuthError::Exchange(e.to_string()))?;

        debug!(provider = provider.name(), "oauth code exchanged");
        provider
            .fetch_user(&self.http, token.access_token().secret())
            .await
    }
}
