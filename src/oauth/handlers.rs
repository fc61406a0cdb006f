use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::{
    auth::dto::ErrorBody,
    oauth::{
        client::PendingAuthorization,
        error::{OAuthError, OAuthResult},
        providers::OAuthUser,
    },
    state::AppState,
};

const STATE_COOKIE: &str = "oauth_state";
const STATE_TTL_SECS: u32 = 600;

pub fn oauth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/:provider", get(begin))
        .route("/auth/:provider/callback", get(callback))
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// GET /auth/:provider
///
/// Redirects to the provider's consent page; CSRF state and PKCE verifier ride in a cookie.
#[instrument(skip(state))]
pub async fn begin(State(state): State<AppState>, Path(provider): Path<String>) -> Response {
    let pending = match state.oauth.begin(&provider) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "oauth begin failed");
            return (StatusCode::BAD_REQUEST, Json(ErrorBody::new(e.to_string()))).into_response();
        }
    };

    let cookie = state_cookie(&provider, &pending, state.config.oauth.secure_cookies());
    (
        [(header::SET_COOKIE, cookie)],
        Redirect::temporary(&pending.url),
    )
        .into_response()
}

/// GET /auth/:provider/callback
///
/// Any failure sends the browser back to `/`.
#[instrument(skip(state, query, headers))]
pub async fn callback(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(query): Query<CallbackQuery>,
    headers: HeaderMap,
) -> Response {
    let clear = clear_cookie(state.config.oauth.secure_cookies());
    match complete(&state, &provider, query, &headers).await {
        Ok(user) => {
            info!(provider = %user.provider, user_id = %user.user_id, "oauth sign-in completed");
            ([(header::SET_COOKIE, clear)], Json(json!({ "user": user }))).into_response()
        }
        Err(e) => {
            warn!(error = %e, "oauth callback failed");
            ([(header::SET_COOKIE, clear)], Redirect::temporary("/")).into_response()
        }
    }
}

async fn complete(
    state: &AppState,
    provider: &str,
    query: CallbackQuery,
    headers: &HeaderMap,
) -> OAuthResult<OAuthUser> {
    if let Some(err) = query.error {
        return Err(OAuthError::Denied(err));
    }

    let stored = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| extract_cookie_value(cookies, STATE_COOKIE))
        .ok_or(OAuthError::StateMismatch)?;
    let (cookie_provider, cookie_state, pkce_verifier) =
        decode_state(&stored).ok_or(OAuthError::StateMismatch)?;

    let (Some(code), Some(returned_state)) = (query.code, query.state) else {
        return Err(OAuthError::StateMismatch);
    };
    if cookie_provider != provider || cookie_state != returned_state {
        return Err(OAuthError::StateMismatch);
    }

    state
        .oauth
        .complete(provider, &code, pkce_verifier.to_string())
        .await
}

fn state_cookie(provider: &str, pending: &PendingAuthorization, secure: bool) -> String {
    format!(
        "{STATE_COOKIE}={provider}.{}.{}; Path=/auth; HttpOnly; SameSite=Lax; Max-Age={STATE_TTL_SECS}{}",
        pending.state,
        pending.pkce_verifier,
        if secure { "; Secure" } else { "" }
    )
}

fn clear_cookie(secure: bool) -> String {
    format!(
        "{STATE_COOKIE}=; Path=/auth; HttpOnly; SameSite=Lax; Max-Age=0{}",
        if secure { "; Secure" } else { "" }
    )
}

/// Split a cookie value into (provider, state, pkce verifier).
fn decode_state(value: &str) -> Option<(&str, &str, &str)> {
    let mut parts = value.splitn(3, '.');
    let provider = parts.next().filter(|s| !s.is_empty())?;
    let state = parts.next().filter(|s| !s.is_empty())?;
    let verifier = parts.next().filter(|s| !s.is_empty())?;
    Some((provider, state, verifier))
}

fn extract_cookie_value(cookies: &str, name: &str) -> Option<String> {
    cookies.split(';').find_map(|cookie| {
        let (key, value) = cookie.trim().split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}
