use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{ErrorBody, SignInRequest, SignInResponse, SignUpRequest, SignUpResponse},
        extractors::ValidatedJson,
    },
    state::AppState,
};

type HandlerError = (StatusCode, Json<ErrorBody>);

pub fn sign_in_routes() -> Router<AppState> {
    Router::new()
        .route("/sign-in", post(sign_in))
        .route("/sign-up", post(sign_up))
}

/// POST /sign-in
///
/// Every workflow failure is reported as 401.
#[instrument(skip(state, payload))]
pub async fn sign_in(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<SignInRequest>,
) -> Result<Json<SignInResponse>, HandlerError> {
    match state.sign_in.sign_in(payload).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            warn!(error = %e, "sign-in rejected");
            Err((StatusCode::UNAUTHORIZED, Json(ErrorBody::new(e.to_string()))))
        }
    }
}

/// POST /sign-up
///
/// Every workflow failure is reported as 409, hashing and storage failures included.
#[instrument(skip(state, payload))]
pub async fn sign_up(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<SignUpRequest>,
) -> Result<(StatusCode, Json<SignUpResponse>), HandlerError> {
    match state.sign_in.sign_up(payload).await {
        Ok(response) => {
            info!(id = response.id, "sign-up accepted");
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(e) => {
            warn!(error = %e, "sign-up rejected");
            Err((StatusCode::CONFLICT, Json(ErrorBody::new(e.to_string()))))
        }
    }
}
