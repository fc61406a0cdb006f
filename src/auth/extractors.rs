use async_trait::async_trait;
use axum::{
    extract::{FromRequest, Request},
    http::StatusCode,
    Json,
};
use serde::de::DeserializeOwned;
use tracing::warn;
use validator::Validate;

use crate::auth::dto::ErrorBody;
use crate::auth::error::AuthError;

/// JSON body that must deserialize and pass its `Validate` rules before the handler runs.
///
/// Every rejection collapses to 400 `{"error": "Invalid request data"}`.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorBody>);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await.map_err(|e| {
            warn!(error = %e, "request body rejected");
            invalid_request()
        })?;

        data.validate().map_err(|e| {
            warn!(error = %e, "request body failed validation");
            invalid_request()
        })?;

        Ok(ValidatedJson(data))
    }
}

fn invalid_request() -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody::new(AuthError::Validation.to_string())),
    )
}
