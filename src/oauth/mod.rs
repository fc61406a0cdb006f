use crate::state::AppState;
use axum::Router;

pub mod client;
pub mod error;
pub mod handlers;
pub mod providers;
#[cfg(test)]
pub(crate) mod testing;

pub use client::OAuthProviders;

pub fn router() -> Router<AppState> {
    handlers::oauth_routes()
}
