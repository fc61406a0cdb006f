use thiserror::Error;

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error("missing or mismatched oauth state")]
    StateMismatch,

    #[error("provider denied authorization: {0}")]
    Denied(String),

    #[error("invalid provider configuration: {0}")]
    Config(String),

    #[error("failed to exchange code: {0}")]
    Exchange(String),

    #[error("failed to fetch user info: {0}")]
    UserInfo(String),
}

pub type OAuthResult<T> = Result<T, OAuthError>;
