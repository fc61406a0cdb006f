use thiserror::Error;

/// Errors raised by the sign-in storage and workflow layers.
///
/// The `Display` text is what ends up in the `error` field of HTTP responses,
/// so the workflow variants keep the exact wording clients already match on.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid request data")]
    Validation,

    #[error("username or password is incorrect")]
    InvalidCredentials,

    #[error("username already exists")]
    DuplicateUsername,

    #[error("email already exists")]
    DuplicateEmail,

    #[error("failed to hash password")]
    HashingFailure,

    #[error("failed to create user")]
    PersistenceFailure,

    #[error("failed to issue token")]
    TokenIssuance,

    #[error("sign-in record {0} not found")]
    NotFound(i64),

    #[error("constraint violated: {0}")]
    ConstraintViolation(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Translate a driver error, pulling unique violations out as `ConstraintViolation`.
pub(crate) fn from_write_error(err: sqlx::Error) -> AuthError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or("unique").to_string();
            return AuthError::ConstraintViolation(constraint);
        }
    }
    AuthError::Database(err)
}
