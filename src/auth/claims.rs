use serde::{Deserialize, Serialize};

/// JWT payload issued on sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,         // sign-in record id
    pub username: String,
    pub iat: usize,          // issued at (unix timestamp)
    pub exp: usize,          // expires at (unix timestamp)
    pub iss: String,         // issuer
    pub aud: String,         // audience
}
