use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Credentials of the configured admin account.
#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "admin@example.com")]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Ready for the `Authorization` header, `Bearer ` prefix included.
    pub token: String,
    /// Seconds until the token expires.
    pub expires_in: i64,
}

/// JWT payload. `sub` is the admin email.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}
