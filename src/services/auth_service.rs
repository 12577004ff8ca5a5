use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;

use crate::{
    dto::auth::{Claims, LoginRequest, LoginResponse},
    error::{AppError, AppResult},
    middleware::auth::{ADMIN_ROLE, AuthSettings},
    response::{ApiResponse, Meta},
};

/// Lifetime of an issued admin token.
pub const TOKEN_TTL_HOURS: i64 = 24;

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

pub fn issue_token(settings: &AuthSettings, sub: &str, role: &str) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(TOKEN_TTL_HOURS))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: sub.to_owned(),
        role: role.to_owned(),
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub async fn login_admin(
    settings: &AuthSettings,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { email, password } = payload;

    if !email.trim().eq_ignore_ascii_case(&settings.admin_email) {
        return Err(AppError::BadRequest("Invalid email or password".into()));
    }

    let parsed_hash = PasswordHash::new(&settings.admin_password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        tracing::warn!(email = %email, "admin login rejected");
        return Err(AppError::BadRequest("Invalid email or password".into()));
    }

    let token = issue_token(settings, &settings.admin_email, ADMIN_ROLE)?;
    tracing::info!(email = %settings.admin_email, "admin logged in");

    Ok(ApiResponse::success(
        "Logged in",
        LoginResponse {
            token: format!("Bearer {}", token),
            expires_in: TOKEN_TTL_HOURS * 3600,
        },
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(password: &str) -> AuthSettings {
        AuthSettings {
            jwt_secret: "test-secret".into(),
            admin_email: "admin@example.com".into(),
            admin_password_hash: hash_password(password).unwrap(),
        }
    }

    #[tokio::test]
    async fn login_issues_bearer_token() {
        let settings = settings("admin123");
        let resp = login_admin(
            &settings,
            LoginRequest {
                email: "Admin@Example.com".into(),
                password: "admin123".into(),
            },
        )
        .await
        .unwrap();
        let data = resp.data.unwrap();
        assert!(data.token.starts_with("Bearer "));
        assert_eq!(data.expires_in, 86_400);
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let settings = settings("admin123");
        let err = login_admin(
            &settings,
            LoginRequest {
                email: "admin@example.com".into(),
                password: "nope".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
