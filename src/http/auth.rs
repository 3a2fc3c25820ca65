//! Bearer-token validation.
//!
//! Token issuance belongs to the auth service; this side only validates the
//! HS256 signature and yields the authenticated principal. Admin-only
//! endpoints additionally require the admin role.

use super::{ApiError, AppState};
use crate::domain::aggregates::Role;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub exp: usize,
}

#[derive(Clone, Copy, Debug)]
pub struct AuthUser {
    pub account_id: Uuid,
    pub role: Role,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Not authorized, no token".into()))?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("Not authorized, no token".into()))?;
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(state.auth_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| ApiError::Unauthorized("Not authorized, token failed".into()))?;
        let account_id = Uuid::parse_str(&data.claims.sub)
            .map_err(|_| ApiError::Unauthorized("Not authorized, token failed".into()))?;
        Ok(AuthUser { account_id, role: data.claims.role })
    }
}

/// An [`AuthUser`] whose role passed the admin check.
#[derive(Clone, Copy, Debug)]
pub struct AdminUser(pub AuthUser);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != Role::Admin {
            return Err(ApiError::Forbidden("Admin access required".into()));
        }
        Ok(AdminUser(user))
    }
}

#[cfg(test)]
pub(crate) fn issue_token(account_id: Uuid, role: Role, secret: &str) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};
    let claims = Claims {
        sub: account_id.to_string(),
        role,
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
}
