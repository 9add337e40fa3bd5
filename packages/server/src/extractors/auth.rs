use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt;

/// Authenticated member extracted from the `Authorization: Bearer <token>` header.
///
/// Add this as a handler parameter to require authentication.
pub struct AuthUser {
    pub member_id: i32,
    pub nickname: String,
}

/// Viewer identity for read endpoints that also serve anonymous visitors.
///
/// A missing header yields `None`; a present but invalid token is still rejected.
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl MaybeAuthUser {
    pub fn member_id(&self) -> Option<i32> {
        self.0.as_ref().map(|u| u.member_id)
    }
}

fn decode_bearer(header: &str, secret: &str) -> Result<AuthUser, AppError> {
    let token = header
        .strip_prefix("Bearer ")
        .ok_or(AppError::TokenInvalid)?;

    let claims = jwt::verify(token, secret).map_err(|_| AppError::TokenInvalid)?;

    Ok(AuthUser {
        member_id: claims.uid,
        nickname: claims.sub,
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::TokenMissing)?;

        decode_bearer(auth_header, &state.config.auth.jwt_secret)
    }
}

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get("Authorization") else {
            return Ok(MaybeAuthUser(None));
        };
        let header = header.to_str().map_err(|_| AppError::TokenInvalid)?;

        decode_bearer(header, &state.config.auth.jwt_secret).map(|u| MaybeAuthUser(Some(u)))
    }
}
