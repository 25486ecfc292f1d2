//! API handlers for Libris REST endpoints

pub mod auth;
pub mod comments;
pub mod health;
pub mod loans;
pub mod logs;
pub mod openapi;
pub mod readers;
pub mod resources;
pub mod staff;
pub mod stats;
pub mod suggestions;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::extract::cookie::CookieJar;

use crate::{error::AppError, models::staff::Claims, AppState};

/// Extractor for an authenticated session.
///
/// The token is read from the HTTP-only access cookie set at login, with
/// the `Authorization: Bearer` header as a fallback for API clients.
pub struct AuthenticatedUser(pub Claims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        let token = match jar.get(&state.config.auth.cookie_name) {
            Some(cookie) => cookie.value().to_string(),
            None => {
                let auth_header = parts
                    .headers
                    .get(AUTHORIZATION)
                    .and_then(|value| value.to_str().ok())
                    .ok_or_else(|| {
                        AppError::Authentication("Missing access token".to_string())
                    })?;

                auth_header
                    .strip_prefix("Bearer ")
                    .ok_or_else(|| {
                        AppError::Authentication(
                            "Invalid authorization header format".to_string(),
                        )
                    })?
                    .to_string()
            }
        };

        let claims = Claims::from_token(&token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}
