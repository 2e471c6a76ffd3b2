use std::sync::Arc;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{HeaderValue, StatusCode, header::AUTHORIZATION, header::WWW_AUTHENTICATE, request::Parts},
    response::{IntoResponse, Response},
};
use jsonwebtoken::errors::ErrorKind;
use serde_json::json;

use super::Claims;
use super::helpers::extract_bearer_token;
use crate::error::Error;
use crate::server::AppState;
use crate::store::UserStore;
use crate::types::User;

/// Extractor for an authenticated caller.
///
/// Runs before every protected handler: validates the bearer token and loads
/// the user it names. Handlers compare ownership against [`RequireUser::id`]
/// and never take the caller's id from the request body.
pub struct RequireUser {
    pub user: User,
    pub claims: Claims,
}

impl RequireUser {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.user.id
    }
}

#[derive(Debug)]
pub enum AuthError {
    MissingAuth,
    InvalidScheme,
    InvalidToken,
    TokenExpired,
    UnknownUser,
    InternalError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingAuth => (StatusCode::UNAUTHORIZED, "Authentication required"),
            AuthError::InvalidScheme => (StatusCode::UNAUTHORIZED, "Invalid authorization scheme"),
            AuthError::InvalidToken | AuthError::UnknownUser => {
                (StatusCode::UNAUTHORIZED, "Invalid token")
            }
            AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "Token expired"),
            AuthError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = json!({ "error": message });

        let mut response = (status, Json(body)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                WWW_AUTHENTICATE,
                HeaderValue::from_static("Bearer realm=\"curio\""),
            );
        }

        response
    }
}

impl FromRequestParts<Arc<AppState>> for RequireUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let claims = extract_and_validate_token(parts, state)?;

        let user = state
            .store
            .get_user(&claims.sub)
            .map_err(|e| {
                tracing::error!("Failed to load token user: {e}");
                AuthError::InternalError
            })?
            .ok_or(AuthError::UnknownUser)?;

        Ok(RequireUser { user, claims })
    }
}

fn extract_and_validate_token(parts: &Parts, state: &AppState) -> Result<Claims, AuthError> {
    let auth_header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuth)?
        .to_str()
        .map_err(|_| AuthError::InvalidScheme)?;

    let raw_token = extract_bearer_token(auth_header).ok_or(AuthError::InvalidScheme)?;

    state.tokens.validate(raw_token).map_err(|e| match e {
        Error::Token(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => {
            AuthError::TokenExpired
        }
        _ => AuthError::InvalidToken,
    })
}
