use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};

use crate::error::Error;
use crate::server::AppState;
use crate::server::response::ApiError;
use crate::types::User;

/// Header set by the upstream gateway once it has authenticated the caller.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Extractor that requires a known user identity.
pub struct RequireUser(pub User);

#[derive(Debug)]
pub enum AuthError {
    MissingIdentity,
    InvalidIdentity,
    UnknownUser,
    Store(Error),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let err = match self {
            AuthError::Store(err) => err,
            rejected => {
                tracing::debug!("Rejected request identity: {rejected:?}");
                Error::Unauthorized
            }
        };
        ApiError::from(err).into_response()
    }
}

impl FromRequestParts<Arc<AppState>> for RequireUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or(AuthError::MissingIdentity)?
            .to_str()
            .map_err(|_| AuthError::InvalidIdentity)?;

        let user_id: i64 = raw.trim().parse().map_err(|_| AuthError::InvalidIdentity)?;

        let user = state
            .workspace
            .get_user(user_id)
            .map_err(AuthError::Store)?
            .ok_or(AuthError::UnknownUser)?;

        Ok(RequireUser(user))
    }
}
