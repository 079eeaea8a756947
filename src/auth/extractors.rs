use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use crate::auth::dto::PublicUser;
use crate::auth::jwt::JwtKeys;
use crate::auth::repo_types::User;
use crate::error::ApiError;
use crate::state::AppState;

/// Runs ahead of every protected handler: extracts the bearer token, verifies
/// it, and resolves the subject to a user row. Any failure rejects the
/// request with 401 before the handler sees it.
pub struct CurrentUser(pub PublicUser);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(ApiError::Authentication("no token"))?;

        let token = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .ok_or(ApiError::Authentication("no token"))?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|_| {
            warn!("invalid or expired token");
            ApiError::Authentication("token not valid")
        })?;

        // A token can outlive its user; a dangling subject is rejected the
        // same way a bad token is.
        let user = User::find_public_by_id(&state.db, claims.sub)
            .await
            .map_err(|e| ApiError::Unavailable(e.into()))?
            .ok_or_else(|| {
                warn!(user_id = %claims.sub, "token subject not found");
                ApiError::Authentication("user not found")
            })?;

        Ok(CurrentUser(user))
    }
}
