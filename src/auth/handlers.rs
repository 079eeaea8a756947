use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, MeResponse, RegisterRequest},
        extractors::CurrentUser,
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo_types::User,
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(me))
        .route("/auth/profile", get(me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let input = payload.validate(state.config.auth.identifier_mode)?;

    let hash = hash_password(&input.password)?;

    // Duplicate email or username surfaces as a unique violation
    let user = User::create(&state.db, &input, &hash).await?;

    let token = if state.config.auth.auto_login {
        let keys = JwtKeys::from_ref(&state);
        Some(keys.sign(user.id)?)
    } else {
        None
    };

    info!(user_id = %user.id, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            token,
            user: user.into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let input = payload.validate()?;

    // Unknown identifier and wrong password take the same exit so responses
    // never reveal which one it was.
    let user = User::find_by_identifier(
        &state.db,
        &input.identifier,
        state.config.auth.identifier_mode,
    )
    .await?
    .ok_or_else(|| {
        warn!("login with unknown identifier");
        ApiError::Authentication("invalid credentials")
    })?;

    let ok = verify_password(&input.password, &user.password_hash)?;
    if !ok {
        warn!(user_id = %user.id, "login with invalid password");
        return Err(ApiError::Authentication("invalid credentials"));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id)?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(AuthResponse {
        success: true,
        token: Some(token),
        user: user.into(),
    }))
}

#[instrument(skip_all)]
pub async fn me(CurrentUser(user): CurrentUser) -> Json<MeResponse> {
    Json(MeResponse {
        success: true,
        user,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::dto::{PublicUser, Sex};
    use uuid::Uuid;

    #[test]
    fn auth_response_omits_token_when_not_issued() {
        let response = AuthResponse {
            success: true,
            token: None,
            user: PublicUser {
                id: Uuid::new_v4(),
                email: "a@x.com".into(),
                username: None,
                name: "A".into(),
                age: 30,
                sex: Sex::Other,
            },
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("token"));
        assert!(json.contains(r#""success":true"#));
    }

    #[test]
    fn auth_response_includes_token_when_issued() {
        let response = AuthResponse {
            success: true,
            token: Some("abc.def.ghi".into()),
            user: PublicUser {
                id: Uuid::new_v4(),
                email: "a@x.com".into(),
                username: Some("ann".into()),
                name: "A".into(),
                age: 30,
                sex: Sex::Female,
            },
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("abc.def.ghi"));
        assert!(json.contains("ann"));
        assert!(!json.contains("password"));
    }
}
