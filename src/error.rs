use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Every failure a request can surface. Flows translate their own faults into
/// one of these before responding; nothing propagates past the request
/// boundary unhandled.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing input; client-fixable.
    #[error("{0}")]
    Validation(String),

    /// Uniqueness violation on registration. Deliberately generic: it confirms
    /// existence and nothing else.
    #[error("user already exists")]
    Conflict,

    /// Bad credentials or a missing/invalid/expired token. The same message is
    /// used whether the user is unknown or the password is wrong.
    #[error("{0}")]
    Authentication(&'static str),

    /// Database or hashing subsystem failed unexpectedly. Logged server-side;
    /// the client sees a generic message.
    #[error("server error")]
    Unavailable(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Conflict => StatusCode::BAD_REQUEST,
            ApiError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ApiError::Unavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Unavailable(source) = &self {
            error!(error = %source, "request failed");
        }
        let body = Json(json!({
            "success": false,
            "message": self.to_string(),
        }));
        (self.status(), body).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        // A duplicate insert racing past any earlier check lands here via the
        // unique indexes on users.email / users.username.
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some("23505") {
                return ApiError::Conflict;
            }
        }
        ApiError::Unavailable(err.into())
    }
}
