use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

/// Everything that can end a request early.  Fallback paths (summary, directory outages) never
/// produce one of these; see `types::Resolved`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed or incomplete inbound payload.
    #[error("{0}")]
    Validation(String),
    /// Unknown call, empty transcript, or no profile for the caller.
    #[error("{0}")]
    NotFound(String),
    /// Any downstream network or API failure.
    #[error("{0}")]
    Transport(String),
    /// Mail credentials missing, expired, or rejected.
    #[error("{0}")]
    Auth(String),
    /// Inbound webhook secret mismatch.
    #[error("{0}")]
    Unauthorized(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Transport(_) | AppError::Auth(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Transport(e.to_string())
    }
}

pub fn handle_error(e: &AppError) {
    if e.status().is_server_error() {
        error!(error=%e, status=%e.status(), "request failed");
    } else {
        warn!(error=%e, status=%e.status(), "request rejected");
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        handle_error(&self);
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
