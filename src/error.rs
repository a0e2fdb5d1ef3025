//! API error taxonomy. Each variant maps to one HTTP status and a
//! `{ "status": "error", "detail": ... }` body.

use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
  #[error("Session not found: {0}")]
  SessionNotFound(String),
  #[error("User not found: {0}")]
  UserNotFound(String),
  #[error("Quest not found: {0}")]
  QuestNotFound(u32),
  #[error("Quest {0} already exists")]
  DuplicateQuest(u32),
  #[error("Invalid quest: {0}")]
  InvalidQuest(String),
  #[error("Remote quest source is not configured")]
  RemoteDisabled,
  #[error("Remote quest source failed: {0}")]
  Remote(String),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::SessionNotFound(_) | ApiError::UserNotFound(_) | ApiError::QuestNotFound(_) => StatusCode::NOT_FOUND,
      ApiError::DuplicateQuest(_) => StatusCode::CONFLICT,
      ApiError::InvalidQuest(_) => StatusCode::BAD_REQUEST,
      ApiError::RemoteDisabled => StatusCode::SERVICE_UNAVAILABLE,
      ApiError::Remote(_) => StatusCode::BAD_GATEWAY,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    (
      self.status(),
      Json(serde_json::json!({ "status": "error", "detail": self.to_string() })),
    )
      .into_response()
  }
}
