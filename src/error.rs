//! Error taxonomy shared by the db layer and the HTTP surface.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  /// A referenced deck node or card does not exist. Read paths resolve this
  /// to an empty result instead; write paths surface it.
  #[error("{0} not found")]
  NotFound(String),

  /// The mutation would violate a tree invariant (cycle, duplicate sibling
  /// title, non-folder parent) or the session is not in a usable state.
  #[error("invalid state: {0}")]
  InvalidState(String),

  /// Backing store failure. The surrounding transaction has been rolled back.
  #[error("persistence failure: {0}")]
  Persistence(#[from] rusqlite::Error),

  /// Database mutex poisoned, no further access possible this process.
  #[error("database unavailable")]
  Lock,
}

impl AppError {
  pub fn not_found(what: impl Into<String>) -> Self {
    Self::NotFound(what.into())
  }

  pub fn invalid_state(msg: impl Into<String>) -> Self {
    Self::InvalidState(msg.into())
  }

  fn status(&self) -> StatusCode {
    match self {
      Self::NotFound(_) => StatusCode::NOT_FOUND,
      Self::InvalidState(_) => StatusCode::CONFLICT,
      Self::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
      Self::Lock => StatusCode::SERVICE_UNAVAILABLE,
    }
  }
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    if matches!(self, Self::Persistence(_) | Self::Lock) {
      tracing::error!("{}", self);
    }
    (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
  }
}
