//! Error types for the catalog collaborator and the HTTP boundary.
//!
//! The planner and selector never fail on business logic; the only failure
//! they can surface is a catalog that could not produce a snapshot.

use std::path::PathBuf;

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use thiserror::Error;
use tracing::error;

use crate::protocol::ErrorOut;

#[derive(Debug, Error)]
pub enum CatalogError {
  #[error("catalog file {path} could not be accessed: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("catalog file {path} is not a valid problem list: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("Problem not found: {0}")]
  NotFound(String),

  #[error("Problem with id {0} already exists")]
  Duplicate(String),

  #[error("catalog lock poisoned")]
  Poisoned,
}

impl CatalogError {
  /// True when the catalog could not be read at all, as opposed to a
  /// well-formed lookup miss or conflict.
  pub fn is_unavailable(&self) -> bool {
    matches!(self, CatalogError::Io { .. } | CatalogError::Parse { .. } | CatalogError::Poisoned)
  }
}

#[derive(Debug, Error)]
pub enum ApiError {
  #[error("Invalid payload: {0}")]
  InvalidPayload(String),

  #[error("Invalid problem: {0}")]
  InvalidProblem(String),

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  Conflict(String),

  #[error("Problem catalog unavailable: {0}")]
  Unavailable(String),

  #[error("Internal error: {0}")]
  Internal(String),
}

impl From<CatalogError> for ApiError {
  fn from(e: CatalogError) -> Self {
    match e {
      CatalogError::NotFound(_) => ApiError::NotFound(e.to_string()),
      CatalogError::Duplicate(_) => ApiError::Conflict(e.to_string()),
      other => ApiError::Unavailable(other.to_string()),
    }
  }
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::InvalidPayload(_) | ApiError::InvalidProblem(_) => StatusCode::UNPROCESSABLE_ENTITY,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
      ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
      ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      error!(target: "assessment_backend", %status, error = %self, "Request failed");
    }
    (status, Json(ErrorOut { detail: self.to_string() })).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn catalog_errors_map_to_http_statuses() {
    let nf: ApiError = CatalogError::NotFound("x".into()).into();
    assert_eq!(nf.status(), StatusCode::NOT_FOUND);

    let dup: ApiError = CatalogError::Duplicate("x".into()).into();
    assert_eq!(dup.status(), StatusCode::BAD_REQUEST);
    assert_eq!(dup.to_string(), "Problem with id x already exists");

    let down: ApiError = CatalogError::Poisoned.into();
    assert_eq!(down.status(), StatusCode::SERVICE_UNAVAILABLE);

    assert_eq!(ApiError::Internal("task cancelled".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
  }

  #[test]
  fn only_read_failures_count_as_unavailable() {
    assert!(CatalogError::Poisoned.is_unavailable());
    assert!(!CatalogError::NotFound("a".into()).is_unavailable());
    assert!(!CatalogError::Duplicate("a".into()).is_unavailable());
  }
}
