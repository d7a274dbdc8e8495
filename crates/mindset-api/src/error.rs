//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("not eligible: {0}")]
  NotEligible(String),

  #[error("conflict: {0}")]
  Conflict(String),

  /// The store timed out or was unreachable. Clients may retry.
  #[error("unavailable: {0}")]
  Unavailable(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<mindset_core::Error> for ApiError {
  fn from(e: mindset_core::Error) -> Self {
    use mindset_core::Error as E;
    if e.is_not_found() {
      return ApiError::NotFound(e.to_string());
    }
    match e {
      E::NotEligible(_) => ApiError::NotEligible(e.to_string()),
      E::SlugTaken(_) => ApiError::Conflict(e.to_string()),
      E::InvalidParent { .. } | E::InvalidWeights(_) => ApiError::BadRequest(e.to_string()),
      E::Transient(m) => ApiError::Unavailable(m),
      E::Store(inner) => ApiError::Store(inner),
      other => ApiError::Store(Box::new(other)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::NotEligible(m) => (StatusCode::UNPROCESSABLE_ENTITY, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Unavailable(m) => {
        let body = json!({ "error": m, "retryable": true });
        return (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response();
      }
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store error");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
