//! # API Error Mapping
//!
//! Translates domain and storage errors into HTTP responses.
//!
//! ## Status Code Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Error → Status Code                                 │
//! │                                                                         │
//! │  EmptyBill / BillTooLarge / Validation  → 400 Bad Request              │
//! │  Missing/bad admin token                → 401 Unauthorized             │
//! │  ProductNotFound / OrderNotFound        → 404 Not Found                │
//! │  InsufficientStock                      → 409 Conflict                 │
//! │  InvalidStatusTransition                → 409 Conflict                 │
//! │  UniqueViolation (order number race)    → 409 Conflict                 │
//! │  Everything else (storage, pool, bugs)  → 500 + generic body           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Business errors carry their message to the client; storage errors are
//! logged in full and surface only as a generic 500 body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use voltmart_core::CoreError;
use voltmart_db::DbError;

/// An HTTP-mappable API error.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    Conflict(String),
    Internal,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::BadRequest(m)
            | ApiError::Unauthorized(m)
            | ApiError::NotFound(m)
            | ApiError::Conflict(m) => m.clone(),
            ApiError::Internal => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "message": self.message() }))).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match &err {
            CoreError::ProductNotFound(_) | CoreError::OrderNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            CoreError::InsufficientStock { .. } | CoreError::InvalidStatusTransition { .. } => {
                ApiError::Conflict(err.to_string())
            }
            CoreError::EmptyBill | CoreError::BillTooLarge { .. } | CoreError::Validation(_) => {
                ApiError::BadRequest(err.to_string())
            }
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Core(core) => core.into(),
            DbError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{entity} not found: {id}"))
            }
            // The per-day order number race surfaces here; clients retry.
            DbError::UniqueViolation { .. } => {
                ApiError::Conflict("Conflicting write, please retry".to_string())
            }
            other => {
                error!(error = %other, "Storage error while handling request");
                ApiError::Internal
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_errors_keep_their_message() {
        let err: ApiError = CoreError::ProductNotFound("PRD-9999".to_string()).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert!(err.message().contains("PRD-9999"));

        let err: ApiError = CoreError::InsufficientStock {
            product_code: "PRD-0001".to_string(),
            requested: 5,
            available: 1,
        }
        .into();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_response_body_uses_message_key() {
        use http_body_util::BodyExt;

        let response = ApiError::NotFound("Order not found: o1".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "Order not found: o1");
        assert!(body.get("error").is_none());
    }

    #[test]
    fn test_storage_errors_are_opaque() {
        let err: ApiError = DbError::QueryFailed("secret table names".to_string()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message().contains("secret"));
    }
}
