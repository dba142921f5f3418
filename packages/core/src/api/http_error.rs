//! HTTP error handling
//!
//! Every JSON error body has the same `{ message, code, details? }` shape;
//! the status code is derived from `code`.

use crate::services::TreeServiceError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};

/// JSON error response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpError {
    /// User-facing error message
    pub message: String,
    /// Machine-readable error code
    pub code: String,
    /// Optional detailed error information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl HttpError {
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            details: None,
        }
    }

    pub fn with_details(
        message: impl Into<String>,
        code: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            details: Some(details.into()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.code.as_str() {
            "NODE_NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "CIRCULAR_MOVE" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<TreeServiceError> for HttpError {
    fn from(err: TreeServiceError) -> Self {
        let code = err.code();
        match err {
            TreeServiceError::Storage(e) => {
                // Storage detail stays in the log
                tracing::error!("Storage failure while handling request: {}", e);
                HttpError::new("The tree could not be saved, please retry", code)
            }
            TreeServiceError::Cycle { node_id, parent_id } => HttpError::with_details(
                format!("Cannot move {} into its own subtree", node_id),
                code,
                format!("node_id: {}, parent_id: {}", node_id, parent_id),
            ),
            other => HttpError::new(other.to_string(), code),
        }
    }
}
