use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::store::GatewayError;

pub const NOT_CONFIGURED_MESSAGE: &str = "Supabase is not configured on the backend. \
     Please set SUPABASE_URL and SUPABASE_SERVICE_ROLE_KEY in the backend environment.";

pub const UNAVAILABLE_MESSAGE: &str =
    "Supabase client could not be initialized on the backend.";

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Missing required fields: {}", .missing.join(", "))]
pub struct ValidationError {
    pub missing: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Request must be application/json")]
    NotJson,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    /// A store call failed; carries the client-facing message only.
    #[error("{0}")]
    Store(&'static str),
    /// A store call failed on an endpoint that answers with an empty list.
    #[error("{0}")]
    Degraded(&'static str),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotJson | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Gateway(_) | ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Degraded(_) => StatusCode::OK,
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            ApiError::Validation(e) => ErrorBody {
                error: e.to_string(),
                details: Some(serde_json::json!({ "missing_fields": e.missing })),
            },
            ApiError::Gateway(GatewayError::NotConfigured { .. }) => ErrorBody {
                error: NOT_CONFIGURED_MESSAGE.to_string(),
                details: None,
            },
            ApiError::Gateway(GatewayError::Unavailable(_)) => ErrorBody {
                error: UNAVAILABLE_MESSAGE.to_string(),
                details: None,
            },
            other => ErrorBody {
                error: other.to_string(),
                details: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Degraded(message) = self {
            let body = serde_json::json!({ "data": [], "message": message });
            return (StatusCode::OK, Json(body)).into_response();
        }
        (self.status(), Json(self.body())).into_response()
    }
}
