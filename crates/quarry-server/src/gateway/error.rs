use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use quarry::routing::RouteError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("No matching summaries found")]
    NoMatch,

    #[error("upstream unavailable: {0}")]
    Upstream(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

impl From<RouteError> for GatewayError {
    fn from(err: RouteError) -> Self {
        match err {
            RouteError::InvalidInput(msg) => GatewayError::InvalidRequest(msg),
            RouteError::NotFound(_) => GatewayError::NoMatch,
            RouteError::UpstreamUnavailable(msg) => GatewayError::Upstream(msg),
            RouteError::Invariant(msg) => GatewayError::InternalError(msg),
        }
    }
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::NoMatch => StatusCode::NOT_FOUND,
            GatewayError::Upstream(_) | GatewayError::InternalError(_) => {
                error!(error = %self, "Query failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}
