use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use crate::index::IndexError;
use crate::pipeline::PipelineError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid or missing API key")]
    Unauthorized,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Only the capability name is exposed to clients.
    #[error("{capability} capability unavailable")]
    CapabilityUnavailable { capability: String },

    #[error("internal error")]
    Internal(String),
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Unauthorized => StatusCode::UNAUTHORIZED,
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            GatewayError::CapabilityUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PipelineError> for GatewayError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::InvalidInput { reason } => GatewayError::InvalidInput(reason),
            PipelineError::CapabilityUnavailable { capability, reason } => {
                warn!(capability = %capability, reason = %reason, "Capability unavailable");
                GatewayError::CapabilityUnavailable { capability }
            }
            PipelineError::Index(e) => e.into(),
            other => {
                error!(error = %other, "Analysis failed");
                GatewayError::Internal(other.to_string())
            }
        }
    }
}

impl From<IndexError> for GatewayError {
    fn from(err: IndexError) -> Self {
        if err.is_shape_error() {
            return GatewayError::InvalidRequest(err.to_string());
        }
        match err {
            IndexError::Embedding(e) => {
                warn!(reason = %e, "Embedding capability unavailable");
                GatewayError::CapabilityUnavailable {
                    capability: "embedding".to_string(),
                }
            }
            other => {
                error!(error = %other, "Index operation failed");
                GatewayError::Internal(other.to_string())
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, body).into_response()
    }
}
