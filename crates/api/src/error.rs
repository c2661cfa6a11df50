//! HTTP-facing error type.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use engine::EngineError;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::codec::CodecError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid workflow submission: {0}")]
    InvalidSubmission(String),

    #[error("no root input image was provided")]
    MissingRootInput,

    #[error("invalid root input: {0}")]
    InvalidRootInput(#[source] CodecError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("failed to encode result: {0}")]
    Encode(#[source] CodecError),

    #[error("workflow run did not complete: {0}")]
    Interrupted(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidSubmission(_) => StatusCode::BAD_REQUEST,
            ApiError::MissingRootInput | ApiError::InvalidRootInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Engine(e) if e.is_operator_failure() => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Engine(_) => StatusCode::BAD_REQUEST,
            ApiError::Encode(_) | ApiError::Interrupted(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn stage(&self) -> &'static str {
        match self {
            ApiError::InvalidSubmission(_) => "validation",
            ApiError::MissingRootInput | ApiError::InvalidRootInput(_) => "input",
            ApiError::Engine(e) => e.stage().as_str(),
            ApiError::Encode(_) => "encoding",
            ApiError::Interrupted(_) => "internal",
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidSubmission(rejection.body_text())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    pub stage: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let node_id = match &self {
            ApiError::Engine(e) => e.node_id().map(str::to_owned),
            _ => None,
        };
        warn!(status = status.as_u16(), node_id = ?node_id, "request failed: {}", self);

        let body = ErrorBody {
            success: false,
            error: self.to_string(),
            stage: self.stage(),
            node_id,
        };
        (status, Json(body)).into_response()
    }
}
