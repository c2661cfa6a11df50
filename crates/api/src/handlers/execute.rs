use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use engine::{WorkflowExecutor, WorkflowSubmission};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::AppState;
use crate::codec;
use crate::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteWorkflowDto {
    #[serde(flatten)]
    pub workflow: WorkflowSubmission,
    /// Image resource as a data URL. The editor historically sent it as
    /// `inputImage`.
    #[serde(default, alias = "inputImage")]
    pub root_input: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExecuteResponse {
    pub success: bool,
    pub result: String,
}

// POST /api/execute
pub async fn execute(
    State(state): State<AppState>,
    payload: Result<Json<ExecuteWorkflowDto>, JsonRejection>,
) -> Result<Json<ExecuteResponse>, ApiError> {
    let Json(payload) = payload?;
    let root_input = payload
        .root_input
        .filter(|s| !s.trim().is_empty())
        .ok_or(ApiError::MissingRootInput)?;
    let workflow = payload.workflow;
    let registry = state.registry;

    info!(nodes = workflow.nodes.len(), edges = workflow.edges.len(), "executing workflow");

    // Decoding, the operators and encoding are all CPU bound; keep them off
    // the async workers. One blocking task runs one workflow start to finish.
    let result = tokio::task::spawn_blocking(move || -> Result<String, ApiError> {
        let root = codec::decode_data_url(&root_input).map_err(ApiError::InvalidRootInput)?;
        let output = WorkflowExecutor::new(registry).run(&workflow, Arc::new(root))?;
        codec::encode_png_data_url(&output.image).map_err(ApiError::Encode)
    })
    .await
    .map_err(|e| ApiError::Interrupted(e.to_string()))??;

    Ok(Json(ExecuteResponse {
        success: true,
        result,
    }))
}
