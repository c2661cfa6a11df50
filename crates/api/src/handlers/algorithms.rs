use axum::extract::State;
use axum::Json;
use operators::OperatorDescriptor;

use super::AppState;

// GET /api/algorithms: every registered operator, in registration order.
pub async fn list(State(state): State<AppState>) -> Json<Vec<OperatorDescriptor>> {
    Json(state.registry.list())
}
