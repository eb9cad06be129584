//! GET /v1/models
//!
//! Lists the base models local providers can serve.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::state::AppState;

pub async fn list_models(State(state): State<AppState>) -> Json<Value> {
    let data: Vec<Value> = state
        .directory
        .local_models()
        .into_iter()
        .map(|(model, provider)| {
            json!({
                "id": model,
                "object": "model",
                "owned_by": provider,
            })
        })
        .collect();

    Json(json!({
        "object": "list",
        "data": data,
    }))
}
