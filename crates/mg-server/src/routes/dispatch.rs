//! Local completion dispatch
//!
//! The terminal handler behind the routing layer: resolves which local
//! provider serves the (possibly substituted) model and forwards the raw
//! request to that provider's upstream endpoint. Requests the routing
//! layer classified `NoProvider` land here too and get the client-visible
//! model-not-found error.

use axum::body::to_bytes;
use axum::extract::{Request, State};
use axum::response::Response;
use tracing::debug;

use mg_routing::{extract_model, parse_suffix, PathHints, ProviderLookup};

use crate::forward::HttpForwarder;
use crate::middleware::error::{ApiErrorResponse, ApiResult};
use crate::middleware::fallback::{ResolvedModel, MAX_BODY_BYTES};
use crate::state::AppState;

/// POST /v1/chat/completions, /v1/messages, /v1beta/models/{action},
/// /v1beta/{*path}
pub async fn completion_dispatch(
    State(state): State<AppState>,
    req: Request,
) -> ApiResult<Response> {
    let path = req.uri().path().to_string();
    let (parts, body) = req.into_parts();

    let body_bytes = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| ApiErrorResponse::bad_request(format!("failed to read request body: {}", e)))?;

    if let Some(ResolvedModel(substituted)) = parts.extensions.get::<ResolvedModel>() {
        debug!("request model was substituted to '{}'", substituted);
    }

    let hints = PathHints::from_path(&path);
    let Some(model) = extract_model(&body_bytes, &hints) else {
        return Err(ApiErrorResponse::bad_request(
            "request does not name a model",
        ));
    };

    let base_model = parse_suffix(&model).base_name;
    let providers = state.directory.providers_for(&base_model);
    let Some(provider_name) = providers.first() else {
        return Err(ApiErrorResponse::model_not_found(&model));
    };

    let provider = state.directory.provider(provider_name).ok_or_else(|| {
        ApiErrorResponse::internal_error(format!(
            "provider '{}' missing from the directory",
            provider_name
        ))
    })?;

    debug!(
        "dispatching model '{}' to provider '{}' at {}",
        model, provider.name, provider.base_url
    );

    let forwarder = HttpForwarder::new(
        state.http_client.clone(),
        provider.base_url.clone(),
        provider.api_key.clone(),
    );
    forwarder.forward(parts, body_bytes).await.map_err(|e| {
        ApiErrorResponse::bad_gateway(format!("provider '{}' request failed: {}", provider.name, e))
    })
}
