//! Routing middleware
//!
//! Wraps every gateway endpoint with the routing decision: buffer the body,
//! extract the requested model, classify the route, then apply the
//! outcome's side effects — header sanitization and body rewrite for
//! locally served routes, response translation for mappings, and handoff
//! to the remote forwarder for fallback. Requests that name no model skip
//! routing entirely and pass through unmodified.

use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::header::{HeaderMap, HeaderValue, CONTENT_LENGTH};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures::StreamExt;
use tracing::{debug, error, warn};

use mg_routing::{
    extract_model, log_route_decision, rewrite_request_model, sanitize_beta_header, PathHints,
    RouteOutcome, StreamModelRewriter, ANTHROPIC_BETA_HEADER,
};

use crate::middleware::error::ApiErrorResponse;
use crate::state::AppState;

/// Request-extension value carrying the substitute model name, for
/// downstream collaborators that need to know a substitution occurred
#[derive(Debug, Clone)]
pub struct ResolvedModel(pub String);

/// Upper bound on buffered request bodies (16 MiB)
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Classify and route one request
pub async fn route_request(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let (mut parts, body) = req.into_parts();

    // Buffer the body so it can be inspected here and re-read downstream
    let body_bytes = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("failed to read request body: {}", e);
            return next.run(Request::from_parts(parts, Body::empty())).await;
        }
    };

    let hints = PathHints::from_path(&path);
    let Some(requested_model) = extract_model(&body_bytes, &hints) else {
        // No extractable model: routing is bypassed, not an error
        return next
            .run(Request::from_parts(parts, Body::from(body_bytes)))
            .await;
    };

    let forwarder = state.remote_forwarder();
    let route = state.engine.decide(&requested_model, forwarder.is_some());
    log_route_decision(&route, &path);

    match route.outcome {
        RouteOutcome::LocalProvider => {
            filter_beta_header(&mut parts.headers);
            next.run(Request::from_parts(parts, Body::from(body_bytes)))
                .await
        }
        RouteOutcome::ModelMapping => {
            let resolved = route
                .resolved_model
                .clone()
                .unwrap_or_else(|| requested_model.clone());

            let outbound = match rewrite_request_model(&body_bytes, &resolved) {
                Some(rewritten) => Bytes::from(rewritten),
                // The classification, not the rewrite, determines behavior;
                // a body without a model field proceeds as-is
                None => body_bytes,
            };

            filter_beta_header(&mut parts.headers);
            parts.extensions.insert(ResolvedModel(resolved.clone()));

            let response = next
                .run(Request::from_parts(parts, Body::from(outbound)))
                .await;
            debug!(
                "translating response model '{}' back to '{}'",
                resolved, requested_model
            );
            translate_response(response, &resolved, &requested_model)
        }
        RouteOutcome::RemoteFallback => {
            let Some(forwarder) = forwarder else {
                // decide() only classifies RemoteFallback when a forwarder
                // exists; degrade to passthrough if it vanished since
                return next
                    .run(Request::from_parts(parts, Body::from(body_bytes)))
                    .await;
            };
            match forwarder.forward(parts, body_bytes).await {
                Ok(response) => response,
                Err(e) => {
                    error!("remote fallback forward failed: {}", e);
                    ApiErrorResponse::bad_gateway(format!("remote fallback failed: {}", e))
                        .into_response()
                }
            }
        }
        RouteOutcome::NoProvider => {
            // Pass through unmodified; the downstream handler produces the
            // client-visible model-not-found error
            next.run(Request::from_parts(parts, Body::from(body_bytes)))
                .await
        }
    }
}

/// Strip upstream-only entitlements before a request is served locally
fn filter_beta_header(headers: &mut HeaderMap) {
    let Some(value) = headers
        .get(ANTHROPIC_BETA_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
    else {
        return;
    };

    match sanitize_beta_header(&value) {
        Some(filtered) if filtered == value => {}
        Some(filtered) => match HeaderValue::from_str(&filtered) {
            Ok(header_value) => {
                headers.insert(ANTHROPIC_BETA_HEADER, header_value);
            }
            Err(e) => {
                warn!("failed to set sanitized beta header: {}", e);
                headers.remove(ANTHROPIC_BETA_HEADER);
            }
        },
        None => {
            headers.remove(ANTHROPIC_BETA_HEADER);
        }
    }
}

/// Wrap a response body so the substitute model name is translated back to
/// the requested one before any byte reaches the client
///
/// Works for buffered and streamed bodies alike; the rewriter's held-back
/// tail is flushed exactly once when the inner body ends, on success and
/// error paths both.
fn translate_response(response: Response, resolved: &str, requested: &str) -> Response {
    let (mut parts, body) = response.into_parts();
    // Translation changes the body length; any upstream length is stale
    parts.headers.remove(CONTENT_LENGTH);

    let mut rewriter = StreamModelRewriter::new(resolved, requested);
    let inner = body.into_data_stream();

    let translated = async_stream::stream! {
        futures::pin_mut!(inner);
        while let Some(chunk) = inner.next().await {
            match chunk {
                Ok(bytes) => {
                    let out = rewriter.feed(&bytes);
                    if !out.is_empty() {
                        yield Ok::<Bytes, axum::Error>(Bytes::from(out));
                    }
                }
                Err(e) => {
                    // Flush what the rewriter owes before surfacing the error
                    let tail = rewriter.finish();
                    if !tail.is_empty() {
                        yield Ok(Bytes::from(tail));
                    }
                    yield Err(e);
                    return;
                }
            }
        }
        let tail = rewriter.finish();
        if !tail.is_empty() {
            yield Ok(Bytes::from(tail));
        }
    };

    Response::from_parts(parts, Body::from_stream(translated))
}
