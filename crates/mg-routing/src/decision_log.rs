//! Structured routing-decision records
//!
//! One record per request, emitted at decision time. The fields carry what
//! an operator needs to audit routing: outcome, requested and resolved
//! model, serving provider, and request path. Cost and source tell apart
//! free local handling from paid upstream forwarding.

use chrono::Utc;
use tracing::{debug, warn};

use crate::types::{ResolvedRoute, RouteOutcome};

/// Emit the routing-decision record for one request
pub fn log_route_decision(route: &ResolvedRoute, path: &str) {
    let provider = route.provider().unwrap_or("");
    let timestamp = Utc::now().to_rfc3339();

    match route.outcome {
        RouteOutcome::LocalProvider => {
            debug!(
                component = "routing",
                outcome = route.outcome.as_str(),
                requested_model = %route.requested_model,
                provider = %provider,
                path = %path,
                timestamp = %timestamp,
                cost = "free",
                source = "local",
                "serving '{}' with local provider '{}'",
                route.requested_model,
                provider
            );
        }
        RouteOutcome::ModelMapping => {
            let resolved = route.resolved_model.as_deref().unwrap_or("");
            debug!(
                component = "routing",
                outcome = route.outcome.as_str(),
                requested_model = %route.requested_model,
                resolved_model = %resolved,
                provider = %provider,
                path = %path,
                timestamp = %timestamp,
                cost = "free",
                source = "local",
                "model mapping: '{}' -> '{}' on provider '{}'",
                route.requested_model,
                resolved,
                provider
            );
        }
        RouteOutcome::RemoteFallback => {
            warn!(
                component = "routing",
                outcome = route.outcome.as_str(),
                requested_model = %route.requested_model,
                path = %path,
                timestamp = %timestamp,
                cost = "paid",
                source = "upstream",
                "forwarding '{}' to the remote fallback (paid); add a model_mappings entry \
                 {{from: \"{}\", to: \"<your-local-model>\"}} to serve it locally",
                route.requested_model,
                route.requested_model
            );
        }
        RouteOutcome::NoProvider => {
            warn!(
                component = "routing",
                outcome = route.outcome.as_str(),
                requested_model = %route.requested_model,
                path = %path,
                timestamp = %timestamp,
                cost = "none",
                source = "error",
                "no provider available for model '{}'",
                route.requested_model
            );
        }
    }
}
