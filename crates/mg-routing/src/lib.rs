//! Model-aware request routing and fallback decisions
//!
//! Decides, per request, whether a named model is served by a locally
//! configured provider, silently substituted via an operator mapping,
//! forwarded to the remote paid service, or unroutable. The decision is a
//! pure classification; the surrounding server applies its side effects
//! (body rewrite, header sanitization, response translation).

mod decision_log;
mod engine;
mod extract;
mod headers;
mod rewrite;
mod suffix;
mod types;

pub use decision_log::log_route_decision;
pub use engine::{ModelMapper, ProviderLookup, ResolvedMapping, RoutePolicy, RoutingEngine};
pub use extract::{extract_model, PathHints};
pub use headers::{sanitize_beta_header, ANTHROPIC_BETA_HEADER, EXTENDED_CONTEXT_BETA};
pub use rewrite::{rewrite_request_model, StreamModelRewriter};
pub use suffix::parse_suffix;
pub use types::{ModelReference, ResolvedRoute, RouteOutcome};
