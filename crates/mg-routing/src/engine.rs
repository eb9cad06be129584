//! Routing decision engine
//!
//! Combines local-provider availability, operator model mappings, and the
//! live force-priority flag into exactly one of four route outcomes. The
//! engine never errors: `RemoteFallback` and `NoProvider` are normal
//! terminal classifications, and translating `NoProvider` into an HTTP
//! error is the caller's job.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::suffix::parse_suffix;
use crate::types::{ModelReference, ResolvedRoute, RouteOutcome};

/// Lookup of locally configured providers able to serve a base model name.
/// An empty list means "not locally configured."
pub trait ProviderLookup: Send + Sync {
    fn providers_for(&self, base_model: &str) -> Vec<String>;
}

/// Operator-defined model substitution table.
/// `None` means unmapped (an empty or whitespace target counts as unmapped).
pub trait ModelMapper: Send + Sync {
    fn map_model(&self, model: &str) -> Option<String>;
}

/// Live-read operator policy controlling decision order
pub trait RoutePolicy: Send + Sync {
    /// When true, mappings are consulted before local provider availability
    fn force_priority(&self) -> bool;
}

/// A usable mapping: the substitute model plus the providers serving it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMapping {
    pub model: String,
    pub providers: Vec<String>,
}

/// Per-request route classifier
///
/// The provider lookup and policy are injected at construction; the mapper
/// is late-bound behind a read/write lock and may be attached or swapped
/// after the engine is already serving requests. In-flight requests past
/// the point of consultation are unaffected by a swap.
pub struct RoutingEngine {
    providers: Arc<dyn ProviderLookup>,
    mapper: RwLock<Option<Arc<dyn ModelMapper>>>,
    policy: Arc<dyn RoutePolicy>,
}

impl RoutingEngine {
    pub fn new(providers: Arc<dyn ProviderLookup>, policy: Arc<dyn RoutePolicy>) -> Self {
        Self {
            providers,
            mapper: RwLock::new(None),
            policy,
        }
    }

    /// Attach or replace the model mapper (late binding)
    pub fn set_mapper(&self, mapper: Arc<dyn ModelMapper>) {
        *self.mapper.write() = Some(mapper);
    }

    /// Resolve an operator mapping for a requested model
    ///
    /// Looks up the name verbatim first, then the normalized base name. The
    /// caller's reasoning suffix is re-attached unless the target already
    /// declares its own. A mapping whose target has no available providers
    /// is unusable and reported as `None`, as is a mapping that resolves
    /// back to the requested name itself.
    pub fn resolve_mapping(
        &self,
        raw_model: &str,
        normalized: &ModelReference,
    ) -> Option<ResolvedMapping> {
        let mapper = self.mapper.read().clone()?;

        let mapped = mapper
            .map_model(raw_model)
            .or_else(|| mapper.map_model(&normalized.base_name))?;
        let mut candidate = mapped.trim().to_string();
        if candidate.is_empty() {
            return None;
        }

        // Preserve the caller's reasoning suffix across the substitution
        // unless the target pins its own.
        if let Some(suffix) = &normalized.reasoning_suffix {
            if parse_suffix(&candidate).reasoning_suffix.is_none() {
                candidate = format!("{}({})", candidate, suffix);
            }
        }

        if candidate == raw_model {
            return None;
        }

        let candidate_base = parse_suffix(&candidate).base_name;
        let providers = self.providers.providers_for(&candidate_base);
        if providers.is_empty() {
            debug!(
                "mapping for '{}' targets '{}' but no provider serves it; ignoring",
                raw_model, candidate
            );
            return None;
        }

        Some(ResolvedMapping {
            model: candidate,
            providers,
        })
    }

    /// Classify one request
    ///
    /// `fallback_available` reports whether a remote forwarding target is
    /// configured; it only matters when neither a local provider nor a
    /// usable mapping is found.
    pub fn decide(&self, requested_model: &str, fallback_available: bool) -> ResolvedRoute {
        let normalized = parse_suffix(requested_model);
        let force = self.policy.force_priority();

        let (resolved_model, providers, used_mapping) = if force {
            // Mapping wins over local availability; an unusable mapping
            // still falls through to the local-provider check.
            match self.resolve_mapping(requested_model, &normalized) {
                Some(mapping) => (Some(mapping.model), mapping.providers, true),
                None => (
                    None,
                    self.providers.providers_for(&normalized.base_name),
                    false,
                ),
            }
        } else {
            // Local providers are free; mappings are only consulted when no
            // provider serves the requested model directly.
            let providers = self.providers.providers_for(&normalized.base_name);
            if providers.is_empty() {
                match self.resolve_mapping(requested_model, &normalized) {
                    Some(mapping) => (Some(mapping.model), mapping.providers, true),
                    None => (None, providers, false),
                }
            } else {
                (None, providers, false)
            }
        };

        let outcome = if used_mapping {
            RouteOutcome::ModelMapping
        } else if !providers.is_empty() {
            RouteOutcome::LocalProvider
        } else if fallback_available {
            RouteOutcome::RemoteFallback
        } else {
            RouteOutcome::NoProvider
        };

        ResolvedRoute {
            outcome,
            requested_model: requested_model.to_string(),
            resolved_model,
            providers,
            rewrote_body: used_mapping,
        }
    }
}
