//! Feature-negotiation header sanitization
//!
//! The beta header advertises entitlements the paid upstream recognizes.
//! When a request is served locally, tokens that only the upstream may
//! honor are stripped so a local provider never sees them. Remote-fallback
//! requests keep the header untouched.

/// Feature-negotiation header inspected on locally served routes
pub const ANTHROPIC_BETA_HEADER: &str = "anthropic-beta";

/// Extended-context entitlement that only the paid upstream may honor
pub const EXTENDED_CONTEXT_BETA: &str = "context-1m-2025-08-07";

/// Filter denylisted tokens out of a comma-delimited beta header value
///
/// Returns `None` when no tokens survive, signaling the header should be
/// removed entirely. Token order is preserved; empty tokens are dropped.
pub fn sanitize_beta_header(value: &str) -> Option<String> {
    let kept: Vec<&str> = value
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty() && *token != EXTENDED_CONTEXT_BETA)
        .collect();

    if kept.is_empty() {
        None
    } else {
        Some(kept.join(","))
    }
}
