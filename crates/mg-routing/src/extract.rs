//! Model identifier extraction
//!
//! Requests name their target model three different ways depending on the
//! client protocol: a top-level JSON `model` field (chat-completion and
//! message style), a colon-delimited action segment (`{model}:{method}`,
//! generate-content style), or a `/models/{model}:{method}` URL path. The
//! extractor tries them in that fixed priority order.

/// URL-derived hints handed to the extractor alongside the body
#[derive(Debug, Clone, Default)]
pub struct PathHints {
    /// Final path segment when it is a `{model}:{method}` action
    pub action: Option<String>,
    /// Full request path, scanned for a `/models/` segment
    pub path: Option<String>,
}

impl PathHints {
    /// Derive hints from a request path
    pub fn from_path(path: &str) -> Self {
        let action = path
            .rsplit('/')
            .next()
            .filter(|segment| segment.contains(':'))
            .map(str::to_string);

        Self {
            action,
            path: Some(path.to_string()),
        }
    }
}

/// Extract the model identifier a request asks for, if any
///
/// Read-only inspection; the caller keeps the original body bytes for
/// re-reading. `None` is not an error — it signals that routing should be
/// skipped and the request passed through unmodified.
pub fn extract_model(body: &[u8], hints: &PathHints) -> Option<String> {
    // 1. Top-level string-typed "model" field in the JSON body
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) {
        if let Some(model) = value.get("model").and_then(|m| m.as_str()) {
            if !model.is_empty() {
                return Some(model.to_string());
            }
        }
    }

    // 2. Action hint: "{model}:{method}", portion before the first colon
    if let Some(action) = hints.action.as_deref() {
        let model = action.split(':').next().unwrap_or("");
        if !model.is_empty() {
            return Some(model.to_string());
        }
    }

    // 3. Path hint: /models/{model}:{method}, first occurrence wins
    if let Some(path) = hints.path.as_deref() {
        if let Some(idx) = path.find("/models/") {
            let rest = &path[idx + "/models/".len()..];
            if let Some(colon) = rest.find(':') {
                if colon > 0 {
                    return Some(rest[..colon].to_string());
                }
            }
        }
    }

    None
}
