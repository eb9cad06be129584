//! Request and response model rewriting
//!
//! When a mapping substitutes a model, the outbound request body's `model`
//! field is rewritten to the substitute, and anything the downstream
//! handler echoes back — including inside streamed output — is translated
//! back to the originally requested name before it reaches the client.

use tracing::warn;

/// Replace the `model` field of a JSON request body
///
/// Returns `None` when the body should be left untouched: it has no
/// top-level `model` field, it is not parseable JSON, or re-serialization
/// fails (the latter logs a warning). A `None` is not an error — routing
/// proceeds with the original body.
pub fn rewrite_request_model(body: &[u8], new_model: &str) -> Option<Vec<u8>> {
    let mut value: serde_json::Value = serde_json::from_slice(body).ok()?;
    let obj = value.as_object_mut()?;
    if !obj.contains_key("model") {
        return None;
    }

    obj.insert(
        "model".to_string(),
        serde_json::Value::String(new_model.to_string()),
    );

    match serde_json::to_vec(&value) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            warn!("failed to rewrite model in request body: {}", e);
            None
        }
    }
}

/// Translates a substitute model name back to the original across a
/// chunked byte stream
///
/// A match can span a chunk boundary, so the rewriter holds back any
/// buffer tail that is a proper prefix of the needle and releases it on
/// the next `feed` or at `finish`. `finish` must be called exactly once
/// when the stream ends so the held-back tail is flushed.
pub struct StreamModelRewriter {
    needle: Vec<u8>,
    replacement: Vec<u8>,
    carry: Vec<u8>,
}

impl StreamModelRewriter {
    /// `from` is the substitute name the downstream emits, `to` the name
    /// the client originally asked for.
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            needle: from.as_bytes().to_vec(),
            replacement: to.as_bytes().to_vec(),
            carry: Vec::new(),
        }
    }

    /// Process one chunk, returning the translated bytes ready to emit
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<u8> {
        if self.needle.is_empty() || self.needle == self.replacement {
            return chunk.to_vec();
        }

        let mut buf = std::mem::take(&mut self.carry);
        buf.extend_from_slice(chunk);

        let mut out = Vec::with_capacity(buf.len());
        let mut i = 0;
        while i < buf.len() {
            let rest = &buf[i..];
            if rest.starts_with(&self.needle) {
                out.extend_from_slice(&self.replacement);
                i += self.needle.len();
            } else if rest.len() < self.needle.len() && self.needle.starts_with(rest) {
                // Possible match continuing in the next chunk
                self.carry = rest.to_vec();
                return out;
            } else {
                out.push(buf[i]);
                i += 1;
            }
        }

        out
    }

    /// Flush any held-back tail; call once when the stream ends
    pub fn finish(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.carry)
    }
}
