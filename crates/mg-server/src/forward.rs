//! HTTP request forwarding
//!
//! One forwarder serves two targets: dispatching a locally routed request
//! to its provider's upstream endpoint, and handing an unroutable request
//! to the remote paid fallback. Bodies stream back without buffering;
//! hop-by-hop headers are stripped in both directions.

use axum::body::Body;
use axum::http::{header, request::Parts, Response as HttpResponse};
use axum::response::Response;
use bytes::Bytes;
use mg_types::{AppError, AppResult};
use tracing::debug;

/// Connection-scoped headers that must not be forwarded
const HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP_HEADERS.contains(&name)
}

/// Forwards a buffered request to an upstream base URL and streams the
/// response back
pub struct HttpForwarder {
    client: reqwest::Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl HttpForwarder {
    pub fn new(client: reqwest::Client, base_url: String, bearer_token: Option<String>) -> Self {
        Self {
            client,
            base_url,
            bearer_token,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Forward the request, preserving method, path, query, and headers
    ///
    /// The configured bearer credential, when present, replaces whatever
    /// authorization the client sent.
    pub async fn forward(&self, parts: Parts, body: Bytes) -> AppResult<Response> {
        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path_and_query);
        debug!("forwarding {} {}", parts.method, url);

        let mut request = self.client.request(parts.method.clone(), url.as_str());
        for (name, value) in parts.headers.iter() {
            if is_hop_by_hop(name.as_str())
                || name == header::HOST
                || name == header::CONTENT_LENGTH
            {
                continue;
            }
            if self.bearer_token.is_some() && name == header::AUTHORIZATION {
                continue;
            }
            request = request.header(name, value);
        }
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let upstream = request
            .body(body)
            .send()
            .await
            .map_err(|e| AppError::Forward(format!("request to {} failed: {}", url, e)))?;

        let mut response = HttpResponse::builder().status(upstream.status());
        for (name, value) in upstream.headers().iter() {
            if is_hop_by_hop(name.as_str()) {
                continue;
            }
            response = response.header(name, value);
        }

        response
            .body(Body::from_stream(upstream.bytes_stream()))
            .map_err(|e| AppError::Internal(format!("failed to assemble forwarded response: {}", e)))
    }
}
