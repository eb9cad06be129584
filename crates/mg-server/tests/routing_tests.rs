//! End-to-end routing tests
//!
//! Drive the assembled gateway router with in-process requests and mock
//! upstreams: local dispatch, model mapping with response translation,
//! force-priority precedence, remote fallback, and the error paths.

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mg_config::{
    AppConfig, ConfigManager, FallbackConfig, ModelMappingRule, ProviderConfig,
};
use mg_server::{app, AppState};

fn provider(name: &str, base_url: &str, models: &[&str]) -> ProviderConfig {
    ProviderConfig {
        name: name.to_string(),
        enabled: true,
        base_url: base_url.to_string(),
        api_key: None,
        models: models.iter().map(|m| m.to_string()).collect(),
    }
}

fn mapping(from: &str, to: &str) -> ModelMappingRule {
    ModelMappingRule {
        from: from.to_string(),
        to: to.to_string(),
    }
}

fn state_with(config: AppConfig) -> AppState {
    AppState::new(Arc::new(ConfigManager::new(
        config,
        PathBuf::from("/tmp/modelgate-test.yaml"),
    )))
}

fn post_request(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

#[tokio::test]
async fn test_local_provider_dispatch() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"id":"cmpl-1","model":"llama3","choices":[]}"#),
        )
        .mount(&upstream)
        .await;

    let mut config = AppConfig::default();
    config
        .providers
        .push(provider("ollama", &upstream.uri(), &["llama3"]));

    let router = app(state_with(config));
    let response = router
        .oneshot(post_request(
            "/v1/chat/completions",
            r#"{"model":"llama3","messages":[]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_bytes(response).await;
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["model"], "llama3");

    // The upstream saw the request body unmodified
    let requests = upstream.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let sent: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(sent["model"], "llama3");
}

#[tokio::test]
async fn test_mapping_rewrites_request_and_translates_response() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"id":"cmpl-1","model":"local-model-a(xhigh)","choices":[]}"#,
        ))
        .mount(&upstream)
        .await;

    let mut config = AppConfig::default();
    config
        .providers
        .push(provider("ollama", &upstream.uri(), &["local-model-a"]));
    config.model_mappings.push(mapping("gpt-5", "local-model-a"));

    let router = app(state_with(config));
    let response = router
        .oneshot(post_request(
            "/v1/chat/completions",
            r#"{"model":"gpt-5(xhigh)","messages":[]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(
        body.contains(r#""model":"gpt-5(xhigh)""#),
        "response model should be translated back, got: {}",
        body
    );
    assert!(
        !body.contains("local-model-a"),
        "substitute model must not leak to the client, got: {}",
        body
    );

    // The provider saw the substituted model with the suffix carried over
    let requests = upstream.received_requests().await.unwrap();
    let sent: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(sent["model"], "local-model-a(xhigh)");
}

#[tokio::test]
async fn test_force_priority_prefers_mapping_over_local_provider() {
    let direct = MockServer::start().await;
    let mapped = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"model":"gpt-5","choices":[]}"#),
        )
        .mount(&direct)
        .await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"model":"local-model-a","choices":[]}"#),
        )
        .mount(&mapped)
        .await;

    let mut config = AppConfig::default();
    config
        .providers
        .push(provider("openai-local", &direct.uri(), &["gpt-5"]));
    config
        .providers
        .push(provider("ollama", &mapped.uri(), &["local-model-a"]));
    config.model_mappings.push(mapping("gpt-5", "local-model-a"));
    config.force_model_mappings = true;

    let router = app(state_with(config));
    let response = router
        .oneshot(post_request(
            "/v1/chat/completions",
            r#"{"model":"gpt-5","messages":[]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(body.contains(r#""model":"gpt-5""#));

    assert!(direct.received_requests().await.unwrap().is_empty());
    let requests = mapped.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let sent: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(sent["model"], "local-model-a");
}

#[tokio::test]
async fn test_default_priority_prefers_local_provider() {
    let direct = MockServer::start().await;
    let mapped = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"model":"gpt-5","choices":[]}"#),
        )
        .mount(&direct)
        .await;

    let mut config = AppConfig::default();
    config
        .providers
        .push(provider("openai-local", &direct.uri(), &["gpt-5"]));
    config
        .providers
        .push(provider("ollama", &mapped.uri(), &["local-model-a"]));
    config.model_mappings.push(mapping("gpt-5", "local-model-a"));

    let router = app(state_with(config));
    let response = router
        .oneshot(post_request(
            "/v1/chat/completions",
            r#"{"model":"gpt-5","messages":[]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(direct.received_requests().await.unwrap().len(), 1);
    assert!(mapped.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_beta_header_sanitized_on_local_route() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"model":"llama3"}"#))
        .mount(&upstream)
        .await;

    let mut config = AppConfig::default();
    config
        .providers
        .push(provider("ollama", &upstream.uri(), &["llama3"]));

    let router = app(state_with(config));
    let request = Request::builder()
        .method("POST")
        .uri("/v1/messages")
        .header("content-type", "application/json")
        .header("anthropic-beta", "tools-2024,context-1m-2025-08-07,vision")
        .body(Body::from(r#"{"model":"llama3"}"#))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let requests = upstream.received_requests().await.unwrap();
    let beta = requests[0]
        .headers
        .get("anthropic-beta")
        .expect("header should survive with filtered value");
    assert_eq!(beta, "tools-2024,vision");
}

#[tokio::test]
async fn test_beta_header_removed_when_only_denylisted_token() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"model":"llama3"}"#))
        .mount(&upstream)
        .await;

    let mut config = AppConfig::default();
    config
        .providers
        .push(provider("ollama", &upstream.uri(), &["llama3"]));

    let router = app(state_with(config));
    let request = Request::builder()
        .method("POST")
        .uri("/v1/messages")
        .header("content-type", "application/json")
        .header("anthropic-beta", "context-1m-2025-08-07")
        .body(Body::from(r#"{"model":"llama3"}"#))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let requests = upstream.received_requests().await.unwrap();
    assert!(requests[0].headers.get("anthropic-beta").is_none());
}

#[tokio::test]
async fn test_remote_fallback_forwards_with_entitlements_intact() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
        .mount(&upstream)
        .await;

    let mut config = AppConfig::default();
    config.fallback = FallbackConfig {
        enabled: true,
        base_url: upstream.uri(),
        api_key: Some("sk-upstream".to_string()),
    };

    let router = app(state_with(config));
    let request = Request::builder()
        .method("POST")
        .uri("/v1/messages")
        .header("content-type", "application/json")
        .header("anthropic-beta", "context-1m-2025-08-07")
        .body(Body::from(r#"{"model":"claude-x"}"#))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_bytes(response).await;
    assert_eq!(body, br#"{"ok":true}"#);

    // The paid upstream sees the original entitlements and its credential
    let requests = upstream.received_requests().await.unwrap();
    assert_eq!(
        requests[0].headers.get("anthropic-beta").unwrap(),
        "context-1m-2025-08-07"
    );
    assert_eq!(
        requests[0].headers.get("authorization").unwrap(),
        "Bearer sk-upstream"
    );
}

#[tokio::test]
async fn test_no_provider_no_mapping_no_fallback_is_not_found() {
    let router = app(state_with(AppConfig::default()));
    let response = router
        .oneshot(post_request(
            "/v1/chat/completions",
            r#"{"model":"claude-x"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["error"]["type"], "not_found_error");
    assert!(json["error"]["message"]
        .as_str()
        .unwrap()
        .contains("claude-x"));
}

#[tokio::test]
async fn test_mapping_to_unreachable_model_is_not_found() {
    // A mapping whose target no provider serves must not produce a route
    let mut config = AppConfig::default();
    config.model_mappings.push(mapping("gpt-5", "nowhere-model"));

    let router = app(state_with(config));
    let response = router
        .oneshot(post_request(
            "/v1/chat/completions",
            r#"{"model":"gpt-5"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_action_path_routes_without_body_model() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-pro:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"candidates":[]}"#))
        .mount(&upstream)
        .await;

    let mut config = AppConfig::default();
    config
        .providers
        .push(provider("gemini-local", &upstream.uri(), &["gemini-pro"]));

    let router = app(state_with(config));
    let response = router
        .oneshot(post_request(
            "/v1beta/models/gemini-pro:generateContent",
            r#"{"contents":[]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(upstream.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_publisher_path_routes_via_models_segment() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"candidates":[]}"#))
        .mount(&upstream)
        .await;

    let mut config = AppConfig::default();
    config
        .providers
        .push(provider("gemini-local", &upstream.uri(), &["gemini-pro"]));

    let router = app(state_with(config));
    let response = router
        .oneshot(post_request(
            "/v1beta/publishers/google/models/gemini-pro:streamGenerateContent",
            r#"{"contents":[]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_request_without_model_is_bad_request() {
    let router = app(state_with(AppConfig::default()));
    let response = router
        .oneshot(post_request("/v1/chat/completions", r#"{"messages":[]}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["error"]["type"], "invalid_request_error");
}

#[tokio::test]
async fn test_list_models() {
    let mut config = AppConfig::default();
    config.providers.push(provider(
        "ollama",
        "http://localhost:11434",
        &["llama3", "qwen"],
    ));

    let router = app(state_with(config));
    let request = Request::builder()
        .method("GET")
        .uri("/v1/models")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["object"], "list");
    let ids: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["llama3", "qwen"]);
}
