//! End-to-end tests through the HTTP endpoint.
//!
//! One wiremock server plays the search API, the candidate pages and Gemini;
//! the real router is served on an ephemeral port and called with reqwest.

use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zak::answer::GeminiComposer;
use zak::config::{LlmConfig, ServerConfig};
use zak::pipeline::{NO_CONTENT_ANSWER, NO_SOURCES_ANSWER, QueryPipeline};
use zak_search::{FetchConfig, PageFetcher, SearchConfig, SerpApiEngine};

const GENERATE_PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";

async fn spawn_app(mock: &MockServer) -> SocketAddr {
    let finder = SerpApiEngine::new(SearchConfig {
        api_key: "serp-test-key".into(),
        endpoint: format!("{}/search.json", mock.uri()),
        timeout_seconds: 2,
        ..Default::default()
    })
    .expect("engine");
    let pages = PageFetcher::new(FetchConfig {
        timeout_seconds: 2,
        ..Default::default()
    })
    .expect("fetcher");
    let composer = GeminiComposer::new(&LlmConfig {
        api_key: "gemini-test-key".into(),
        base_url: mock.uri(),
        timeout_seconds: 2,
        ..Default::default()
    })
    .expect("composer");

    let pipeline = Arc::new(QueryPipeline::new(finder, pages, composer, 4));
    let app = zak::server::router(pipeline, &ServerConfig::default());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

async fn mount_search(mock: &MockServer, links: &[String]) {
    let results: Vec<_> = links.iter().map(|link| json!({"link": link})).collect();
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "organic_results": results
        })))
        .mount(mock)
        .await;
}

async fn ask(addr: SocketAddr, body: String) -> (u16, serde_json::Value) {
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/api/realtime"))
        .header("content-type", "application/json")
        .body(body)
        .send()
        .await
        .expect("request");
    let status = response.status().as_u16();
    let value = response.json().await.expect("json response");
    (status, value)
}

#[tokio::test]
async fn capital_of_france_is_answered_from_page_content() {
    let mock = MockServer::start().await;
    let broken = format!("{}/broken", mock.uri());
    mount_search(&mock, &[format!("{}/france", mock.uri()), broken.clone()]).await;
    Mock::given(method("GET"))
        .and(path("/france"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string("<html><body><p>Paris is the capital of France.</p></body></html>"),
        )
        .mount(&mock)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock)
        .await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_string_contains("Paris is the capital of France."))
        .and(body_string_contains(broken.as_str()))
        .and(body_string_contains("What is the capital of France?"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": "The capital of France is Paris."}]}}]
        })))
        .expect(1)
        .mount(&mock)
        .await;

    let addr = spawn_app(&mock).await;
    let (status, body) = ask(
        addr,
        json!({"question": "What is the capital of France?"}).to_string(),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body, json!({"answer": "The capital of France is Paris."}));
}

#[tokio::test]
async fn search_query_param_is_the_trimmed_question() {
    let mock = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("q", "capital of France"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"organic_results": []})))
        .expect(1)
        .mount(&mock)
        .await;

    let addr = spawn_app(&mock).await;
    let (status, body) = ask(addr, json!({"question": "  capital of France \n"}).to_string()).await;
    assert_eq!(status, 200);
    assert_eq!(body["answer"], NO_SOURCES_ANSWER);
}

#[tokio::test]
async fn unreadable_pages_give_no_content_answer() {
    let mock = MockServer::start().await;
    mount_search(&mock, &[format!("{}/gone", mock.uri())]).await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock)
        .await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock)
        .await;

    let addr = spawn_app(&mock).await;
    let (status, body) = ask(addr, json!({"question": "anything"}).to_string()).await;
    assert_eq!(status, 200);
    assert_eq!(body["answer"], NO_CONTENT_ANSWER);
}

#[tokio::test]
async fn missing_or_blank_question_is_rejected() {
    let mock = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock)
        .await;

    let addr = spawn_app(&mock).await;
    for body in [
        json!({}).to_string(),
        json!({"question": "   "}).to_string(),
        json!({"question": 7}).to_string(),
        "not json".to_owned(),
    ] {
        let (status, value) = ask(addr, body).await;
        assert_eq!(status, 400);
        assert_eq!(value, json!({"error": "Missing 'question'"}));
    }
}

#[tokio::test]
async fn health_reports_ok() {
    let mock = MockServer::start().await;
    let addr = spawn_app(&mock).await;
    let body: serde_json::Value = reqwest::get(format!("http://{addr}/health"))
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn cors_admits_only_the_configured_origin() {
    let mock = MockServer::start().await;
    let addr = spawn_app(&mock).await;
    let client = reqwest::Client::new();
    let preflight = |origin: &'static str| {
        client
            .request(
                reqwest::Method::OPTIONS,
                format!("http://{addr}/api/realtime"),
            )
            .header("origin", origin)
            .header("access-control-request-method", "POST")
            .send()
    };

    let allowed = preflight("https://zak-beta.vercel.app").await.expect("preflight");
    assert_eq!(
        allowed
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("https://zak-beta.vercel.app")
    );

    let denied = preflight("https://evil.example").await.expect("preflight");
    assert!(denied.headers().get("access-control-allow-origin").is_none());
}
