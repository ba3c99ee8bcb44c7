//! HTTP surface: `POST /api/realtime` and `GET /health`.
//!
//! Handlers only translate between JSON and [`QueryPipeline`]; all request
//! logic lives in the pipeline.

use crate::answer::AnswerComposer;
use crate::config::ServerConfig;
use crate::error::Result;
use crate::pipeline::{PipelineOutcome, QueryPipeline};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use zak_search::{PageSourceFactory, SourceFinder};

/// Error body for a request without a usable question.
const MISSING_QUESTION: &str = "Missing 'question'";

/// Build the application router around a shared pipeline.
///
/// CORS applies to `/api/*` only and admits the configured origins.
pub fn router<F, P, C>(pipeline: Arc<QueryPipeline<F, P, C>>, config: &ServerConfig) -> Router
where
    F: SourceFinder + 'static,
    P: PageSourceFactory + 'static,
    C: AnswerComposer + 'static,
{
    Router::new()
        .route("/api/realtime", post(realtime::<F, P, C>))
        .layer(cors_layer(&config.allowed_origins))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(pipeline)
}

/// Bind the configured address and serve `app` until `shutdown` resolves.
///
/// # Errors
///
/// Returns an I/O error if the address cannot be bound or the server fails.
pub async fn serve(
    app: Router,
    config: &ServerConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!("zak listening on http://{local_addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok"
    }))
}

async fn realtime<F, P, C>(
    State(pipeline): State<Arc<QueryPipeline<F, P, C>>>,
    body: Bytes,
) -> Response
where
    F: SourceFinder + 'static,
    P: PageSourceFactory + 'static,
    C: AnswerComposer + 'static,
{
    let Some(question) = question_from_body(&body) else {
        return missing_question();
    };

    // Dropping the handler (client disconnect) cancels the run.
    let cancel = CancellationToken::new();
    let guard = cancel.clone().drop_guard();
    let outcome = pipeline.run(&question, &cancel).await;
    guard.disarm();

    match outcome {
        PipelineOutcome::BadRequest => missing_question(),
        PipelineOutcome::Cancelled => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({"error": "request cancelled"})),
        )
            .into_response(),
        answered => {
            let answer = answered.answer().unwrap_or_default();
            (StatusCode::OK, Json(serde_json::json!({"answer": answer}))).into_response()
        }
    }
}

/// Pull a string `question` out of a JSON body.
///
/// A body that is not JSON, or whose `question` is absent or not a string,
/// yields `None`.
fn question_from_body(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value.get("question")?.as_str().map(str::to_owned)
}

fn missing_question() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({"error": MISSING_QUESTION})),
    )
        .into_response()
}
