//! zak: realtime web-grounded question answering.
//!
//! A question flows through one pipeline per request:
//! question → search API → page fetch + extraction → corpus → Gemini → answer
//!
//! # Architecture
//!
//! - **Retrieval** (`zak-search`): source lookup, page fetching, content
//!   extraction and corpus aggregation
//! - **Answering** ([`answer`]): prompt assembly and the Gemini client
//! - **Orchestration** ([`pipeline`]): the per-request state machine and its
//!   terminal outcomes
//! - **Service** ([`server`]): the axum HTTP surface
//!
//! Every stage degrades instead of failing: the caller always receives an
//! answer, a "no results"/"no content" message, or a 400 for a blank question.

pub mod answer;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod server;

pub use answer::{AnswerComposer, GeminiComposer};
pub use config::{LlmConfig, QaConfig, ServerConfig};
pub use error::{QaError, Result};
pub use pipeline::{
    NO_CONTENT_ANSWER, NO_SOURCES_ANSWER, PipelineOutcome, Query, QueryPipeline, Stage,
};
