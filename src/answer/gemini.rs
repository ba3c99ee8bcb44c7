//! Gemini `generateContent` client.

use super::AnswerComposer;
use super::prompt::build_prompt;
use crate::config::LlmConfig;
use crate::error::{QaError, Result};
use crate::pipeline::Query;
use serde_json::{Value, json};
use std::time::Duration;
use zak_search::{Corpus, SourceList};

/// Location of the answer text in a `generateContent` response.
const ANSWER_POINTER: &str = "/candidates/0/content/parts/0/text";

/// Longest error body excerpt carried into an answer.
const MAX_ERROR_EXCERPT: usize = 200;

/// Composes answers with a single non-streaming Gemini call.
pub struct GeminiComposer {
    client: reqwest::Client,
    url: String,
    api_key: String,
    timeout_seconds: u64,
    max_corpus_chars: Option<usize>,
}

impl GeminiComposer {
    /// Build a composer from validated config.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Llm`] if the HTTP client cannot be built.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| QaError::Llm(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: format!(
                "{}/v1beta/models/{}:generateContent",
                config.base_url.trim_end_matches('/'),
                config.model
            ),
            api_key: config.api_key.clone(),
            timeout_seconds: config.timeout_seconds,
            max_corpus_chars: config.max_corpus_chars,
        })
    }

    /// Send `prompt` and return the trimmed answer text.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Llm`] on transport failure, timeout, a non-2xx
    /// status, or a response without answer text.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            return Err(map_http_error(status, &text));
        }

        let value: Value = serde_json::from_str(&text)
            .map_err(|e| QaError::Llm(format!("response is not JSON: {e}")))?;
        value
            .pointer(ANSWER_POINTER)
            .and_then(Value::as_str)
            .map(|answer| answer.trim().to_owned())
            .ok_or_else(|| QaError::Llm("response has no candidate text".into()))
    }

    fn transport_error(&self, err: reqwest::Error) -> QaError {
        if err.is_timeout() {
            QaError::Llm(format!("request timed out after {}s", self.timeout_seconds))
        } else {
            QaError::Llm(err.without_url().to_string())
        }
    }
}

impl AnswerComposer for GeminiComposer {
    async fn compose(&self, query: &Query, sources: &SourceList, corpus: &Corpus) -> String {
        let prompt = build_prompt(query.text(), sources, corpus.as_str(), self.max_corpus_chars);
        tracing::debug!(prompt_chars = prompt.chars().count(), "sending prompt to Gemini");

        match self.generate(&prompt).await {
            Ok(answer) => answer,
            Err(err) => {
                tracing::warn!(error = %err, "Gemini call failed");
                let detail = match err {
                    QaError::Llm(detail) => detail,
                    other => other.to_string(),
                };
                format!("Error querying Gemini: {detail}")
            }
        }
    }
}

fn map_http_error(status: reqwest::StatusCode, body: &str) -> QaError {
    let message = extract_error_message(body);
    QaError::Llm(format!("HTTP {}: {message}", status.as_u16()))
}

/// Pull `error.message` out of a Gemini error body, else a short excerpt.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.pointer("/error/message").and_then(Value::as_str).map(String::from))
        .unwrap_or_else(|| body.chars().take(MAX_ERROR_EXCERPT).collect())
}
