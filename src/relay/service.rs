//! Remote answering service client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// Reply body of the chat route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatAnswer {
    pub response: Option<String>,
    pub sources: Vec<Value>,
    pub error: Option<String>,
}

impl ChatAnswer {
    /// A request the relay itself refuses
    #[must_use]
    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            response: None,
            sources: Vec::new(),
            error: Some(error.into()),
        }
    }

    fn degraded(response: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            response: Some(response.into()),
            sources: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// Answers a query on behalf of the chat route
#[async_trait]
pub trait AnswerService: Send + Sync {
    /// Answer `query`
    ///
    /// Upstream failures are folded into the answer's `error` field.
    ///
    /// # Errors
    ///
    /// Returns error only when the upstream reply cannot be interpreted
    async fn answer(&self, query: &str) -> Result<ChatAnswer>;
}

#[derive(Serialize)]
struct AskRequest<'a> {
    query: &'a str,
}

#[derive(Deserialize)]
struct AskResponse {
    answer: Option<String>,
    #[serde(default)]
    sources: Option<Vec<Value>>,
}

/// Retrieval-augmented answering service reached over HTTP (`POST {base}/ask`)
#[derive(Debug, Clone)]
pub struct RemoteRagService {
    client: Client,
    base_url: String,
}

impl RemoteRagService {
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl AnswerService for RemoteRagService {
    async fn answer(&self, query: &str) -> Result<ChatAnswer> {
        let url = format!("{}/ask", self.base_url);

        let response = match self.client.post(&url).json(&AskRequest { query }).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, %url, "answering service unreachable");
                return Ok(ChatAnswer::degraded(
                    "The AI assistant is currently unreachable. Please check your connection \
                     and verify the answering service is running.",
                    e.to_string(),
                ));
            }
        };

        let status = response.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            let body = response.text().await.unwrap_or_default();
            let detail = error_detail(&body);
            tracing::error!(%status, %detail, "answering service error");
            return Ok(ChatAnswer::degraded(
                "The AI assistant encountered an error. The answering service may be missing \
                 its model API key.",
                detail,
            ));
        }
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, %body, "answering service error");
            return Ok(ChatAnswer::degraded(
                format!(
                    "The AI assistant encountered an error ({}). Please try again later.",
                    status.as_u16()
                ),
                body,
            ));
        }

        let body = response.text().await?;
        let ask: AskResponse = serde_json::from_str(&body).map_err(|e| {
            Error::Transport(format!("unexpected reply from answering service: {e}"))
        })?;
        tracing::debug!(
            sources = ask.sources.as_ref().map_or(0, Vec::len),
            "answering service replied"
        );

        Ok(ChatAnswer {
            response: ask.answer,
            sources: ask.sources.unwrap_or_default(),
            error: None,
        })
    }
}

/// `detail` field of an error body, or the raw body
fn error_detail(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value.get("detail").map(|detail| match detail {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
        })
        .unwrap_or_else(|| body.to_string())
}
